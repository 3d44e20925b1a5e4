use dirabus_catalog::{Seat, VehicleId};
use dirabus_shared::Credentials;
use tracing::{info, warn};

use crate::repository::SeatSource;

/// Outcome of a seat fetch. A failed fetch carries no seats and an error
/// message; callers check `error` instead of handling a `Result`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatLoad {
    pub seats: Vec<Seat>,
    pub error: Option<String>,
}

impl SeatLoad {
    pub fn loaded(seats: Vec<Seat>) -> Self {
        Self { seats, error: None }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            seats: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Fetch the seats of `vehicle_id`. Never fails: transport and backend errors
/// become an empty [`SeatLoad`] with the error text.
pub async fn load_seats(
    source: &dyn SeatSource,
    credentials: &Credentials,
    vehicle_id: &VehicleId,
) -> SeatLoad {
    match source.fetch_seats(credentials, vehicle_id).await {
        Ok(seats) => {
            info!("Loaded {} seats for vehicle {}", seats.len(), vehicle_id);
            SeatLoad::loaded(seats)
        }
        Err(e) => {
            warn!("Failed to load seats for vehicle {}: {}", vehicle_id, e);
            SeatLoad::failed(e.to_string())
        }
    }
}
