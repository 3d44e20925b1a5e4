use chrono::Utc;
use dirabus_catalog::{
    partition_rows, seat_status, FareCalculator, PassengerCategory, Seat, SeatId, SeatRow, SeatStatus, Vehicle,
    VehicleId,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::events::{ConfirmedSeat, SelectionConfirmed};
use crate::loader::SeatLoad;
use crate::selection::{Selection, ToggleOutcome, ToggleRejection};
use crate::{CoreError, CoreResult};

/// Tag attached to a seat fetch. Only the response carrying the session's
/// current ticket is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub vehicle_id: VehicleId,
    generation: u64,
}

/// Seat selection state for one passenger session: the active vehicle, its
/// seats as last fetched, and the selection overlay.
#[derive(Debug, Default)]
pub struct SeatSession {
    vehicle: Option<Vehicle>,
    seats: Vec<Seat>,
    selection: Selection,
    load_error: Option<String>,
    current: Option<FetchTicket>,
    loading: bool,
    generation: u64,
}

impl SeatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `vehicle` the active one and issue the ticket for its seat fetch.
    ///
    /// Seats, selection and categories of the previous vehicle are dropped, and
    /// any fetch still in flight becomes stale.
    pub fn select_vehicle(&mut self, vehicle: Vehicle) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            vehicle_id: vehicle.id.clone(),
            generation: self.generation,
        };

        if !self.selection.is_empty() {
            info!(
                "Discarding {} selected seats on vehicle change",
                self.selection.len()
            );
        }
        info!("Active vehicle is now {} ({})", vehicle.id, vehicle.plate_number);

        self.selection.clear();
        self.seats.clear();
        self.load_error = None;
        self.vehicle = Some(vehicle);
        self.current = Some(ticket.clone());
        self.loading = true;
        ticket
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.current.as_ref() == Some(ticket)
    }

    /// Apply a finished fetch. Returns `false` and leaves state untouched when
    /// the ticket is stale or was already applied.
    pub fn apply_seats(&mut self, ticket: &FetchTicket, load: SeatLoad) -> bool {
        if !self.loading || !self.is_current(ticket) {
            debug!(
                "Discarding stale seat response for vehicle {} (generation {})",
                ticket.vehicle_id, ticket.generation
            );
            return false;
        }

        self.seats = load.seats;
        self.load_error = load.error;
        self.loading = false;
        true
    }

    pub fn toggle(&mut self, seat_id: &SeatId) -> ToggleOutcome {
        match self.seats.iter().find(|s| &s.id == seat_id) {
            Some(seat) => self.selection.toggle(seat),
            None => ToggleOutcome::Rejected(ToggleRejection::UnknownSeat),
        }
    }

    pub fn set_category(&mut self, seat_id: &SeatId, category: PassengerCategory) -> CoreResult<()> {
        self.selection.set_category(seat_id, category)
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn seat(&self, seat_id: &SeatId) -> Option<&Seat> {
        self.seats.iter().find(|s| &s.id == seat_id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status_of(&self, seat: &Seat) -> SeatStatus {
        seat_status(seat, self.selection.contains(&seat.id))
    }

    pub fn rows(&self) -> Vec<SeatRow<'_>> {
        partition_rows(&self.seats)
    }

    /// Price of one seat in `category` on the active vehicle
    pub fn unit_price(&self, category: PassengerCategory) -> CoreResult<Decimal> {
        let vehicle = self.vehicle.as_ref().ok_or(CoreError::NoActiveVehicle)?;
        Ok(FareCalculator::for_vehicle(vehicle).unit_price(category)?)
    }

    /// Current fare; zero without an active vehicle.
    pub fn total(&self) -> CoreResult<Decimal> {
        match self.vehicle.as_ref() {
            Some(vehicle) => self.selection.total(vehicle),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Hand the selection upward: `on_confirmed` receives the picked seats (in
    /// pick order) and the computed total.
    pub fn confirm<F, R>(&self, on_confirmed: F) -> CoreResult<R>
    where
        F: FnOnce(SelectionConfirmed) -> R,
    {
        let vehicle = self.vehicle.as_ref().ok_or(CoreError::NoActiveVehicle)?;
        if self.selection.is_empty() {
            return Err(CoreError::EmptySelection);
        }

        let fares = FareCalculator::for_vehicle(vehicle);
        let seats = self
            .selection
            .entries()
            .map(|(seat_id, category)| {
                Ok(ConfirmedSeat {
                    seat_id: seat_id.clone(),
                    label: self
                        .seat(seat_id)
                        .map(|s| s.label.clone())
                        .unwrap_or_else(|| seat_id.to_string()),
                    category,
                    price: fares.unit_price(category)?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let confirmed = SelectionConfirmed {
            vehicle_id: vehicle.id.clone(),
            seats,
            total: self.selection.total(vehicle)?,
            confirmed_at: Utc::now().timestamp(),
        };

        info!(
            "Confirmed {} seats on vehicle {} for {}",
            confirmed.seats.len(),
            confirmed.vehicle_id,
            confirmed.total
        );
        Ok(on_confirmed(confirmed))
    }
}
