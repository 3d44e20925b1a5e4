use dirabus_catalog::{PassengerCategory, SeatId, VehicleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmedSeat {
    pub seat_id: SeatId,
    pub label: String,
    pub category: PassengerCategory,
    pub price: Decimal,
}

/// Handed upward when the passenger confirms a seat selection. Booking
/// submission takes over from here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionConfirmed {
    pub vehicle_id: VehicleId,
    /// In the order the seats were picked
    pub seats: Vec<ConfirmedSeat>,
    pub total: Decimal,
    pub confirmed_at: i64,
}

impl SelectionConfirmed {
    pub fn seat_ids(&self) -> Vec<SeatId> {
        self.seats.iter().map(|s| s.seat_id.clone()).collect()
    }
}
