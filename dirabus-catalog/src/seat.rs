use serde::{Deserialize, Serialize};

use crate::ids::{SeatId, VehicleId};

/// One bookable position on a vehicle, in canonical form.
///
/// Seats are fetched read-only; the client never mutates them, it only keeps a
/// selection overlay keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub id: SeatId,
    pub vehicle_id: Option<VehicleId>,
    /// Label printed on the seat (e.g. "12").
    pub label: String,
    pub available: bool,
    pub reserved: bool,
}

impl Seat {
    pub fn new(id: impl Into<SeatId>, label: impl Into<String>, available: bool, reserved: bool) -> Self {
        Self {
            id: id.into(),
            vehicle_id: None,
            label: label.into(),
            available,
            reserved,
        }
    }

    /// The only state in which a seat may enter a selection.
    pub fn is_selectable(&self) -> bool {
        self.available && !self.reserved
    }
}
