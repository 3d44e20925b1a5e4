use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{RouteId, VehicleId};

/// Operational status of a bus
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
}

/// A single bus with fixed capacity and pricing. Owned by the backend and
/// read-only for the duration of a selection session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate_number: String,
    pub route_id: Option<RouteId>,
    pub capacity: u32,
    pub available_seats: u32,
    pub price_per_seat: Decimal,
    /// Percentage off `price_per_seat` for the student category.
    pub student_discount: Decimal,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub status: VehicleStatus,
}

impl Vehicle {
    pub fn new(
        id: impl Into<VehicleId>,
        plate_number: impl Into<String>,
        price_per_seat: Decimal,
        student_discount: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            plate_number: plate_number.into(),
            route_id: None,
            capacity: 0,
            available_seats: 0,
            price_per_seat,
            student_discount,
            departure_time: None,
            arrival_time: None,
            status: VehicleStatus::Active,
        }
    }
}
