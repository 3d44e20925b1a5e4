use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// GPS position reported by a conductor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BusLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl BusLocation {
    pub fn new(latitude: f64, longitude: f64) -> CoreResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::ValidationError(format!("Latitude {} out of range", latitude)));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::ValidationError(format!("Longitude {} out of range", longitude)));
        }
        Ok(Self { latitude, longitude })
    }
}

/// Aggregate counters shown on the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_bookings: u64,
    pub total_revenue: Decimal,
    pub active_buses: u64,
    pub active_routes: u64,
}
