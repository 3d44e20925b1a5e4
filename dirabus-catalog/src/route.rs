use serde::{Deserialize, Serialize};

use crate::ids::{RouteId, StationId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub route_id: Option<RouteId>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Position of the stop along its route, starting at 1.
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub start_location: String,
    pub end_location: String,
    /// Kilometres
    pub distance: f64,
    /// Minutes
    pub estimated_duration: u32,
    pub stations: Vec<Station>,
}
