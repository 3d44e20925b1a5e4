use chrono::{DateTime, NaiveDate, Utc};
use dirabus_catalog::{Route, RouteId, Seat, SeatId, Station, StationId, Vehicle, VehicleId, VehicleStatus};
use dirabus_core::{AdminStats, Booking, BookingStatus, PassengerDetails};
use dirabus_shared::Masked;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;

/// Integer primary key or string id
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> Option<String> {
        match self {
            WireId::Int(n) => Some(n.to_string()),
            WireId::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            WireId::Text(_) => None,
        }
    }
}

fn id_string(id: Option<WireId>) -> Option<String> {
    id.and_then(WireId::into_string)
}

/// Anything other than a literal `true` counts as `false`.
fn flag(value: Option<Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

#[derive(Debug, Deserialize)]
pub struct Wrapped<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

/// Either an `ApiResponse`-style envelope or the bare payload. Field casing
/// differs between endpoints, so the `Wire*` records below take both spellings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped(Wrapped<T>),
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Envelope::Bare(data) => Ok(data),
            Envelope::Wrapped(Wrapped { success: true, data: Some(data), .. }) => Ok(data),
            Envelope::Wrapped(Wrapped { success: true, data: None, .. }) => {
                Err(ApiError::Decode("Envelope reported success without data".to_string()))
            }
            Envelope::Wrapped(Wrapped { success: false, message, .. }) => {
                Err(ApiError::Rejected(message.unwrap_or_else(|| "No message".to_string())))
            }
        }
    }
}

// ============================================================================
// Seats
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WireSeat {
    pub id: Option<WireId>,
    #[serde(alias = "busId", alias = "bus_id")]
    pub bus: Option<WireId>,
    #[serde(alias = "seatNumber")]
    pub seat_number: Option<WireId>,
    #[serde(alias = "isAvailable")]
    pub is_available: Option<Value>,
    #[serde(alias = "isReserved")]
    pub is_reserved: Option<Value>,
}

impl WireSeat {
    /// Canonical seat, or `None` when the record has no usable id.
    pub fn into_seat(self) -> Option<Seat> {
        let id = id_string(self.id)?;
        let label = id_string(self.seat_number).unwrap_or_else(|| id.clone());
        Some(Seat {
            id: SeatId::new(id),
            vehicle_id: id_string(self.bus).map(VehicleId::new),
            label,
            available: flag(self.is_available),
            reserved: flag(self.is_reserved),
        })
    }
}

/// Normalize a seat listing, keeping backend order and dropping records
/// without an id.
pub fn normalize_seats(raw: Vec<WireSeat>) -> Vec<Seat> {
    let total = raw.len();
    let seats: Vec<Seat> = raw.into_iter().filter_map(WireSeat::into_seat).collect();
    if seats.len() < total {
        warn!("Dropped {} seat records without an id", total - seats.len());
    }
    seats
}

// ============================================================================
// Buses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WireVehicle {
    pub id: Option<WireId>,
    #[serde(alias = "plateNumber")]
    pub plate_number: Option<String>,
    #[serde(alias = "routeId", alias = "route_id")]
    pub route: Option<WireId>,
    pub capacity: Option<u32>,
    #[serde(alias = "availableSeats")]
    pub available_seats: Option<u32>,
    #[serde(alias = "pricePerSeat")]
    pub price_per_seat: Option<Decimal>,
    #[serde(alias = "studentDiscount")]
    pub student_discount: Option<Decimal>,
    #[serde(alias = "departureTime")]
    pub departure_time: Option<String>,
    #[serde(alias = "arrivalTime")]
    pub arrival_time: Option<String>,
    pub status: Option<String>,
}

impl WireVehicle {
    /// Canonical vehicle. Buses without an id or a seat price cannot be sold
    /// and are dropped.
    pub fn into_vehicle(self) -> Option<Vehicle> {
        let id = id_string(self.id)?;
        let Some(price_per_seat) = self.price_per_seat else {
            warn!("Bus {} has no seat price; skipping", id);
            return None;
        };
        let capacity = self.capacity.unwrap_or(0);
        let status = match self.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("active") => VehicleStatus::Active,
            Some("maintenance") => VehicleStatus::Maintenance,
            Some(_) => VehicleStatus::Inactive,
        };

        Some(Vehicle {
            plate_number: self.plate_number.unwrap_or_else(|| id.clone()),
            id: VehicleId::new(id),
            route_id: id_string(self.route).map(RouteId::new),
            capacity,
            available_seats: self.available_seats.unwrap_or(capacity),
            price_per_seat,
            student_discount: self.student_discount.unwrap_or(Decimal::ZERO),
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            status,
        })
    }
}

pub fn normalize_vehicles(raw: Vec<WireVehicle>) -> Vec<Vehicle> {
    raw.into_iter().filter_map(WireVehicle::into_vehicle).collect()
}

// ============================================================================
// Routes & Stations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WireStation {
    pub id: Option<WireId>,
    #[serde(alias = "routeId", alias = "route_id")]
    pub route: Option<WireId>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub order: Option<u32>,
}

impl WireStation {
    pub fn into_station(self) -> Option<Station> {
        let id = id_string(self.id)?;
        Some(Station {
            name: self.name.unwrap_or_else(|| id.clone()),
            id: StationId::new(id),
            route_id: id_string(self.route).map(RouteId::new),
            latitude: self.latitude.unwrap_or_default(),
            longitude: self.longitude.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        })
    }
}

/// Stations sorted by their order on the route
pub fn normalize_stations(raw: Vec<WireStation>) -> Vec<Station> {
    let mut stations: Vec<Station> = raw.into_iter().filter_map(WireStation::into_station).collect();
    stations.sort_by_key(|s| s.order);
    stations
}

#[derive(Debug, Deserialize)]
pub struct WireRoute {
    pub id: Option<WireId>,
    pub name: Option<String>,
    #[serde(alias = "startLocation")]
    pub start_location: Option<String>,
    #[serde(alias = "endLocation")]
    pub end_location: Option<String>,
    pub distance: Option<f64>,
    #[serde(alias = "estimatedDuration")]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub stations: Vec<WireStation>,
}

impl WireRoute {
    pub fn into_route(self) -> Option<Route> {
        let id = id_string(self.id)?;
        Some(Route {
            name: self.name.unwrap_or_else(|| id.clone()),
            id: RouteId::new(id),
            start_location: self.start_location.unwrap_or_default(),
            end_location: self.end_location.unwrap_or_default(),
            distance: self.distance.unwrap_or_default(),
            estimated_duration: self.estimated_duration.unwrap_or_default(),
            stations: normalize_stations(self.stations),
        })
    }
}

pub fn normalize_routes(raw: Vec<WireRoute>) -> Vec<Route> {
    raw.into_iter().filter_map(WireRoute::into_route).collect()
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WireBooking {
    pub id: Option<WireId>,
    #[serde(alias = "receiptId")]
    pub receipt_id: Option<String>,
    #[serde(alias = "busId", alias = "bus_id")]
    pub bus: Option<WireId>,
    #[serde(alias = "travelDate")]
    pub travel_date: Option<String>,
    #[serde(default)]
    pub seats: Vec<WireId>,
    #[serde(alias = "totalPrice")]
    pub total_price: Option<Decimal>,
    #[serde(alias = "passengerInfo")]
    pub passenger_info: Option<Value>,
    pub status: Option<String>,
    #[serde(alias = "bookingDate")]
    pub booking_date: Option<String>,
}

/// Accepts `YYYY-MM-DD` as well as a full ISO timestamp.
fn parse_travel_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
pub struct WirePassenger {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "passengerType")]
    pub passenger_type: Option<String>,
    #[serde(alias = "seatId")]
    pub seat_id: Option<WireId>,
    #[serde(alias = "seatNumber")]
    pub seat_number: Option<WireId>,
}

impl WirePassenger {
    fn into_details(self) -> PassengerDetails {
        PassengerDetails {
            name: self.name.unwrap_or_default(),
            phone: Masked::new(self.phone.unwrap_or_default()),
            email: Masked::new(self.email.unwrap_or_default()),
            passenger_type: self
                .passenger_type
                .as_deref()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default(),
            seat_id: id_string(self.seat_id).map(SeatId::new),
            seat_number: id_string(self.seat_number),
        }
    }
}

/// `passenger_info` is free-form JSON on the backend; only object entries of
/// a list are kept.
fn parse_passengers(value: Option<Value>) -> Vec<PassengerDetails> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<WirePassenger>(item).ok())
            .map(WirePassenger::into_details)
            .collect(),
        _ => Vec::new(),
    }
}

impl WireBooking {
    pub fn into_booking(self) -> Result<Booking, ApiError> {
        let id = id_string(self.id)
            .ok_or_else(|| ApiError::Decode("Booking without id".to_string()))?;
        let status = match self.status.as_deref() {
            None => BookingStatus::Confirmed,
            Some(raw) => raw
                .parse::<BookingStatus>()
                .map_err(|e| ApiError::Decode(format!("Booking {}: {}", id, e)))?,
        };

        Ok(Booking {
            receipt_id: self.receipt_id.unwrap_or_default(),
            vehicle_id: id_string(self.bus).map(VehicleId::new),
            travel_date: self.travel_date.as_deref().and_then(parse_travel_date),
            seats: self
                .seats
                .into_iter()
                .filter_map(WireId::into_string)
                .map(SeatId::new)
                .collect(),
            total_price: self.total_price.unwrap_or(Decimal::ZERO),
            passengers: parse_passengers(self.passenger_info),
            status,
            booked_at: self.booking_date.as_deref().and_then(parse_timestamp),
            id,
        })
    }
}

pub fn normalize_bookings(raw: Vec<WireBooking>) -> Result<Vec<Booking>, ApiError> {
    raw.into_iter().map(WireBooking::into_booking).collect()
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct WireAdminStats {
    #[serde(alias = "totalUsers")]
    pub total_users: Option<u64>,
    #[serde(alias = "totalBookings")]
    pub total_bookings: Option<u64>,
    #[serde(alias = "totalRevenue")]
    pub total_revenue: Option<Decimal>,
    #[serde(alias = "activeBuses")]
    pub active_buses: Option<u64>,
    #[serde(alias = "activeRoutes")]
    pub active_routes: Option<u64>,
}

/// Stats either flat or nested under `stats` (next to chart series we ignore)
#[derive(Debug, Deserialize)]
pub struct WireAdminStatsResponse {
    pub stats: Option<WireAdminStats>,
    #[serde(flatten)]
    pub flat: WireAdminStats,
}

impl WireAdminStatsResponse {
    pub fn into_stats(self) -> AdminStats {
        let raw = self.stats.unwrap_or(self.flat);
        AdminStats {
            total_users: raw.total_users.unwrap_or_default(),
            total_bookings: raw.total_bookings.unwrap_or_default(),
            total_revenue: raw.total_revenue.unwrap_or(Decimal::ZERO),
            active_buses: raw.active_buses.unwrap_or_default(),
            active_routes: raw.active_routes.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirabus_catalog::PassengerCategory;
    use rust_decimal_macros::dec;

    fn seats_from(json: &str) -> Result<Vec<Seat>, ApiError> {
        let envelope: Envelope<Vec<WireSeat>> = serde_json::from_str(json)?;
        Ok(normalize_seats(envelope.into_result()?))
    }

    #[test]
    fn test_camel_case_envelope() {
        let seats = seats_from(
            r#"{"success": true, "message": "ok", "data": [
                {"id": "seat-1", "busId": "bus-1", "seatNumber": "1", "isAvailable": true, "isReserved": false},
                {"id": "seat-2", "busId": "bus-1", "seatNumber": "2", "isAvailable": false, "isReserved": false}
            ]}"#,
        )
        .unwrap();

        assert_eq!(seats.len(), 2);
        assert_eq!(seats[0].id, SeatId::from("seat-1"));
        assert_eq!(seats[0].vehicle_id, Some(VehicleId::from("bus-1")));
        assert!(seats[0].is_selectable());
        assert!(!seats[1].available);
    }

    #[test]
    fn test_snake_case_bare_list_with_int_ids() {
        let seats = seats_from(
            r#"[{"id": 14, "bus": 3, "seat_number": 12, "is_available": true, "is_reserved": true}]"#,
        )
        .unwrap();

        assert_eq!(seats[0].id.as_str(), "14");
        assert_eq!(seats[0].label, "12");
        assert!(seats[0].reserved);
        assert!(!seats[0].is_selectable());
    }

    #[test]
    fn test_missing_or_odd_flags_fail_closed() {
        let seats = seats_from(
            r#"[
                {"id": 1, "seatNumber": "1"},
                {"id": 2, "seatNumber": "2", "isAvailable": "yes"},
                {"id": 3, "seatNumber": "3", "isAvailable": null},
                {"seatNumber": "orphan", "isAvailable": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(seats.len(), 3);
        assert!(seats.iter().all(|s| !s.available && !s.reserved));
    }

    #[test]
    fn test_failed_envelope_is_rejected() {
        let err = seats_from(r#"{"success": false, "data": null, "message": "Bus not found"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Bus not found"));
    }

    #[test]
    fn test_vehicle_normalization() {
        let raw: Vec<WireVehicle> = serde_json::from_str(
            r#"[
                {"id": 1, "plate_number": "T123ABC", "route": 4, "capacity": 50, "available_seats": 25,
                 "price_per_seat": "5000.00", "student_discount": 20, "departure_time": "08:00:00",
                 "arrival_time": "08:45:00", "status": "active"},
                {"id": "bus-2", "plateNumber": "T456DEF", "routeId": "route-1", "capacity": 45,
                 "pricePerSeat": 4500, "studentDiscount": 15, "status": "maintenance"},
                {"id": 3, "plate_number": "NOPRICE"}
            ]"#,
        )
        .unwrap();
        let buses = normalize_vehicles(raw);

        assert_eq!(buses.len(), 2);
        assert_eq!(buses[0].price_per_seat, dec!(5000));
        assert_eq!(buses[0].route_id, Some(RouteId::from("4")));
        assert_eq!(buses[1].plate_number, "T456DEF");
        assert_eq!(buses[1].available_seats, 45);
        assert_eq!(buses[1].status, VehicleStatus::Maintenance);
    }

    #[test]
    fn test_routes_with_unsorted_stations() {
        let raw: Vec<WireRoute> = serde_json::from_str(
            r#"[{"id": 1, "name": "Stone Town - Jambiani", "start_location": "Stone Town",
                 "end_location": "Jambiani", "distance": 32.0, "estimated_duration": 75,
                 "stations": [
                    {"id": 9, "name": "Jambiani", "latitude": -6.3, "longitude": 39.5, "order": 2, "route": 1},
                    {"id": 8, "name": "Darajani", "latitude": -6.16, "longitude": 39.19, "order": 1, "route": 1}
                 ]}]"#,
        )
        .unwrap();
        let routes = normalize_routes(raw);

        assert_eq!(routes[0].stations[0].name, "Darajani");
        assert_eq!(routes[0].estimated_duration, 75);
    }

    #[test]
    fn test_booking_normalization() {
        let raw: WireBooking = serde_json::from_str(
            r#"{"id": 31, "user": 2, "bus": 1, "travel_date": "2026-10-20", "seats": [11, 12],
                "total_price": "9000.00", "status": "confirmed",
                "booking_date": "2026-10-19T09:30:00Z", "receipt_id": "RCP-AB12CD34EF",
                "passenger_info": [
                    {"name": "John Doe", "phone": "+255123456789", "email": "john@example.com",
                     "passengerType": "adult", "seatId": 11, "seatNumber": "1"},
                    {"name": "Jane Doe", "phone": "+255987654321", "email": "jane@example.com",
                     "passengerType": "student", "seatId": "12", "seatNumber": "2"}
                ]}"#,
        )
        .unwrap();
        let booking = raw.into_booking().unwrap();

        assert_eq!(booking.id, "31");
        assert_eq!(booking.seats, vec![SeatId::from("11"), SeatId::from("12")]);
        assert_eq!(booking.total_price, dec!(9000));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.booked_at.is_some());
        assert_eq!(booking.passengers.len(), 2);
        assert_eq!(booking.passengers[0].seat_id, Some(SeatId::from("11")));
        assert_eq!(booking.passengers[1].passenger_type, PassengerCategory::Student);
        assert_eq!(booking.passengers[1].phone.expose(), "+255987654321");
    }

    #[test]
    fn test_booking_with_iso_travel_date_and_dict_passenger_info() {
        let raw: WireBooking = serde_json::from_str(
            r#"{"id": "booking-1", "busId": "bus-1", "travelDate": "2026-10-20T05:00:00.000Z",
                "totalPrice": 10000, "status": "pending", "receiptId": "RCP-1", "passengerInfo": {}}"#,
        )
        .unwrap();
        let booking = raw.into_booking().unwrap();

        assert_eq!(booking.travel_date, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert!(booking.passengers.is_empty());
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_unknown_booking_status_is_a_decode_error() {
        let raw: WireBooking = serde_json::from_str(r#"{"id": 1, "status": "boarding"}"#).unwrap();
        assert!(matches!(raw.into_booking(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_admin_stats_nested_and_flat() {
        let nested: Envelope<WireAdminStatsResponse> = serde_json::from_str(
            r#"{"stats": {"totalUsers": 1250, "totalBookings": 3420, "totalRevenue": 12500000,
                          "activeBuses": 45, "activeRoutes": 12},
                "chartData": [{"month": "Jan", "bookings": 245, "revenue": 980000}]}"#,
        )
        .unwrap();
        let stats = nested.into_result().unwrap().into_stats();
        assert_eq!(stats.total_users, 1250);
        assert_eq!(stats.total_revenue, dec!(12500000));

        let flat: Envelope<WireAdminStatsResponse> =
            serde_json::from_str(r#"{"total_users": 3, "active_routes": 1}"#).unwrap();
        let stats = flat.into_result().unwrap().into_stats();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_routes, 1);
        assert_eq!(stats.total_bookings, 0);
    }
}
