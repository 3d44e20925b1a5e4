pub mod ids;
pub mod vehicle;
pub mod seat;
pub mod route;
pub mod pricing;
pub mod layout;

pub use ids::{RouteId, SeatId, StationId, VehicleId};
pub use vehicle::{Vehicle, VehicleStatus};
pub use seat::Seat;
pub use route::{Route, Station};
pub use pricing::{compute_total, FareCalculator, FareOverflow, PassengerCategory};
pub use layout::{partition_rows, seat_status, SeatRow, SeatStatus, SEATS_PER_ROW};
