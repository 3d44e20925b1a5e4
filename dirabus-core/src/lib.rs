pub mod events;
pub mod selection;
pub mod loader;
pub mod session;
pub mod booking;
pub mod dashboard;
pub mod repository;

pub use events::{ConfirmedSeat, SelectionConfirmed};
pub use selection::{Selection, ToggleOutcome, ToggleRejection};
pub use loader::{load_seats, SeatLoad};
pub use session::{FetchTicket, SeatSession};
pub use booking::{Booking, BookingDraft, BookingRequest, BookingStatus, PassengerDetails};
pub use dashboard::{AdminStats, BusLocation};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Seat {0} is not selected")]
    SeatNotSelected(String),
    #[error("No seats selected")]
    EmptySelection,
    #[error("No vehicle selected")]
    NoActiveVehicle,
    #[error(transparent)]
    Fare(#[from] dirabus_catalog::FareOverflow),
    #[error("Invalid booking status transition from {from} to {to}")]
    InvalidTransition {
        from: String,
        to: String,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
