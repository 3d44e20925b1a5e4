use chrono::{DateTime, NaiveDate, Utc};
use dirabus_catalog::{PassengerCategory, SeatId, VehicleId};
use dirabus_shared::Masked;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::events::{ConfirmedSeat, SelectionConfirmed};
use crate::{CoreError, CoreResult};

/// Booking status in the conductor's lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Pending → Confirmed, Pending → Cancelled, Confirmed → Completed
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }

    pub fn transition(self, next: BookingStatus) -> CoreResult<BookingStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(CoreError::ValidationError(format!("Unknown booking status: {}", other))),
        }
    }
}

/// Contact details of the traveller in one seat.
///
/// Serialized in the shape the booking endpoint stores verbatim in
/// `passenger_info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDetails {
    pub name: String,
    pub phone: Masked<String>,
    pub email: Masked<String>,
    #[serde(default)]
    pub passenger_type: PassengerCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_id: Option<SeatId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<String>,
}

impl PassengerDetails {
    fn blank_for(seat: &ConfirmedSeat) -> Self {
        Self {
            name: String::new(),
            phone: Masked::from(""),
            email: Masked::from(""),
            passenger_type: seat.category,
            seat_id: Some(seat.seat_id.clone()),
            seat_number: Some(seat.label.clone()),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.phone.expose().trim().is_empty()
            && !self.email.expose().trim().is_empty()
    }
}

/// A confirmed selection waiting for passenger details.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub vehicle_id: VehicleId,
    pub travel_date: NaiveDate,
    pub seats: Vec<ConfirmedSeat>,
    /// Client-side estimate; the backend recomputes the charged amount.
    pub total: Decimal,
    passengers: Vec<PassengerDetails>,
}

impl BookingDraft {
    /// One blank passenger per confirmed seat, category carried over.
    pub fn new(confirmed: SelectionConfirmed, travel_date: NaiveDate) -> Self {
        let passengers = confirmed.seats.iter().map(PassengerDetails::blank_for).collect();
        Self {
            vehicle_id: confirmed.vehicle_id,
            travel_date,
            seats: confirmed.seats,
            total: confirmed.total,
            passengers,
        }
    }

    pub fn passengers(&self) -> &[PassengerDetails] {
        &self.passengers
    }

    /// Fill in passenger `index` (zero-based, in seat order).
    pub fn set_passenger(
        &mut self,
        index: usize,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> CoreResult<()> {
        let count = self.passengers.len();
        let passenger = self.passengers.get_mut(index).ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Passenger {} does not exist; this booking has {} seats",
                index + 1,
                count
            ))
        })?;

        passenger.name = name.into().trim().to_string();
        passenger.phone = Masked::new(phone.into().trim().to_string());
        passenger.email = Masked::new(email.into().trim().to_string());
        Ok(())
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.seats.is_empty() {
            return Err(CoreError::EmptySelection);
        }
        if self.passengers.len() != self.seats.len() {
            return Err(CoreError::ValidationError(format!(
                "{} passengers for {} seats",
                self.passengers.len(),
                self.seats.len()
            )));
        }
        if let Some(pos) = self.passengers.iter().position(|p| !p.is_complete()) {
            return Err(CoreError::ValidationError(format!(
                "Passenger {} is missing name, phone or email",
                pos + 1
            )));
        }
        Ok(())
    }

    /// Validated request body for the booking endpoint
    pub fn to_request(&self) -> CoreResult<BookingRequest> {
        self.validate()?;
        Ok(BookingRequest {
            bus: self.vehicle_id.clone(),
            travel_date: self.travel_date,
            seats: self.seats.iter().map(|s| s.seat_id.clone()).collect(),
            total_price: self.total,
            passenger_info: self.passengers.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingRequest {
    pub bus: VehicleId,
    pub travel_date: NaiveDate,
    pub seats: Vec<SeatId>,
    pub total_price: Decimal,
    pub passenger_info: Vec<PassengerDetails>,
}

/// A booking as recorded by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub receipt_id: String,
    pub vehicle_id: Option<VehicleId>,
    pub travel_date: Option<NaiveDate>,
    pub seats: Vec<SeatId>,
    pub total_price: Decimal,
    pub passengers: Vec<PassengerDetails>,
    pub status: BookingStatus,
    pub booked_at: Option<DateTime<Utc>>,
}
