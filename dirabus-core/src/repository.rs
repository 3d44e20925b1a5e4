use async_trait::async_trait;
use chrono::NaiveDate;
use dirabus_catalog::{Route, RouteId, Seat, Station, Vehicle, VehicleId};
use dirabus_shared::Credentials;

use crate::booking::{Booking, BookingRequest, BookingStatus};
use crate::dashboard::{AdminStats, BusLocation};

pub type RepositoryError = Box<dyn std::error::Error + Send + Sync>;

/// Seat listing for one vehicle
#[async_trait]
pub trait SeatSource: Send + Sync {
    /// Seats in backend order, normalized to the canonical shape.
    async fn fetch_seats(
        &self,
        credentials: &Credentials,
        vehicle_id: &VehicleId,
    ) -> Result<Vec<Seat>, RepositoryError>;
}

/// Routes, stations and buses
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_routes(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Route>, RepositoryError>;

    async fn list_stations(
        &self,
        credentials: &Credentials,
        route_id: &RouteId,
    ) -> Result<Vec<Station>, RepositoryError>;

    async fn list_buses(
        &self,
        credentials: &Credentials,
        route_id: &RouteId,
        travel_date: NaiveDate,
    ) -> Result<Vec<Vehicle>, RepositoryError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(
        &self,
        credentials: &Credentials,
        request: &BookingRequest,
    ) -> Result<Booking, RepositoryError>;

    async fn list_user_bookings(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Booking>, RepositoryError>;

    async fn get_receipt(
        &self,
        credentials: &Credentials,
        receipt_id: &str,
    ) -> Result<Booking, RepositoryError>;
}

#[async_trait]
pub trait ConductorRepository: Send + Sync {
    async fn list_assigned_buses(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Vehicle>, RepositoryError>;

    async fn list_bookings(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Booking>, RepositoryError>;

    async fn update_location(
        &self,
        credentials: &Credentials,
        vehicle_id: &VehicleId,
        location: &BusLocation,
    ) -> Result<(), RepositoryError>;

    async fn update_booking_status(
        &self,
        credentials: &Credentials,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn stats(
        &self,
        credentials: &Credentials,
    ) -> Result<AdminStats, RepositoryError>;
}
