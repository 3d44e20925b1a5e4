use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use dirabus_catalog::{Route, RouteId, Seat, Station, Vehicle, VehicleId};
use dirabus_core::repository::{
    AdminRepository, BookingRepository, CatalogRepository, ConductorRepository, RepositoryError,
    SeatSource,
};
use dirabus_core::{AdminStats, Booking, BookingRequest, BookingStatus, BusLocation};
use dirabus_shared::Credentials;

use crate::app_config::ApiConfig;
use crate::error::ApiError;
use crate::wire::{self, Envelope, WireAdminStatsResponse, WireBooking, WireRoute, WireSeat, WireStation, WireVehicle};

const BODY_SNIPPET_LEN: usize = 200;

/// Acknowledgement of a write endpoint. Bodies that are not an envelope are
/// taken as success once the status code was 2xx.
#[derive(Debug, Deserialize)]
struct Ack {
    success: Option<bool>,
    message: Option<String>,
}

impl Ack {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or(Ack {
            success: None,
            message: None,
        })
    }

    fn into_result(self) -> Result<(), ApiError> {
        match self {
            Ack { success: Some(false), message } => Err(ApiError::Rejected(
                message.unwrap_or_else(|| "No message".to_string()),
            )),
            _ => Ok(()),
        }
    }
}

/// REST client for the booking backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, credentials: &Credentials) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        let url = format!("{}{}", self.base_url, path);
        debug!(
            "{} {} (request {}, authenticated: {})",
            method,
            url,
            request_id,
            credentials.is_authenticated()
        );

        let mut builder = self
            .http
            .request(method, url)
            .header("X-Request-Id", request_id.to_string());
        if let Some(value) = credentials.authorization_header() {
            builder = builder.header(reqwest::header::AUTHORIZATION, value);
        }
        builder
    }

    /// Send and check the status code, returning the raw body.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let snippet: String = body.chars().take(BODY_SNIPPET_LEN).collect();
            warn!(status = status.as_u16(), "Backend returned an error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: snippet,
            });
        }
        Ok(body)
    }

    /// Decode the (possibly enveloped) body of a successful response.
    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        envelope.into_result()
    }

    /// For write endpoints whose body only says whether it worked.
    async fn execute(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let body = self.send(builder).await?;
        if body.trim().is_empty() {
            return Ok(());
        }
        Ack::parse(&body).into_result()
    }

    pub async fn routes(&self, credentials: &Credentials) -> Result<Vec<Route>, ApiError> {
        let raw: Vec<WireRoute> = self.fetch(self.request(Method::GET, "/routes/", credentials)).await?;
        Ok(wire::normalize_routes(raw))
    }

    pub async fn stations(
        &self,
        credentials: &Credentials,
        route_id: &RouteId,
    ) -> Result<Vec<Station>, ApiError> {
        let path = format!("/routes/{}/stations/", route_id);
        let raw: Vec<WireStation> = self.fetch(self.request(Method::GET, &path, credentials)).await?;
        Ok(wire::normalize_stations(raw))
    }

    /// Buses serving `route_id` on `travel_date`
    pub async fn buses(
        &self,
        credentials: &Credentials,
        route_id: &RouteId,
        travel_date: NaiveDate,
    ) -> Result<Vec<Vehicle>, ApiError> {
        let path = format!("/buses/route/{}/", route_id);
        let builder = self
            .request(Method::GET, &path, credentials)
            .query(&[("date", travel_date.format("%Y-%m-%d").to_string())]);
        let raw: Vec<WireVehicle> = self.fetch(builder).await?;
        Ok(wire::normalize_vehicles(raw))
    }

    pub async fn seats(
        &self,
        credentials: &Credentials,
        vehicle_id: &VehicleId,
    ) -> Result<Vec<Seat>, ApiError> {
        let path = format!("/buses/{}/seats/", vehicle_id);
        let raw: Vec<WireSeat> = self.fetch(self.request(Method::GET, &path, credentials)).await?;
        Ok(wire::normalize_seats(raw))
    }

    pub async fn submit_booking(
        &self,
        credentials: &Credentials,
        request: &BookingRequest,
    ) -> Result<Booking, ApiError> {
        let builder = self.request(Method::POST, "/bookings/", credentials).json(request);
        let raw: WireBooking = self.fetch(builder).await?;
        raw.into_booking()
    }

    pub async fn my_bookings(&self, credentials: &Credentials) -> Result<Vec<Booking>, ApiError> {
        let raw: Vec<WireBooking> = self
            .fetch(self.request(Method::GET, "/user/bookings/", credentials))
            .await?;
        wire::normalize_bookings(raw)
    }

    pub async fn receipt(&self, credentials: &Credentials, receipt_id: &str) -> Result<Booking, ApiError> {
        let path = format!("/bookings/{}/receipt/", receipt_id);
        let raw: WireBooking = self.fetch(self.request(Method::GET, &path, credentials)).await?;
        raw.into_booking()
    }

    pub async fn conductor_buses(&self, credentials: &Credentials) -> Result<Vec<Vehicle>, ApiError> {
        let raw: Vec<WireVehicle> = self
            .fetch(self.request(Method::GET, "/conductor/buses/", credentials))
            .await?;
        Ok(wire::normalize_vehicles(raw))
    }

    pub async fn conductor_bookings(&self, credentials: &Credentials) -> Result<Vec<Booking>, ApiError> {
        let raw: Vec<WireBooking> = self
            .fetch(self.request(Method::GET, "/conductor/bookings/", credentials))
            .await?;
        wire::normalize_bookings(raw)
    }

    pub async fn put_location(
        &self,
        credentials: &Credentials,
        vehicle_id: &VehicleId,
        location: &BusLocation,
    ) -> Result<(), ApiError> {
        let path = format!("/buses/{}/location/", vehicle_id);
        self.execute(self.request(Method::PUT, &path, credentials).json(location))
            .await
    }

    pub async fn put_booking_status(
        &self,
        credentials: &Credentials,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), ApiError> {
        let path = format!("/bookings/{}/status/", booking_id);
        let body = json!({ "status": status });
        self.execute(self.request(Method::PUT, &path, credentials).json(&body))
            .await
    }

    pub async fn admin_stats(&self, credentials: &Credentials) -> Result<AdminStats, ApiError> {
        let raw: WireAdminStatsResponse = self
            .fetch(self.request(Method::GET, "/admin/stats/", credentials))
            .await?;
        Ok(raw.into_stats())
    }
}

#[async_trait]
impl SeatSource for ApiClient {
    async fn fetch_seats(
        &self,
        credentials: &Credentials,
        vehicle_id: &VehicleId,
    ) -> Result<Vec<Seat>, RepositoryError> {
        Ok(self.seats(credentials, vehicle_id).await?)
    }
}

#[async_trait]
impl CatalogRepository for ApiClient {
    async fn list_routes(&self, credentials: &Credentials) -> Result<Vec<Route>, RepositoryError> {
        Ok(self.routes(credentials).await?)
    }

    async fn list_stations(
        &self,
        credentials: &Credentials,
        route_id: &RouteId,
    ) -> Result<Vec<Station>, RepositoryError> {
        Ok(self.stations(credentials, route_id).await?)
    }

    async fn list_buses(
        &self,
        credentials: &Credentials,
        route_id: &RouteId,
        travel_date: NaiveDate,
    ) -> Result<Vec<Vehicle>, RepositoryError> {
        Ok(self.buses(credentials, route_id, travel_date).await?)
    }
}

#[async_trait]
impl BookingRepository for ApiClient {
    async fn create_booking(
        &self,
        credentials: &Credentials,
        request: &BookingRequest,
    ) -> Result<Booking, RepositoryError> {
        Ok(self.submit_booking(credentials, request).await?)
    }

    async fn list_user_bookings(&self, credentials: &Credentials) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self.my_bookings(credentials).await?)
    }

    async fn get_receipt(
        &self,
        credentials: &Credentials,
        receipt_id: &str,
    ) -> Result<Booking, RepositoryError> {
        Ok(self.receipt(credentials, receipt_id).await?)
    }
}

#[async_trait]
impl ConductorRepository for ApiClient {
    async fn list_assigned_buses(&self, credentials: &Credentials) -> Result<Vec<Vehicle>, RepositoryError> {
        Ok(self.conductor_buses(credentials).await?)
    }

    async fn list_bookings(&self, credentials: &Credentials) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self.conductor_bookings(credentials).await?)
    }

    async fn update_location(
        &self,
        credentials: &Credentials,
        vehicle_id: &VehicleId,
        location: &BusLocation,
    ) -> Result<(), RepositoryError> {
        Ok(self.put_location(credentials, vehicle_id, location).await?)
    }

    async fn update_booking_status(
        &self,
        credentials: &Credentials,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<(), RepositoryError> {
        Ok(self.put_booking_status(credentials, booking_id, status).await?)
    }
}

#[async_trait]
impl AdminRepository for ApiClient {
    async fn stats(&self, credentials: &Credentials) -> Result<AdminStats, RepositoryError> {
        Ok(self.admin_stats(credentials).await?)
    }
}
