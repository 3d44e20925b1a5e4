use std::sync::Arc;

use dirabus_core::repository::{
    AdminRepository, BookingRepository, CatalogRepository, ConductorRepository, SeatSource,
};
use dirabus_shared::Credentials;
use dirabus_store::ApiClient;

/// Shared handles for one terminal session
#[derive(Clone)]
pub struct AppState {
    pub seats: Arc<dyn SeatSource>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub conductor: Arc<dyn ConductorRepository>,
    pub admin: Arc<dyn AdminRepository>,
    pub credentials: Credentials,
    /// Label printed in front of amounts, e.g. `TSh`
    pub currency: String,
}

impl AppState {
    pub fn new(api: ApiClient, credentials: Credentials, currency: impl Into<String>) -> Self {
        Self::with_backend(Arc::new(api), credentials, currency)
    }

    /// All repositories served by one backend.
    pub fn with_backend<B>(backend: Arc<B>, credentials: Credentials, currency: impl Into<String>) -> Self
    where
        B: SeatSource
            + CatalogRepository
            + BookingRepository
            + ConductorRepository
            + AdminRepository
            + 'static,
    {
        Self {
            seats: backend.clone(),
            catalog: backend.clone(),
            bookings: backend.clone(),
            conductor: backend.clone(),
            admin: backend,
            credentials,
            currency: currency.into(),
        }
    }
}
