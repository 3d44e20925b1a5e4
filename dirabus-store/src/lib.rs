pub mod app_config;
pub mod error;
pub mod wire;
pub mod api_client;

pub use api_client::ApiClient;
pub use error::ApiError;
