pub mod pii;
pub mod credentials;

pub use pii::Masked;
pub use credentials::Credentials;
