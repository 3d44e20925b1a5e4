pub mod app;
pub mod command;
pub mod error;
pub mod render;
pub mod state;

pub use app::run;
pub use command::Command;
pub use error::CommandError;
pub use state::AppState;
