use dirabus_core::repository::RepositoryError;
use dirabus_core::CoreError;

/// Why a terminal command could not be carried out. Printed to the user; the
/// session keeps going.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list of commands")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    Backend(RepositoryError),
}

impl From<RepositoryError> for CommandError {
    fn from(err: RepositoryError) -> Self {
        CommandError::Backend(err)
    }
}
