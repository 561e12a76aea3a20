use fabnet_container::ContainerRunnerError;
use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Simulated launch failure.
    #[error("launch failed: {0}")]
    Launch(String),
}

impl ContainerRunnerError for Error {}
