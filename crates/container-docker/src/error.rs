use fabnet_container::ContainerRunnerError;
use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The runtime executable could not be started.
    #[error("failed to spawn {0}: {1}")]
    Spawn(String, #[source] std::io::Error),

    /// The runtime executable was started but could not be waited on.
    #[error("failed to wait for {0}: {1}")]
    Wait(String, #[source] std::io::Error),
}

impl ContainerRunnerError for Error {}
