//! Error types for the layout crate.

use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Template could not be (de)serialized.
    #[error("template yaml error: {0}")]
    Yaml(#[source] serde_yaml::Error),
}
