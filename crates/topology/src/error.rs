//! Error types for parsing service bindings.

use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
///
/// Building a topology cannot fail; these only surface when bindings are read
/// back from their string form.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// Port binding is not `host:container`.
    #[error("invalid port binding `{0}`")]
    InvalidPortBinding(String),

    /// Volume binding is not `source:target[:ro|:rw]`.
    #[error("invalid volume binding `{0}`")]
    InvalidVolumeBinding(String),
}
