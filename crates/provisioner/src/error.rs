//! Error types for the provisioner crate.

use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),

    /// Template could not be rendered.
    #[error(transparent)]
    Layout(#[from] fabnet_layout::Error),

    /// The external tool could not be started or exited non-zero.
    ///
    /// Output written before the failure must be treated as untrustworthy.
    #[error("{tool} provisioning failed: {reason}")]
    Provisioning {
        /// Tool that was invoked.
        tool: &'static str,

        /// What went wrong.
        reason: String,
    },
}
