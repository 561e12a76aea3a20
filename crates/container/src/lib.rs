//! Abstract interface for running commands against a container runtime.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::error::Error;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Options for a single runtime invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunOptions {
    /// Directory the command runs in.
    pub working_dir: PathBuf,

    /// Whether stdout should be returned to the caller.
    pub capture_output: bool,

    /// Whether command output should be surfaced to the user.
    pub verbose: bool,
}

impl RunOptions {
    /// Creates options running in `working_dir` with output neither captured nor shown.
    #[must_use]
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            capture_output: false,
            verbose: false,
        }
    }

    /// Sets whether stdout is returned.
    #[must_use]
    pub const fn with_capture_output(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }

    /// Sets whether output is surfaced.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Result of a command that was launched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutcome {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,

    /// Captured stdout, present only when [`RunOptions::capture_output`] was set.
    pub stdout: Option<String>,
}

impl CommandOutcome {
    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Marker trait for `ContainerRunner` errors.
pub trait ContainerRunnerError: Debug + Error + Send + Sync {}

/// Runs commands against a container runtime.
#[async_trait]
pub trait ContainerRunner
where
    Self: Clone + Send + Sync + 'static,
{
    /// The error type for the runner.
    type Error: ContainerRunnerError;

    /// Runs the runtime with `args` and waits for it to exit.
    ///
    /// A command that starts and exits non-zero is reported through
    /// [`CommandOutcome::exit_code`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be launched.
    async fn run_command(
        &self,
        options: &RunOptions,
        args: &[String],
    ) -> Result<CommandOutcome, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_builder() {
        let options = RunOptions::new("/tmp/stack")
            .with_capture_output(true)
            .with_verbose(true);

        assert_eq!(options.working_dir, PathBuf::from("/tmp/stack"));
        assert!(options.capture_output);
        assert!(options.verbose);
    }

    #[test]
    fn test_outcome_success() {
        let ok = CommandOutcome {
            exit_code: Some(0),
            stdout: None,
        };
        let failed = CommandOutcome {
            exit_code: Some(1),
            stdout: None,
        };
        let killed = CommandOutcome::default();

        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
    }
}
