//! Recording container runner for tests.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::sync::Arc;

use async_trait::async_trait;
use fabnet_container::{CommandOutcome, ContainerRunner, RunOptions};
use parking_lot::Mutex;

/// A single call made against the runner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordedInvocation {
    /// Options the call was made with.
    pub options: RunOptions,

    /// Argument vector passed to the runtime.
    pub args: Vec<String>,
}

#[derive(Debug)]
enum Behaviour {
    Exit {
        exit_code: i32,
        stdout: Option<String>,
    },
    FailLaunch(String),
}

/// Runner that records invocations instead of running anything.
///
/// Clones share the same log, so a test can hand a clone to the code under
/// test and inspect the original afterwards.
#[derive(Clone, Debug)]
pub struct MockContainerRunner {
    invocations: Arc<Mutex<Vec<RecordedInvocation>>>,
    behaviour: Arc<Behaviour>,
}

impl MockContainerRunner {
    /// Creates a runner whose commands all exit with status zero.
    #[must_use]
    pub fn new() -> Self {
        Self::with_exit_code(0)
    }

    /// Creates a runner whose commands all exit with `exit_code`.
    #[must_use]
    pub fn with_exit_code(exit_code: i32) -> Self {
        Self::with_behaviour(Behaviour::Exit {
            exit_code,
            stdout: None,
        })
    }

    /// Creates a successful runner that reports `stdout` for captured calls.
    #[must_use]
    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::Exit {
            exit_code: 0,
            stdout: Some(stdout.into()),
        })
    }

    /// Creates a runner whose commands all fail to launch.
    #[must_use]
    pub fn failing_launch(reason: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::FailLaunch(reason.into()))
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            invocations: Arc::new(Mutex::new(Vec::new())),
            behaviour: Arc::new(behaviour),
        }
    }

    /// All recorded invocations, oldest first.
    #[must_use]
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.lock().clone()
    }
}

impl Default for MockContainerRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRunner for MockContainerRunner {
    type Error = Error;

    async fn run_command(&self, options: &RunOptions, args: &[String]) -> Result<CommandOutcome> {
        self.invocations.lock().push(RecordedInvocation {
            options: options.clone(),
            args: args.to_vec(),
        });

        match self.behaviour.as_ref() {
            Behaviour::Exit { exit_code, stdout } => Ok(CommandOutcome {
                exit_code: Some(*exit_code),
                stdout: if options.capture_output {
                    Some(stdout.clone().unwrap_or_default())
                } else {
                    None
                },
            }),
            Behaviour::FailLaunch(reason) => Err(Error::Launch(reason.clone())),
        }
    }
}
