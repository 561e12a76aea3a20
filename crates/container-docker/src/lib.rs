//! Runs container commands through the `docker` CLI.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::{Error, Result};

use std::process::Stdio;

use async_trait::async_trait;
use fabnet_container::{CommandOutcome, ContainerRunner, RunOptions};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

static DEFAULT_PROGRAM: &str = "docker";

/// Container runner shelling out to a docker-compatible CLI.
#[derive(Clone, Debug)]
pub struct DockerRunner {
    program: String,
}

impl DockerRunner {
    /// Creates a runner invoking `docker` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
        }
    }

    /// Creates a runner invoking `program` instead of `docker`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this runner invokes.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for DockerRunner {
    fn default() -> Self {
        Self::new()
    }
}

// Forwards each line of `reader` to tracing as it arrives, keeping a copy if `capture` is set.
async fn forward_lines<R>(reader: Option<R>, label: &str, verbose: bool, capture: bool) -> String
where
    R: AsyncRead + Unpin,
{
    let mut captured = String::new();
    let Some(reader) = reader else {
        return captured;
    };

    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if verbose {
            info!(target: "container", "{label}: {line}");
        } else {
            debug!(target: "container", "{label}: {line}");
        }

        if capture {
            captured.push_str(&line);
            captured.push('\n');
        }
    }

    captured
}

#[async_trait]
impl ContainerRunner for DockerRunner {
    type Error = Error;

    async fn run_command(&self, options: &RunOptions, args: &[String]) -> Result<CommandOutcome> {
        debug!(
            "running {} {} in {}",
            self.program,
            args.join(" "),
            options.working_dir.display()
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&options.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Spawn(self.program.clone(), e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (captured, _) = tokio::join!(
            forward_lines(stdout, "stdout", options.verbose, options.capture_output),
            forward_lines(stderr, "stderr", options.verbose, false),
        );

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Wait(self.program.clone(), e))?;

        if !status.success() {
            warn!("{} exited with {status}", self.program);
        }

        Ok(CommandOutcome {
            exit_code: status.code(),
            stdout: options.capture_output.then_some(captured),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::mpsc;
    use std::time::Duration;

    fn shell(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_default_program_is_docker() {
        assert_eq!(DockerRunner::new().program(), "docker");
        assert_eq!(DockerRunner::with_program("podman").program(), "podman");
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DockerRunner::with_program("sh");
        let options = RunOptions::new(dir.path()).with_capture_output(true);

        let outcome = runner
            .run_command(&options, &shell("echo hello"))
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout.as_deref(), Some("hello\n"));
    }

    #[tokio::test]
    async fn test_stdout_not_returned_without_capture() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DockerRunner::with_program("sh");
        let options = RunOptions::new(dir.path());

        let outcome = runner
            .run_command(&options, &shell("echo hello"))
            .await
            .unwrap();

        assert!(outcome.success());
        assert_eq!(outcome.stdout, None);
    }

    #[tokio::test]
    async fn test_reports_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DockerRunner::with_program("sh");
        let options = RunOptions::new(dir.path()).with_verbose(true);

        let outcome = runner
            .run_command(&options, &shell("echo boom >&2; exit 3"))
            .await
            .unwrap();

        assert!(!outcome.success());
        assert_eq!(outcome.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DockerRunner::with_program("sh");
        let options = RunOptions::new(dir.path()).with_capture_output(true);

        let outcome = runner.run_command(&options, &shell("pwd -P")).await.unwrap();

        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(
            outcome.stdout.as_deref().map(str::trim),
            Some(expected.to_str().unwrap())
        );
    }

    #[derive(Clone)]
    struct LineSink(mpsc::Sender<String>);

    impl io::Write for LineSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let _ = self.0.send(String::from_utf8_lossy(buf).into_owned());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_output_is_logged_while_running() {
        let (tx, rx) = mpsc::channel();
        let sink = LineSink(tx);
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dir = tempfile::tempdir().unwrap();
        let runner = DockerRunner::with_program("sh");
        let options = RunOptions::new(dir.path()).with_verbose(true);
        let running = tokio::spawn(async move {
            runner
                .run_command(&options, &shell("echo ready; sleep 30"))
                .await
        });

        let seen = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if rx.try_iter().any(|line| line.contains("stdout: ready")) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;

        assert!(seen.is_ok(), "output was held back until exit");
        assert!(!running.is_finished());
        running.abort();
    }

    #[tokio::test]
    async fn test_large_output_on_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DockerRunner::with_program("sh");
        let options = RunOptions::new(dir.path()).with_capture_output(true);

        let script = "i=0; while [ $i -lt 5000 ]; do echo out$i; echo err$i >&2; i=$((i+1)); done";

        let outcome = runner.run_command(&options, &shell(script)).await.unwrap();

        assert!(outcome.success());
        let stdout = outcome.stdout.unwrap();
        assert_eq!(stdout.lines().count(), 5000);
        assert_eq!(stdout.lines().last(), Some("out4999"));
    }

    #[tokio::test]
    async fn test_launch_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = DockerRunner::with_program("fabnet-definitely-not-installed");
        let options = RunOptions::new(dir.path());

        let result = runner.run_command(&options, &[]).await;

        assert!(matches!(result, Err(Error::Spawn(..))));
    }
}
