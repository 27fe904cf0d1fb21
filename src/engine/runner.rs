//! External process execution.
//!
//! Everything that shells out to ffmpeg or ffprobe goes through [`ProcessRunner`],
//! so tests can substitute a scripted fake for the real binaries.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often a running child is polled when a timeout is in effect
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' timed out after {}s", .timeout.as_secs_f64())]
    TimedOut { program: String, timeout: Duration },

    #[error("error waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Synchronous capability to run a command to completion and capture its output.
///
/// Implementations must not interpret the exit status; a non-zero exit is a
/// normal `Ok` result and the caller decides what it means.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, cmd: Command, timeout: Option<Duration>) -> Result<ProcessOutput, RunError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, cmd: Command, timeout: Option<Duration>) -> Result<ProcessOutput, RunError> {
        (**self).run(cmd, timeout)
    }
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, mut cmd: Command, timeout: Option<Duration>) -> Result<ProcessOutput, RunError> {
        let program = cmd.get_program().to_string_lossy().to_string();

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Drain both pipes on their own threads so a chatty ffmpeg can't block on a full pipe
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let status = match timeout {
            Some(limit) => wait_with_timeout(&mut child, limit, &program)?,
            None => child.wait().map_err(|source| RunError::Wait {
                program: program.clone(),
                source,
            })?,
        };

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: stdout_reader.join().unwrap_or_default(),
            stderr: stderr_reader.join().unwrap_or_default(),
        })
    }
}

fn spawn_reader<S: Read + Send + 'static>(stream: Option<S>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut s) = stream {
            let _ = s.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn wait_with_timeout(
    child: &mut Child,
    limit: Duration,
    program: &str,
) -> Result<std::process::ExitStatus, RunError> {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if start.elapsed() >= limit => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!("Killed '{}' after {:.1}s", program, limit.as_secs_f64());
                return Err(RunError::TimedOut {
                    program: program.to_string(),
                    timeout: limit,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(RunError::Wait {
                    program: program.to_string(),
                    source,
                });
            }
        }
    }
}

/// Last `lines` lines of a diagnostic stream, for logs and error messages
pub fn stderr_tail(stderr: &str, lines: usize) -> String {
    let all: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
