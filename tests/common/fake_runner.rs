#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use vidfit::engine::{ProcessOutput, ProcessRunner, RunError};

/// What a scripted command does when it matches
#[derive(Debug, Clone)]
pub enum Response {
    /// Exit with the given code and captured output
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    /// Pretend the timeout fired
    TimedOut,
    /// Pretend the program could not be started
    SpawnFails,
}

impl Response {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::Exit {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn fail(code: i32, stderr: impl Into<String>) -> Self {
        Self::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

struct Expectation {
    arg_pattern: String,
    response: Response,
    create_output: bool,
}

/// Scripted stand-in for ffmpeg/ffprobe.
///
/// Each call is matched against the expectations in insertion order by
/// substring of the space-joined command line. Unmatched calls succeed with
/// empty output. Every `ffmpeg` call that ends up successful (or is scripted
/// with `create_output`) writes a small file at its last argument, so tests
/// can check what was left on disk.
#[derive(Default)]
pub struct FakeRunner {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<Vec<String>>>,
    delay: Option<Duration>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn expect(&self, arg_pattern: &str, response: Response) -> &Self {
        self.push(arg_pattern, response, false)
    }

    /// Like `expect`, but still leaves a (truncated) output file behind
    pub fn expect_with_partial_output(&self, arg_pattern: &str, response: Response) -> &Self {
        self.push(arg_pattern, response, true)
    }

    fn push(&self, arg_pattern: &str, response: Response, create_output: bool) -> &Self {
        self.expectations.lock().unwrap().push(Expectation {
            arg_pattern: arg_pattern.to_string(),
            response,
            create_output,
        });
        self
    }

    /// Answer ffprobe with a file of this duration and resolution
    pub fn with_probe(self, duration_seconds: f64, width: u32, height: u32) -> Self {
        self.expect("ffprobe", Response::ok(probe_json(duration_seconds, width, height)));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Encode invocations only (ffmpeg calls that read an input)
    pub fn encode_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c[0] == "ffmpeg" && c.iter().any(|a| a == "-i"))
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, cmd: Command, _timeout: Option<Duration>) -> Result<ProcessOutput, RunError> {
        let program = cmd.get_program().to_string_lossy().to_string();
        let mut argv = vec![program.clone()];
        argv.extend(cmd.get_args().map(|a| a.to_string_lossy().to_string()));
        let joined = argv.join(" ");

        self.calls.lock().unwrap().push(argv.clone());

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }

        let (response, create_output) = {
            let expectations = self.expectations.lock().unwrap();
            expectations
                .iter()
                .find(|e| joined.contains(&e.arg_pattern))
                .map(|e| (e.response.clone(), e.create_output))
                .unwrap_or((Response::ok(""), false))
        };

        let succeeded = matches!(response, Response::Exit { code: 0, .. });
        let is_encode = program == "ffmpeg" && argv.iter().any(|a| a == "-i");
        if is_encode && (succeeded || create_output) {
            if let Some(out) = argv.last() {
                let _ = fs::write(PathBuf::from(out), b"fake mp4");
            }
        }

        match response {
            Response::Exit {
                code,
                stdout,
                stderr,
            } => Ok(ProcessOutput {
                exit_code: Some(code),
                stdout,
                stderr,
            }),
            Response::TimedOut => Err(RunError::TimedOut {
                program,
                timeout: Duration::from_secs(1),
            }),
            Response::SpawnFails => Err(RunError::Spawn {
                program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}

/// ffprobe JSON for a single-video-stream file
pub fn probe_json(duration_seconds: f64, width: u32, height: u32) -> String {
    format!(
        r#"{{
    "streams": [
        {{ "index": 0, "codec_name": "h264", "codec_type": "video", "width": {width}, "height": {height} }}
    ],
    "format": {{ "filename": "input.mov", "duration": "{duration_seconds:.6}" }}
}}"#
    )
}
