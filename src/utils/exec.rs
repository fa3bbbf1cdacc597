//! Running the external drawing and rendering tools.
//!
//! [`Cmd`] captures both output streams, optionally feeds stdin and kills
//! the process once its wall-clock timeout elapses.
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Simple command with working directory
//! Cmd::new("keymap").args(["parse", "-z", "toucan.keymap"]).cwd(root).run()?;
//!
//! // With stdin piping and a timeout
//! let output = Cmd::new("rsvg-convert")
//!     .args(["-f", "pdf", "-o", "page_1.pdf"])
//!     .stdin(svg_data)
//!     .timeout(Duration::from_secs(60))
//!     .run()?;
//! ```

use crate::debug;
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Output, Stdio},
    sync::OnceLock,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Poll interval while waiting on a process with a timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{message}")]
    Failed {
        program: String,
        status: ExitStatus,
        /// Trimmed stderr of the process (ANSI codes removed).
        stderr: String,
        message: String,
    },

    #[error("`{program}` did not finish within {}s and was killed", .timeout.as_secs_f64())]
    Timeout { program: String, timeout: Duration },

    #[error("I/O error while running `{program}`")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    /// The program could not be found on `PATH`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// Diagnostic text produced by the process, if it ran and failed.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } if !stderr.is_empty() => Some(stderr.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    stdin_data: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Shell-like rendering of the command for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Execute the command and return its output.
    ///
    /// A non-zero exit status is an error carrying the process's stderr.
    pub fn run(self) -> Result<Output, ExecError> {
        let name = self.program_name();
        debug!("exec"; "{}", self.command_line());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: name.clone(),
            source,
        })?;

        // Feed stdin and drain pipes on separate threads so a full pipe
        // can never block the child.
        let writer = match (child.stdin.take(), self.stdin_data) {
            (Some(mut stdin), Some(data)) => Some(thread::spawn(move || stdin.write_all(&data))),
            _ => None,
        };
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = match self.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout),
            None => child.wait().map(Some),
        }
        .map_err(|source| ExecError::Io {
            program: name.clone(),
            source,
        })?;

        let Some(status) = status else {
            return Err(ExecError::Timeout {
                program: name,
                timeout: self.timeout.unwrap_or_default(),
            });
        };

        let output = Output {
            status,
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        };
        let write_result = writer.map_or(Ok(()), |handle| handle.join().unwrap_or(Ok(())));

        if !output.status.success() {
            return Err(ExecError::Failed {
                program: name.clone(),
                status: output.status,
                stderr: strip_ansi(String::from_utf8_lossy(&output.stderr).trim()).into_owned(),
                message: format_error(&name, &output),
            });
        }

        write_result.map_err(|source| ExecError::Io {
            program: name.clone(),
            source,
        })?;

        log_stderr(&name, &output);
        Ok(output)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .map(|handle| handle.join().unwrap_or_default())
        .unwrap_or_default()
}

/// Wait for the child, killing and reaping it once `timeout` elapses.
///
/// Returns `Ok(None)` on timeout.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Remove terminal color codes from tool output.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Log stderr chatter of a successful command in verbose mode.
fn log_stderr(name: &str, output: &Output) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<_> = stderr
        .lines()
        .map(strip_ansi)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if !lines.is_empty() {
        debug!(name; "{}", lines.join("\n"));
    }
}

/// Error text for a non-zero exit: status, stderr, then stdout unless it is PDF data.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let error_msg = strip_ansi(stderr.trim());

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    if !error_msg.is_empty() {
        msg.push('\n');
        msg.push_str(&error_msg);
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() && !stdout_trimmed.starts_with("%PDF") {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
