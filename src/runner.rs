//! Shell command execution with fully buffered stdout/stderr capture.
//!
//! Commands are handed to `/bin/bash -c`. The only escaping applied is a
//! backslash in front of each embedded double quote before the command is
//! wrapped in the invocation's own quotes. `$`, backticks, `;` and every other
//! shell metacharacter pass straight through: the command line is trusted
//! input. There is no timeout, so a command that never exits blocks the caller.

use std::io::{self, Read};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ExitStatus, Stdio};
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use crate::Response;

pub const SHELL: &str = "/bin/bash";

pub trait Executor {
    fn run(&self, command_line: &str) -> Response;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessResult {
    pub fn render(&self) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            text.push_str("\n[stderr]: ");
            text.push_str(&self.stderr);
        }
        text.push_str(&format!("\n[exit_code]: {}", self.exit_code));
        text.trim().to_string()
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn into_response(self) -> Response {
        Response {
            success: self.success(),
            result: Some(self.render()),
            error: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start {shell}: {source}")]
    Spawn {
        shell: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for process: {0}")]
    Wait(#[source] io::Error),

    #[error("failed reading {stream}: {source}")]
    Capture {
        stream: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{stream} pipe was not captured")]
    MissingPipe { stream: &'static str },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }

    /// Spawns the command, drains both pipes on their own threads while
    /// waiting for the exit status, and joins both readers before returning.
    pub fn capture(&self, command_line: &str) -> Result<ProcessResult, RunError> {
        let args = invocation_args(command_line);
        debug!(command = command_line, "spawning shell");

        let mut child = std::process::Command::new(SHELL)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                shell: SHELL,
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or(RunError::MissingPipe { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(RunError::MissingPipe { stream: "stderr" })?;

        // Both readers must run while we wait, otherwise a child that fills
        // one pipe buffer never exits.
        let stdout_task = thread::spawn(move || drain(stdout));
        let stderr_task = thread::spawn(move || drain(stderr));

        let status = wait(&mut child);

        let stdout = join(stdout_task, "stdout");
        let stderr = join(stderr_task, "stderr");

        let status = status?;
        Ok(ProcessResult {
            stdout: stdout?,
            stderr: stderr?,
            exit_code: exit_code(status),
        })
    }
}

impl Executor for ShellRunner {
    fn run(&self, command_line: &str) -> Response {
        match self.capture(command_line) {
            Ok(result) => result.into_response(),
            Err(e) => {
                warn!(command = command_line, error = %e, "command execution failed");
                Response::failure(format!("Error ejecutando: {e}"))
            }
        }
    }
}

fn drain(mut pipe: impl Read) -> io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn wait(child: &mut Child) -> Result<ExitStatus, RunError> {
    child.wait().map_err(RunError::Wait)
}

fn join(
    task: thread::JoinHandle<io::Result<String>>,
    stream: &'static str,
) -> Result<String, RunError> {
    match task.join() {
        Ok(read) => read.map_err(|source| RunError::Capture { stream, source }),
        Err(_) => Err(RunError::Capture {
            stream,
            source: io::Error::other("reader thread panicked"),
        }),
    }
}

/// Signal deaths are reported as `128 + signal`, like the shell does.
fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}

/// Escapes embedded double quotes with a backslash. Nothing else is escaped.
pub fn escape_quotes(command_line: &str) -> String {
    command_line.replace('"', "\\\"")
}

// `-c "<escaped command>"`
pub fn invocation_line(command_line: &str) -> String {
    format!("-c \"{}\"", escape_quotes(command_line))
}

/// Argument vector for [`SHELL`], obtained by splitting [`invocation_line`]
/// with the usual quoted-argument rules.
pub fn invocation_args(command_line: &str) -> Vec<String> {
    split_arguments(&invocation_line(command_line))
}

/// Splits an argument line. Only space and tab separate arguments, and only
/// outside quotes. A run of backslashes followed by `"` yields half the
/// backslashes; with an odd run the quote is literal, with an even run it is
/// handled as a plain quote. Inside quotes `""` is one literal quote. Other
/// backslashes are literal.
fn split_arguments(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let mut backslashes = 1;
                while chars.next_if_eq(&'\\').is_some() {
                    backslashes += 1;
                }
                in_arg = true;
                if chars.peek() == Some(&'"') {
                    current.extend(std::iter::repeat_n('\\', backslashes / 2));
                    if backslashes % 2 == 1 {
                        chars.next();
                        current.push('"');
                    }
                } else {
                    current.extend(std::iter::repeat_n('\\', backslashes));
                }
            }
            '"' => {
                in_arg = true;
                if quoted && chars.next_if_eq(&'"').is_some() {
                    current.push('"');
                } else {
                    quoted = !quoted;
                }
            }
            ' ' | '\t' if !quoted => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}
