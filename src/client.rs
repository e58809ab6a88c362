use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Stdio};

use anyhow::{Context, Result, anyhow};

use crate::bridge::EXIT_SENTINEL;
use crate::dispatch::Action;
use crate::{Command, Response};

// Talks to a spawned bridge over its stdin/stdout pipes.
pub struct BridgeClient {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl BridgeClient {
    /// Starts the bridge at `path`. Its stderr is inherited so logs stay
    /// visible.
    pub fn spawn(path: &Path) -> Result<Self> {
        let mut child = std::process::Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start bridge at {}", path.display()))?;

        let stdin = child.stdin.take().context("bridge stdin not captured")?;
        let stdout = child.stdout.take().context("bridge stdout not captured")?;

        Ok(Self {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
        })
    }

    /// Sends one command and blocks until its response line arrives.
    pub fn send(&mut self, command: &Command) -> Result<Response> {
        let json = serde_json::to_string(command)?;
        self.write_line(&json)?;

        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .context("failed reading bridge response")?;
        if read == 0 {
            return Err(anyhow!("bridge closed its output"));
        }

        serde_json::from_str(line.trim_end()).context("malformed bridge response")
    }

    pub fn execute_command(&mut self, command_line: &str) -> Result<Response> {
        self.send_action(Action::ExecuteCommand, Some(command_line))
    }

    pub fn analyze_text(&mut self, text: &str) -> Result<Response> {
        self.send_action(Action::AnalyzeText, Some(text))
    }

    pub fn system_info(&mut self) -> Result<Response> {
        self.send_action(Action::GetSystemInfo, None)
    }

    pub fn diagnostics(&mut self) -> Result<Response> {
        self.send_action(Action::ArchDiagnostics, None)
    }

    /// Sends the exit sentinel and waits for the bridge to finish.
    pub fn close(mut self) -> Result<()> {
        self.write_line(EXIT_SENTINEL)?;
        // Dropping stdin closes the pipe in case the sentinel was not seen.
        drop(self.stdin.take());
        let status = self.child.wait().context("failed waiting for bridge")?;
        if !status.success() {
            return Err(anyhow!("bridge exited with {status}"));
        }
        Ok(())
    }

    fn send_action(&mut self, action: Action, data: Option<&str>) -> Result<Response> {
        self.send(&Command::new(action.as_str(), data.map(str::to_string)))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let stdin = self.stdin.as_mut().context("bridge input already closed")?;
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }
}

impl Drop for BridgeClient {
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
