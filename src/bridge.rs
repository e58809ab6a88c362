use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::dispatch::Dispatcher;
use crate::host::{HostProbe, SystemHost};
use crate::runner::{Executor, ShellRunner};
use crate::{Command, Response};

pub const EXIT_SENTINEL: &str = "EXIT";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to read request: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),
}

pub struct Bridge<R, W, E = ShellRunner, H = SystemHost> {
    reader: R,
    writer: W,
    dispatcher: Dispatcher<E, H>,
}

impl<R: BufRead, W: Write, E: Executor, H: HostProbe> Bridge<R, W, E, H> {
    pub fn new(reader: R, writer: W, dispatcher: Dispatcher<E, H>) -> Self {
        Self {
            reader,
            writer,
            dispatcher,
        }
    }

    /// Runs the loop to completion. On a fatal error a final
    /// `Bridge error: ...` response is written (best effort) before the error
    /// is returned.
    pub fn serve(mut self) -> Result<(), BridgeError> {
        let result = self.run();
        if let Err(e) = &result {
            error!(error = %e, "bridge stopped");
            let fatal = Response::failure(format!("Bridge error: {e}"));
            if let Err(write_err) = fatal.write_line(&mut self.writer) {
                warn!(error = %write_err, "could not report fatal error");
            }
        }
        result
    }

    fn run(&mut self) -> Result<(), BridgeError> {
        let mut buf = Vec::new();
        loop {
            // 1. Read one line
            buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut buf)
                .map_err(BridgeError::Read)?;
            if read == 0 {
                debug!("input closed");
                return Ok(());
            }

            // 2. Termination: EOF above, empty line or the sentinel here
            let line = String::from_utf8_lossy(strip_line_ending(&buf));
            if line.is_empty() || line == EXIT_SENTINEL {
                debug!("shutdown requested");
                return Ok(());
            }

            // 3. Decode; malformed lines get no response
            let command = match Command::decode(&line) {
                Ok(command) => command,
                Err(e) => {
                    warn!(error = %e, "skipping undecodable line");
                    continue;
                }
            };

            // 4. Dispatch and write
            let response = self.dispatcher.dispatch(&command);
            response
                .write_line(&mut self.writer)
                .map_err(BridgeError::Write)?;
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
