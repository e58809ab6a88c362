//! Line-oriented JSON bridge between a controlling process and the local shell.
//!
//! The bridge reads one [`Command`] per line on stdin, dispatches it and writes
//! one [`Response`] per line on stdout.

pub mod bridge;
pub mod classify;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod host;
pub mod runner;
pub mod telemetry;

use std::io::Write;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    #[serde(default, alias = "Action")]
    pub action: String,
    #[serde(default, alias = "Data", skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A single response line. `result` and `error` are always encoded, as `null`
/// when absent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    #[serde(alias = "Success")]
    pub success: bool,
    #[serde(default, alias = "Result")]
    pub result: Option<String>,
    #[serde(default, alias = "Error")]
    pub error: Option<String>,
}

impl Command {
    pub fn new(action: impl Into<String>, data: Option<String>) -> Self {
        Self {
            action: action.into(),
            data,
        }
    }

    /// Parses one request line. Anything that isn't an object of the expected
    /// shape is rejected, including the literal `null`.
    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    pub fn data_or_empty(&self) -> &str {
        self.data.as_deref().unwrap_or("")
    }
}

impl Response {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Encodes the response as a single line without the trailing newline.
    /// Control characters inside strings are escaped by the JSON encoder, so
    /// the result never spans more than one line.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Writes the encoded response plus `\n` and flushes.
    pub fn write_line<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let json = self.encode()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lower_case_command() {
        let command = Command::decode(r#"{"action":"execute_command","data":"echo hi"}"#)
            .expect("decode");
        assert_eq!(command.action, "execute_command");
        assert_eq!(command.data.as_deref(), Some("echo hi"));
    }

    #[test]
    fn decodes_pascal_case_command() {
        let command =
            Command::decode(r#"{"Action":"ANALYZE_TEXT","Data":"ls"}"#).expect("decode");
        assert_eq!(command.action, "ANALYZE_TEXT");
        assert_eq!(command.data_or_empty(), "ls");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let command = Command::decode(r#"{"data":null}"#).expect("decode");
        assert_eq!(command.action, "");
        assert_eq!(command.data_or_empty(), "");
    }

    #[test]
    fn rejects_non_objects() {
        assert!(Command::decode("null").is_err());
        assert!(Command::decode("[]").is_err());
        assert!(Command::decode("not json").is_err());
        assert!(Command::decode(r#"{"action":"x","data":5}"#).is_err());
    }

    #[test]
    fn encodes_absent_fields_as_null() {
        let line = Response::ok("done").encode().expect("encode");
        assert_eq!(line, r#"{"success":true,"result":"done","error":null}"#);

        let line = Response::failure("boom").encode().expect("encode");
        assert_eq!(line, r#"{"success":false,"result":null,"error":"boom"}"#);
    }

    #[test]
    fn encoding_stays_on_one_line() {
        let response = Response::ok("a\nb\r\n\tc\u{1b}[0m");
        let line = response.encode().expect("encode");
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));

        let decoded: Response = serde_json::from_str(&line).expect("decode");
        assert_eq!(decoded, response);
    }

    #[test]
    fn write_line_appends_newline() {
        let mut out = Vec::new();
        Response::failure("x").write_line(&mut out).expect("write");
        assert!(out.ends_with(b"}\n"));
        assert_eq!(out.iter().filter(|b| **b == b'\n').count(), 1);
    }
}
