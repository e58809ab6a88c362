use serde::{Deserialize, Serialize};

const COMMAND_TOKENS: &[&str] = &[
    "ls", "dir", "pwd", "cd", "cat", "grep", "find", "ps", "top", "df", "du", "free", "uname",
    "pacman", "yay", "systemctl", "journalctl", "sudo", "su", "chmod", "mkdir", "rm", "cp", "mv",
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    PackageManager,
    Systemd,
    FileSystem,
    Process,
    Navigation,
    General,
    None,
}

impl CommandType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PackageManager => "package_manager",
            Self::Systemd => "systemd",
            Self::FileSystem => "file_system",
            Self::Process => "process",
            Self::Navigation => "navigation",
            Self::General => "general",
            Self::None => "none",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    pub is_command: bool,
    /// The input exactly as received, untrimmed.
    pub text: String,
    pub command_type: CommandType,
}

pub fn classify(text: &str) -> TextAnalysis {
    let is_command = is_likely_command(text);
    let command_type = if is_command {
        detect_command_type(text)
    } else {
        CommandType::None
    };

    TextAnalysis {
        is_command,
        text: text.to_string(),
        command_type,
    }
}

/// True when the trimmed text starts with a known token (ignoring ASCII case)
/// that is followed by whitespace or the end of the text.
pub fn is_likely_command(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    COMMAND_TOKENS.iter().any(|token| {
        let Some(head) = text.get(..token.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(token) {
            return false;
        }
        text[token.len()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
    })
}

/// Coarse category by plain prefix. These prefixes deliberately differ from
/// [`COMMAND_TOKENS`]; everything unmatched is `general`.
pub fn detect_command_type(text: &str) -> CommandType {
    let text = text.trim().to_lowercase();
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| text.starts_with(p));

    if starts(&["pacman", "yay"]) {
        CommandType::PackageManager
    } else if starts(&["systemctl"]) {
        CommandType::Systemd
    } else if starts(&["ls", "find"]) {
        CommandType::FileSystem
    } else if starts(&["ps", "top"]) {
        CommandType::Process
    } else if starts(&["cd", "pwd"]) {
        CommandType::Navigation
    } else {
        CommandType::General
    }
}
