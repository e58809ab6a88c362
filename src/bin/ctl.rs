use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use mcp_bridge::{Command, Response, client::BridgeClient};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the bridge binary (defaults to mcp-bridge next to this executable)
    #[arg(short, long)]
    bridge: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path = match args.bridge {
        Some(path) => path,
        None => default_bridge_path()?,
    };

    println!("Starting bridge at {}...", path.display());
    let mut client = BridgeClient::spawn(&path)?;
    println!("Commands: exec <cmd> | !<cmd> | analyze <text> | info | diag | raw <action> [data] | exit");

    // REPL Loop
    let stdin = io::stdin();
    let mut handle = stdin.lock();
    let mut input = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        if handle.read_line(&mut input)? == 0 {
            break; // EOF
        }

        let line = input.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let result = match parse_line(line) {
            Some(command) => client.send(&command),
            None => {
                eprintln!("Unknown input: {line}");
                continue;
            }
        };

        match result {
            Ok(response) => print_response(&response),
            Err(e) => {
                eprintln!("Bridge failure: {e:#}");
                break; // the bridge is most likely gone
            }
        }
    }

    client.close()?;
    println!("Bridge closed.");
    Ok(())
}

/// Maps a REPL line onto a protocol command.
fn parse_line(line: &str) -> Option<Command> {
    if let Some(cmd) = line.strip_prefix('!') {
        return Some(Command::new("execute_command", Some(cmd.trim().to_string())));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, Some(rest.trim().to_string())),
        None => (line, None),
    };

    match word {
        "exec" => Some(Command::new("execute_command", rest)),
        "analyze" => Some(Command::new("analyze_text", rest)),
        "info" => Some(Command::new("get_system_info", None)),
        "diag" => Some(Command::new("arch_diagnostics", None)),
        "raw" => {
            let rest = rest?;
            let (action, data) = match rest.split_once(char::is_whitespace) {
                Some((action, data)) => (action.to_string(), Some(data.trim().to_string())),
                None => (rest, None),
            };
            Some(Command::new(action, data))
        }
        _ => None,
    }
}

fn print_response(response: &Response) {
    if let Some(result) = &response.result {
        println!("{result}");
    }
    if let Some(error) = &response.error {
        eprintln!("Remote Error: {error}");
    }
    if !response.success && response.error.is_none() {
        eprintln!("(command failed)");
    }
}

fn default_bridge_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate current executable")?;
    let dir = exe.parent().context("executable has no parent directory")?;
    Ok(dir.join("mcp-bridge"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bang_and_exec_run_commands() {
        let expected = Command::new("execute_command", Some("ls -l".to_string()));
        assert_eq!(parse_line("!ls -l"), Some(expected.clone()));
        assert_eq!(parse_line("exec ls -l"), Some(expected));
    }

    #[test]
    fn shortcuts_carry_no_data() {
        assert_eq!(
            parse_line("info"),
            Some(Command::new("get_system_info", None))
        );
        assert_eq!(
            parse_line("diag"),
            Some(Command::new("arch_diagnostics", None))
        );
    }

    #[test]
    fn raw_passes_action_through() {
        assert_eq!(
            parse_line("raw Analyze_Text pacman -Q"),
            Some(Command::new("Analyze_Text", Some("pacman -Q".to_string())))
        );
        assert_eq!(parse_line("raw"), None);
        assert_eq!(parse_line("bogus"), None);
    }
}
