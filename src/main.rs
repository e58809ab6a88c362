use std::io;

use anyhow::{Context, Result};
use mcp_bridge::bridge::Bridge;
use mcp_bridge::config::Config;
use mcp_bridge::dispatch::Dispatcher;
use mcp_bridge::telemetry;
use tracing::info;

fn main() -> Result<()> {
    // Only a leading `--help` is honoured, everything else on the command line
    // is ignored.
    if std::env::args().nth(1).as_deref() == Some("--help") {
        println!("mcp-bridge - native line-protocol bridge for MCP");
        println!("Usage: mcp-bridge  (JSON commands on stdin, one per line; EXIT to quit)");
        return Ok(());
    }

    let config = Config::from_env()?;
    telemetry::init(&config).context("failed to initialise logging")?;
    info!("bridge ready");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let bridge = Bridge::new(stdin.lock(), stdout.lock(), Dispatcher::system());
    bridge.serve()?;

    Ok(())
}
