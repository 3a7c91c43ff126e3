//! Long-running JSON-lines request loop.
//!
//! Sessions live as long as the process, so `analyze` and `resample` can be
//! sent as separate requests.

use anyhow::Context;
use clap::Args;
use nyquist_session::handle_line;
use std::io::{BufRead, Write};
use std::path::Path;

use super::common::load_service;

/// Answer JSON-lines requests on stdin until EOF.
#[derive(Args)]
pub struct ServeArgs {}

/// Run the serve command.
pub fn run(_args: ServeArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let service = load_service(config)?;
    tracing::info!(policy = ?service.store().policy(), "serving requests on stdin");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    let mut handled = 0u64;

    for line in stdin.lock().lines() {
        let line = line.context("reading request")?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = handle_line(&service, &line);
        writeln!(stdout, "{reply}").context("writing reply")?;
        stdout.flush().context("writing reply")?;
        handled += 1;
    }

    tracing::info!(handled, sessions = service.store().len(), "input closed");
    Ok(())
}
