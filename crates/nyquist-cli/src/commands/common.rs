//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use nyquist_config::ServiceConfig;
use nyquist_session::{Response, Service, ServiceError};
use serde_json::Value;
use std::path::Path;

/// Build a service from the `--config` file, the default config file, or
/// built-in defaults, in that order.
pub fn load_service(config: Option<&Path>) -> anyhow::Result<Service> {
    let config = ServiceConfig::load_or_default(config).context("loading configuration")?;
    tracing::debug!(?config, "configuration loaded");
    Ok(Service::new(&config))
}

/// Read an input file in full.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading '{}'", path.display()))
}

/// Print a reply envelope as one line of JSON on stdout.
///
/// A failed request still prints its envelope, then becomes the process
/// error so the exit status reflects it.
pub fn print_response<T: serde::Serialize>(
    result: Result<T, ServiceError>,
    edit: impl FnOnce(&mut Value),
) -> anyhow::Result<()> {
    let failure = result.as_ref().err().cloned();
    let mut value = serde_json::to_value(Response::from(result))?;
    edit(&mut value);
    println!("{value}");

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
