//! Logging setup for the ironsbom CLI.
//!
//! Events are written to stderr so stdout carries only the rendered report.
//! The filter comes from, in order: `--log-level`, `RUST_LOG`, then
//! `general.log_level` from the configuration.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ironsbom_core::config::GeneralConfig;

/// Install the global subscriber. Call once, before any event is emitted.
///
/// `general.log_format` selects `json` lines or the `pretty` layout.
pub fn init_tracing(general: &GeneralConfig, level_override: Option<&str>) -> Result<()> {
    let filter = log_filter(general, level_override)?;

    let (json, pretty) = match general.log_format.as_str() {
        "json" => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        "pretty" => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            ),
        ),
        other => {
            anyhow::bail!("unknown log format '{}', expected 'json' or 'pretty'", other);
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .context("failed to install tracing subscriber")
}

/// Pick the event filter for this run.
fn log_filter(general: &GeneralConfig, level_override: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = level_override {
        return EnvFilter::try_new(level)
            .with_context(|| format!("invalid --log-level '{}'", level));
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&general.log_level)))
}
