// crates/hexatrack-cli/src/logging.rs
// ============================================================================
// Module: Logging Setup
// Description: Tracing subscriber installation for stage processes.
// Purpose: Route structured events to stderr as text or JSON.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! The filter directive comes from `--log-level` when given, then `RUST_LOG`,
//! then the configured level. Events always go to stderr so stdout stays
//! free for command output and JSON-lines records.

use hexatrack_config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for the filter directive.
pub(crate) const LOG_ENV_VAR: &str = "RUST_LOG";

/// Picks the filter directive by precedence.
pub(crate) fn resolve_directive<'a>(cli: Option<&'a str>, env: Option<&'a str>, config: &'a str) -> &'a str {
    cli.or_else(|| env.filter(|value| !value.trim().is_empty())).unwrap_or(config)
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns a message when the directive is invalid or a subscriber is
/// already installed.
pub(crate) fn init_tracing(directive: &str, format: LogFormat) -> Result<(), String> {
    let filter = EnvFilter::try_new(directive).map_err(|err| format!("invalid log filter {directive}: {err}"))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| format!("failed to install log subscriber: {err}"))
}
