//! Structured logging configuration.
//!
//! The core library logs through the `log` facade; the subscriber installed
//! here forwards those records into `tracing` alongside the server's own events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use matchday_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use matchday_server::logging::log_security_event;
///
/// log_security_event("forbidden", Some(7), "Non-admin tried to create a tournament");
/// ```
pub fn log_security_event(event_type: &str, account_id: Option<i64>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        account_id = account_id,
        "SECURITY: {}",
        message
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic without a subscriber
        log_security_event("missing_token", None, "Test message");
        log_security_event("forbidden", Some(1), "Test message");
    }
}
