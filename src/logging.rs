//! Logging setup for querykit.
//!
//! Library code only emits `tracing` events. This module installs a
//! subscriber for applications that do not bring their own.
//!
//! # Environment Variables
//!
//! - `QUERYKIT_DEBUG=true|1|yes` - Enable debug logging
//! - `QUERYKIT_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `QUERYKIT_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use querykit::logging;
//!
//! // Driven by the environment
//! logging::init();
//!
//! // Or explicit, e.g. from the `[debug]` config section
//! logging::init_with("debug", "compact");
//! ```

use std::env;
use std::sync::Once;

use crate::config::DebugConfig;

static INIT: Once = Once::new();

/// Check if `QUERYKIT_DEBUG` is set to "true", "1" or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("QUERYKIT_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Level from `QUERYKIT_LOG_LEVEL`.
///
/// Defaults to "debug" if `QUERYKIT_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    env::var("QUERYKIT_LOG_LEVEL")
        .ok()
        .and_then(|level| normalize_level(&level))
        .unwrap_or(if is_debug_enabled() { "debug" } else { "warn" })
}

/// Format from `QUERYKIT_LOG_FORMAT`, "json" unless set otherwise.
pub fn get_log_format() -> &'static str {
    env::var("QUERYKIT_LOG_FORMAT")
        .map(|f| normalize_format(&f))
        .unwrap_or("json")
}

fn normalize_level(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn normalize_format(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        "pretty" => "pretty",
        "compact" => "compact",
        _ => "json",
    }
}

/// Initialize logging from the environment.
///
/// Does nothing unless `QUERYKIT_DEBUG` or `QUERYKIT_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("QUERYKIT_LOG_LEVEL").is_err() {
        return;
    }
    init_with(get_log_level(), get_log_format());
}

/// Initialize logging from a `[debug]` config section, falling back to the
/// environment for anything left unset.
pub fn init_from_config(debug: &DebugConfig) {
    match (&debug.log_level, &debug.log_format) {
        (None, None) => init(),
        (level, format) => init_with(
            level.as_deref().unwrap_or_else(|| get_log_level()),
            format.as_deref().unwrap_or_else(|| get_log_format()),
        ),
    }
}

/// Initialize logging with an explicit level and format.
///
/// Unknown levels fall back to "warn" and unknown formats to "json".
/// Only the first initialization in a process takes effect.
pub fn init_with(level: &str, format: &str) {
    let level = normalize_level(level).unwrap_or("warn");
    let format = normalize_format(format);

    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!(
                "querykit={level},querykit_criteria={level},querykit_pool={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let installed = match format {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format, "querykit logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            // no subscriber compiled in; events reach whatever the host installed
            let _ = (level, format);
        }
    });
}
