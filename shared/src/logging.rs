//! Shared logging utilities for consistent tracing across the workspace

use crate::types::SessionId;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

/// Build the env-filter directive used by every binary in the workspace
pub fn filter_directive(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    format!("workflow={base_level},shared={base_level},reqwest=warn,hyper=warn")
}

/// Initialize tracing subscriber writing to stdout with the given log level
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = filter_directive(log_level);

    // try_init so a second initialisation (tests, embedding) is harmless
    fmt()
        .with_env_filter(EnvFilter::new(&env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .ok();
}

/// Initialize tracing subscriber with the default level
pub fn init_tracing() {
    init_tracing_with_level(None);
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for session-aware info logging
#[macro_export]
macro_rules! session_info {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::info!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for session-aware warning logging
#[macro_export]
macro_rules! session_warn {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for session-aware error logging
#[macro_export]
macro_rules! session_error {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::error!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for session-aware debug logging
#[macro_export]
macro_rules! session_debug {
    ($session_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            session = %$session_id,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(session_id: &SessionId, details: &str) {
    info!(
        session = %session_id,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(session_id: &SessionId, reason: &str) {
    info!(
        session = %session_id,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(session_id: &SessionId, context: &str, error: &dyn std::fmt::Display) {
    error!(
        session = %session_id,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(session_id: &SessionId, message: &str) {
    info!(
        session = %session_id,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}

/// Record one state machine step
pub fn log_transition(session_id: &SessionId, from: &dyn std::fmt::Display, event: &dyn std::fmt::Display, to: &dyn std::fmt::Display) {
    debug!(
        session = %session_id,
        timestamp = format_timestamp(),
        from = %from,
        event = %event,
        to = %to,
        "🔀 {} --{}--> {}",
        from,
        event,
        to
    );
}
