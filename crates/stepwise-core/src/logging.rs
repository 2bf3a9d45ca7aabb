//! Logging integration.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-step spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level` (e.g. "debug", "info",
/// "stepwise_migrations=trace"). In debug mode a pretty, human-readable format
/// is used; otherwise a structured JSON format is used. Installing a second
/// subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one migration step.
///
/// All events emitted while the step's action runs carry the step name and
/// the direction ("forward" or "backward").
///
/// # Examples
///
/// ```
/// use stepwise_core::logging::migration_span;
///
/// let span = migration_span("createUsersTable", "forward");
/// let _guard = span.enter();
/// tracing::info!("applying");
/// ```
pub fn migration_span(step: &str, direction: &str) -> tracing::Span {
    tracing::info_span!("migration", step = step, direction = direction)
}
