//! Tracing subscriber setup for the launcher.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the default log filter.
pub const LOG_ENV: &str = "PINPOINT_LOG";

/// Filter used when neither an explicit filter nor [`LOG_ENV`] is given.
pub const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Pick the filter expression: explicit argument, then [`LOG_ENV`], then
/// [`DEFAULT_FILTER`]. Blank values are skipped.
pub fn filter_directive(explicit: Option<&str>, env: Option<String>) -> String {
    explicit
        .map(str::to_string)
        .into_iter()
        .chain(env)
        .map(|f| f.trim().to_string())
        .find(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global stderr subscriber. Only the first call has any effect.
pub fn init(explicit: Option<&str>) {
    INSTALLED.get_or_init(|| {
        let directive = filter_directive(explicit, std::env::var(LOG_ENV).ok());
        let (filter, rejected) = match EnvFilter::try_new(&directive) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new(DEFAULT_FILTER), Some(e)),
        };

        // Fails only if another subscriber was installed first.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .try_init();

        if let Some(e) = rejected {
            warn!(filter = %directive, error = %e, "invalid log filter, using {}", DEFAULT_FILTER);
        }
    });
}
