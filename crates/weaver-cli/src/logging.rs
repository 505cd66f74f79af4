//! Structured logging for the runner.
//!
//! Logs go to stderr so reports written to stdout stay machine-readable.

use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

fn filter_for(level: LogLevel) -> EnvFilter {
    EnvFilter::new(level.as_filter_str())
}

/// Install the global subscriber at `level`.
///
/// If a global subscriber is already set the call does nothing; the first
/// subscriber wins.
pub fn init_logging(level: LogLevel) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogLevel::Info);
        init_logging(LogLevel::Debug);
    }

    #[test]
    fn filter_uses_log_level() {
        assert_eq!(filter_for(LogLevel::Warn).to_string(), "warn");
    }
}
