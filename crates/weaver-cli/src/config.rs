//! Runner configuration parsed from environment variables.
//!
//! Every setting can be overridden via environment variables prefixed with
//! `NOTE_WEAVER_`; command line flags take precedence over both.

use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use weaver_site::{DriverError, SiteRoutes};

/// Base URL of a locally running site.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("invalid {name} '{value}', expected {expected}")]
    Invalid {
        /// Setting name.
        name: &'static str,
        /// Value as given.
        value: String,
        /// What would have been accepted.
        expected: &'static str,
    },
    /// The base URL cannot address the site.
    #[error("invalid base URL: {0}")]
    BaseUrl(#[source] DriverError),
}

/// Log level enumeration matching tracing crate levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything, including per-step detail from dependencies.
    Trace,
    /// Per-step progress.
    Debug,
    /// Per-scenario results and the run summary.
    #[default]
    Info,
    /// Failures only.
    Warn,
    /// Errors only.
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::Invalid {
                name: "log level",
                value: s.to_string(),
                expected: "one of trace, debug, info, warn, error",
            }),
        }
    }
}

impl LogLevel {
    /// Convert to a tracing filter directive string.
    #[must_use]
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Settings shared by every subcommand that talks to the site.
///
/// # Environment Variables
///
/// - `NOTE_WEAVER_BASE_URL`: root of the site under test
/// - `NOTE_WEAVER_LOG_LEVEL`: trace, debug, info, warn or error
/// - `NOTE_WEAVER_JOBS`: scenarios run at once, at least 1
/// - `NOTE_WEAVER_FAIL_ON_SKIPPED`: treat pending scenarios as failures
/// - `NOTE_WEAVER_TIMEOUT_SECS`: per-request timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Root URL of the site under test.
    pub base_url: String,
    /// Log verbosity.
    pub log_level: LogLevel,
    /// Maximum scenarios in flight.
    pub jobs: NonZeroUsize,
    /// Fail the run when a scenario is skipped.
    pub fail_on_skipped: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_level: LogLevel::default(),
            jobs: NonZeroUsize::MIN,
            fail_on_skipped: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--base-url`.
    pub base_url: Option<String>,
    /// `--log-level`.
    pub log_level: Option<LogLevel>,
    /// `--jobs`.
    pub jobs: Option<NonZeroUsize>,
    /// `--fail-on-skipped`; the flag can only switch the setting on.
    pub fail_on_skipped: bool,
    /// `--timeout-secs`.
    pub timeout_secs: Option<u64>,
}

impl RunnerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from `lookup`, which maps a variable name to its
    /// value. Missing variables keep their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("NOTE_WEAVER_BASE_URL") {
            config.base_url = url;
        }
        if let Some(level) = lookup("NOTE_WEAVER_LOG_LEVEL") {
            config.log_level = level.parse()?;
        }
        if let Some(jobs) = lookup("NOTE_WEAVER_JOBS") {
            config.jobs = parse_jobs(&jobs)?;
        }
        if let Some(flag) = lookup("NOTE_WEAVER_FAIL_ON_SKIPPED") {
            config.fail_on_skipped = parse_bool("NOTE_WEAVER_FAIL_ON_SKIPPED", &flag)?;
        }
        if let Some(secs) = lookup("NOTE_WEAVER_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_timeout(&secs)?);
        }
        Ok(config)
    }

    /// Apply command line overrides on top of the environment.
    #[must_use]
    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs;
        }
        if overrides.fail_on_skipped {
            self.fail_on_skipped = true;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Route table for the configured base URL.
    ///
    /// # Errors
    /// Returns [`ConfigError::BaseUrl`] when the URL is unusable.
    pub fn routes(&self) -> Result<SiteRoutes, ConfigError> {
        SiteRoutes::new(&self.base_url).map_err(ConfigError::BaseUrl)
    }
}

fn parse_jobs(value: &str) -> Result<NonZeroUsize, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name: "job count",
        value: value.to_string(),
        expected: "a positive integer",
    })
}

fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::Invalid {
            name: "timeout",
            value: value.to_string(),
            expected: "a positive number of seconds",
        })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            expected: "1/true/yes/on or 0/false/no/off",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<RunnerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        RunnerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = load(&[]).unwrap_or_else(|err| panic!("config: {err}"));
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("NOTE_WEAVER_BASE_URL", "https://staging.example/"),
            ("NOTE_WEAVER_LOG_LEVEL", "DEBUG"),
            ("NOTE_WEAVER_JOBS", "4"),
            ("NOTE_WEAVER_FAIL_ON_SKIPPED", "yes"),
            ("NOTE_WEAVER_TIMEOUT_SECS", "3"),
        ])
        .unwrap_or_else(|err| panic!("config: {err}"));
        assert_eq!(config.base_url, "https://staging.example/");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.jobs.get(), 4);
        assert!(config.fail_on_skipped);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[rstest]
    #[case("1", true)]
    #[case("TRUE", true)]
    #[case(" on ", true)]
    #[case("0", false)]
    #[case("No", false)]
    #[case("off", false)]
    fn parses_booleans(#[case] value: &str, #[case] expected: bool) {
        assert!(matches!(parse_bool("flag", value), Ok(parsed) if parsed == expected));
    }

    #[rstest]
    #[case("NOTE_WEAVER_FAIL_ON_SKIPPED", "maybe", "1/true/yes/on")]
    #[case("NOTE_WEAVER_JOBS", "0", "positive integer")]
    #[case("NOTE_WEAVER_JOBS", "many", "positive integer")]
    #[case("NOTE_WEAVER_TIMEOUT_SECS", "0", "positive number of seconds")]
    #[case("NOTE_WEAVER_LOG_LEVEL", "loud", "one of trace")]
    fn rejects_invalid_values(#[case] key: &str, #[case] value: &str, #[case] expected: &str) {
        let Err(err) = load(&[(key, value)]) else {
            panic!("{key}={value} should be rejected");
        };
        let message = err.to_string();
        assert!(message.contains(expected), "{message}");
        assert!(message.contains(value), "{message}");
    }

    #[rstest]
    #[case("warning", LogLevel::Warn)]
    #[case("Trace", LogLevel::Trace)]
    #[case("error", LogLevel::Error)]
    fn parses_log_levels(#[case] value: &str, #[case] expected: LogLevel) {
        assert_eq!(value.parse::<LogLevel>().ok(), Some(expected));
        assert_eq!(expected.as_filter_str(), value.to_lowercase().replace("warning", "warn"));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = load(&[("NOTE_WEAVER_JOBS", "4"), ("NOTE_WEAVER_FAIL_ON_SKIPPED", "on")])
            .unwrap_or_else(|err| panic!("config: {err}"))
            .apply_overrides(Overrides {
                base_url: Some("http://localhost:8080".into()),
                jobs: NonZeroUsize::new(2),
                timeout_secs: Some(30),
                ..Overrides::default()
            });
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.jobs.get(), 2);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.fail_on_skipped, "absent flag keeps the environment value");
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[rstest]
    #[case("http://127.0.0.1:5000", true)]
    #[case("127.0.0.1:5000", false)]
    fn validates_base_url(#[case] base_url: &str, #[case] valid: bool) {
        let config = RunnerConfig {
            base_url: base_url.into(),
            ..RunnerConfig::default()
        };
        assert_eq!(config.routes().is_ok(), valid);
    }
}
