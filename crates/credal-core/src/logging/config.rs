//! Logging configuration for embedding applications.
//!
//! The level comes from CREDAL_LOG, falling back to a bare or
//! `credal_core=` directive in RUST_LOG. CREDAL_LOG_FORMAT picks the
//! output format. Explicit arguments to [`LogConfig::from_env`] win.

use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the log level.
pub const ENV_LOG_LEVEL: &str = "CREDAL_LOG";

/// Environment variable selecting the output format.
pub const ENV_LOG_FORMAT: &str = "CREDAL_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per event.
    Jsonl,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [LogFormat::Human, LogFormat::Jsonl]
            .into_iter()
            .find(|f| s.eq_ignore_ascii_case(f.as_str()))
            .ok_or_else(|| format!("unknown log format {s:?} (expected human or jsonl)"))
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity, most verbose first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Trace,
    /// Per-run initialization, clustering and aggregation events.
    Debug,
    /// Run lifecycle and skipped input entries.
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Off,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Level named by a RUST_LOG value, if it has a bare level or a
    /// `credal_core=<level>` directive.
    fn from_rust_log(value: &str) -> Option<Self> {
        value.split(',').map(str::trim).find_map(|directive| {
            let level = match directive.split_once('=') {
                Some(("credal_core", level)) => level,
                Some(_) => return None,
                None => directive,
            };
            level.parse().ok()
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|l| s.eq_ignore_ascii_case(l.as_str()))
            .ok_or_else(|| format!("unknown log level {s:?}"))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscriber settings used by [`super::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Prefix human output with timestamps.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::default(),
            level: LogLevel::default(),
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Read the environment, then apply the explicit overrides.
    ///
    /// Unparsable environment values are ignored.
    pub fn from_env(level: Option<LogLevel>, format: Option<LogFormat>) -> Self {
        let env_level = match std::env::var(ENV_LOG_LEVEL) {
            Ok(value) => value.parse().ok(),
            Err(_) => std::env::var("RUST_LOG")
                .ok()
                .and_then(|value| LogLevel::from_rust_log(&value)),
        };
        let env_format = std::env::var(ENV_LOG_FORMAT)
            .ok()
            .and_then(|value| value.parse().ok());

        LogConfig {
            level: level.or(env_level).unwrap_or_default(),
            format: format.or(env_format).unwrap_or_default(),
            ..LogConfig::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// `EnvFilter` directive used when RUST_LOG does not parse.
    pub fn filter_directive(&self) -> String {
        format!("credal_core={}", self.level)
    }
}
