//! Subscriber setup for hosts that embed the executor (feature `logging`).
//!
//! The executor itself only emits `tracing` events. A task-runner host that
//! has no subscriber of its own can call [`init_logging`] once at startup.

use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Set by the task runner when it was started with `--verbose`.
pub const VERBOSE_ENV: &str = "NX_VERBOSE_LOGGING";

static INIT: Once = Once::new();

/// How much executor output reaches the terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Silent,
    Error,
    /// Engine warnings and failures.
    Warn,
    /// Build banners.
    #[default]
    Info,
    /// Cleaning, per-entry progress, emitted files and timings.
    Debug,
}

impl LogLevel {
    /// `Debug` when the task runner runs verbosely, `Info` otherwise.
    pub fn from_env() -> Self {
        match std::env::var(VERBOSE_ENV).as_deref() {
            Ok("true") | Ok("1") => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Silent => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "verbose" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install a compact stderr subscriber at `level`. Later calls are no-ops.
///
/// `RUST_LOG` directives are applied on top of `level`.
///
/// ```rust,no_run
/// use pkgbuild_bundler::logging::{LogLevel, init_logging};
///
/// init_logging(LogLevel::from_env());
/// ```
pub fn init_logging(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level.level_filter().into())
            .from_env_lossy();

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact();

        tracing_subscriber::registry().with(filter).with(layer).init();
    });
}
