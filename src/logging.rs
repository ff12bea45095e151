//! Diagnostic logging to stderr.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Log level from CLI argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing filter string.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Filter directive for the crate, raised to `debug` when verbose.
#[must_use]
pub fn filter_directive(level: LogLevel, verbose: bool) -> String {
    let level = if verbose && level > LogLevel::Debug {
        LogLevel::Debug
    } else {
        level
    };
    format!("orderlens={}", level.as_filter())
}

/// Initialize logging. `RUST_LOG` overrides the level when set.
pub fn init(level: LogLevel, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}
