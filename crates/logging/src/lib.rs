//! wgforge Logging
//!
//! Shared tracing-subscriber initialization for all wgforge binaries.
//! `RUST_LOG` overrides the level chosen in code.

use tracing_subscriber::EnvFilter;

/// Log verbosity for subscriber initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Initialize the global subscriber.
///
/// Returns an error if a subscriber is already installed; callers that
/// do not care (tests, repeated builders) ignore the result.
pub fn try_init(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}
