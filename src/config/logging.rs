//! Logging Config
//!
//! Logs go to stderr; stdout is reserved for the cart summary or snapshot, so the default level
//! is `warn` and cart events only show up when asked for (`-l debug`).

use clap::{Args, ValueEnum};

/// How log lines are written to stderr.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One human-readable line per event
    #[default]
    Compact,

    /// One JSON object per event, for piping into other tools
    Json,
}

/// Logging flags shared by every `copygo` invocation.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `warn` or `copygo=debug`
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log line format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,
}
