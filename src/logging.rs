//! Tracing subscriber setup for binaries that embed the engine.
//!
//! The engine itself only emits `tracing` events. Logs go to stderr so stdout
//! stays free for the rendered handler.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Force debug-level output, ignoring `RUST_LOG`.
    pub debug: bool,
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub default_level: String,
    pub show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_level: "warn".to_string(),
            show_target: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&self.default_level))
        }
    }
}

/// Installs the global subscriber. Returns `false` if one was already installed.
pub fn init(config: &LogConfig) -> bool {
    fmt()
        .with_env_filter(config.build_filter())
        .with_target(config.show_target)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init()
        .is_ok()
}
