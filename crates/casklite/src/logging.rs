//! Logging setup for casklite applications.
//!
//! Built on the `tracing` framework. The storage layer emits events
//! for segment rollover, recovery, and compaction; this module wires
//! up a subscriber so embedding applications can see them.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log output goes.
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Write to stdout
    Stdout,
    /// Write to a daily-rotated file
    File(PathBuf),
    /// Write to both stdout and a daily-rotated file
    Both(PathBuf),
}

/// Log output style.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Multi-line human-readable format (default)
    Pretty,
    /// Single-line compact format
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level filter, overridable via `RUST_LOG`
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Config at info level, stdout output
    pub fn info() -> Self {
        Self {
            level: "info".to_string(),
            ..Default::default()
        }
    }

    /// Config at debug level
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Send output to a rotated file
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Send output to both stdout and a rotated file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set format style
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Install this configuration as the global subscriber.
    ///
    /// Returns a guard that must be kept alive while the program runs;
    /// dropping it shuts down the background log writer.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use casklite::logging::LogConfig;
    ///
    /// let _guard = LogConfig::info().init();
    /// ```
    pub fn init(self) -> Option<WorkerGuard> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .expect("Invalid log level");

        match self.output {
            LogOutput::Stdout => {
                match self.format {
                    LogFormat::Pretty => {
                        tracing_subscriber::registry()
                            .with(env_filter)
                            .with(fmt::layer().pretty())
                            .init();
                    }
                    LogFormat::Compact => {
                        tracing_subscriber::registry()
                            .with(env_filter)
                            .with(fmt::layer().compact())
                            .init();
                    }
                }
                None
            }
            LogOutput::File(path) => {
                let (non_blocking, guard) = file_writer(&path);

                match self.format {
                    LogFormat::Pretty => {
                        tracing_subscriber::registry()
                            .with(env_filter)
                            .with(fmt::layer().with_writer(non_blocking).pretty())
                            .init();
                    }
                    LogFormat::Compact => {
                        tracing_subscriber::registry()
                            .with(env_filter)
                            .with(fmt::layer().with_writer(non_blocking).compact())
                            .init();
                    }
                }
                Some(guard)
            }
            LogOutput::Both(path) => {
                let (non_blocking, guard) = file_writer(&path);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer())
                    .with(fmt::layer().with_writer(non_blocking))
                    .init();

                Some(guard)
            }
        }
    }
}

fn file_writer(path: &Path) -> (tracing_appender::non_blocking::NonBlocking, WorkerGuard) {
    let appender = tracing_appender::rolling::daily(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("casklite.log"),
    );
    tracing_appender::non_blocking(appender)
}
