//! Structured logging using tracing.
//!
//! Two concerns live here:
//! - subscriber setup ([`init`]): console output plus a rotating JSON log
//!   file, configured through [`LoggingConfig`];
//! - addon messages ([`log_msg`], [`Logger`]): messages carry a verbosity
//!   from `-2` (errors) to `2` (database debug) and are only emitted when the
//!   `emby_logLevel` window property allows it.

use std::panic::Location;
use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{Error, Result};
use crate::properties::{LOG_LEVEL, PropertyStore, Window};

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files are stored.
    pub log_directory: PathBuf,
    /// Log file name prefix (e.g., "kodiconnect" -> "kodiconnect.2024-01-15").
    pub log_file_prefix: String,
    /// Maximum log level for file output.
    pub file_level: Level,
    /// How often to rotate log files.
    pub rotation: LogRotation,
    /// Whether to include ANSI color codes in console output.
    pub console_ansi: bool,
    /// Whether to include file/line info in logs.
    pub include_file_line: bool,
    /// Whether to include target module in logs.
    pub include_target: bool,
    /// Whether to log span events (enter/exit).
    pub log_span_events: bool,
}

/// Log rotation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    /// Create a new log file every hour.
    Hourly,
    /// Create a new log file every day.
    Daily,
    /// Never rotate (single log file).
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggingConfig {
    /// Verbose configuration for development.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "kodiconnect".to_string(),
            file_level: Level::TRACE,
            rotation: LogRotation::Hourly,
            console_ansi: true,
            include_file_line: true,
            include_target: true,
            log_span_events: true,
        }
    }

    /// Production configuration with minimal console output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "kodiconnect".to_string(),
            file_level: Level::DEBUG,
            rotation: LogRotation::Daily,
            console_ansi: true,
            include_file_line: false,
            include_target: false,
            log_span_events: false,
        }
    }

    /// Detect configuration based on build type.
    #[must_use]
    pub fn auto() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Set the log directory.
    #[must_use]
    pub fn with_log_directory(mut self, path: PathBuf) -> Self {
        self.log_directory = path;
        self
    }

    /// Set the file log level.
    #[must_use]
    pub const fn with_file_level(mut self, level: Level) -> Self {
        self.file_level = level;
        self
    }

    /// Set the log rotation frequency.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Guard that keeps file logging active. Drop this to flush and close log files.
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize the global subscriber.
///
/// Returns a guard that must be kept alive for the duration of the program.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    if !config.log_directory.exists() {
        std::fs::create_dir_all(&config.log_directory).map_err(|e| {
            Error::Logging(format!(
                "Failed to create log directory {}: {e}",
                config.log_directory.display()
            ))
        })?;
    }

    let file_appender = RollingFileAppender::new(
        config.rotation.into(),
        &config.log_directory,
        &config.log_file_prefix,
    );
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG overrides the console filter
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new("warn,kodiconnect=info,kodiconnect_core=info")
            .map_err(|e| Error::Logging(e.to_string()))?,
    };
    let file_filter = EnvFilter::try_new(format!(
        "{},kodiconnect=trace,kodiconnect_core=trace",
        level_to_directive(config.file_level)
    ))
    .map_err(|e| Error::Logging(e.to_string()))?;

    let span_events = if config.log_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let console_layer = fmt::layer()
        .with_ansi(config.console_ansi)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_span_events(span_events.clone())
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .json()
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Default log directory.
#[must_use]
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kodiconnect")
        .join("logs")
}

const fn level_to_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Addon log verbosity configured through the `emby_logLevel` property.
///
/// Anything that does not parse as an integer counts as `0`.
pub fn configured_log_level(properties: &dyn PropertyStore) -> i32 {
    Window::home(properties)
        .get(LOG_LEVEL)
        .trim()
        .parse()
        .unwrap_or(0)
}

/// Emit `msg` under `title` when the configured verbosity is at least `level`.
///
/// At verbosity `2` the caller's source location is included. Returns
/// whether the message was emitted.
#[track_caller]
pub fn log_msg(properties: &dyn PropertyStore, title: &str, msg: &str, level: i32) -> bool {
    let configured = configured_log_level(properties);
    if configured < level {
        return false;
    }

    let line = if configured >= 2 {
        let caller = Location::caller();
        format!("{title} -> {}:{} : {msg}", caller.file(), caller.line())
    } else {
        format!("{title} -> {msg}")
    };

    match level {
        i32::MIN..=-2 => tracing::error!(target: "kodiconnect", "{}", line),
        -1 => tracing::warn!(target: "kodiconnect", "{}", line),
        0 => tracing::info!(target: "kodiconnect", "{}", line),
        1 => tracing::debug!(target: "kodiconnect", "{}", line),
        _ => tracing::trace!(target: "kodiconnect", "{}", line),
    }
    true
}

/// Per-component logger that prefixes messages with `"{addon} {component}"`.
///
/// Workers hold one by value instead of inheriting logging behavior.
#[derive(Clone, Copy)]
pub struct Logger<'a> {
    properties: &'a dyn PropertyStore,
    addon_name: &'a str,
    component: &'a str,
}

impl<'a> Logger<'a> {
    /// Create a logger for `component`.
    #[must_use]
    pub fn new(properties: &'a dyn PropertyStore, addon_name: &'a str, component: &'a str) -> Self {
        Self {
            properties,
            addon_name,
            component,
        }
    }

    /// Title used as message prefix.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {}", self.addon_name, self.component)
    }

    /// Log `msg` at `level`; see [`log_msg`].
    #[track_caller]
    pub fn log(&self, msg: &str, level: i32) -> bool {
        log_msg(self.properties, &self.title(), msg, level)
    }
}

impl std::fmt::Debug for Logger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("title", &self.title())
            .finish()
    }
}
