//! Presenter diagnostics
//!
//! Every message goes through one replaceable process-wide sink. The default
//! sink prints colored, timestamped lines to stdout; tests and applications
//! install their own `Logger` to capture or forward them. Error-level
//! messages carry the file and line of the call site.

use colored::*;
use chrono::{DateTime, Local};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Destination for presenter diagnostics
///
/// # Example
///
/// ```no_run
/// use frame_presenter::presenter::log::{LogEntry, LogSeverity, Logger, Logging};
///
/// /// Forwards warnings and errors to stderr, drops the rest
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, entry: &LogEntry) {
///         if entry.severity >= LogSeverity::Warn {
///             eprintln!("{}: {}", entry.source, entry.message);
///         }
///     }
/// }
///
/// Logging::set_logger(StderrLogger);
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One diagnostic message
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. "presenter::Swapchain" or "presenter::vulkan"
    pub source: String,
    pub message: String,
    /// Call site, set for error-level messages only
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

/// Ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-frame acquire/present chatter
    Trace,
    Debug,
    /// Swapchain created or recreated
    Info,
    /// Recovered anomalies: dropped frames, invalid resolutions
    Warn,
    /// Failed device calls
    Error,
}

impl LogSeverity {
    /// Fixed-width colored tag used by the console logger
    fn tag(self) -> ColoredString {
        match self {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        }
    }
}

/// Console logger: `[time] [LEVEL] [source] message`, plus ` (file:line)` when known
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let local: DateTime<Local> = entry.timestamp.into();
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        println!(
            "[{}] [{}] [{}] {}{}",
            local.format("%H:%M:%S%.3f"),
            entry.severity.tag(),
            entry.source.bright_blue(),
            entry.message,
            location
        );
    }
}

/// Process-wide log sink used by the presenter_* macros
pub struct Logging;

impl Logging {
    fn sink() -> &'static RwLock<Box<dyn Logger>> {
        LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
    }

    /// Replace the current logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = Self::sink().write() {
            *lock = Box::new(logger);
        }
    }

    /// Restore the DefaultLogger
    pub fn reset_logger() {
        if let Ok(mut lock) = Self::sink().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Emit a message without call-site information
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::emit(severity, source, message, None);
    }

    /// Emit a message tagged with the call site (presenter_error!, presenter_err!)
    pub fn log_detailed(severity: LogSeverity, source: &str, message: String, file: &'static str, line: u32) {
        Self::emit(severity, source, message, Some((file, line)));
    }

    fn emit(severity: LogSeverity, source: &str, message: String, location: Option<(&'static str, u32)>) {
        let Ok(sink) = Self::sink().read() else {
            return;
        };
        sink.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: location.map(|(file, _)| file),
            line: location.map(|(_, line)| line),
        });
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! presenter_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::presenter::Logging::log(
            $crate::presenter::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! presenter_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::presenter::Logging::log(
            $crate::presenter::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
///
/// # Example
///
/// ```no_run
/// frame_presenter::presenter_info!("presenter::Swapchain", "Recreated at {}x{}", 1920, 1080);
/// ```
#[macro_export]
macro_rules! presenter_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::presenter::Logging::log(
            $crate::presenter::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! presenter_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::presenter::Logging::log(
            $crate::presenter::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! presenter_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::presenter::Logging::log_detailed(
            $crate::presenter::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR and build the matching `Error::BackendError`
///
/// # Example
///
/// ```no_run
/// use frame_presenter::presenter_err;
///
/// let err = presenter_err!("presenter::vulkan", "vkCreateSwapchainKHR failed: {}", -4);
/// ```
#[macro_export]
macro_rules! presenter_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::presenter::Logging::log_detailed(
            $crate::presenter::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::presenter::Error::BackendError(message)
    }};
}

/// Log an ERROR and return `Err(Error::BackendError)` from the current function
#[macro_export]
macro_rules! presenter_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::presenter_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
