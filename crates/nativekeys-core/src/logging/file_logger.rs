//! Process-wide debug log file
//!
//! Records one-time events (binding the native library, loading fallback
//! configuration) where no injected `Logger` exists yet. Disabled unless
//! `NATIVEKEYS_DEBUG` is `1` or `true`; `NATIVEKEYS_LOG_LEVEL` sets the
//! threshold (default `debug`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::SystemTime;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

struct FileLoggerState {
    file: Option<File>,
    min_level: LogLevel,
}

impl FileLoggerState {
    fn from_env() -> Self {
        let enabled = std::env::var("NATIVEKEYS_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("NATIVEKEYS_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);

        // Only touch the filesystem when logging is on
        let file = if enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path())
                .ok()
        } else {
            None
        };

        Self { file, min_level }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if level < self.min_level {
            return;
        }

        if let Some(ref mut file) = self.file {
            let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp(), level, module, message);
            let _ = file.flush();
        }
    }
}

/// `HH:MM:SS.mmm` in UTC
fn timestamp() -> String {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs();
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                (secs % 86400) / 3600,
                (secs % 3600) / 60,
                secs % 60,
                d.subsec_millis()
            )
        })
        .unwrap_or_else(|_| "??:??:??.???".to_string())
}

static LOGGER: OnceLock<Mutex<FileLoggerState>> = OnceLock::new();

fn get_logger() -> &'static Mutex<FileLoggerState> {
    LOGGER.get_or_init(|| Mutex::new(FileLoggerState::from_env()))
}

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.write(level, module, message);
    }
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

/// Path of the debug log file
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join("nativekeys-debug.log")
}
