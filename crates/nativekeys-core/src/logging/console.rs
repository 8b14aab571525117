//! Console logger implementation

use super::file_logger::LogLevel;
use super::traits::Logger;

/// A logger that outputs to the console (stdout/stderr)
///
/// Messages below `min_level` are dropped. Info goes to stdout; debug, warn
/// and error go to stderr.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix, logging info and above
    pub fn new() -> Self {
        Self {
            prefix: "[nativekeys]".to_string(),
            min_level: LogLevel::Info,
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    /// Change the minimum level that is printed
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Debug) {
            eprintln!("{} DEBUG: {}", self.prefix, message);
        }
    }

    fn info(&self, message: &str) {
        if self.enabled(LogLevel::Info) {
            println!("{} INFO: {}", self.prefix, message);
        }
    }

    fn warn(&self, message: &str) {
        if self.enabled(LogLevel::Warn) {
            eprintln!("{} WARN: {}", self.prefix, message);
        }
    }

    fn error(&self, message: &str) {
        if self.enabled(LogLevel::Error) {
            eprintln!("{} ERROR: {}", self.prefix, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logger_creation() {
        let logger = ConsoleLogger::new();
        assert_eq!(logger.prefix, "[nativekeys]");
        assert_eq!(logger.min_level, LogLevel::Info);

        let custom = ConsoleLogger::with_prefix("[MyApp]").with_min_level(LogLevel::Debug);
        assert_eq!(custom.prefix, "[MyApp]");
        assert!(custom.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_console_logger_filters() {
        let logger = ConsoleLogger::new().with_min_level(LogLevel::Warn);
        assert!(!logger.enabled(LogLevel::Info));
        assert!(logger.enabled(LogLevel::Error));

        // Just make sure nothing panics
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
