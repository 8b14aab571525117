//! Logger trait definition

use std::sync::Arc;

/// Logger abstraction injected into the resolver
///
/// Implementations:
/// - `NoOpLogger`: Silent logger for testing
/// - `ConsoleLogger`: Logs to stdout/stderr
/// - Host adapters: forward to the application's own log pipeline
///
/// Messages never contain secret values.
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);
}

/// Type alias for an Arc-wrapped logger
pub type SharedLogger = Arc<dyn Logger>;
