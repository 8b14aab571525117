//! Logging abstractions
//!
//! - `Logger` trait, injected into `NativeSecrets` to report fallbacks
//! - `file_logger`, a process-wide debug log for one-time events such as
//!   binding the native library

mod traits;
mod noop;
mod console;
pub mod file_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;

pub use file_logger::{log_file_path, LogLevel};
