//! Native library boundary
//!
//! This module provides everything on the native side of the resolver:
//! - `NativeLayer` trait for the calls the native library exports
//! - `NativeBinding`, the write-once record of whether the library loaded
//! - `DynamicLibrary` / `DynamicLibraryLoader` for the real shared library
//! - `MockNativeLayer` / `MockLibraryLoader` for testing

mod traits;
mod error;
mod value;
mod loader;
mod library;
pub mod mock;

pub use traits::{NativeLayer, LibraryLoader, PlatformContext};
pub use error::{NativeError, NativeResult};
pub use value::NativeValue;
pub use loader::{NativeBinding, LoaderState, DEFAULT_LIBRARY_NAME};
pub use library::{DynamicLibrary, DynamicLibraryLoader, NativeExports, LIBRARY_PATH_ENV};
pub use mock::{MockNativeLayer, MockLibraryLoader, MockHashMode};
