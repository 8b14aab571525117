//! One-time binding of the native library
//!
//! A `NativeBinding` tries to load its library the first time anyone asks for
//! its state and records the outcome for the rest of its lifetime. A missing
//! or rejected library is a normal condition: it produces an unavailable
//! state, never an error for the caller.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::error::{NativeError, NativeResult};
use super::traits::{LibraryLoader, NativeLayer};
use crate::logging::file_logger as log;

/// Default base name of the native security library
pub const DEFAULT_LIBRARY_NAME: &str = "security";

/// Terminal outcome of the one-time library load
#[derive(Clone)]
pub struct LoaderState {
    native: Option<Arc<dyn NativeLayer>>,
    failure: Option<NativeError>,
}

impl LoaderState {
    fn bound(native: Arc<dyn NativeLayer>) -> Self {
        Self {
            native: Some(native),
            failure: None,
        }
    }

    fn failed(failure: NativeError) -> Self {
        Self {
            native: None,
            failure: Some(failure),
        }
    }

    /// Whether native calls may be attempted
    pub fn native_available(&self) -> bool {
        self.native.is_some()
    }

    /// The bound native layer, if loading succeeded
    pub fn native(&self) -> Option<&Arc<dyn NativeLayer>> {
        self.native.as_ref()
    }

    /// Why loading failed, if it did
    pub fn failure(&self) -> Option<&NativeError> {
        self.failure.as_ref()
    }
}

impl fmt::Debug for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderState")
            .field("native_available", &self.native_available())
            .field("failure", &self.failure)
            .finish()
    }
}

/// Loader used for bindings whose state is fixed at construction
struct NoLibraryLoader;

impl LibraryLoader for NoLibraryLoader {
    fn load(&self, _name: &str) -> NativeResult<Arc<dyn NativeLayer>> {
        Err(NativeError::Unavailable)
    }
}

/// Write-once binding of a native library
///
/// Concurrent first access from many threads results in exactly one call to
/// the underlying `LibraryLoader`; every caller observes the same state.
pub struct NativeBinding {
    library: String,
    loader: Arc<dyn LibraryLoader>,
    state: OnceCell<LoaderState>,
}

impl NativeBinding {
    /// Create a binding that loads `library` lazily on first use
    pub fn new(library: impl Into<String>, loader: Arc<dyn LibraryLoader>) -> Self {
        Self {
            library: library.into(),
            loader,
            state: OnceCell::new(),
        }
    }

    /// A binding that is already known to have no native library
    pub fn unavailable() -> Self {
        Self {
            library: DEFAULT_LIBRARY_NAME.to_string(),
            loader: Arc::new(NoLibraryLoader),
            state: OnceCell::with_value(LoaderState::failed(NativeError::Unavailable)),
        }
    }

    /// A binding around a native layer the host has already bound
    pub fn from_layer(native: Arc<dyn NativeLayer>) -> Self {
        Self {
            library: DEFAULT_LIBRARY_NAME.to_string(),
            loader: Arc::new(NoLibraryLoader),
            state: OnceCell::with_value(LoaderState::bound(native)),
        }
    }

    /// Name of the library this binding loads
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Whether the one-time load has already happened
    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    /// Get the loader state, loading the library on first call
    pub fn state(&self) -> &LoaderState {
        self.state.get_or_init(|| self.initialize())
    }

    /// Shorthand for `state().native_available()`
    pub fn native_available(&self) -> bool {
        self.state().native_available()
    }

    fn initialize(&self) -> LoaderState {
        log::debug("NativeBinding", &format!("Loading native library '{}'", self.library));

        let outcome = catch_unwind(AssertUnwindSafe(|| self.loader.load(&self.library)))
            .unwrap_or_else(|_| {
                Err(NativeError::load_failed(&self.library, "loader panicked"))
            });

        match outcome {
            Ok(native) => {
                log::info("NativeBinding", &format!("Native library '{}' bound", self.library));
                LoaderState::bound(native)
            }
            Err(e) => {
                log::warn(
                    "NativeBinding",
                    &format!("Native library '{}' unavailable, using fallbacks: {}", self.library, e),
                );
                LoaderState::failed(e)
            }
        }
    }
}

impl fmt::Debug for NativeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBinding")
            .field("library", &self.library)
            .field("state", &self.state.get())
            .finish()
    }
}
