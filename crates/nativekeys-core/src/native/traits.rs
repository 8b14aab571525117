//! Core traits and types for the native boundary

use std::ffi::c_void;
use std::sync::Arc;

use super::error::NativeResult;
use super::value::NativeValue;

/// Opaque platform handle passed through to native calls
///
/// The resolver never dereferences, constructs, or frees the pointee; it only
/// forwards the raw pointer it was given. A null context is valid for
/// platforms whose native library needs no handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformContext {
    raw: *mut c_void,
}

// SAFETY: the handle is an opaque token owned by the host application for
// the lifetime of the process; the resolver never dereferences it.
unsafe impl Send for PlatformContext {}
unsafe impl Sync for PlatformContext {}

impl PlatformContext {
    /// Wrap a host-provided handle
    pub fn from_raw(raw: *mut c_void) -> Self {
        Self { raw }
    }

    /// A context carrying no handle
    pub fn null() -> Self {
        Self {
            raw: std::ptr::null_mut(),
        }
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }
}

impl Default for PlatformContext {
    fn default() -> Self {
        Self::null()
    }
}

/// Calls exported by the native security library
///
/// Implementations:
/// - `DynamicLibrary`: the real library bound through the platform loader
/// - `MockNativeLayer`: scripted responses for testing
///
/// Implementations report failures as `Err` and return raw results otherwise;
/// interpreting sentinels and falling back is the resolver's job.
pub trait NativeLayer: Send + Sync {
    /// Retrieve the secret for a numeric key id
    ///
    /// `Ok(None)` means the native call returned no value at all.
    fn get_key(&self, key_id: i32, context: PlatformContext) -> NativeResult<Option<String>>;

    /// Hash an arbitrary input string
    fn build_hash(&self, input: &str, context: PlatformContext) -> NativeResult<String>;

    /// Extract signing attributes of the artifact at `path`
    ///
    /// `Ok(None)` means the native call returned nothing.
    fn get_signature(&self, path: &str, context: PlatformContext) -> NativeResult<Option<NativeValue>>;
}

/// Binds a native library by name
pub trait LibraryLoader: Send + Sync {
    /// Attempt to bind the library
    ///
    /// Called at most once per `NativeBinding`.
    fn load(&self, name: &str) -> NativeResult<Arc<dyn NativeLayer>>;
}
