//! Native security library bound through the platform dynamic loader
//!
//! The library exports a small C ABI:
//!
//! | symbol             | signature                                          |
//! |--------------------|----------------------------------------------------|
//! | `nk_get_key`       | `char *(int32_t key_id, void *ctx)`                |
//! | `nk_build_hash`    | `char *(const char *input, void *ctx)`             |
//! | `nk_get_signature` | `char *(const char *path, void *ctx)`              |
//! | `nk_free_string`   | `void (char *s)`                                   |
//!
//! Returned strings are NUL-terminated UTF-8 owned by the library and handed
//! back through `nk_free_string`. A null return means "no value".
//! `nk_get_signature` returns the JSON form of a `NativeValue`.

use std::env;
use std::ffi::{c_char, c_void, CStr, CString, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;

use super::error::{NativeError, NativeResult};
use super::traits::{LibraryLoader, NativeLayer, PlatformContext};
use super::value::NativeValue;
use crate::logging::file_logger as log;

pub const SYMBOL_GET_KEY: &str = "nk_get_key";
pub const SYMBOL_BUILD_HASH: &str = "nk_build_hash";
pub const SYMBOL_GET_SIGNATURE: &str = "nk_get_signature";
pub const SYMBOL_FREE_STRING: &str = "nk_free_string";

/// Environment variable holding extra library search directories
pub const LIBRARY_PATH_ENV: &str = "NATIVEKEYS_LIBRARY_PATH";

pub type GetKeyFn = unsafe extern "C" fn(i32, *mut c_void) -> *mut c_char;
pub type BuildHashFn = unsafe extern "C" fn(*const c_char, *mut c_void) -> *mut c_char;
pub type GetSignatureFn = unsafe extern "C" fn(*const c_char, *mut c_void) -> *mut c_char;
pub type FreeStringFn = unsafe extern "C" fn(*mut c_char);

/// The `nk_*` entry points of a security library
#[derive(Debug, Clone, Copy)]
pub struct NativeExports {
    pub get_key: GetKeyFn,
    pub build_hash: BuildHashFn,
    pub get_signature: GetSignatureFn,
    pub free_string: FreeStringFn,
}

impl NativeExports {
    /// Resolve every export from an opened library
    ///
    /// # Safety
    ///
    /// The library's symbols must have the signatures in the table above.
    unsafe fn resolve(library: &Library, name: &str) -> NativeResult<Self> {
        Ok(Self {
            get_key: Self::symbol(library, name, SYMBOL_GET_KEY)?,
            build_hash: Self::symbol(library, name, SYMBOL_BUILD_HASH)?,
            get_signature: Self::symbol(library, name, SYMBOL_GET_SIGNATURE)?,
            free_string: Self::symbol(library, name, SYMBOL_FREE_STRING)?,
        })
    }

    unsafe fn symbol<T: Copy>(library: &Library, name: &str, symbol: &str) -> NativeResult<T> {
        let sym = library
            .get::<T>(symbol.as_bytes())
            .map_err(|_| NativeError::missing_symbol(name, symbol))?;
        Ok(*sym)
    }
}

/// A loaded native security library
///
/// All symbols are resolved when the library is opened, so a library that
/// lacks any of them is rejected up front rather than failing mid-call.
pub struct DynamicLibrary {
    name: String,
    path: Option<PathBuf>,
    exports: NativeExports,
    // Keeps the function pointers in `exports` valid.
    _library: Option<Library>,
}

impl DynamicLibrary {
    /// Open the library at `path` and resolve its exports
    pub fn open(name: &str, path: impl AsRef<Path>) -> NativeResult<Self> {
        let path = path.as_ref();

        // SAFETY: loading runs the library's initialisers. The library is the
        // application's own security module, located by the host.
        let library = unsafe { Library::new(path) }
            .map_err(|e| NativeError::load_failed(name, e.to_string()))?;

        // SAFETY: the declared types match the exported C ABI.
        let exports = unsafe { NativeExports::resolve(&library, name)? };

        Ok(Self {
            name: name.to_string(),
            path: Some(path.to_path_buf()),
            exports,
            _library: Some(library),
        })
    }

    /// Bind exports already linked into the process
    ///
    /// # Safety
    ///
    /// The functions must follow the `nk_*` contract and stay valid for the
    /// life of the returned value.
    pub unsafe fn from_exports(name: &str, exports: NativeExports) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            exports,
            _library: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the library was opened from, if it was opened from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy a library-owned string and release it
    fn take_string(&self, call: &str, raw: *mut c_char) -> NativeResult<Option<String>> {
        if raw.is_null() {
            return Ok(None);
        }

        // SAFETY: non-null returns are NUL-terminated strings owned by the
        // library until passed to `nk_free_string`.
        let copied = unsafe { CStr::from_ptr(raw) }
            .to_str()
            .map(str::to_owned)
            .map_err(|_| NativeError::InvalidUtf8(call.to_string()));
        unsafe { (self.exports.free_string)(raw) };

        copied.map(Some)
    }

    fn c_arg(call: &str, value: &str) -> NativeResult<CString> {
        CString::new(value).map_err(|_| NativeError::InteriorNul(call.to_string()))
    }
}

impl NativeLayer for DynamicLibrary {
    fn get_key(&self, key_id: i32, context: PlatformContext) -> NativeResult<Option<String>> {
        // SAFETY: plain value arguments; the context is forwarded untouched.
        let raw = unsafe { (self.exports.get_key)(key_id, context.as_raw()) };
        self.take_string("get_key", raw)
    }

    fn build_hash(&self, input: &str, context: PlatformContext) -> NativeResult<String> {
        let input = Self::c_arg("build_hash", input)?;
        // SAFETY: `input` outlives the call.
        let raw = unsafe { (self.exports.build_hash)(input.as_ptr(), context.as_raw()) };
        self.take_string("build_hash", raw)?
            .ok_or_else(|| NativeError::NullResult("build_hash".to_string()))
    }

    fn get_signature(&self, path: &str, context: PlatformContext) -> NativeResult<Option<NativeValue>> {
        let path = Self::c_arg("get_signature", path)?;
        // SAFETY: `path` outlives the call.
        let raw = unsafe { (self.exports.get_signature)(path.as_ptr(), context.as_raw()) };
        match self.take_string("get_signature", raw)? {
            Some(json) => NativeValue::from_json(&json).map(Some),
            None => Ok(None),
        }
    }
}

/// Loads `DynamicLibrary` instances by base name
///
/// The platform file name (`libsecurity.so`, `security.dll`, ...) is looked
/// up in each search directory in order, then handed to the system loader.
#[derive(Debug, Clone, Default)]
pub struct DynamicLibraryLoader {
    search_dirs: Vec<PathBuf>,
}

impl DynamicLibraryLoader {
    /// A loader that only uses the system search path
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that checks `dirs` before the system search path
    pub fn with_search_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs: dirs }
    }

    /// A loader whose search directories come from `NATIVEKEYS_LIBRARY_PATH`
    pub fn from_env() -> Self {
        let search_dirs = env::var_os(LIBRARY_PATH_ENV)
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Platform-specific file name for a library base name
    pub fn file_name(name: &str) -> OsString {
        libloading::library_filename(name)
    }

    fn locate(&self, name: &str) -> PathBuf {
        let file_name = Self::file_name(name);
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(file_name))
    }
}

impl LibraryLoader for DynamicLibraryLoader {
    fn load(&self, name: &str) -> NativeResult<Arc<dyn NativeLayer>> {
        let path = self.locate(name);
        log::debug("DynamicLibraryLoader", &format!("Opening {}", path.display()));
        let library = DynamicLibrary::open(name, &path)?;
        Ok(Arc::new(library))
    }
}
