//! Mock native layer for testing
//!
//! Provides scripted, deterministic native responses with call counting, so
//! the fallback rules can be exercised without a real shared library.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{NativeError, NativeResult};
use super::traits::{LibraryLoader, NativeLayer, PlatformContext};
use super::value::NativeValue;

/// How the mock answers `build_hash`
#[derive(Debug, Clone)]
pub enum MockHashMode {
    /// Return `"<prefix><input>"`
    Prefix(String),
    /// Return a fixed string regardless of input
    Fixed(String),
    /// Fail every call
    Error(NativeError),
}

impl Default for MockHashMode {
    fn default() -> Self {
        MockHashMode::Prefix("hash:".to_string())
    }
}

/// Scripted native layer
///
/// Unknown key ids answer `Ok(None)`; the signature call answers `Ok(None)`
/// until scripted otherwise.
#[derive(Debug, Default)]
pub struct MockNativeLayer {
    keys: Mutex<HashMap<i32, NativeResult<Option<String>>>>,
    hash_mode: Mutex<MockHashMode>,
    signature: Mutex<Option<NativeResult<Option<NativeValue>>>>,
    last_context: Mutex<Option<PlatformContext>>,
    get_key_calls: AtomicUsize,
    build_hash_calls: AtomicUsize,
    get_signature_calls: AtomicUsize,
}

impl MockNativeLayer {
    /// Create a mock with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `key_id` with a string
    pub fn with_key(self, key_id: i32, value: impl Into<String>) -> Self {
        self.with_key_response(key_id, Ok(Some(value.into())))
    }

    /// Answer `key_id` with an arbitrary result
    pub fn with_key_response(self, key_id: i32, response: NativeResult<Option<String>>) -> Self {
        self.keys.lock().insert(key_id, response);
        self
    }

    pub fn with_hash_mode(self, mode: MockHashMode) -> Self {
        *self.hash_mode.lock() = mode;
        self
    }

    /// Answer the signature call with a value (or nothing)
    pub fn with_signature(self, signature: Option<NativeValue>) -> Self {
        *self.signature.lock() = Some(Ok(signature));
        self
    }

    /// Fail the signature call
    pub fn with_signature_error(self, error: NativeError) -> Self {
        *self.signature.lock() = Some(Err(error));
        self
    }

    pub fn get_key_calls(&self) -> usize {
        self.get_key_calls.load(Ordering::SeqCst)
    }

    pub fn build_hash_calls(&self) -> usize {
        self.build_hash_calls.load(Ordering::SeqCst)
    }

    pub fn get_signature_calls(&self) -> usize {
        self.get_signature_calls.load(Ordering::SeqCst)
    }

    /// Total native calls of any kind
    pub fn total_calls(&self) -> usize {
        self.get_key_calls() + self.build_hash_calls() + self.get_signature_calls()
    }

    /// Context passed to the most recent call
    pub fn last_context(&self) -> Option<PlatformContext> {
        *self.last_context.lock()
    }

    fn record_context(&self, context: PlatformContext) {
        *self.last_context.lock() = Some(context);
    }
}

impl NativeLayer for MockNativeLayer {
    fn get_key(&self, key_id: i32, context: PlatformContext) -> NativeResult<Option<String>> {
        self.get_key_calls.fetch_add(1, Ordering::SeqCst);
        self.record_context(context);
        self.keys.lock().get(&key_id).cloned().unwrap_or(Ok(None))
    }

    fn build_hash(&self, input: &str, context: PlatformContext) -> NativeResult<String> {
        self.build_hash_calls.fetch_add(1, Ordering::SeqCst);
        self.record_context(context);
        match &*self.hash_mode.lock() {
            MockHashMode::Prefix(prefix) => Ok(format!("{}{}", prefix, input)),
            MockHashMode::Fixed(value) => Ok(value.clone()),
            MockHashMode::Error(e) => Err(e.clone()),
        }
    }

    fn get_signature(&self, _path: &str, context: PlatformContext) -> NativeResult<Option<NativeValue>> {
        self.get_signature_calls.fetch_add(1, Ordering::SeqCst);
        self.record_context(context);
        self.signature.lock().clone().unwrap_or(Ok(None))
    }
}

/// What a `MockLibraryLoader` does when asked to load
#[derive(Clone)]
enum MockLoadMode {
    Succeed(Arc<dyn NativeLayer>),
    Fail(NativeError),
    Panic,
}

/// Library loader that counts load attempts
pub struct MockLibraryLoader {
    mode: MockLoadMode,
    load_count: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockLibraryLoader {
    /// A loader that binds `native`
    pub fn succeeding(native: Arc<dyn NativeLayer>) -> Self {
        Self::with_mode(MockLoadMode::Succeed(native))
    }

    /// A loader that always fails with `error`
    pub fn failing(error: NativeError) -> Self {
        Self::with_mode(MockLoadMode::Fail(error))
    }

    /// A loader that panics while loading
    pub fn panicking() -> Self {
        Self::with_mode(MockLoadMode::Panic)
    }

    fn with_mode(mode: MockLoadMode) -> Self {
        Self {
            mode,
            load_count: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `load` has been called
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// Library names passed to `load`, in call order
    pub fn requested_names(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

impl LibraryLoader for MockLibraryLoader {
    fn load(&self, name: &str) -> NativeResult<Arc<dyn NativeLayer>> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(name.to_string());
        match &self.mode {
            MockLoadMode::Succeed(native) => Ok(Arc::clone(native)),
            MockLoadMode::Fail(e) => Err(e.clone()),
            MockLoadMode::Panic => panic!("mock loader panic while loading '{}'", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_defaults() {
        let mock = MockNativeLayer::new();
        let ctx = PlatformContext::null();

        assert_eq!(mock.get_key(1, ctx).unwrap(), None);
        assert_eq!(mock.build_hash("abc", ctx).unwrap(), "hash:abc");
        assert_eq!(mock.get_signature("/app.apk", ctx).unwrap(), None);
        assert_eq!(mock.total_calls(), 3);
        assert_eq!(mock.last_context(), Some(ctx));
    }

    #[test]
    fn test_mock_scripted() {
        let mock = MockNativeLayer::new()
            .with_key(5, "five")
            .with_key_response(6, Err(NativeError::call_failed("get_key", "boom")))
            .with_hash_mode(MockHashMode::Fixed("h".into()))
            .with_signature_error(NativeError::MalformedResult("bad".into()));
        let ctx = PlatformContext::null();

        assert_eq!(mock.get_key(5, ctx).unwrap(), Some("five".to_string()));
        assert!(mock.get_key(6, ctx).is_err());
        assert_eq!(mock.build_hash("anything", ctx).unwrap(), "h");
        assert!(mock.get_signature("/p", ctx).is_err());
        assert_eq!(mock.get_key_calls(), 2);
    }

    #[test]
    fn test_loader_counts() {
        let loader = MockLibraryLoader::failing(NativeError::Unavailable);
        assert!(loader.load("security").is_err());
        assert!(loader.load("other").is_err());
        assert_eq!(loader.load_count(), 2);
        assert_eq!(loader.requested_names(), vec!["security", "other"]);
    }
}
