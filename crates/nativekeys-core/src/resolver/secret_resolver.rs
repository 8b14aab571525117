//! Secret, hash and signature resolution with static fallback
//!
//! Every call is gated by the native binding's one-time load state:
//! 1. Static-only secrets come straight from `FallbackConfig`
//! 2. Native-first secrets ask the native layer, then fall back
//! 3. Hashes and signatures are forwarded to the native layer when it exists

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use super::signature::{normalize_signature, SignatureMap};
use crate::config::{ConfigResult, FallbackConfig};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::native::{
    DynamicLibraryLoader, LibraryLoader, LoaderState, NativeBinding, NativeError, NativeResult,
    PlatformContext, DEFAULT_LIBRARY_NAME,
};
use crate::types::{ResolutionPolicy, SecretKind};

/// String the native key call returns instead of raising an error
pub const NATIVE_ERROR_SENTINEL: &str = "error";

/// Why a static value was returned instead of a native one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The secret kind is never read from native code
    StaticPolicy,
    /// The native library did not load
    NativeUnavailable,
    /// The native call failed or returned an unusable value
    NativeFailed(NativeError),
}

/// Where a resolved secret came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    Native,
    Fallback(FallbackReason),
}

/// Result of resolving a secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value
    pub value: String,
    /// Which path produced it
    pub source: SecretSource,
}

impl ResolvedSecret {
    fn native(value: String) -> Self {
        Self {
            value,
            source: SecretSource::Native,
        }
    }

    fn fallback(value: &str, reason: FallbackReason) -> Self {
        Self {
            value: value.to_string(),
            source: SecretSource::Fallback(reason),
        }
    }

    pub fn is_native(&self) -> bool {
        self.source == SecretSource::Native
    }
}

/// Turn a raw native key response into a usable value
///
/// `None`, `""` and exactly `"error"` are failures; any other string,
/// including whitespace, is returned untouched.
pub fn interpret_key_response(call: &str, raw: Option<String>) -> NativeResult<String> {
    match raw {
        None => Err(NativeError::NullResult(call.to_string())),
        Some(value) if value.is_empty() => Err(NativeError::EmptyResult(call.to_string())),
        Some(value) if value == NATIVE_ERROR_SENTINEL => Err(NativeError::Sentinel(call.to_string())),
        Some(value) => Ok(value),
    }
}

/// Run one native call, turning a panic into `CallFailed`
fn guarded<T>(call: &str, f: impl FnOnce() -> NativeResult<T>) -> NativeResult<T> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|_| Err(NativeError::call_failed(call, "native layer panicked")))
}

/// Process-lifetime credential service
///
/// Construct once at startup and share by `Arc`. Secret and signature
/// lookups never fail: every native problem degrades to a documented
/// fallback. `build_hash` is the exception, see its docs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use nativekeys_core::config::FallbackConfig;
/// use nativekeys_core::native::NativeBinding;
/// use nativekeys_core::NativeSecrets;
///
/// let fallback = FallbackConfig::new("app-1", "tel-1", "sec-1").unwrap();
/// let secrets = NativeSecrets::new(Arc::new(NativeBinding::unavailable()), fallback);
///
/// assert_eq!(secrets.shared_secret(), "sec-1");
/// assert_eq!(secrets.build_hash("payload").unwrap(), "payload");
/// ```
pub struct NativeSecrets {
    binding: Arc<NativeBinding>,
    fallback: FallbackConfig,
    context: PlatformContext,
    logger: SharedLogger,
}

impl NativeSecrets {
    /// Create a service with a null platform context and no logging
    pub fn new(binding: Arc<NativeBinding>, fallback: FallbackConfig) -> Self {
        Self {
            binding,
            fallback,
            context: PlatformContext::null(),
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    pub fn builder() -> NativeSecretsBuilder {
        NativeSecretsBuilder::new()
    }

    /// Bind the native library now instead of on first use
    pub fn initialize(&self) -> &LoaderState {
        self.binding.state()
    }

    pub fn native_available(&self) -> bool {
        self.binding.native_available()
    }

    pub fn fallback(&self) -> &FallbackConfig {
        &self.fallback
    }

    /// Platform context forwarded to native calls made on the caller's behalf
    pub fn context(&self) -> PlatformContext {
        self.context
    }

    /// Resolve a secret, reporting which path produced it
    pub fn resolve_detailed(&self, kind: SecretKind) -> ResolvedSecret {
        let state = self.binding.state();

        if kind.policy() == ResolutionPolicy::StaticOnly {
            return ResolvedSecret::fallback(self.fallback.get(kind), FallbackReason::StaticPolicy);
        }

        let Some(native) = state.native() else {
            self.logger.debug(&format!("{}: native library unavailable, using fallback", kind));
            return ResolvedSecret::fallback(self.fallback.get(kind), FallbackReason::NativeUnavailable);
        };

        let response = guarded("get_key", || native.get_key(kind.key_id(), self.context))
            .and_then(|raw| interpret_key_response("get_key", raw));

        match response {
            Ok(value) => {
                self.logger.debug(&format!("{}: resolved from native library", kind));
                ResolvedSecret::native(value)
            }
            Err(e) => {
                self.logger.warn(&format!("{}: native lookup failed, using fallback: {}", kind, e));
                ResolvedSecret::fallback(self.fallback.get(kind), FallbackReason::NativeFailed(e))
            }
        }
    }

    /// Resolve a secret; never fails
    pub fn resolve(&self, kind: SecretKind) -> String {
        self.resolve_detailed(kind).value
    }

    pub fn telemetry_id(&self) -> String {
        self.resolve(SecretKind::TelemetryAppId)
    }

    pub fn service_app_id(&self) -> String {
        self.resolve(SecretKind::ServiceAppId)
    }

    pub fn shared_secret(&self) -> String {
        self.resolve(SecretKind::SharedSecret)
    }

    /// Hash `input` with the native layer
    ///
    /// Without a native library this returns `input` unchanged. That output
    /// is not a hash and carries no tamper evidence; check
    /// `native_available()` if it matters.
    ///
    /// With a native library, a failing native call is returned as `Err`
    /// rather than replaced by the identity value, so callers never mistake
    /// an unhashed payload for a hashed one.
    pub fn build_hash(&self, input: &str) -> NativeResult<String> {
        let Some(native) = self.binding.state().native() else {
            return Ok(input.to_string());
        };

        guarded("build_hash", || native.build_hash(input, self.context)).map_err(|e| {
            self.logger.error(&format!("build_hash: native call failed: {}", e));
            e
        })
    }

    /// Signing attributes of the artifact at `path`
    ///
    /// `None` when the native library is missing, the call fails, or the
    /// native result is absent or not a map. Non-string entries are dropped.
    pub fn get_signature_map(&self, path: &str, context: PlatformContext) -> Option<SignatureMap> {
        let native = self.binding.state().native()?;

        match guarded("get_signature", || native.get_signature(path, context)) {
            Ok(Some(value)) => {
                let kind = value.type_name();
                let map = normalize_signature(value);
                if map.is_none() {
                    self.logger.warn(&format!("get_signature: unexpected '{}' result for {}", kind, path));
                }
                map
            }
            Ok(None) => None,
            Err(e) => {
                self.logger.warn(&format!("get_signature: native call failed for {}: {}", path, e));
                None
            }
        }
    }

    /// Whether this build is the upstream vendor's signed application
    ///
    /// Always `false`: this library serves derivative builds only.
    pub fn is_official_application(&self) -> bool {
        false
    }
}

impl fmt::Debug for NativeSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeSecrets")
            .field("binding", &self.binding)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Builder for `NativeSecrets`
///
/// Defaults: library `security`, found via `NATIVEKEYS_LIBRARY_PATH` then
/// the system loader; fallback values from the environment and the
/// user-level YAML file; null context; no logging.
pub struct NativeSecretsBuilder {
    library: String,
    loader: Option<Arc<dyn LibraryLoader>>,
    binding: Option<Arc<NativeBinding>>,
    fallback: Option<FallbackConfig>,
    context: PlatformContext,
    logger: SharedLogger,
}

impl NativeSecretsBuilder {
    pub fn new() -> Self {
        Self {
            library: DEFAULT_LIBRARY_NAME.to_string(),
            loader: None,
            binding: None,
            fallback: None,
            context: PlatformContext::null(),
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    /// Base name of the native library
    pub fn library(mut self, name: impl Into<String>) -> Self {
        self.library = name.into();
        self
    }

    /// Directories searched before the system loader path
    pub fn search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.loader = Some(Arc::new(DynamicLibraryLoader::with_search_dirs(dirs)));
        self
    }

    pub fn loader(mut self, loader: Arc<dyn LibraryLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Use an existing binding; overrides `library` and `loader`
    pub fn binding(mut self, binding: Arc<NativeBinding>) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn fallback(mut self, fallback: FallbackConfig) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn context(mut self, context: PlatformContext) -> Self {
        self.context = context;
        self
    }

    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Build the service
    ///
    /// Fails only when no fallback was given and the default layers do not
    /// yield a complete configuration. The native library is not loaded
    /// here; that happens on first use or `initialize()`.
    pub fn build(self) -> ConfigResult<NativeSecrets> {
        let fallback = match self.fallback {
            Some(fallback) => fallback,
            None => FallbackConfig::loader().with_default_sources()?.load()?,
        };

        let binding = self.binding.unwrap_or_else(|| {
            let loader = self
                .loader
                .unwrap_or_else(|| Arc::new(DynamicLibraryLoader::from_env()));
            Arc::new(NativeBinding::new(self.library, loader))
        });

        Ok(NativeSecrets {
            binding,
            fallback,
            context: self.context,
            logger: self.logger,
        })
    }
}

impl Default for NativeSecretsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{MockHashMode, MockLibraryLoader, MockNativeLayer, NativeValue};
    use std::ffi::c_void;

    const SHARED: i32 = 0xC100_0003u32 as i32;

    fn fallback() -> FallbackConfig {
        FallbackConfig::new("app-1", "tel-1", "sec-1").unwrap()
    }

    fn with_native(mock: MockNativeLayer) -> (NativeSecrets, Arc<MockNativeLayer>) {
        let mock = Arc::new(mock);
        let binding = NativeBinding::from_layer(mock.clone());
        (NativeSecrets::new(Arc::new(binding), fallback()), mock)
    }

    struct PanickingLayer;

    impl crate::native::NativeLayer for PanickingLayer {
        fn get_key(&self, _key_id: i32, _context: PlatformContext) -> NativeResult<Option<String>> {
            panic!("get_key blew up")
        }

        fn build_hash(&self, _input: &str, _context: PlatformContext) -> NativeResult<String> {
            panic!("build_hash blew up")
        }

        fn get_signature(&self, _path: &str, _context: PlatformContext) -> NativeResult<Option<NativeValue>> {
            panic!("get_signature blew up")
        }
    }

    fn with_failed_load() -> (NativeSecrets, Arc<MockLibraryLoader>) {
        let loader = Arc::new(MockLibraryLoader::failing(NativeError::load_failed("security", "missing")));
        let secrets = NativeSecrets::builder()
            .loader(loader.clone())
            .fallback(fallback())
            .build()
            .unwrap();
        (secrets, loader)
    }

    #[test]
    fn test_unavailable_returns_fallbacks_without_native_calls() {
        let (secrets, loader) = with_failed_load();

        for kind in SecretKind::ALL {
            assert_eq!(secrets.resolve(kind), secrets.fallback().get(kind));
        }
        assert_eq!(
            secrets.resolve_detailed(SecretKind::SharedSecret).source,
            SecretSource::Fallback(FallbackReason::NativeUnavailable)
        );
        assert!(secrets.initialize().native().is_none());
        assert_eq!(loader.load_count(), 1);
    }

    #[test]
    fn test_native_secret_passes_through() {
        let (secrets, mock) = with_native(MockNativeLayer::new().with_key(SHARED, "native-secret"));

        let resolved = secrets.resolve_detailed(SecretKind::SharedSecret);
        assert_eq!(resolved.value, "native-secret");
        assert!(resolved.is_native());
        assert_eq!(mock.get_key_calls(), 1);
    }

    #[test]
    fn test_whitespace_native_value_is_not_trimmed() {
        let (secrets, _) = with_native(MockNativeLayer::new().with_key(SHARED, "  "));
        assert_eq!(secrets.shared_secret(), "  ");

        let (secrets, _) = with_native(MockNativeLayer::new().with_key(SHARED, " tok "));
        assert_eq!(secrets.shared_secret(), " tok ");
    }

    #[test]
    fn test_sentinel_empty_and_null_fall_back() {
        let cases = [
            (Ok(Some("error".to_string())), NativeError::Sentinel("get_key".into())),
            (Ok(Some(String::new())), NativeError::EmptyResult("get_key".into())),
            (Ok(None), NativeError::NullResult("get_key".into())),
        ];

        for (response, expected) in cases {
            let (secrets, _) = with_native(MockNativeLayer::new().with_key_response(SHARED, response));
            let resolved = secrets.resolve_detailed(SecretKind::SharedSecret);
            assert_eq!(resolved.value, "sec-1");
            assert_eq!(
                resolved.source,
                SecretSource::Fallback(FallbackReason::NativeFailed(expected))
            );
        }
    }

    #[test]
    fn test_sentinel_is_case_sensitive() {
        let (secrets, _) = with_native(MockNativeLayer::new().with_key(SHARED, "ERROR"));
        assert_eq!(secrets.shared_secret(), "ERROR");

        let (secrets, _) = with_native(MockNativeLayer::new().with_key(SHARED, "error "));
        assert_eq!(secrets.shared_secret(), "error ");
    }

    #[test]
    fn test_native_call_error_falls_back() {
        let (secrets, _) = with_native(
            MockNativeLayer::new().with_key_response(SHARED, Err(NativeError::call_failed("get_key", "jni exception"))),
        );
        assert_eq!(secrets.shared_secret(), "sec-1");
    }

    #[test]
    fn test_static_kinds_never_call_native() {
        let (secrets, mock) = with_native(
            MockNativeLayer::new()
                .with_key(SecretKind::ServiceAppId.key_id(), "native-app")
                .with_key(SecretKind::TelemetryAppId.key_id(), "native-tel"),
        );

        assert_eq!(secrets.service_app_id(), "app-1");
        assert_eq!(secrets.telemetry_id(), "tel-1");
        assert_eq!(
            secrets.resolve_detailed(SecretKind::ServiceAppId).source,
            SecretSource::Fallback(FallbackReason::StaticPolicy)
        );
        assert_eq!(mock.get_key_calls(), 0);
    }

    #[test]
    fn test_official_flag_is_always_false() {
        let (secrets, _) = with_native(MockNativeLayer::new());
        assert!(!secrets.is_official_application());

        let (secrets, _) = with_failed_load();
        assert!(!secrets.is_official_application());
    }

    #[test]
    fn test_build_hash_identity_when_unavailable() {
        let (secrets, _) = with_failed_load();
        assert_eq!(secrets.build_hash("x").unwrap(), "x");
        assert_eq!(secrets.build_hash("").unwrap(), "");
    }

    #[test]
    fn test_build_hash_native() {
        let (secrets, mock) = with_native(MockNativeLayer::new());
        assert_eq!(secrets.build_hash("payload").unwrap(), "hash:payload");
        assert_eq!(mock.build_hash_calls(), 1);
    }

    #[test]
    fn test_build_hash_native_failure_propagates() {
        let (secrets, _) = with_native(
            MockNativeLayer::new().with_hash_mode(MockHashMode::Error(NativeError::call_failed("build_hash", "boom"))),
        );
        let err = secrets.build_hash("payload").unwrap_err();
        assert!(matches!(err, NativeError::CallFailed { .. }));
    }

    #[test]
    fn test_signature_unavailable_is_none_without_call() {
        let (secrets, loader) = with_failed_load();
        assert_eq!(secrets.get_signature_map("/data/app/base.apk", PlatformContext::null()), None);
        assert_eq!(loader.load_count(), 1);
    }

    #[test]
    fn test_signature_filters_entries() {
        let signature = NativeValue::Map(vec![
            (NativeValue::from("a"), NativeValue::from("1")),
            (NativeValue::from("b"), NativeValue::Int(2)),
            (NativeValue::Int(3), NativeValue::from("c")),
        ]);
        let (secrets, _) = with_native(MockNativeLayer::new().with_signature(Some(signature)));

        let map = secrets.get_signature_map("/app.apk", PlatformContext::null()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_signature_absent_and_malformed() {
        let (secrets, _) = with_native(MockNativeLayer::new().with_signature(None));
        assert_eq!(secrets.get_signature_map("/app.apk", PlatformContext::null()), None);

        let (secrets, _) = with_native(MockNativeLayer::new().with_signature(Some(NativeValue::from("raw"))));
        assert_eq!(secrets.get_signature_map("/app.apk", PlatformContext::null()), None);

        let (secrets, _) = with_native(
            MockNativeLayer::new().with_signature_error(NativeError::MalformedResult("truncated".into())),
        );
        assert_eq!(secrets.get_signature_map("/app.apk", PlatformContext::null()), None);

        let (secrets, _) = with_native(MockNativeLayer::new().with_signature(Some(NativeValue::Map(vec![]))));
        assert_eq!(
            secrets.get_signature_map("/app.apk", PlatformContext::null()),
            Some(SignatureMap::new())
        );
    }

    #[test]
    fn test_context_is_forwarded() {
        let mut token = 0u32;
        let ctx = PlatformContext::from_raw(&mut token as *mut u32 as *mut c_void);
        let mock = Arc::new(MockNativeLayer::new().with_key(SHARED, "s"));
        let secrets = NativeSecrets::builder()
            .binding(Arc::new(NativeBinding::from_layer(mock.clone())))
            .fallback(fallback())
            .context(ctx)
            .build()
            .unwrap();

        secrets.shared_secret();
        assert_eq!(mock.last_context(), Some(ctx));

        let other = PlatformContext::null();
        secrets.get_signature_map("/app.apk", other);
        assert_eq!(mock.last_context(), Some(other));
    }

    #[test]
    fn test_interpret_key_response() {
        assert_eq!(interpret_key_response("k", Some("v".into())), Ok("v".to_string()));
        assert_eq!(
            interpret_key_response("k", Some("error".into())),
            Err(NativeError::Sentinel("k".into()))
        );
        assert_eq!(
            interpret_key_response("k", None),
            Err(NativeError::NullResult("k".into()))
        );
    }

    #[test]
    fn test_unavailable_scenario() {
        let secrets = NativeSecrets::builder()
            .binding(Arc::new(NativeBinding::unavailable()))
            .fallback(FallbackConfig::new("app-1", "tel-1", "sec-1").unwrap())
            .build()
            .unwrap();

        assert_eq!(secrets.service_app_id(), "app-1");
        assert_eq!(secrets.telemetry_id(), "tel-1");
        assert_eq!(secrets.shared_secret(), "sec-1");
        assert_eq!(secrets.build_hash("payload").unwrap(), "payload");
        assert_eq!(secrets.get_signature_map("/any/path", PlatformContext::null()), None);
        assert!(!secrets.is_official_application());
    }

    #[test]
    fn test_concurrent_callers_share_one_load() {
        use std::sync::Barrier;
        use std::thread;

        let mock = Arc::new(MockNativeLayer::new().with_key(SHARED, "native-secret"));
        let loader = Arc::new(MockLibraryLoader::succeeding(mock.clone()));
        let secrets = Arc::new(
            NativeSecrets::builder()
                .loader(loader.clone())
                .fallback(fallback())
                .build()
                .unwrap(),
        );
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let secrets = Arc::clone(&secrets);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    secrets.shared_secret()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "native-secret");
        }
        assert_eq!(loader.load_count(), 1);
        assert_eq!(mock.get_key_calls(), 8);
    }

    #[test]
    fn test_builder_defers_loading() {
        let loader = Arc::new(MockLibraryLoader::succeeding(Arc::new(MockNativeLayer::new())));
        let secrets = NativeSecrets::builder()
            .library("customsec")
            .loader(loader.clone())
            .fallback(fallback())
            .build()
            .unwrap();

        assert_eq!(loader.load_count(), 0);
        assert!(secrets.initialize().native_available());
        assert!(secrets.native_available());
        assert_eq!(loader.load_count(), 1);
        assert_eq!(loader.requested_names(), vec!["customsec".to_string()]);
    }

    #[test]
    fn test_panicking_native_layer_degrades() {
        let binding = NativeBinding::from_layer(Arc::new(PanickingLayer));
        let secrets = NativeSecrets::new(Arc::new(binding), fallback());

        let resolved = secrets.resolve_detailed(SecretKind::SharedSecret);
        assert_eq!(resolved.value, "sec-1");
        assert_eq!(
            resolved.source,
            SecretSource::Fallback(FallbackReason::NativeFailed(NativeError::call_failed(
                "get_key",
                "native layer panicked"
            )))
        );
        assert_eq!(secrets.shared_secret(), "sec-1");
        assert_eq!(secrets.get_signature_map("/data/app/base.apk", PlatformContext::null()), None);
        assert!(matches!(
            secrets.build_hash("payload"),
            Err(NativeError::CallFailed { ref call, .. }) if call == "build_hash"
        ));
    }
}
