//! nativekeys Core
//!
//! Native credential resolution with static fallback.
//! Application secrets, hashes and signature fingerprints come from a native
//! security library when it is present, and from static configuration when
//! it is not. Usable from any host (Python via PyO3, native services, etc.)
//!
//! ## Resolution
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nativekeys_core::{NativeSecrets, PlatformContext};
//!
//! // Library "security" from NATIVEKEYS_LIBRARY_PATH or the system path,
//! // fallbacks from NATIVEKEYS_* env vars and ~/.config/nativekeys/fallback.yaml
//! let secrets = Arc::new(NativeSecrets::builder().build()?);
//!
//! let app_id = secrets.service_app_id();
//! let hash = secrets.build_hash(&format!("{}{}", app_id, "payload"))?;
//! let signature = secrets.get_signature_map("/data/app/base.apk", PlatformContext::null());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod native;
pub mod resolver;

// Re-export commonly used types
pub use types::{SecretKind, ResolutionPolicy};

pub use logging::{Logger, SharedLogger, NoOpLogger, ConsoleLogger};

pub use config::{
    FallbackConfig, FallbackConfigLoader, FallbackSource, ConfigError, ConfigResult,
    MemoryFallbackSource, EnvFallbackSource, FileFallbackSource,
};

pub use native::{
    NativeLayer, LibraryLoader, PlatformContext, NativeError, NativeResult, NativeValue,
    NativeBinding, LoaderState, DynamicLibrary, DynamicLibraryLoader,
};

pub use resolver::{
    NativeSecrets, NativeSecretsBuilder, ResolvedSecret, SecretSource, FallbackReason,
    SignatureMap, normalize_signature, install_global, global,
};
