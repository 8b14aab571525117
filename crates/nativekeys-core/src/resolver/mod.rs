//! Credential resolution
//!
//! `NativeSecrets` is the single entry point: it resolves secrets, hashes
//! and signatures from the native library, falling back to static
//! configuration when the library is missing or misbehaves.

mod secret_resolver;
mod signature;
mod registry;

pub use secret_resolver::{
    NativeSecrets, NativeSecretsBuilder, ResolvedSecret, SecretSource, FallbackReason,
    interpret_key_response, NATIVE_ERROR_SENTINEL,
};
pub use signature::{SignatureMap, normalize_signature};
pub use registry::{install_global, global};
