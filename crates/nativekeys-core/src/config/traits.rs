//! Fallback configuration source trait

use crate::types::SecretKind;

/// A layer of static fallback values
///
/// Implementations:
/// - `MemoryFallbackSource`: explicit values, for hosts and tests
/// - `EnvFallbackSource`: `NATIVEKEYS_*` environment variables
/// - `FileFallbackSource`: YAML file (~/.config/nativekeys/fallback.yaml)
///
/// Sources return raw values; placeholder filtering happens when layers are
/// merged by `FallbackConfigLoader`.
pub trait FallbackSource: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Raw value for a secret kind, if this layer sets one
    fn get(&self, kind: SecretKind) -> Option<String>;

    /// Whether this layer marks the build as a debug build
    fn debug_mode(&self) -> Option<bool> {
        None
    }
}

/// Errors that can occur while loading fallback configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No fallback value configured for {0}")]
    MissingValue(SecretKind),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
