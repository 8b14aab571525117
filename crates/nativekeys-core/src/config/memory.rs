//! In-memory fallback source

use std::collections::HashMap;

use super::traits::FallbackSource;
use crate::types::SecretKind;

/// Fallback values held in memory
///
/// Useful for hosts that inject secrets at build time, and for testing.
///
/// # Example
///
/// ```
/// use nativekeys_core::config::{FallbackSource, MemoryFallbackSource};
/// use nativekeys_core::SecretKind;
///
/// let source = MemoryFallbackSource::new()
///     .with(SecretKind::ServiceAppId, "app-1")
///     .with_debug_mode(true);
/// assert_eq!(source.get(SecretKind::ServiceAppId), Some("app-1".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFallbackSource {
    values: HashMap<SecretKind, String>,
    debug_mode: Option<bool>,
}

impl MemoryFallbackSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source with all three values set
    pub fn with_values(
        service_app_id: impl Into<String>,
        telemetry_app_id: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> Self {
        Self::new()
            .with(SecretKind::ServiceAppId, service_app_id)
            .with(SecretKind::TelemetryAppId, telemetry_app_id)
            .with(SecretKind::SharedSecret, shared_secret)
    }

    /// Set the value for one kind
    pub fn with(mut self, kind: SecretKind, value: impl Into<String>) -> Self {
        self.values.insert(kind, value.into());
        self
    }

    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = Some(debug);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FallbackSource for MemoryFallbackSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, kind: SecretKind) -> Option<String> {
        self.values.get(&kind).cloned()
    }

    fn debug_mode(&self) -> Option<bool> {
        self.debug_mode
    }
}
