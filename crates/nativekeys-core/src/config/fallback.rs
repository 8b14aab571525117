//! Static fallback values and their layered loading

use std::sync::Arc;

use super::env::EnvFallbackSource;
use super::file::FileFallbackSource;
use super::traits::{ConfigError, ConfigResult, FallbackSource};
use crate::logging::file_logger as log;
use crate::types::SecretKind;

/// Telemetry id used by debug builds that were given none; it never reports
pub const DEBUG_TELEMETRY_ID: &str = "test_debug_id";

/// Where the telemetry id came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetrySource {
    /// Supplied by a configuration layer (named)
    Injected(String),
    /// Substituted because this is a debug build
    DebugMode,
}

/// Snapshot of the telemetry configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryStatus {
    pub initialized: bool,
    pub app_id: String,
    pub debug_mode: bool,
    pub source: TelemetrySource,
}

/// Validated static fallback values
///
/// Every value is non-empty and never a build placeholder; construction
/// fails otherwise. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackConfig {
    service_app_id: String,
    telemetry_app_id: String,
    shared_secret: String,
    debug_mode: bool,
    telemetry_source: TelemetrySource,
}

impl FallbackConfig {
    /// Build a config from explicit values
    pub fn new(
        service_app_id: impl Into<String>,
        telemetry_app_id: impl Into<String>,
        shared_secret: impl Into<String>,
    ) -> ConfigResult<Self> {
        let config = Self {
            service_app_id: service_app_id.into(),
            telemetry_app_id: telemetry_app_id.into(),
            shared_secret: shared_secret.into(),
            debug_mode: false,
            telemetry_source: TelemetrySource::Injected("explicit".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Start a layered loader
    pub fn loader() -> FallbackConfigLoader {
        FallbackConfigLoader::new()
    }

    /// Static value for a secret kind
    pub fn get(&self, kind: SecretKind) -> &str {
        match kind {
            SecretKind::ServiceAppId => &self.service_app_id,
            SecretKind::TelemetryAppId => &self.telemetry_app_id,
            SecretKind::SharedSecret => &self.shared_secret,
        }
    }

    pub fn service_app_id(&self) -> &str {
        &self.service_app_id
    }

    pub fn telemetry_app_id(&self) -> &str {
        &self.telemetry_app_id
    }

    pub fn shared_secret(&self) -> &str {
        &self.shared_secret
    }

    pub fn is_debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Whether a real telemetry id is configured
    pub fn is_configured(&self) -> bool {
        !self.telemetry_app_id.is_empty() && self.telemetry_app_id != DEBUG_TELEMETRY_ID
    }

    pub fn telemetry_status(&self) -> TelemetryStatus {
        TelemetryStatus {
            initialized: !self.telemetry_app_id.is_empty(),
            app_id: self.telemetry_app_id.clone(),
            debug_mode: self.debug_mode,
            source: self.telemetry_source.clone(),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        for kind in SecretKind::ALL {
            if kind.is_unset(self.get(kind)) {
                return Err(ConfigError::MissingValue(kind));
            }
        }
        Ok(())
    }
}

/// Merges fallback sources into a `FallbackConfig`
///
/// Sources are consulted in the order they were added; the first one with a
/// usable value for a kind wins. Empty strings and build placeholders
/// (`DEFAULT_SHARED_SECRET`, ...) are skipped.
///
/// # Example
///
/// ```
/// use nativekeys_core::config::{FallbackConfig, MemoryFallbackSource};
///
/// let config = FallbackConfig::loader()
///     .with_source(MemoryFallbackSource::with_values("app-1", "tel-1", "sec-1"))
///     .load()
///     .unwrap();
/// assert_eq!(config.shared_secret(), "sec-1");
/// ```
#[derive(Default)]
pub struct FallbackConfigLoader {
    sources: Vec<Arc<dyn FallbackSource>>,
    debug_mode: Option<bool>,
}

impl FallbackConfigLoader {
    /// A loader with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source (lower priority than those already added)
    pub fn with_source(mut self, source: impl FallbackSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Append a shared source
    pub fn with_shared_source(mut self, source: Arc<dyn FallbackSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Append the standard layers: environment, then the user-level file
    pub fn with_default_sources(self) -> ConfigResult<Self> {
        let file = FileFallbackSource::user()?;
        Ok(self.with_source(EnvFallbackSource::new()).with_source(file))
    }

    /// Force debug mode on or off regardless of what sources say
    pub fn debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = Some(debug);
        self
    }

    /// Names of the configured sources, highest priority first
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Merge all layers and validate the result
    pub fn load(&self) -> ConfigResult<FallbackConfig> {
        let debug_mode = self
            .debug_mode
            .or_else(|| self.sources.iter().find_map(|s| s.debug_mode()))
            .unwrap_or(false);

        let service_app_id = self.first_value(SecretKind::ServiceAppId);
        let shared_secret = self.first_value(SecretKind::SharedSecret);

        let (telemetry_app_id, telemetry_source) = match self.first_value(SecretKind::TelemetryAppId) {
            Some((value, source)) => (value, TelemetrySource::Injected(source)),
            None if debug_mode => (DEBUG_TELEMETRY_ID.to_string(), TelemetrySource::DebugMode),
            None => return Err(ConfigError::MissingValue(SecretKind::TelemetryAppId)),
        };

        let (service_app_id, _) = service_app_id.ok_or(ConfigError::MissingValue(SecretKind::ServiceAppId))?;
        let (shared_secret, _) = shared_secret.ok_or(ConfigError::MissingValue(SecretKind::SharedSecret))?;

        let config = FallbackConfig {
            service_app_id,
            telemetry_app_id,
            shared_secret,
            debug_mode,
            telemetry_source,
        };
        config.validate()?;

        log::debug(
            "FallbackConfigLoader",
            &format!(
                "Loaded fallback config from {:?} (debug_mode={})",
                self.source_names(),
                debug_mode
            ),
        );
        Ok(config)
    }

    fn first_value(&self, kind: SecretKind) -> Option<(String, String)> {
        self.sources.iter().find_map(|source| {
            source
                .get(kind)
                .filter(|value| !kind.is_unset(value))
                .map(|value| (value, source.name().to_string()))
        })
    }
}
