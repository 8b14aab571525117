//! Python bindings for nativekeys via PyO3

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use nativekeys_core::config::{
    FallbackConfig as CoreFallbackConfig, MemoryFallbackSource, TelemetrySource,
    TelemetryStatus as CoreTelemetryStatus,
};
use nativekeys_core::{
    NativeSecrets as CoreNativeSecrets, PlatformContext, SecretKind, SecretSource,
};

fn parse_kind(kind: &str) -> PyResult<SecretKind> {
    SecretKind::parse(kind).ok_or_else(|| {
        PyValueError::new_err(format!(
            "Unknown secret kind '{}' (expected service_app_id, telemetry_app_id or shared_secret)",
            kind
        ))
    })
}

// ============================================================================
// Telemetry Status
// ============================================================================

#[pyclass]
#[derive(Clone)]
pub struct TelemetryStatus {
    #[pyo3(get)]
    pub initialized: bool,
    #[pyo3(get)]
    pub app_id: String,
    #[pyo3(get)]
    pub debug_mode: bool,
    #[pyo3(get)]
    pub source: String,
}

#[pymethods]
impl TelemetryStatus {
    fn __repr__(&self) -> String {
        format!(
            "TelemetryStatus(initialized={}, debug_mode={}, source='{}')",
            self.initialized, self.debug_mode, self.source
        )
    }
}

impl From<CoreTelemetryStatus> for TelemetryStatus {
    fn from(status: CoreTelemetryStatus) -> Self {
        let source = match status.source {
            TelemetrySource::Injected(layer) => format!("injected:{}", layer),
            TelemetrySource::DebugMode => "debug".to_string(),
        };
        Self {
            initialized: status.initialized,
            app_id: status.app_id,
            debug_mode: status.debug_mode,
            source,
        }
    }
}

// ============================================================================
// NativeSecrets
// ============================================================================

/// Credential service backed by the native security library
///
/// Explicit fallback values take priority over NATIVEKEYS_* environment
/// variables and ~/.config/nativekeys/fallback.yaml.
#[pyclass]
pub struct NativeSecrets {
    inner: Arc<CoreNativeSecrets>,
}

#[pymethods]
impl NativeSecrets {
    #[new]
    #[pyo3(signature = (service_app_id=None, telemetry_app_id=None, shared_secret=None, library=None, search_dir=None, debug=None))]
    pub fn new(
        service_app_id: Option<String>,
        telemetry_app_id: Option<String>,
        shared_secret: Option<String>,
        library: Option<String>,
        search_dir: Option<PathBuf>,
        debug: Option<bool>,
    ) -> PyResult<Self> {
        let mut explicit = MemoryFallbackSource::new();
        for (kind, value) in [
            (SecretKind::ServiceAppId, service_app_id),
            (SecretKind::TelemetryAppId, telemetry_app_id),
            (SecretKind::SharedSecret, shared_secret),
        ] {
            if let Some(value) = value {
                explicit = explicit.with(kind, value);
            }
        }

        let mut loader = CoreFallbackConfig::loader()
            .with_source(explicit)
            .with_default_sources()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        if let Some(debug) = debug {
            loader = loader.debug_mode(debug);
        }
        let fallback = loader.load().map_err(|e| PyValueError::new_err(e.to_string()))?;

        let mut builder = CoreNativeSecrets::builder().fallback(fallback);
        if let Some(library) = library {
            builder = builder.library(library);
        }
        if let Some(dir) = search_dir {
            builder = builder.search_dirs(vec![dir]);
        }
        let inner = builder.build().map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { inner: Arc::new(inner) })
    }

    pub fn native_available(&self) -> bool {
        self.inner.native_available()
    }

    pub fn telemetry_id(&self) -> String {
        self.inner.telemetry_id()
    }

    pub fn service_app_id(&self) -> String {
        self.inner.service_app_id()
    }

    pub fn shared_secret(&self) -> String {
        self.inner.shared_secret()
    }

    /// Resolve a secret by kind name, returning (value, source)
    pub fn resolve(&self, kind: &str) -> PyResult<(String, String)> {
        let resolved = self.inner.resolve_detailed(parse_kind(kind)?);
        let source = match resolved.source {
            SecretSource::Native => "native".to_string(),
            SecretSource::Fallback(reason) => format!("fallback:{:?}", reason),
        };
        Ok((resolved.value, source))
    }

    /// Hash via the native library; identity when it is unavailable
    pub fn build_hash(&self, input: &str) -> PyResult<String> {
        self.inner
            .build_hash(input)
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    pub fn get_signature_map(&self, path: &str) -> Option<HashMap<String, String>> {
        self.inner.get_signature_map(path, PlatformContext::null())
    }

    pub fn is_official_application(&self) -> bool {
        self.inner.is_official_application()
    }

    pub fn telemetry_status(&self) -> TelemetryStatus {
        self.inner.fallback().telemetry_status().into()
    }

    fn __repr__(&self) -> String {
        format!("NativeSecrets(native_available={})", self.inner.native_available())
    }
}

// ============================================================================
// Module Definition
// ============================================================================

#[pymodule]
fn nativekeys(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<NativeSecrets>()?;
    m.add_class::<TelemetryStatus>()?;
    Ok(())
}
