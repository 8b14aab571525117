//! Environment variable fallback source

use std::env;

use super::traits::FallbackSource;
use crate::types::SecretKind;

/// Environment variable that marks a debug build
pub const DEBUG_BUILD_ENV: &str = "NATIVEKEYS_DEBUG_BUILD";

/// Fallback source that reads `NATIVEKEYS_*` environment variables
///
/// - `ServiceAppId` → `NATIVEKEYS_SERVICE_APP_ID`
/// - `TelemetryAppId` → `NATIVEKEYS_TELEMETRY_APP_ID`
/// - `SharedSecret` → `NATIVEKEYS_SHARED_SECRET`
///
/// Variables are read on every call, so the source always reflects the
/// current process environment.
#[derive(Debug, Default)]
pub struct EnvFallbackSource {
    _private: (),
}

impl EnvFallbackSource {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl FallbackSource for EnvFallbackSource {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, kind: SecretKind) -> Option<String> {
        env::var(kind.env_var()).ok().filter(|v| !v.is_empty())
    }

    fn debug_mode(&self) -> Option<bool> {
        env::var(DEBUG_BUILD_ENV)
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_source_name() {
        assert_eq!(EnvFallbackSource::new().name(), "env");
    }

    #[test]
    fn test_env_source_reads_variables() {
        env::set_var("NATIVEKEYS_SHARED_SECRET", "from-env");
        env::set_var("NATIVEKEYS_SERVICE_APP_ID", "");

        let source = EnvFallbackSource::new();
        assert_eq!(source.get(SecretKind::SharedSecret), Some("from-env".to_string()));
        assert_eq!(source.get(SecretKind::ServiceAppId), None);

        env::remove_var("NATIVEKEYS_SHARED_SECRET");
        env::remove_var("NATIVEKEYS_SERVICE_APP_ID");
        assert_eq!(source.get(SecretKind::SharedSecret), None);
    }
}
