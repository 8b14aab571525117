//! Logical secrets and how each one is resolved

use serde::{Deserialize, Serialize};

/// A logical secret the application can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretKind {
    /// Identifier of the third-party service the application talks to
    ServiceAppId,
    /// Identifier of the crash/telemetry reporter
    TelemetryAppId,
    /// Signing secret shared with the backend
    SharedSecret,
}

/// Where a secret of a given kind is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Static configuration is authoritative; native code is never consulted
    StaticOnly,
    /// Ask native code first, fall back to static configuration
    NativeFirst,
}

impl SecretKind {
    /// Every secret kind, in declaration order
    pub const ALL: [SecretKind; 3] = [
        SecretKind::ServiceAppId,
        SecretKind::TelemetryAppId,
        SecretKind::SharedSecret,
    ];

    /// Key id understood by the native `get_key` call
    pub fn key_id(&self) -> i32 {
        let raw: u32 = match self {
            SecretKind::ServiceAppId => 0xC100_0001,
            SecretKind::TelemetryAppId => 0xC100_0002,
            SecretKind::SharedSecret => 0xC100_0003,
        };
        raw as i32
    }

    pub fn policy(&self) -> ResolutionPolicy {
        match self {
            SecretKind::ServiceAppId | SecretKind::TelemetryAppId => ResolutionPolicy::StaticOnly,
            SecretKind::SharedSecret => ResolutionPolicy::NativeFirst,
        }
    }

    /// Configuration field name
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretKind::ServiceAppId => "service_app_id",
            SecretKind::TelemetryAppId => "telemetry_app_id",
            SecretKind::SharedSecret => "shared_secret",
        }
    }

    /// Parse a configuration field name
    pub fn parse(name: &str) -> Option<Self> {
        SecretKind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Environment variable that overrides the static value
    pub fn env_var(&self) -> &'static str {
        match self {
            SecretKind::ServiceAppId => "NATIVEKEYS_SERVICE_APP_ID",
            SecretKind::TelemetryAppId => "NATIVEKEYS_TELEMETRY_APP_ID",
            SecretKind::SharedSecret => "NATIVEKEYS_SHARED_SECRET",
        }
    }

    /// Value injected by builds that were never given a real secret
    pub fn placeholder(&self) -> &'static str {
        match self {
            SecretKind::ServiceAppId => "DEFAULT_SERVICE_APP_ID",
            SecretKind::TelemetryAppId => "DEFAULT_TELEMETRY_APP_ID",
            SecretKind::SharedSecret => "DEFAULT_SHARED_SECRET",
        }
    }

    /// Whether `value` counts as "not configured" for this kind
    pub fn is_unset(&self, value: &str) -> bool {
        value.is_empty() || value == self.placeholder()
    }
}

impl std::fmt::Display for SecretKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
