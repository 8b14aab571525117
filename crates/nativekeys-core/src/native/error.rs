//! Native boundary error types

use thiserror::Error;

/// Errors that can occur at the native library boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    /// The native library was never bound for this process
    #[error("Native library is not available")]
    Unavailable,

    /// The dynamic loader rejected the library
    #[error("Failed to load native library '{library}': {message}")]
    LoadFailed { library: String, message: String },

    /// The library loaded but does not export a required symbol
    #[error("Native library '{library}' is missing symbol '{symbol}'")]
    MissingSymbol { library: String, symbol: String },

    /// The native call itself reported a failure
    #[error("Native call '{call}' failed: {message}")]
    CallFailed { call: String, message: String },

    /// The native call returned the sentinel failure string
    #[error("Native call '{0}' returned the failure sentinel")]
    Sentinel(String),

    /// The native call returned an empty string
    #[error("Native call '{0}' returned an empty result")]
    EmptyResult(String),

    /// The native call returned nothing where a value was required
    #[error("Native call '{0}' returned null")]
    NullResult(String),

    /// A native string was not valid UTF-8
    #[error("Native call '{0}' returned invalid UTF-8")]
    InvalidUtf8(String),

    /// An argument could not be passed as a C string
    #[error("Argument for native call '{0}' contains an interior NUL byte")]
    InteriorNul(String),

    /// The native payload did not match the expected schema
    #[error("Malformed native result: {0}")]
    MalformedResult(String),
}

impl NativeError {
    /// Create a load failure error
    pub fn load_failed(library: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LoadFailed {
            library: library.into(),
            message: message.into(),
        }
    }

    /// Create a missing symbol error
    pub fn missing_symbol(library: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self::MissingSymbol {
            library: library.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a call failure error
    pub fn call_failed(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the library could not be bound at all
    pub fn is_binding_failure(&self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::LoadFailed { .. } | Self::MissingSymbol { .. }
        )
    }
}

impl From<serde_json::Error> for NativeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResult(err.to_string())
    }
}

pub type NativeResult<T> = Result<T, NativeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_failures() {
        assert!(NativeError::Unavailable.is_binding_failure());
        assert!(NativeError::load_failed("security", "not found").is_binding_failure());
        assert!(NativeError::missing_symbol("security", "nk_get_key").is_binding_failure());
        assert!(!NativeError::Sentinel("get_key".into()).is_binding_failure());
        assert!(!NativeError::call_failed("build_hash", "boom").is_binding_failure());
    }

    #[test]
    fn test_error_messages() {
        let err = NativeError::missing_symbol("security", "nk_build_hash");
        assert_eq!(
            err.to_string(),
            "Native library 'security' is missing symbol 'nk_build_hash'"
        );

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(NativeError::from(json_err), NativeError::MalformedResult(_)));
    }
}
