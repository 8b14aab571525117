//! Static fallback configuration
//!
//! Fallback values are layered from multiple sources:
//! - `MemoryFallbackSource`: explicit values
//! - `EnvFallbackSource`: `NATIVEKEYS_*` environment variables
//! - `FileFallbackSource`: YAML file (user level or explicit path)
//!
//! `FallbackConfigLoader` merges the layers into a validated `FallbackConfig`.

mod traits;
mod memory;
mod env;
mod file;
mod fallback;

pub use traits::{FallbackSource, ConfigError, ConfigResult};
pub use memory::MemoryFallbackSource;
pub use env::{EnvFallbackSource, DEBUG_BUILD_ENV};
pub use file::{FileFallbackSource, FallbackFile};
pub use fallback::{
    FallbackConfig, FallbackConfigLoader, TelemetryStatus, TelemetrySource, DEBUG_TELEMETRY_ID,
};
