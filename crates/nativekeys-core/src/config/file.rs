//! File-based fallback source (YAML)
//!
//! User-level file lives at ~/.config/nativekeys/fallback.yaml; hosts may
//! point at any other path.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::traits::{ConfigResult, FallbackSource};
use crate::types::SecretKind;

/// Fallback file structure
///
/// ```yaml
/// service_app_id: app-1
/// telemetry_app_id: tel-1
/// shared_secret: sec-1
/// debug: false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FallbackFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry_app_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,

    /// Debug builds get a non-reporting telemetry id when none is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl FallbackFile {
    pub fn get(&self, kind: SecretKind) -> Option<&str> {
        match kind {
            SecretKind::ServiceAppId => self.service_app_id.as_deref(),
            SecretKind::TelemetryAppId => self.telemetry_app_id.as_deref(),
            SecretKind::SharedSecret => self.shared_secret.as_deref(),
        }
    }
}

/// Fallback source backed by a YAML file
///
/// The file is read once when the source is opened. A missing file is not an
/// error and yields an empty layer; a malformed one is.
///
/// # Example
///
/// ```no_run
/// use nativekeys_core::config::FileFallbackSource;
///
/// let user = FileFallbackSource::user().unwrap();
/// let custom = FileFallbackSource::open("/etc/myapp/fallback.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileFallbackSource {
    path: PathBuf,
    contents: FallbackFile,
}

impl FileFallbackSource {
    /// Open the file at `path`
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let contents = Self::load(&path)?;
        Ok(Self { path, contents })
    }

    /// Open the user-level file (~/.config/nativekeys/fallback.yaml)
    pub fn user() -> ConfigResult<Self> {
        Self::open(Self::user_path())
    }

    /// Path of the user-level file
    pub fn user_path() -> PathBuf {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("nativekeys").join("fallback.yaml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &FallbackFile {
        &self.contents
    }

    /// Write `contents` to `path`, creating parent directories
    pub fn save(path: impl AsRef<Path>, contents: &FallbackFile) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(contents)?)?;
        Ok(())
    }

    fn load(path: &Path) -> ConfigResult<FallbackFile> {
        if !path.exists() {
            return Ok(FallbackFile::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(FallbackFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl FallbackSource for FileFallbackSource {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, kind: SecretKind) -> Option<String> {
        self.contents.get(kind).map(str::to_owned)
    }

    fn debug_mode(&self) -> Option<bool> {
        self.contents.debug
    }
}
