//! Process-wide `NativeSecrets` handle
//!
//! Hosts that cannot thread an `Arc<NativeSecrets>` through to every consumer
//! install one instance at startup; consumers look it up here.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::secret_resolver::NativeSecrets;
use crate::logging::file_logger as log;

static GLOBAL: OnceCell<Arc<NativeSecrets>> = OnceCell::new();

/// Install the process-wide instance
///
/// The first install wins; later calls leave it in place and return `false`.
pub fn install_global(secrets: Arc<NativeSecrets>) -> bool {
    let installed = GLOBAL.set(secrets).is_ok();
    if !installed {
        log::warn("registry", "NativeSecrets already installed, ignoring replacement");
    }
    installed
}

/// The process-wide instance, if one has been installed
pub fn global() -> Option<Arc<NativeSecrets>> {
    GLOBAL.get().cloned()
}
