//! # helm-settings
//!
//! Layered configuration for the helm console.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`HelmSettings::default()`]
//! 2. **User file**: `~/.helm/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `HELM_*` overrides (highest priority)
//!
//! The global singleton is reloadable: after new values are written to
//! disk, [`reload_settings_from_path`] swaps the cached value so all
//! subsequent [`get_settings`] calls return fresh data.
//!
//! # Usage
//!
//! ```no_run
//! use helm_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("events stream: {}", settings.backend.events_url);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::path::Path;
use std::sync::{Arc, RwLock};

/// Global settings singleton.
///
/// Uses `RwLock<Option<Arc<HelmSettings>>>` instead of `OnceLock` so the
/// cached value can be swapped on reload. Reads are cheap (shared lock +
/// `Arc::clone`); writes only happen on reload, which is rare.
static SETTINGS: RwLock<Option<Arc<HelmSettings>>> = RwLock::new(None);

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.helm/settings.json` with env
/// var overrides; loading failures fall back to compiled defaults.
/// Returns an `Arc` so callers hold a consistent snapshot even if
/// another thread reloads concurrently.
pub fn get_settings() -> Arc<HelmSettings> {
    {
        let guard = SETTINGS.read().expect("settings lock poisoned");
        if let Some(ref s) = *guard {
            return Arc::clone(s);
        }
    }

    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    // Another thread may have initialized while we waited for the lock.
    if let Some(ref s) = *guard {
        return Arc::clone(s);
    }

    let settings = Arc::new(match load_settings() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            HelmSettings::default()
        }
    });
    *guard = Some(Arc::clone(&settings));
    settings
}

/// Replace the global settings with a specific value.
///
/// Useful for tests and startup paths where the configuration is already
/// resolved.
pub fn init_settings(settings: HelmSettings) {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(Arc::new(settings));
}

/// Reload settings from a specific file path and swap the global cache.
pub fn reload_settings_from_path(path: &Path) {
    let new = Arc::new(match load_settings_from_path(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, ?path, "failed to reload settings, falling back to defaults");
            HelmSettings::default()
        }
    });
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = Some(new);
    tracing::info!(?path, "settings reloaded from disk");
}

/// Reset the global settings cache (test-only).
#[cfg(test)]
pub(crate) fn reset_settings() {
    let mut guard = SETTINGS.write().expect("settings lock poisoned");
    *guard = None;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
