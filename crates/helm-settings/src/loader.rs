//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`HelmSettings::default()`]
//! 2. If `~/.helm/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `HELM_*` environment overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::HelmSettings;

/// Resolve the path to the settings file (`~/.helm/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".helm").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<HelmSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file is not an error (defaults are used); invalid JSON is.
pub fn load_settings_from_path(path: &Path) -> Result<HelmSettings> {
    let defaults = serde_json::to_value(HelmSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: HelmSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Parsing is strict: integers must be valid and in range, otherwise the
/// variable is silently ignored and the file/default value stands.
pub fn apply_env_overrides(settings: &mut HelmSettings) {
    if let Some(v) = read_env_string("HELM_API_URL") {
        settings.backend.api_url = v;
    }
    if let Some(v) = read_env_string("HELM_EVENTS_URL") {
        settings.backend.events_url = v;
    }
    if let Some(v) = read_env_string("HELM_AGENT_URL") {
        settings.agent.api_url = v;
    }
    if let Some(v) = read_env_string("HELM_AGENT_APP") {
        settings.agent.app_name = v;
    }
    if let Some(v) = read_env_string("HELM_AGENT_USER") {
        settings.agent.user_id = v;
    }
    if let Some(v) = read_env_string("HELM_AGENT_SESSION") {
        settings.agent.session_id = v;
    }
    if let Some(v) = read_env_string("HELM_PROXY_HOST") {
        settings.proxy.host = v;
    }
    if let Some(v) = read_env_u16("HELM_PROXY_PORT", 1, 65535) {
        settings.proxy.port = v;
    }
    if let Some(v) = read_env_u64("HELM_RECONNECT_BASE_MS", 1, 3_600_000) {
        settings.reconnect.base_delay_ms = v;
    }
    if let Some(v) = read_env_u64("HELM_RECONNECT_MAX_MS", 1, 3_600_000) {
        settings.reconnect.max_delay_ms = v;
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    parse_bounded_u16(&std::env::var(name).ok()?, min, max)
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    parse_bounded_u64(&std::env::var(name).ok()?, min, max)
}

fn parse_bounded_u16(val: &str, min: u16, max: u16) -> Option<u16> {
    val.trim()
        .parse::<u16>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn parse_bounded_u64(val: &str, min: u64, max: u64) -> Option<u64> {
    val.trim()
        .parse::<u64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
