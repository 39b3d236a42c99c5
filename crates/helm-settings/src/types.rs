//! Settings type definitions with compiled defaults.
//!
//! All URLs default to localhost so a fresh checkout talks to a locally
//! running backend with zero configuration.

use helm_core::backoff::BackoffPolicy;
use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelmSettings {
    /// Task/resource backend endpoints.
    pub backend: BackendSettings,
    /// Upstream agent API reached through the chat proxy.
    pub agent: AgentSettings,
    /// Chat proxy bind address.
    pub proxy: ProxySettings,
    /// Event-stream reconnect policy.
    pub reconnect: BackoffPolicy,
}

/// Endpoints of the resource backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendSettings {
    /// Base URL for the REST API.
    pub api_url: String,
    /// URL of the SSE push stream.
    pub events_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            events_url: "http://localhost:8000/events".into(),
        }
    }
}

/// Upstream agent API identifiers used by the chat proxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Base URL of the agent API.
    pub api_url: String,
    /// Application name sent with every chat request.
    pub app_name: String,
    /// User id sent with every chat request.
    pub user_id: String,
    /// Session id used when the caller supplies none.
    pub session_id: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8002".into(),
            app_name: "representation".into(),
            user_id: "demo".into(),
            session_id: "default_session".into(),
        }
    }
}

/// Bind address for the chat proxy server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxySettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        let settings = HelmSettings::default();
        assert_eq!(settings.backend.api_url, "http://localhost:8000");
        assert_eq!(settings.backend.events_url, "http://localhost:8000/events");
        assert_eq!(settings.agent.api_url, "http://localhost:8002");
        assert_eq!(settings.proxy.port, 3000);
        assert_eq!(settings.reconnect.base_delay_ms, 3000);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: HelmSettings =
            serde_json::from_str(r#"{"backend": {"apiUrl": "http://box:9000"}}"#).unwrap();
        assert_eq!(settings.backend.api_url, "http://box:9000");
        // Untouched siblings keep their defaults.
        assert_eq!(settings.backend.events_url, "http://localhost:8000/events");
        assert_eq!(settings.agent.user_id, "demo");
    }

    #[test]
    fn camel_case_wire_names() {
        let value = serde_json::to_value(HelmSettings::default()).unwrap();
        assert!(value["backend"].get("apiUrl").is_some());
        assert!(value["agent"].get("appName").is_some());
        assert!(value["reconnect"].get("baseDelayMs").is_some());
    }
}
