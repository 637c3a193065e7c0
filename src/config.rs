//! Client configuration: server origin, credential, fixed timeouts.
//!
//! Resolution order for every knob is CLI flag > environment variable >
//! built-in default. Environment lookups are isolated in [`ClientConfig::resolve`]
//! so the precedence logic itself stays a pure, testable function.

use std::time::Duration;

/// Environment variable overriding the server origin.
pub const SERVER_ENV: &str = "LECTERN_SERVER";

/// Environment variable supplying the research API key.
pub const API_KEY_ENV: &str = "LECTERN_API_KEY";

/// Default server origin for local development.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Timeout applied to every request except file uploads.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Extended timeout for multipart file uploads.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Connection settings for [`crate::api::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://127.0.0.1:8000`. API routes live under
    /// `/api`; the health probe lives at the origin root.
    pub server: String,
    /// Credential forwarded on research calls only. `None` sends no header.
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            api_key: None,
            request_timeout: REQUEST_TIMEOUT,
            upload_timeout: UPLOAD_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Resolve a configuration from CLI flags and the process environment.
    pub fn resolve(server_flag: Option<String>, api_key_flag: Option<String>) -> Self {
        Self::resolve_from(
            server_flag,
            api_key_flag,
            std::env::var(SERVER_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
        )
    }

    /// Precedence logic with environment values passed in explicitly.
    fn resolve_from(
        server_flag: Option<String>,
        api_key_flag: Option<String>,
        server_env: Option<String>,
        api_key_env: Option<String>,
    ) -> Self {
        let server = server_flag
            .or(server_env)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());

        let api_key = api_key_flag
            .or(api_key_env)
            .filter(|k| !k.trim().is_empty());

        Self {
            server: server.trim_end_matches('/').to_string(),
            api_key,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_server() {
        let config = ClientConfig::resolve_from(None, None, None, None);
        assert_eq!(config.server, DEFAULT_SERVER);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn flag_beats_env() {
        let config = ClientConfig::resolve_from(
            Some("http://flag:1".into()),
            None,
            Some("http://env:2".into()),
            None,
        );
        assert_eq!(config.server, "http://flag:1");
    }

    #[test]
    fn env_beats_default() {
        let config =
            ClientConfig::resolve_from(None, None, Some("http://env:2".into()), None);
        assert_eq!(config.server, "http://env:2");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config =
            ClientConfig::resolve_from(Some("http://host:8000/".into()), None, None, None);
        assert_eq!(config.server, "http://host:8000");
    }

    #[test]
    fn blank_values_fall_through() {
        let config = ClientConfig::resolve_from(Some("  ".into()), Some(String::new()), None, None);
        assert_eq!(config.server, DEFAULT_SERVER);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn api_key_resolution() {
        let config = ClientConfig::resolve_from(None, Some("k1".into()), None, Some("k2".into()));
        assert_eq!(config.api_key.as_deref(), Some("k1"));
    }
}
