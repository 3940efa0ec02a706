//! Dispatch configuration.
//!
//! The endpoint, its credentials and transport timeouts are fixed at
//! startup and shared read-only by every invocation.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::secret::Secret;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// The address of an action endpoint: an absolute `http` or `https` URL.
///
/// # Examples
///
/// ```
/// use action_gate::ActionEndpoint;
///
/// let endpoint = ActionEndpoint::parse("https://actions.example.com/pre-issue").unwrap();
/// assert_eq!(endpoint.as_str(), "https://actions.example.com/pre-issue");
///
/// assert!(ActionEndpoint::parse("ftp://actions.example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ActionEndpoint(Url);

impl ActionEndpoint {
    /// Parses and validates an endpoint address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the text is not a URL, or
    /// its scheme is neither `http` nor `https`, or it has no host.
    pub fn parse(endpoint: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url = Url::parse(endpoint).map_err(|error| invalid(error.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self(url))
    }

    /// Returns the endpoint as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the parsed URL.
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Returns the endpoint without userinfo, query string or fragment, safe
    /// to log.
    pub fn redacted(&self) -> String {
        let mut url = self.0.clone();
        url.set_query(None);
        url.set_fragment(None);
        let _ = url.set_password(None);
        let _ = url.set_username("");
        url.to_string()
    }
}

impl TryFrom<String> for ActionEndpoint {
    type Error = ConfigError;

    fn try_from(endpoint: String) -> Result<Self, Self::Error> {
        Self::parse(&endpoint)
    }
}

impl fmt::Display for ActionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// How the dispatcher authenticates against the action endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndpointAuth {
    /// No credentials are sent
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer {
        /// Bearer token
        token: Secret<String>,
    },
    /// HTTP basic authentication
    Basic {
        /// User name
        username: String,
        /// Password
        password: Secret<String>,
    },
    /// A custom header carrying an API key
    ApiKey {
        /// Header name
        header: String,
        /// Key value
        value: Secret<String>,
    },
}

impl EndpointAuth {
    /// Short name of the scheme, safe to log.
    pub fn scheme(&self) -> &'static str {
        match self {
            EndpointAuth::None => "none",
            EndpointAuth::Bearer { .. } => "bearer",
            EndpointAuth::Basic { .. } => "basic",
            EndpointAuth::ApiKey { .. } => "api_key",
        }
    }
}

/// Process-wide settings for calling the action endpoint.
///
/// # Examples
///
/// ```
/// use action_gate::DispatchConfig;
///
/// let config = DispatchConfig::from_json_str(r#"{
///     "endpoint": "https://actions.example.com/pre-issue",
///     "auth": { "type": "bearer", "token": "tok-123" },
///     "timeout_ms": 5000
/// }"#).unwrap();
///
/// assert_eq!(config.auth.scheme(), "bearer");
/// assert_eq!(config.timeout().as_millis(), 5000);
/// assert_eq!(config.connect_timeout().as_secs(), 15);
/// ```
#[derive(Debug, Deserialize)]
pub struct DispatchConfig {
    /// Where actions are sent
    pub endpoint: ActionEndpoint,
    /// Credentials for the endpoint
    #[serde(default)]
    pub auth: EndpointAuth,
    /// Connection establishment timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Whole-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl DispatchConfig {
    /// Creates a configuration with no credentials and default timeouts.
    pub fn new(endpoint: ActionEndpoint) -> Self {
        Self {
            endpoint,
            auth: EndpointAuth::None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sets the endpoint credentials.
    pub fn with_auth(mut self, auth: EndpointAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Decodes a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] if the document does not decode,
    /// including when the endpoint fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Connection timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Whole-request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_rejects_relative_urls() {
        let error = ActionEndpoint::parse("/pre-issue").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn endpoint_rejects_non_http_schemes() {
        let error = ActionEndpoint::parse("file:///etc/passwd").unwrap_err();
        assert!(error.to_string().contains("unsupported scheme 'file'"));
    }

    #[test]
    fn endpoint_display_drops_query_and_userinfo() {
        let endpoint =
            ActionEndpoint::parse("https://user:pw@actions.example.com/hook?key=abc#frag").unwrap();

        let shown = endpoint.to_string();
        assert!(!shown.contains("abc"));
        assert!(!shown.contains("pw"));
        assert!(!shown.contains("user"));
        assert!(!shown.contains('@'));
        assert_eq!(shown, "https://actions.example.com/hook");
    }

    #[test]
    fn endpoint_display_drops_username_without_password() {
        let endpoint = ActionEndpoint::parse("https://svc@actions.example.com/hook").unwrap();

        assert_eq!(endpoint.redacted(), "https://actions.example.com/hook");
        assert_eq!(endpoint.as_str(), "https://svc@actions.example.com/hook");
    }

    #[test]
    fn config_defaults() {
        let config =
            DispatchConfig::from_json_str(r#"{"endpoint": "http://localhost:8080/action"}"#)
                .unwrap();

        assert_eq!(config.auth.scheme(), "none");
        assert_eq!(config.connect_timeout_ms, 15_000);
        assert_eq!(config.timeout_ms, 60_000);
    }

    #[test]
    fn config_with_api_key_keeps_value_redacted() {
        let config = DispatchConfig::from_json_str(
            r#"{
                "endpoint": "https://actions.example.com",
                "auth": {"type": "api_key", "header": "X-Api-Key", "value": "k-999"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.auth.scheme(), "api_key");
        assert!(!format!("{:?}", config).contains("k-999"));
    }

    #[test]
    fn config_with_invalid_endpoint_is_malformed() {
        let error = DispatchConfig::from_json_str(r#"{"endpoint": "not a url"}"#).unwrap_err();
        assert!(matches!(error, ConfigError::Malformed(_)));
    }
}
