use std::io::Read;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};

use super::{ActionDispatcher, DispatchError};
use crate::config::{ActionEndpoint, DispatchConfig, EndpointAuth};
use crate::error::ConfigError;
use crate::request::ActionExecutionRequest;
use crate::response::ActionExecutionResponse;
use crate::secret::Secret;

const USER_AGENT: &str = concat!("action-gate/", env!("CARGO_PKG_VERSION"));

/// Longest status body kept in a [`DispatchError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 1024;

/// Bytes read from an error body; enough for the kept chars in any encoding.
const MAX_ERROR_BODY_BYTES: u64 = (MAX_ERROR_BODY_CHARS * 4) as u64;

enum Credentials {
    None,
    Bearer(Secret<String>),
    Basic {
        username: String,
        password: Secret<String>,
    },
    ApiKey {
        header: HeaderName,
        value: HeaderValue,
    },
}

/// Dispatcher that POSTs the JSON-encoded request to the action endpoint.
///
/// The call blocks the current thread. Connect and overall timeouts come
/// from [`DispatchConfig`]; when one expires the call fails with
/// [`DispatchError::Transport`]. No retries are attempted.
///
/// Must not be constructed or used from inside an async runtime; wrap calls
/// in `spawn_blocking` there.
pub struct HttpDispatcher {
    client: Client,
    credentials: Credentials,
}

impl std::fmt::Debug for HttpDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDispatcher")
            .field("auth", &self.auth_scheme())
            .finish_non_exhaustive()
    }
}

impl HttpDispatcher {
    /// Creates a dispatcher from the process-wide dispatch settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] for an unusable API key header
    /// name, [`ConfigError::InvalidHeaderValue`] for an API key that cannot
    /// be sent as a header value, or [`ConfigError::HttpClient`] if the
    /// client cannot be built.
    pub fn new(config: &DispatchConfig) -> Result<Self, ConfigError> {
        let credentials = match &config.auth {
            EndpointAuth::None => Credentials::None,
            EndpointAuth::Bearer { token } => {
                Credentials::Bearer(Secret::new(token.expose_secret().clone()))
            }
            EndpointAuth::Basic { username, password } => Credentials::Basic {
                username: username.clone(),
                password: Secret::new(password.expose_secret().clone()),
            },
            EndpointAuth::ApiKey { header, value } => {
                let name = HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
                    ConfigError::InvalidHeader {
                        header: header.clone(),
                    }
                })?;
                let mut value = HeaderValue::from_str(value.expose_secret()).map_err(|_| {
                    ConfigError::InvalidHeaderValue {
                        header: header.clone(),
                    }
                })?;
                value.set_sensitive(true);
                Credentials::ApiKey {
                    header: name,
                    value,
                }
            }
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|error| ConfigError::HttpClient {
                message: error.to_string(),
            })?;

        Ok(Self {
            client,
            credentials,
        })
    }

    fn auth_scheme(&self) -> &'static str {
        match self.credentials {
            Credentials::None => "none",
            Credentials::Bearer(_) => "bearer",
            Credentials::Basic { .. } => "basic",
            Credentials::ApiKey { .. } => "api_key",
        }
    }

    fn authenticate(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::None => builder,
            Credentials::Bearer(token) => builder.bearer_auth(token.expose_secret()),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password.expose_secret()))
            }
            Credentials::ApiKey { header, value } => builder.header(header.clone(), value.clone()),
        }
    }
}

/// Reads at most [`MAX_ERROR_BODY_CHARS`] chars of an error body.
fn error_body(response: Response) -> String {
    let mut bytes = Vec::new();
    if response.take(MAX_ERROR_BODY_BYTES).read_to_end(&mut bytes).is_err() {
        return "unable to read response body".to_string();
    }
    String::from_utf8_lossy(&bytes)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}

impl ActionDispatcher for HttpDispatcher {
    fn call(
        &self,
        endpoint: &ActionEndpoint,
        request: &ActionExecutionRequest,
    ) -> Result<ActionExecutionResponse, DispatchError> {
        let builder = self
            .client
            .post(endpoint.url().clone())
            .header(ACCEPT, "application/json")
            .json(request);

        let response = self
            .authenticate(builder)
            .send()
            .map_err(|error| DispatchError::Transport {
                message: if error.is_timeout() {
                    format!("request to {endpoint} timed out")
                } else {
                    error.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body: error_body(response),
            });
        }

        let body = response.text().map_err(|error| DispatchError::Transport {
            message: error.to_string(),
        })?;

        serde_json::from_str(&body).map_err(|error| DispatchError::MalformedBody {
            message: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ActionType;
    use serde_json::json;

    fn config(endpoint: &str) -> DispatchConfig {
        DispatchConfig::new(ActionEndpoint::parse(endpoint).unwrap())
    }

    #[test]
    fn invalid_api_key_header_is_rejected() {
        let config = config("http://127.0.0.1:9/").with_auth(EndpointAuth::ApiKey {
            header: "bad header\n".to_string(),
            value: Secret::new("k".to_string()),
        });

        let error = HttpDispatcher::new(&config).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidHeader { .. }));
    }

    #[test]
    fn invalid_api_key_value_is_rejected() {
        let config = config("http://127.0.0.1:9/").with_auth(EndpointAuth::ApiKey {
            header: "X-Api-Key".to_string(),
            value: Secret::new("k\n1".to_string()),
        });

        let error = HttpDispatcher::new(&config).unwrap_err();

        assert!(matches!(
            &error,
            ConfigError::InvalidHeaderValue { header } if header == "X-Api-Key"
        ));
        assert!(!error.to_string().contains("k\n1"));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = config("http://127.0.0.1:9/").with_auth(EndpointAuth::Bearer {
            token: Secret::new("tok-secret".to_string()),
        });

        let dispatcher = HttpDispatcher::new(&config).unwrap();
        let debug = format!("{:?}", dispatcher);

        assert!(debug.contains("bearer"));
        assert!(!debug.contains("tok-secret"));
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let mut config = config("http://127.0.0.1:1/action");
        config.connect_timeout_ms = 2_000;
        config.timeout_ms = 2_000;
        let dispatcher = HttpDispatcher::new(&config).unwrap();
        let request =
            ActionExecutionRequest::builder(ActionType::PreIssueAccessToken, json!({})).build();

        let error = dispatcher.call(&config.endpoint, &request).unwrap_err();

        assert!(matches!(error, DispatchError::Transport { .. }));
    }

    mod http_endpoint {
        use super::*;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn endpoint(server: &MockServer) -> ActionEndpoint {
            ActionEndpoint::parse(&format!("{}/action", server.uri())).unwrap()
        }

        fn request() -> ActionExecutionRequest {
            ActionExecutionRequest::builder(ActionType::PreIssueAccessToken, json!({})).build()
        }

        // The blocking client runs its own runtime, so keep it off tokio threads.
        async fn dispatch(
            config: DispatchConfig,
        ) -> Result<ActionExecutionResponse, DispatchError> {
            tokio::task::spawn_blocking(move || {
                std::thread::spawn(move || {
                    let dispatcher = HttpDispatcher::new(&config).unwrap();
                    dispatcher.call(&config.endpoint, &request())
                })
                .join()
                .unwrap()
            })
            .await
            .unwrap()
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn server_error_becomes_status_with_truncated_body() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action"))
                .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(5_000)))
                .expect(1)
                .mount(&server)
                .await;

            let error = dispatch(DispatchConfig::new(endpoint(&server)))
                .await
                .unwrap_err();

            match error {
                DispatchError::Status { status, body } => {
                    assert_eq!(status, 500);
                    assert_eq!(body.chars().count(), MAX_ERROR_BODY_CHARS);
                }
                other => panic!("expected status error, got {other:?}"),
            }
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn short_error_body_is_kept_whole() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
                .mount(&server)
                .await;

            let error = dispatch(DispatchConfig::new(endpoint(&server)))
                .await
                .unwrap_err();

            assert_eq!(
                error,
                DispatchError::Status {
                    status: 403,
                    body: "forbidden".to_string(),
                }
            );
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn undecodable_body_is_malformed() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
                .mount(&server)
                .await;

            let error = dispatch(DispatchConfig::new(endpoint(&server)))
                .await
                .unwrap_err();

            assert!(matches!(error, DispatchError::MalformedBody { .. }));
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn body_without_operations_is_empty_response() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/action"))
                .and(header("accept", "application/json"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;

            let response = dispatch(DispatchConfig::new(endpoint(&server)))
                .await
                .unwrap();

            assert!(response.operations().is_empty());
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn proposed_operations_are_decoded() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "operations": [
                        { "op": "add", "path": "/accessToken/claims/role", "value": "admin" }
                    ]
                })))
                .mount(&server)
                .await;

            let response = dispatch(DispatchConfig::new(endpoint(&server)))
                .await
                .unwrap();

            assert_eq!(response.operations().len(), 1);
            assert_eq!(
                response.operations()[0].path.as_str(),
                "/accessToken/claims/role"
            );
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn bearer_token_is_sent() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(header("authorization", "Bearer tok-1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "operations": [] })))
                .expect(1)
                .mount(&server)
                .await;

            let config = DispatchConfig::new(endpoint(&server)).with_auth(EndpointAuth::Bearer {
                token: Secret::new("tok-1".to_string()),
            });

            assert!(dispatch(config).await.is_ok());
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn basic_credentials_are_sent() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                // base64("user:pw")
                .and(header("authorization", "Basic dXNlcjpwdw=="))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "operations": [] })))
                .expect(1)
                .mount(&server)
                .await;

            let config = DispatchConfig::new(endpoint(&server)).with_auth(EndpointAuth::Basic {
                username: "user".to_string(),
                password: Secret::new("pw".to_string()),
            });

            assert!(dispatch(config).await.is_ok());
        }

        #[tokio::test(flavor = "multi_thread")]
        async fn api_key_header_is_sent() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(header("x-api-key", "k-123"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "operations": [] })))
                .expect(1)
                .mount(&server)
                .await;

            let config = DispatchConfig::new(endpoint(&server)).with_auth(EndpointAuth::ApiKey {
                header: "X-Api-Key".to_string(),
                value: Secret::new("k-123".to_string()),
            });

            assert!(dispatch(config).await.is_ok());
        }
    }
}
