// ABOUTME: Management API client shared by all stack handles
// ABOUTME: Provides verb helpers, input serialization and response processing

use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{ApiErrorBody, ManagementError, ManagementResult};
use crate::stack::{StackAuth, StackInstance};
use crate::transport::{ApiRequest, HttpTransport, RawResponse, Transport};

/// Longest slice of a non-JSON error body kept in the error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Entry point for the management API.
///
/// Cheap to clone; clones share the underlying transport and its connection pool.
#[derive(Clone)]
pub struct ManagementClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl fmt::Debug for ManagementClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementClient")
            .field("base_url", &self.config.base_url())
            .finish_non_exhaustive()
    }
}

impl ManagementClient {
    /// Create a client backed by the reqwest transport
    pub fn new(config: ClientConfig) -> ManagementResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client from `STACK_MANAGEMENT_*` environment variables
    pub fn from_env() -> ManagementResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Scope this client to a single stack
    pub fn stack(&self, auth: StackAuth) -> ManagementResult<StackInstance> {
        StackInstance::new(self.clone(), auth)
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
    ) -> ManagementResult<RawResponse> {
        self.send(Method::GET, path, query, headers, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> ManagementResult<RawResponse> {
        self.send(Method::POST, path, query, headers, body).await
    }

    pub async fn put(
        &self,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> ManagementResult<RawResponse> {
        self.send(Method::PUT, path, query, headers, body).await
    }

    pub async fn delete(
        &self,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> ManagementResult<RawResponse> {
        self.send(Method::DELETE, path, query, headers, body).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> ManagementResult<RawResponse> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            headers,
            body,
        };
        self.transport.execute(request).await
    }

    /// Encode a request payload as JSON
    pub fn serialize_input<T: Serialize>(input: &T) -> ManagementResult<Vec<u8>> {
        serde_json::to_vec(input).map_err(ManagementError::Serialization)
    }

    /// Check the status of a response and decode its body.
    ///
    /// Non-2xx responses become [`ManagementError::Api`]; the service error
    /// envelope is used for the message when the body carries one.
    pub fn process_response<T: DeserializeOwned>(response: RawResponse) -> ManagementResult<T> {
        if !response.is_success() {
            return Err(api_error(response));
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            ManagementError::Decode(format!(
                "{} - {}",
                e,
                truncated_body(&response.body)
            ))
        })
    }
}

fn api_error(response: RawResponse) -> ManagementError {
    let status = response.status;

    match serde_json::from_slice::<ApiErrorBody>(&response.body) {
        Ok(body) if body.error_message.is_some() || body.error_code.is_some() => {
            warn!(
                status,
                error_code = ?body.error_code,
                "Management API returned an error"
            );
            ManagementError::Api {
                status,
                code: body.error_code,
                message: body
                    .error_message
                    .unwrap_or_else(|| format!("HTTP {}", status)),
                errors: body.errors,
            }
        }
        _ => {
            warn!(status, "Management API returned an error");
            let text = truncated_body(&response.body);
            ManagementError::Api {
                status,
                code: None,
                message: if text.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    text
                },
                errors: None,
            }
        }
    }
}

fn truncated_body(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Notice {
        notice: String,
    }

    #[test]
    fn test_process_response_decodes_success_body() {
        let response = RawResponse::new(200, r#"{"notice":"ok"}"#);
        let notice: Notice = ManagementClient::process_response(response).unwrap();
        assert_eq!(notice.notice, "ok");
    }

    #[test]
    fn test_process_response_uses_error_envelope() {
        let body = json!({
            "error_message": "Taxonomy was not found",
            "error_code": 141,
            "errors": { "uid": ["is not valid."] }
        });
        let response = RawResponse::new(404, body.to_string());

        let err = ManagementClient::process_response::<Notice>(response).unwrap_err();
        match err {
            ManagementError::Api {
                status,
                code,
                message,
                errors,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, Some(141));
                assert_eq!(message, "Taxonomy was not found");
                assert_eq!(errors, Some(json!({ "uid": ["is not valid."] })));
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_process_response_with_plain_error_body() {
        let response = RawResponse::new(502, "Bad Gateway");
        let err = ManagementClient::process_response::<Notice>(response).unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "API error (502): Bad Gateway");

        let response = RawResponse::new(500, Vec::new());
        let err = ManagementClient::process_response::<Notice>(response).unwrap_err();
        assert_eq!(err.to_string(), "API error (500): HTTP 500");
    }

    #[test]
    fn test_process_response_rejects_mismatched_body() {
        let response = RawResponse::new(200, r#"{"something":"else"}"#);
        let err = ManagementClient::process_response::<Notice>(response).unwrap_err();
        assert!(matches!(err, ManagementError::Decode(_)));
    }

    #[tokio::test]
    async fn test_verbs_forward_request_unchanged() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| {
                req.method == Method::PUT
                    && req.path == "/v3/things/a"
                    && req.query == vec![("locale".to_string(), "en-us".to_string())]
                    && req.body.as_deref() == Some(b"{}".as_slice())
            })
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, "{}")));

        let client = ManagementClient::with_transport(ClientConfig::default(), Arc::new(transport));
        let response = client
            .put(
                "/v3/things/a",
                &[("locale".to_string(), "en-us".to_string())],
                HeaderMap::new(),
                Some(b"{}".to_vec()),
            )
            .await
            .unwrap();

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Err(ManagementError::Transport("connection refused".to_string())));

        let client = ManagementClient::with_transport(ClientConfig::default(), Arc::new(transport));
        let err = client.get("/v3/things", &[], HeaderMap::new()).await.unwrap_err();
        assert!(err.is_transport_error());
    }
}
