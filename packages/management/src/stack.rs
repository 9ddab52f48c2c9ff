// ABOUTME: Stack-scoped handle over the management client
// ABOUTME: Resolves api_key, token and branch headers once per stack

use std::env;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::client::ManagementClient;
use crate::constants::{
    HEADER_API_KEY, HEADER_AUTHTOKEN, HEADER_BRANCH, STACK_API_KEY, STACK_BRANCH,
    STACK_MANAGEMENT_TOKEN,
};
use crate::error::{ManagementError, ManagementResult};

/// Credentials identifying a stack
#[derive(Clone, Default)]
pub struct StackAuth {
    pub api_key: String,
    pub management_token: Option<String>,
    pub branch: Option<String>,
}

impl std::fmt::Debug for StackAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackAuth")
            .field("api_key", &self.api_key)
            .field(
                "management_token",
                &self.management_token.as_ref().map(|_| "<redacted>"),
            )
            .field("branch", &self.branch)
            .finish()
    }
}

impl StackAuth {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_management_token(mut self, token: impl Into<String>) -> Self {
        self.management_token = Some(token.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Read `STACK_API_KEY`, `STACK_MANAGEMENT_TOKEN` and `STACK_BRANCH`
    pub fn from_env() -> ManagementResult<Self> {
        let api_key = env::var(STACK_API_KEY)
            .map_err(|_| ManagementError::config(format!("{} is not set", STACK_API_KEY)))?;

        Ok(Self {
            api_key,
            management_token: env::var(STACK_MANAGEMENT_TOKEN).ok().filter(|v| !v.is_empty()),
            branch: env::var(STACK_BRANCH).ok().filter(|v| !v.is_empty()),
        })
    }
}

/// Authenticated access to a single stack.
///
/// Resource operations are implemented on this type in their own modules.
#[derive(Debug, Clone)]
pub struct StackInstance {
    pub(crate) client: ManagementClient,
    api_key: String,
    headers: HeaderMap,
}

impl StackInstance {
    pub(crate) fn new(client: ManagementClient, auth: StackAuth) -> ManagementResult<Self> {
        if auth.api_key.trim().is_empty() {
            return Err(ManagementError::config("Stack api_key must not be empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(HEADER_API_KEY),
            header_value("api_key", &auth.api_key, false)?,
        );

        if let Some(token) = &auth.management_token {
            headers.insert(AUTHORIZATION, header_value("management token", token, true)?);
        } else if let Some(token) = client.config().auth_token() {
            headers.insert(
                HeaderName::from_static(HEADER_AUTHTOKEN),
                header_value("authtoken", token, true)?,
            );
        }

        if let Some(branch) = &auth.branch {
            headers.insert(
                HeaderName::from_static(HEADER_BRANCH),
                header_value("branch", branch, false)?,
            );
        }

        Ok(Self {
            client,
            api_key: auth.api_key,
            headers,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Headers sent with every request on this stack
    pub fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }
}

fn header_value(field: &str, value: &str, sensitive: bool) -> ManagementResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| ManagementError::config(format!("Invalid {} header value: {}", field, e)))?;
    header.set_sensitive(sensitive);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn client(auth_token: Option<&str>) -> ManagementClient {
        let mut config = ClientConfig::default();
        if let Some(token) = auth_token {
            config = config.with_auth_token(token);
        }
        ManagementClient::new(config).unwrap()
    }

    #[test]
    fn test_management_token_headers() {
        let stack = client(Some("user-token"))
            .stack(
                StackAuth::new("blt123")
                    .with_management_token("cs-token")
                    .with_branch("develop"),
            )
            .unwrap();

        let headers = stack.headers();
        assert_eq!(headers.get("api_key").unwrap(), "blt123");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "cs-token");
        assert_eq!(headers.get("branch").unwrap(), "develop");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        // management token takes precedence over the user authtoken
        assert!(headers.get("authtoken").is_none());
    }

    #[test]
    fn test_falls_back_to_authtoken() {
        let stack = client(Some("user-token"))
            .stack(StackAuth::new("blt123"))
            .unwrap();

        let headers = stack.headers();
        assert_eq!(headers.get("authtoken").unwrap(), "user-token");
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get("branch").is_none());
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let err = client(None).stack(StackAuth::new("  ")).unwrap_err();
        assert!(matches!(err, ManagementError::Configuration(_)));
    }

    #[test]
    fn test_rejects_invalid_header_values() {
        let err = client(None)
            .stack(StackAuth::new("blt123").with_management_token("bad\ntoken"))
            .unwrap_err();
        assert!(matches!(err, ManagementError::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let auth = StackAuth::new("blt123").with_management_token("secret");
        let printed = format!("{:?}", auth);
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("secret"));
    }
}
