use reqwest::Client;
use serde_json::Value;
use std::env;
use thiserror::Error;

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";
const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, and AZURE_TENANT_ID must be set")]
    MissingConfiguration,

    #[error("Failed to get access token from Azure AD: {kind} - {detail}")]
    TokenAcquisition { kind: String, detail: String },
}

/// Azure AD client-credentials authentication for the Graph API.
///
/// Each call to [`GraphAuth::access_token`] performs a fresh credential
/// exchange; there is no caching or refresh scheduling, so no invalidation
/// logic exists either.
#[derive(Debug)]
pub struct GraphAuth {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority: String,
    graph_url: String,
    http: Client,
}

impl GraphAuth {
    pub fn new<T, C, S>(tenant_id: T, client_id: C, client_secret: S) -> Result<Self, AuthError>
    where
        T: Into<String>,
        C: Into<String>,
        S: Into<String>,
    {
        let tenant_id = tenant_id.into();
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if tenant_id.is_empty() || client_id.is_empty() || client_secret.is_empty() {
            return Err(AuthError::MissingConfiguration);
        }

        Ok(Self {
            tenant_id,
            client_id,
            client_secret,
            authority: DEFAULT_AUTHORITY.to_string(),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
            http: Client::new(),
        })
    }

    /// Load identity configuration from AZURE_TENANT_ID, AZURE_CLIENT_ID and
    /// AZURE_CLIENT_SECRET. Missing variables are fatal to startup.
    pub fn from_env() -> Result<Self, AuthError> {
        let tenant_id = env::var("AZURE_TENANT_ID").map_err(|_| AuthError::MissingConfiguration)?;
        let client_id = env::var("AZURE_CLIENT_ID").map_err(|_| AuthError::MissingConfiguration)?;
        let client_secret =
            env::var("AZURE_CLIENT_SECRET").map_err(|_| AuthError::MissingConfiguration)?;
        Self::new(tenant_id, client_id, client_secret)
    }

    /// Override the identity endpoint (used against a simulated server)
    pub fn with_authority<S: Into<String>>(mut self, authority: S) -> Self {
        self.authority = authority.into();
        self
    }

    /// Override the Graph API base URL (used against a simulated server)
    pub fn with_graph_url<S: Into<String>>(mut self, graph_url: S) -> Self {
        self.graph_url = graph_url.into();
        self
    }

    /// The base URL for Graph API calls
    pub fn base_graph_url(&self) -> &str {
        &self.graph_url
    }

    /// Exchange the client credentials for a bearer token
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        );

        let response = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", DEFAULT_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::TokenAcquisition {
                kind: "RequestError".to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenAcquisition {
                kind: "HTTPStatusError".to_string(),
                detail: format!("{} - {}", status.as_u16(), body),
            });
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| AuthError::TokenAcquisition {
                kind: "DecodeError".to_string(),
                detail: e.to_string(),
            })?;

        data.get("access_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| AuthError::TokenAcquisition {
                kind: "DecodeError".to_string(),
                detail: "token response had no access_token field".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_empty_configuration_is_rejected() {
        let err = GraphAuth::new("", "client-id", "client-secret").unwrap_err();
        assert!(matches!(err, AuthError::MissingConfiguration));
    }

    #[tokio::test]
    async fn test_access_token_client_credentials_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "tok-123"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let auth = GraphAuth::new("contoso", "client-id", "client-secret")
            .unwrap()
            .with_authority(server.uri());

        // Every call performs a fresh exchange
        assert_eq!(auth.access_token().await.unwrap(), "tok-123");
        assert_eq!(auth.access_token().await.unwrap(), "tok-123");
    }

    #[tokio::test]
    async fn test_access_token_propagates_identity_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/oauth2/v2.0/token"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("AADSTS7000215: invalid secret"),
            )
            .mount(&server)
            .await;

        let auth = GraphAuth::new("contoso", "client-id", "bad-secret")
            .unwrap()
            .with_authority(server.uri());

        let err = auth.access_token().await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Failed to get access token from Azure AD"));
        assert!(text.contains("HTTPStatusError"));
        assert!(text.contains("AADSTS7000215"));
    }
}
