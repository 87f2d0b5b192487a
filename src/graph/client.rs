use anyhow::Result;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use super::auth::GraphAuth;
use super::error::GraphError;

/// Executes Graph API requests with bearer authentication and uniform
/// status mapping. The `operation` strings passed in become the prefix of
/// every error message, matching the envelope wording the model sees.
pub struct GraphClient {
    auth: GraphAuth,
    http: Client,
}

impl GraphClient {
    pub fn new(auth: GraphAuth) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { auth, http })
    }

    pub fn base_url(&self) -> &str {
        self.auth.base_graph_url()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Acquire a fresh bearer token for one operation
    pub(crate) async fn token(&self, operation: &str) -> Result<String, GraphError> {
        self.auth
            .access_token()
            .await
            .map_err(|e| GraphError::Auth {
                operation: operation.to_string(),
                detail: e.to_string(),
            })
    }

    /// Send the request and map any non-2xx status to [`GraphError::Http`]
    pub(crate) async fn execute(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<Response, GraphError> {
        let response = request
            .send()
            .await
            .map_err(|e| GraphError::transport(operation, &e))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GraphError::Http {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            })
        }
    }
}
