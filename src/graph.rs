//! Direct HTTP bindings for the Microsoft Graph API.
//!
//! Each operation issues exactly one request with a freshly acquired bearer
//! token and maps transport or status failures into [`error::GraphError`],
//! whose Display strings are what the model ultimately sees.
pub mod auth;
pub mod calendar;
pub mod client;
pub mod drive;
pub mod error;
pub mod mail;

/// Percent-encode a drive path one segment at a time, so slashes keep their
/// meaning while embedded special characters do not corrupt the URL.
pub(crate) fn encode_path_segments(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
pub(crate) mod testutil {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::auth::GraphAuth;
    use super::client::GraphClient;

    /// A wiremock server that serves both the token endpoint and the Graph
    /// API, with a GraphClient pointed at it.
    pub async fn mock_graph() -> (MockServer, GraphClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/contoso/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "test-token"
            })))
            .mount(&server)
            .await;

        let auth = GraphAuth::new("contoso", "client-id", "client-secret")
            .unwrap()
            .with_authority(server.uri())
            .with_graph_url(format!("{}/v1.0", server.uri()));
        let client = GraphClient::new(auth).unwrap();
        (server, client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_path_segments() {
        assert_eq!(encode_path_segments("Documents/Reports"), "Documents/Reports");
        assert_eq!(
            encode_path_segments("Shared Files/Project X"),
            "Shared%20Files/Project%20X"
        );
        assert_eq!(encode_path_segments("/leading/and/trailing/"), "leading/and/trailing");
        assert_eq!(encode_path_segments("q&a/50%"), "q%26a/50%25");
    }
}
