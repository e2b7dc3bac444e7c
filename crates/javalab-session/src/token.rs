//! Access-token acquisition.
//!
//! The token endpoint gates access to the execution environment: one GET
//! carrying the session descriptor's fields, one `{token}` body back. The
//! requester performs no retry — a failed request means the session never
//! opens, and retry policy belongs to the caller.

use std::fmt;

use serde::Deserialize;

use crate::descriptor::SessionDescriptor;
use crate::errors::SessionError;

/// An opaque short-lived credential for one connection attempt.
///
/// The token is used once, embedded in the WebSocket URL, and never
/// persisted. `Debug` redacts it so it cannot leak into logs.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Token endpoint response.
#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Performs the single request/response exchange for a session token.
#[derive(Clone, Debug)]
pub struct TokenRequester {
    client: reqwest::Client,
    endpoint: String,
}

impl TokenRequester {
    /// Create a requester with a fresh HTTP client.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Create a requester reusing an existing HTTP client.
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Exchange the session descriptor for an access token.
    ///
    /// Exactly one outbound request, no retry, no shared-state mutation.
    /// A non-2xx response yields [`SessionError::TokenRequest`] carrying the
    /// raw body.
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn request_token(
        &self,
        descriptor: &SessionDescriptor,
    ) -> Result<AccessToken, SessionError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&descriptor.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SessionError::TokenRequest {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;
        tracing::debug!("received javabuilder access token");
        Ok(AccessToken(body.token))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn descriptor() -> SessionDescriptor {
        SessionDescriptor::new("abc123", "https://studio.example/p/abc123", "v7", "1138")
            .with_option("executionType", "RUN")
    }

    #[tokio::test]
    async fn request_token_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/javabuilder/access_token"))
            .and(query_param("channelId", "abc123"))
            .and(query_param("projectUrl", "https://studio.example/p/abc123"))
            .and(query_param("projectVersion", "v7"))
            .and(query_param("levelId", "1138"))
            .and(query_param("options[executionType]", "RUN"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok-1"})),
            )
            .mount(&server)
            .await;

        let requester =
            TokenRequester::new(format!("{}/javabuilder/access_token", server.uri()));
        let token = requester.request_token(&descriptor()).await.unwrap();
        assert_eq!(token.as_str(), "tok-1");
    }

    #[tokio::test]
    async fn request_token_rejection_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let requester = TokenRequester::new(format!("{}/access_token", server.uri()));
        let err = requester.request_token(&descriptor()).await.unwrap_err();
        assert_matches!(
            err,
            SessionError::TokenRequest { status: 403, ref message } if message == "quota exceeded"
        );
    }

    #[tokio::test]
    async fn request_token_malformed_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let requester = TokenRequester::new(format!("{}/access_token", server.uri()));
        let err = requester.request_token(&descriptor()).await.unwrap_err();
        assert_matches!(err, SessionError::Http(_));
    }

    #[tokio::test]
    async fn request_token_network_failure() {
        // Nothing is listening on this port.
        let requester = TokenRequester::new("http://127.0.0.1:1/access_token");
        let err = requester.request_token(&descriptor()).await.unwrap_err();
        assert_matches!(err, SessionError::Http(_));
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken("secret-token".to_string());
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("redacted"));
    }
}
