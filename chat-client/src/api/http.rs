//! HTTP implementation of the RemoteAPI contract.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use chat_types::{Message, MessageDraft, MessageId, User, UserId};

use super::{ApiError, RemoteApi};

/// RemoteAPI over HTTP with JSON bodies.
///
/// Authentication is external to the engine; when the hosting application
/// has a session token it is attached as a bearer header.
#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

/// Shape of the backend's error bodies: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpRemoteApi {
    /// Create a client against the given API base URL
    /// (e.g. `https://chat.example.com/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode a JSON response, mapping failures into the
    /// engine's error taxonomy.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = Self::send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request and discard the body (ack-only operations).
    async fn execute_ack(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        Self::send(builder).await.map(|_| ())
    }

    async fn send(builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Non-success: surface the backend's message field when present.
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn fetch_peers(&self) -> Result<Vec<User>, ApiError> {
        self.execute(self.request(reqwest::Method::GET, "/messages/users"))
            .await
    }

    async fn fetch_messages(&self, peer: &UserId) -> Result<Vec<Message>, ApiError> {
        self.execute(self.request(reqwest::Method::GET, &format!("/messages/{peer}")))
            .await
    }

    async fn send_message(
        &self,
        peer: &UserId,
        draft: &MessageDraft,
    ) -> Result<Message, ApiError> {
        self.execute(
            self.request(reqwest::Method::POST, &format!("/messages/send/{peer}"))
                .json(draft),
        )
        .await
    }

    async fn edit_message(&self, id: &MessageId, content: &str) -> Result<Message, ApiError> {
        self.execute(
            self.request(reqwest::Method::PUT, &format!("/messages/edit/{id}"))
                .json(&json!({ "content": content })),
        )
        .await
    }

    async fn delete_message(&self, id: &MessageId) -> Result<(), ApiError> {
        self.execute_ack(self.request(reqwest::Method::DELETE, &format!("/messages/delete/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joining_tolerates_trailing_slash() {
        let api = HttpRemoteApi::new("http://localhost:5001/api/");
        assert_eq!(
            api.url("/messages/users"),
            "http://localhost:5001/api/messages/users"
        );

        let api = HttpRemoteApi::new("http://localhost:5001/api");
        assert_eq!(
            api.url("/messages/users"),
            "http://localhost:5001/api/messages/users"
        );
    }

    #[test]
    fn error_body_parses_with_and_without_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"Nope"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Nope"));

        let body: ErrorBody = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.message.is_none());
    }
}
