pub mod endpoints;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CashtreeError, Result};
use crate::types::ApiFailure;

/// HTTP client wrapper for the Cashtree REST API.
///
/// Holds the bearer token once the operator has logged in; every request
/// except register/login carries it as `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct CashtreeHttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CashtreeHttpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let request = self.authorize(self.client.get(self.url(path)).query(query));
        Self::handle(send(request).await?).await
    }

    /// POST a JSON body, parse a JSON response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::handle(send(request).await?).await
    }

    /// PUT a JSON body, parse a JSON response.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.authorize(self.client.put(self.url(path)).json(body));
        Self::handle(send(request).await?).await
    }

    /// DELETE a resource, parse a JSON response.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.authorize(self.client.delete(self.url(path)));
        Self::handle(send(request).await?).await
    }

    /// DELETE with a JSON body (legacy delete-by-username route).
    pub async fn delete_with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.authorize(self.client.delete(self.url(path)).json(body));
        Self::handle(send(request).await?).await
    }

    /// Map the response: 401 becomes invalid credentials, 409 a conflict,
    /// anything else a generic HTTP error carrying the backend's `{message}`
    /// when it sent one.
    async fn handle<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiFailure>(&body)
                .ok()
                .and_then(|failure| failure.message)
                .unwrap_or(body);
            return Err(match status.as_u16() {
                401 => CashtreeError::InvalidCredentials(or_default(message, "invalid credentials")),
                409 => CashtreeError::Conflict(or_default(message, "duplicate username")),
                code => CashtreeError::Http {
                    status: code,
                    message,
                },
            });
        }

        response.json::<T>().await.map_err(CashtreeError::Request)
    }
}

/// Dispatch a request; a transport failure (no response at all) collapses to
/// the unreachable sentinel rather than leaking reqwest internals.
async fn send(request: RequestBuilder) -> Result<Response> {
    request.send().await.map_err(|e| {
        tracing::debug!(error = %e, "transport failure");
        CashtreeError::Unreachable
    })
}

fn or_default(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
