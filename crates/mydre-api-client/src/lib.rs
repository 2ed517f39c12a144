//! HTTP client for the myDRE configuration API.
//!
//! A thin reqwest wrapper with generic GET/POST helpers plus the domain
//! methods in [`api`] (create, decrypt, combine, upload, staged files).
//! Non-2xx responses become [`AppError::Api`], carrying the server's
//! `detail`/`error`/`message` field when the body parses as JSON.

pub mod api;

use std::time::Duration;

use mydre_core::AppError;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// API version prefix (e.g. "/api/v1"). Set MYDRE_API_VERSION to match the
/// server.
pub fn api_prefix() -> String {
    let version = std::env::var("MYDRE_API_VERSION").unwrap_or_else(|_| "v1".to_string());
    format!("/api/{}", version)
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from MYDRE_API_URL (or API_URL), defaulting to the
    /// local development server.
    pub fn from_env() -> Result<Self, AppError> {
        let base_url = std::env::var("MYDRE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request, deserializing the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self
            .client
            .get(self.build_url(path))
            .send()
            .await
            .map_err(send_error)?;
        Self::json_body(response).await
    }

    /// POST a JSON body and deserialize the JSON response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await
            .map_err(send_error)?;
        Self::json_body(response).await
    }

    /// POST a JSON body and return the raw response bytes (encrypted
    /// artifacts come back as an octet stream).
    pub async fn post_json_for_bytes<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<bytes::Bytes, AppError> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await
            .map_err(send_error)?;
        Self::bytes_body(response).await
    }

    /// POST a multipart form and deserialize the JSON response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, AppError> {
        let response = self
            .client
            .post(self.build_url(path))
            .multipart(form)
            .send()
            .await
            .map_err(send_error)?;
        Self::json_body(response).await
    }

    /// POST a multipart form and return the raw response bytes.
    pub async fn post_multipart_for_bytes(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<bytes::Bytes, AppError> {
        let response = self
            .client
            .post(self.build_url(path))
            .multipart(form)
            .send()
            .await
            .map_err(send_error)?;
        Self::bytes_body(response).await
    }

    /// DELETE request, deserializing the JSON response.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self
            .client
            .delete(self.build_url(path))
            .send()
            .await
            .map_err(send_error)?;
        Self::json_body(response).await
    }

    async fn json_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse response as JSON: {}", e)))
    }

    async fn bytes_body(response: reqwest::Response) -> Result<bytes::Bytes, AppError> {
        let response = Self::check_status(response).await?;
        response
            .bytes()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read response body: {}", e)))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "API request failed");
        Err(AppError::Api {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }
}

fn send_error(err: reqwest::Error) -> AppError {
    AppError::Internal(format!("Failed to send request: {}", err))
}

/// Pull a human-readable message out of an error body. FastAPI-style
/// bodies use `detail`; older variants use `error` or `message`.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.trim().to_string()
    }
}
