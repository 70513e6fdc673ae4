//! API client for the LifeHub REST API.
//!
//! This module provides the `ApiClient` struct. Paths are resolved against
//! the session's API base and every request carries the live session token.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::SessionStore;

use super::ApiError;

/// Resolve `path` against `base`.
///
/// Anything starting with `http` is already a full URL and is used as is.
/// Otherwise one leading `/` is dropped and the path is appended to `base`.
pub fn resolve_url(base: &str, path: &str) -> String {
    if path.starts_with("http") {
        return path.to_string();
    }
    let relative = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", base.trim_end_matches('/'), relative)
}

/// Verb, body and extra headers for a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    /// Merged over the defaults; a header set here replaces the default.
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_string(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// API client for LifeHub.
/// Clone is cheap - the session is shared and reqwest::Client uses Arc internally.
#[derive(Clone)]
pub struct ApiClient {
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Send one request and hand back the raw response, whatever its status.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Response, ApiError> {
        let url = resolve_url(self.session.api_base(), path);
        let headers = self.build_headers(options.headers)?;

        debug!(method = %options.method, url = %url, "Sending request");

        let mut request = self
            .session
            .http()
            .request(options.method, &url)
            .headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        debug!(status = %response.status(), url = %url, "Response received");
        Ok(response)
    }

    /// Defaults, then caller overrides, then the live token on top.
    fn build_headers(&self, overrides: HeaderMap) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.extend(overrides);

        if let Some(token) = self.session.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::from_response(response).await)
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(path, RequestOptions::new(Method::GET)).await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(Method::POST).json(body)?;
        let response = self.request(path, options).await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new(Method::PATCH).json(body)?;
        let response = self.request(path, options).await?;
        Self::parse_json(Self::check_response(response).await?).await
    }

    /// DELETE a resource. `204 No Content` yields `None` without reading a body.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let response = self.request(path, RequestOptions::new(Method::DELETE)).await?;
        let response = Self::check_response(response).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Self::parse_json(response).await.map(Some)
    }
}
