//! HTTP transport for TheTVDB requests.

use super::TvdbError;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

/// Base URL of TheTVDB v2 API
pub const DEFAULT_BASE_URL: &str = "https://api.thetvdb.com";

/// A request against the API, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a> {
    pub method: Method,
    /// Path below the base URL, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: &'a HeaderMap,
    /// JSON body, sent for POST requests
    pub body: Option<serde_json::Value>,
}

impl<'a> ApiRequest<'a> {
    /// Creates a GET request for the given path
    pub fn get(path: impl Into<String>, headers: &'a HeaderMap) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            headers,
            body: None,
        }
    }

    /// Creates a POST request carrying a JSON body
    pub fn post_json(
        path: impl Into<String>,
        headers: &'a HeaderMap,
        body: serde_json::Value,
    ) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            headers,
            body: Some(body),
        }
    }

    /// Appends a query parameter
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Status and raw body of an API response.
///
/// The body is kept as text so error variants can carry it verbatim.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body as JSON
    pub fn json<T>(&self) -> Result<T, TvdbError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        serde_json::from_str(&self.body).map_err(|e| TvdbError::Parse(e.to_string()))
    }
}

/// Sends requests to the remote API.
///
/// Calls block until the response body has been read. There is no retry;
/// a failure is reported to the caller as-is.
pub trait Transport {
    fn send(&self, request: &ApiRequest<'_>) -> Result<ApiResponse, TvdbError>;
}

/// Transport backed by a blocking reqwest client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport for the given base URL (e.g. `https://api.thetvdb.com`)
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest<'_>) -> Result<ApiResponse, TvdbError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone())
            .query(&request.query);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|e| TvdbError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| TvdbError::Request(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}
