//! Login against TheTVDB and the resulting request headers.

use super::TvdbError;
use super::transport::{ApiRequest, Transport};
use super::tvdb_types::LoginResponse;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// An authenticated API session.
///
/// Holds the headers every subsequent request has to carry. The headers are
/// read-only once the session exists and are never written anywhere.
#[derive(Debug, Clone)]
pub struct Session {
    headers: HeaderMap,
}

impl Session {
    /// Logs in with the given API key and builds the bearer headers
    ///
    /// # Errors
    ///
    /// Returns [`TvdbError::Auth`] with status and body if the login is
    /// rejected. There is no retry.
    pub fn authenticate(transport: &dyn Transport, api_key: &str) -> Result<Self, TvdbError> {
        let mut headers = json_headers();

        let request =
            ApiRequest::post_json("/login", &headers, serde_json::json!({ "apikey": api_key }));
        let response = transport.send(&request)?;

        if !response.status.is_success() {
            return Err(TvdbError::Auth {
                status: response.status,
                body: response.body,
            });
        }

        let token = response
            .json::<LoginResponse>()?
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TvdbError::InvalidData("login response carries no token".to_string()))?;

        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TvdbError::InvalidData(format!("unusable token: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        tracing::debug!("logged in to TheTVDB");
        Ok(Self { headers })
    }

    /// Headers to attach to every authenticated request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}
