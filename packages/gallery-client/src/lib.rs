//! REST client for the gallery API
//!
//! Covers the endpoints the web client's session layer talks to: the
//! cookie-backed current-user lookup, login, logout and the notification list.
//! The session lives in an HTTP-only cookie, so the underlying `reqwest`
//! client keeps a cookie jar and every request on one `GalleryClient`
//! (and its clones) shares it.
//!
//! # Example
//!
//! ```rust,ignore
//! use gallery_client::GalleryClient;
//!
//! let client = GalleryClient::from_env()?;
//!
//! match client.current_user().await? {
//!     Some(user) => println!("signed in as {}", user.username),
//!     None => println!("anonymous"),
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{ClientError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gallery API client.
#[derive(Clone)]
pub struct GalleryClient {
    http_client: Client,
    base_url: String,
}

impl GalleryClient {
    /// Create a client for the given API base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variable `API_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("API_BASE_URL")
            .map_err(|_| ClientError::Config("API_BASE_URL not set".into()))?;
        Self::new(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /me` - who owns the session cookie, if anyone.
    ///
    /// An empty 2xx body is reported as `Ok(None)`; a 401 is
    /// `Err(ClientError::Unauthorized)`.
    pub async fn current_user(&self) -> Result<Option<ApiUser>> {
        let response = self
            .http_client
            .get(self.url("/me"))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Current user request failed");
                ClientError::Network(e.to_string())
            })?;

        let body: Option<CurrentUserResponse> = read_json(check_status(response).await?).await?;
        debug!(found = body.is_some(), "Fetched current user");
        Ok(body.map(|b| b.user))
    }

    /// `POST /login` - establish a session; the server sets the cookie.
    pub async fn login(&self, request: &LoginRequest) -> Result<ApiUser> {
        let response = self
            .http_client
            .post(self.url("/login"))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Login request failed");
                ClientError::Network(e.to_string())
            })?;

        let body: Option<CurrentUserResponse> = read_json(check_status(response).await?).await?;
        body.map(|b| b.user)
            .ok_or_else(|| ClientError::Parse("Login response had no user".into()))
    }

    /// `POST /logout` - drop the server-side session.
    pub async fn logout(&self) -> Result<()> {
        let response = self
            .http_client
            .post(self.url("/logout"))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Logout request failed");
                ClientError::Network(e.to_string())
            })?;

        check_status(response).await?;
        Ok(())
    }

    /// `GET /user/notifications` - the signed-in user's notifications in
    /// server order. A null body is treated as an empty list.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .get(self.url("/user/notifications"))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Notifications request failed");
                ClientError::Network(e.to_string())
            })?;

        let list: Option<Vec<Notification>> = read_json(check_status(response).await?).await?;
        let list = list.unwrap_or_default();

        debug!(
            count = list.len(),
            duration_ms = start.elapsed().as_millis(),
            "Fetched notifications"
        );
        Ok(list)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!(status = %status, error = %message, "Gallery API error");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let text = response
        .text()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;

    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| ClientError::Parse(format!("Failed to deserialize response: {}", e)))
}
