//! The authenticated transport seam.
//!
//! Everything in this crate talks to the remote service through a
//! [`SessionClient`]. The core never logs in, renews or retries; it hands a
//! fully described [`ApiRequest`] to the session and interprets the
//! [`ApiResponse`] it gets back.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::{ApiError, Result};

pub use reqwest::Method;

/// Which host a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// JSON:API host (groups v2, people v2).
    Api,
    /// Web frontend host, including the legacy v1 JSON endpoints.
    Frontend,
}

/// Request body variants accepted by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(serde_json::Value),
    /// Form-encoded pairs. Keys may repeat (e.g. `types[]`).
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub service: Service,
    pub method: Method,
    /// Path relative to the service base, or an absolute URL (pagination links).
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Ask for an HTML page instead of JSON
    pub html: bool,
}

impl ApiRequest {
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        Self {
            service,
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
            html: false,
        }
    }

    pub fn get(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::GET, path)
    }

    pub fn post(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::POST, path)
    }

    pub fn delete(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_form(mut self, form: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn expect_html(mut self) -> Self {
        self.html = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Value of the `Location` header, if any.
    pub location: Option<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            location: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-2xx response into the matching [`ApiError`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse JSON response: {} (body starts with: {})",
                e,
                &self.body[..floor_char_boundary(&self.body, 200)]
            ))
        })
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Authenticated HTTP transport.
///
/// Implementations return `Err(ApiError::Transport)` for network failures and
/// `Err(ApiError::Unauthorized)` when the session has expired. Any other HTTP
/// status is returned as-is for the caller to interpret.
#[async_trait]
pub trait SessionClient: Send + Sync {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Send a request and fail on any non-2xx status.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.request(request).await?.error_for_status()
    }
}
