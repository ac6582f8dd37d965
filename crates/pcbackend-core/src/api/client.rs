//! reqwest-backed [`SessionClient`] implementation.
//!
//! Authenticates with a Planning Center personal access token (HTTP basic
//! auth, application id + secret) and keeps the cookies the web frontend
//! hands out. Frontend writes are sent as AJAX requests carrying a CSRF
//! token scraped from the `csrf-token` meta tag; the token is cached briefly
//! and re-fetched once when a write is refused.
//!
//! Redirects are never followed. The frontend answers an expired session
//! with a redirect to its login page, which surfaces as `Unauthorized`.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, redirect, Client};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::error::{ApiError, Result};
use super::paths;
use super::session::{ApiRequest, ApiResponse, Method, RequestBody, Service, SessionClient};
use crate::config::Config;

/// How long a scraped CSRF token is reused
const CSRF_TOKEN_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
struct CsrfToken {
    value: String,
    fetched_at: Instant,
}

impl CsrfToken {
    fn new(value: String) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < CSRF_TOKEN_TTL
    }
}

/// HTTP session for the Planning Center API and web frontend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and clones share the cookie jar and the cached CSRF token.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    api_base_url: String,
    frontend_base_url: String,
    credentials: Option<Credentials>,
    csrf_token: Arc<Mutex<Option<CsrfToken>>>,
}

impl HttpSession {
    /// Create a new unauthenticated session from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            frontend_base_url: config.frontend_base_url.trim_end_matches('/').to_string(),
            credentials: None,
            csrf_token: Arc::new(Mutex::new(None)),
        })
    }

    /// Attach personal access token credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Seed the CSRF token sent with frontend writes
    pub fn set_csrf_token(&self, token: String) {
        *self.lock_csrf() = Some(CsrfToken::new(token));
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    fn lock_csrf(&self) -> std::sync::MutexGuard<'_, Option<CsrfToken>> {
        self.csrf_token.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn url_for(&self, service: Service, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = match service {
            Service::Api => &self.api_base_url,
            Service::Frontend => &self.frontend_base_url,
        };
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn headers_for(&self, request: &ApiRequest, csrf: Option<&str>) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();

        if is_frontend_write(request) {
            // the frontend only answers AJAX-style writes with this accept header
            headers.insert(header::ACCEPT, header::HeaderValue::from_static("text/javascript"));
            headers.insert(
                "x-requested-with",
                header::HeaderValue::from_static("XMLHttpRequest"),
            );
            if let Some(token) = csrf {
                let value = header::HeaderValue::from_str(token).map_err(|e| {
                    ApiError::InvalidValue(format!("CSRF token is not a valid header: {}", e))
                })?;
                headers.insert("x-csrf-token", value);
            }
        } else if request.html {
            headers.insert(header::ACCEPT, header::HeaderValue::from_static("text/html"));
        } else {
            headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }

    /// Cached CSRF token, scraped from the frontend when missing or stale
    async fn csrf_token(&self, force_refresh: bool) -> Result<String> {
        if !force_refresh {
            let cached = self
                .lock_csrf()
                .as_ref()
                .filter(|t| t.is_fresh())
                .map(|t| t.value.clone());
            if let Some(value) = cached {
                return Ok(value);
            }
        }

        let page = ApiRequest::get(Service::Frontend, paths::FRONTEND_GROUPS).expect_html();
        let response = self.execute(&page, None).await?.error_for_status()?;
        let value = parse_csrf_token(&response.body)?.ok_or_else(|| {
            ApiError::InvalidResponse("frontend page has no csrf-token meta tag".to_string())
        })?;
        debug!("Fetched CSRF token");
        *self.lock_csrf() = Some(CsrfToken::new(value.clone()));
        Ok(value)
    }

    /// Send one request as-is, without CSRF handling or retries
    async fn execute(&self, request: &ApiRequest, csrf: Option<&str>) -> Result<ApiResponse> {
        let url = self.url_for(request.service, &request.path);
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.headers_for(request, csrf)?);

        if let Some(ref credentials) = self.credentials {
            builder = builder.basic_auth(&credentials.app_id, Some(&credentials.secret));
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::None => builder,
            RequestBody::Json(ref body) => builder.json(body),
            RequestBody::Form(ref pairs) => builder.form(pairs),
        };

        let response = builder.send().await?;
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        debug!(status = %status, url = %url, "Response received");

        if status.as_u16() == 401 {
            return Err(ApiError::Unauthorized);
        }
        if status.is_redirection() && location.as_deref().is_some_and(is_login_redirect) {
            warn!(url = %url, "Redirected to login, session expired");
            return Err(ApiError::Unauthorized);
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            location,
            body,
        })
    }
}

fn is_frontend_write(request: &ApiRequest) -> bool {
    request.service == Service::Frontend && request.method != Method::GET
}

fn is_login_redirect(location: &str) -> bool {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    path.contains("/login") || path.contains("/sign_in")
}

/// Value of the `csrf-token` meta tag, if the page has one
fn parse_csrf_token(html: &str) -> Result<Option<String>> {
    let selector = Selector::parse(r#"meta[name="csrf-token"]"#)
        .map_err(|e| ApiError::InvalidResponse(format!("invalid selector: {:?}", e)))?;
    Ok(Html::parse_document(html)
        .select(&selector)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(str::to_string))
}

#[async_trait]
impl SessionClient for HttpSession {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse> {
        if !is_frontend_write(&request) {
            return self.execute(&request, None).await;
        }

        let token = self.csrf_token(false).await?;
        let response = self.execute(&request, Some(&token)).await?;
        if !matches!(response.status, 403 | 422) {
            return Ok(response);
        }

        // a refused write may just mean the cached token went stale
        debug!(status = response.status, "Write refused, retrying with a fresh CSRF token");
        let token = self.csrf_token(true).await?;
        self.execute(&request, Some(&token)).await
    }
}
