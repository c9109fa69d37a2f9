//! Gateway client for the repurposing backend.
//!
//! Every backend call goes through [`ApiClient::send`], which attaches the
//! stored bearer token and recovers from an expired access token by
//! refreshing it once. Callers never deal with token expiry themselves.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::SessionContext;
use crate::storage::ACCESS_TOKEN_KEY;

use super::request::{PendingRequest, RequestBody};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when nothing else is configured (local development server).
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Refresh endpoint. Called directly, never through the gateway.
const REFRESH_PATH: &str = "/api/auth/refresh";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How concurrent 401s share token refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Each failing request refreshes on its own. Two requests that fail
    /// together issue two refresh calls.
    #[default]
    PerRequest,
    /// Refreshes are serialized; a request that waited behind another
    /// refresh reuses the token it produced.
    SingleFlight,
}

impl RefreshPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "per_request" => Some(RefreshPolicy::PerRequest),
            "single_flight" => Some(RefreshPolicy::SingleFlight),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// API client for the repurposing backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and clones share the session and refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
    policy: RefreshPolicy,
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client with the default transport timeout
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Result<Self, ApiError> {
        Self::with_timeout(
            base_url,
            session,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        session: SessionContext,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(client, base_url, session))
    }

    /// Build around an existing `reqwest::Client`, sharing its connection pool.
    pub fn with_http_client(
        client: Client,
        base_url: impl Into<String>,
        session: SessionContext,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            session,
            policy: RefreshPolicy::default(),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.policy
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Gateway =====

    /// Send a request described by its parts. See [`ApiClient::send`].
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        params: &[(&str, String)],
    ) -> Result<Response, ApiError> {
        let mut pending = PendingRequest::new(method, path);
        if let Some(body) = body {
            pending = pending.json(body)?;
        }
        for (name, value) in params {
            pending = pending.param(*name, value);
        }
        self.send(pending).await
    }

    /// Dispatch a request, refreshing the access token once on 401.
    ///
    /// - 401 with a stored refresh token: refresh, store the new access
    ///   token, resend once with it and return that outcome. A second 401
    ///   is returned as `Unauthorized`.
    /// - 401 and the refresh fails: all stored session data is cleared, the
    ///   navigator is sent to the login route, and `SessionExpired` is
    ///   returned.
    /// - 401 with no refresh token: returned as `Unauthorized`.
    /// - Anything else is passed through as-is. Nothing else is retried.
    pub async fn send(&self, mut pending: PendingRequest) -> Result<Response, ApiError> {
        pending.validate()?;

        let token = self.session.access_token()?;
        let response = self.dispatch(&pending, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || pending.is_retried() {
            return Self::check_response(response).await;
        }
        pending.mark_retried();

        let refresh_token = match self.session.refresh_token()? {
            Some(t) => t,
            None => {
                debug!(path = %pending.path, "401 without refresh token");
                return Self::check_response(response).await;
            }
        };

        let new_token = self
            .recover_access_token(token.as_deref(), &refresh_token)
            .await?;

        debug!(path = %pending.path, "Resending request with refreshed token");
        let response = self.dispatch(&pending, Some(&new_token)).await?;
        Self::check_response(response).await
    }

    /// Obtain a usable access token after a 401. When that is impossible
    /// the session is ended and `SessionExpired` returned.
    async fn recover_access_token(
        &self,
        failed_token: Option<&str>,
        refresh_token: &str,
    ) -> Result<String, ApiError> {
        match self.policy {
            RefreshPolicy::PerRequest => self.refresh_or_end_session(refresh_token).await,
            RefreshPolicy::SingleFlight => {
                // Held until the session is either refreshed or ended
                let _guard = self.refresh_lock.lock().await;

                // Someone else refreshed while we waited
                if let Some(current) = self.session.access_token()? {
                    if failed_token != Some(current.as_str()) {
                        debug!("Reusing access token refreshed by a concurrent request");
                        return Ok(current);
                    }
                }

                match self.session.refresh_token()? {
                    Some(latest) => self.refresh_or_end_session(&latest).await,
                    // A concurrent refresh failure already ended the session
                    None => Err(ApiError::SessionExpired),
                }
            }
        }
    }

    async fn refresh_or_end_session(&self, refresh_token: &str) -> Result<String, ApiError> {
        match self.refresh(refresh_token).await {
            Ok(token) => Ok(token),
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.session.end_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Exchange a refresh token for a new access token and store it.
    ///
    /// Goes straight to the transport: no bearer header, no 401 handling.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse refresh response: {}", e)))?;

        self.session
            .storage()
            .set(ACCESS_TOKEN_KEY, &body.access_token)?;
        info!("Access token refreshed");
        Ok(body.access_token)
    }

    fn auth_headers(token: Option<&str>) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("Stored access token is not a valid header value".to_string()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn dispatch(
        &self,
        pending: &PendingRequest,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        debug!(
            method = %pending.method,
            path = %pending.path,
            retried = pending.is_retried(),
            authenticated = token.is_some(),
            "Dispatching request"
        );

        let mut builder = self
            .client
            .request(pending.method.clone(), self.url(&pending.path))
            .headers(Self::auth_headers(token)?);

        if !pending.params.is_empty() {
            builder = builder.query(&pending.params);
        }

        builder = match pending.body {
            Some(RequestBody::Json(ref value)) => builder.json(value),
            Some(RequestBody::Multipart(ref upload)) => builder.multipart(upload.to_form()?),
            None => builder,
        };

        Ok(builder.send().await?)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Request failed");
            Err(ApiError::from_status(status, &body))
        }
    }

    // ===== Typed helpers =====

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .request::<()>(Method::GET, path, None, params)
            .await?;
        Self::decode(response, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::POST, path, Some(body), &[]).await?;
        Self::decode(response, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::PUT, path, Some(body), &[]).await?;
        Self::decode(response, path).await
    }

    /// Send a multipart upload and decode the JSON reply.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        upload: super::MultipartUpload,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut pending = PendingRequest::new(Method::POST, path).multipart(upload);
        for (name, value) in params {
            pending = pending.param(*name, value);
        }
        let response = self.send(pending).await?;
        Self::decode(response, path).await
    }

    /// DELETE a resource. The body of the reply (usually empty) is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request::<()>(Method::DELETE, path, None, &[]).await?;
        Ok(())
    }
}
