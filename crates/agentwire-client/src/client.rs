//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{ControlApi, RunsApi};
use crate::error::{Error, ErrorResponse, Result};
use crate::stream::EventStream;
use crate::types::{Checkpoint, RunInput};

/// Environment variable selecting the agent service base URL.
pub const AGENT_URL_ENV: &str = "AGENT_URL";

/// Environment variable overriding the tenant routing identifier.
pub const TENANT_ID_ENV: &str = "AGENT_TENANT_ID";

/// Header carrying the tenant routing identifier.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant identifier sent when none is configured.
pub const DEFAULT_TENANT_ID: &str = "f436cc35-e7af-411d-b4b0-63d3ee183523";

/// Route that accepts run inputs and answers with an event stream.
pub const DEFAULT_DISPATCH_ROUTE: &str = "agent";

/// Default timeout for control requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout, applied to every request including streams.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Agent service client.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Example
///
/// ```no_run
/// use agentwire_client::AgentClient;
///
/// # async fn example() -> agentwire_client::Result<()> {
/// let client = AgentClient::builder()
///     .base_url("http://localhost:8000")
///     .build()?;
///
/// let history = client.get_history::<serde_json::Value, serde_json::Value>("thread-1").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AgentClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Resolved dispatch URL.
    pub(crate) dispatch_url: Url,
    /// Tenant routing identifier.
    pub(crate) tenant_id: String,
    /// Control request timeout.
    pub(crate) timeout: Duration,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("dispatch_url", &self.inner.dispatch_url.as_str())
            .field("tenant_id", &self.inner.tenant_id)
            .finish()
    }
}

impl AgentClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client configured from `AGENT_URL` (and `AGENT_TENANT_ID`).
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env()?.build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Get the URL run inputs are posted to.
    pub fn dispatch_url(&self) -> &Url {
        &self.inner.dispatch_url
    }

    /// Get the tenant routing identifier.
    pub fn tenant_id(&self) -> &str {
        &self.inner.tenant_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the run streaming API.
    pub fn runs(&self) -> RunsApi {
        RunsApi::new(self.clone())
    }

    /// Access the control API (history, stop).
    pub fn control(&self) -> ControlApi {
        ControlApi::new(self.clone())
    }

    /// Start, resume, fork or replay a run and stream its events.
    pub async fn stream_run<S, R>(&self, input: &RunInput<S, R>) -> Result<EventStream>
    where
        S: Serialize,
        R: Serialize,
    {
        self.runs().stream(input).await
    }

    /// Fetch the checkpoint history of a thread.
    pub async fn get_history<S, I>(&self, thread_id: &str) -> Result<Vec<Checkpoint<S, I>>>
    where
        S: DeserializeOwned,
        I: DeserializeOwned,
    {
        self.control().history(thread_id).await
    }

    /// Ask the service to stop a running thread.
    pub async fn stop_agent(&self, thread_id: &str) -> Result<()> {
        self.control().stop(thread_id).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Make a GET request with query parameters.
    ///
    /// Non-success statuses are turned into an error by `on_error`.
    pub(crate) async fn get_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        on_error: fn(u16, String) -> Error,
        fallback: &str,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        let response = Self::check_status(response, on_error, fallback).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Make a POST request whose success body is ignored.
    pub(crate) async fn post_no_content<B>(
        &self,
        path: &str,
        body: &B,
        on_error: fn(u16, String) -> Error,
        fallback: &str,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        Self::check_status(response, on_error, fallback).await?;
        Ok(())
    }

    /// POST to the dispatch route and hand back the open response.
    ///
    /// No overall timeout: runs stream for as long as the agent works.
    pub(crate) async fn post_stream<B>(&self, body: &B) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .inner
            .http
            .post(self.inner.dispatch_url.clone())
            .json(body)
            .send()
            .await?;

        Self::check_status(
            response,
            |status, detail| Error::Request { status, detail },
            "Failed to call agent route",
        )
        .await
    }

    /// Pass successful responses through; turn failures into an error
    /// carrying the server's `detail` text.
    async fn check_status(
        response: reqwest::Response,
        on_error: fn(u16, String) -> Error,
        fallback: &str,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let detail = ErrorResponse::detail_from_body(&body).unwrap_or_else(|| fallback.to_string());
        tracing::debug!(status, %detail, "request failed");
        Err(on_error(status, detail))
    }
}

/// Builder for creating an [`AgentClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    tenant_id: String,
    dispatch_route: String,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            dispatch_route: DEFAULT_DISPATCH_ROUTE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Create a builder from the process environment.
    ///
    /// `AGENT_URL` is required; `AGENT_TENANT_ID` is optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a builder from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(AGENT_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{AGENT_URL_ENV} is not set")))?;

        let mut builder = Self::new().base_url(base_url);
        if let Some(tenant) = lookup(TENANT_ID_ENV).filter(|v| !v.trim().is_empty()) {
            builder = builder.tenant_id(tenant);
        }
        Ok(builder)
    }

    /// Set the base URL for the agent service.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the tenant routing identifier.
    pub fn tenant_id(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_id = tenant.into();
        self
    }

    /// Set the route (relative to the base URL) run inputs are posted to.
    pub fn dispatch_route(mut self, route: impl Into<String>) -> Self {
        self.dispatch_route = route.into();
        self
    }

    /// Set the control request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AgentClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let dispatch_url = base_url.join(self.dispatch_route.trim_start_matches('/'))?;

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let tenant = HeaderValue::from_str(&self.tenant_id)
            .map_err(|_| Error::Config("Invalid tenant id".to_string()))?;
        headers.insert(HeaderName::from_static(TENANT_HEADER), tenant);

        // Build HTTP client
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("agentwire-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .connect_timeout(self.connect_timeout)
            .build()?;

        Ok(AgentClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                dispatch_url,
                tenant_id: self.tenant_id,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
