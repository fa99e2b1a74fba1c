//! Network utilities: HTTP client, rate limiting, and content parsing.
//!
//! - **HTTP Client**: a global connection-pooled client wrapped per source
//! - **Rate Limiting**: N requests per time window, per source
//! - **Retry Logic**: exponential backoff on transport errors and HTTP 429
//! - **Content Parsing**: HTML selector helpers and JSON/GraphQL decoding
//!
//! # Examples
//!
//! ```rust
//! use multisrc::net::{ClientConfig, HttpClient, RateLimit};
//!
//! # async fn example() -> multisrc::Result<()> {
//! let client = HttpClient::new("my_source")
//!     .with_rate_limit(RateLimit::per_seconds(1, 2)?)
//!     .with_max_retries(3)
//!     .with_header("Referer", "https://example.com/");
//!
//! let html = client.get_text("https://example.com").await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use reqwest::{
    Client, RequestBuilder,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub mod html;
pub mod json;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Global HTTP client instance.
///
/// Per-request settings (user agent, headers, timeout) are applied by
/// [`HttpClient`], so this client only carries pooling and compression.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
});

/// A request budget: at most `permits` request starts within any `period`.
///
/// # Examples
///
/// ```rust
/// use multisrc::net::RateLimit;
/// use std::time::Duration;
///
/// let limit = RateLimit::per_seconds(1, 2).unwrap();
/// assert_eq!(limit.permits(), 1);
/// assert_eq!(limit.period(), Duration::from_secs(2));
///
/// assert!(RateLimit::new(0, Duration::from_secs(1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    permits: u32,
    period: Duration,
}

impl RateLimit {
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) when `permits` or `period` is zero.
    pub fn new(permits: u32, period: Duration) -> crate::Result<Self> {
        if permits == 0 {
            return Err(crate::Error::config("rate limit needs at least one permit"));
        }
        if period.is_zero() {
            return Err(crate::Error::config("rate limit period must be non-zero"));
        }
        Ok(Self { permits, period })
    }

    pub fn per_seconds(permits: u32, seconds: u64) -> crate::Result<Self> {
        Self::new(permits, Duration::from_secs(seconds))
    }

    pub fn per_millis(permits: u32, millis: u64) -> crate::Result<Self> {
        Self::new(permits, Duration::from_millis(millis))
    }

    pub fn permits(&self) -> u32 {
        self.permits
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for RateLimit {
    /// Five requests per second.
    fn default() -> Self {
        Self {
            permits: 5,
            period: Duration::from_secs(1),
        }
    }
}

/// Per-source sliding-window rate limiter.
///
/// Each source id keeps the start instants of its most recent requests. A
/// request may start once fewer than `permits` starts fall inside the last
/// `period`. Clones share the same window state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    limit: RateLimit,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            limit,
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Waits until `source_id` may start a request, then records the start.
    pub async fn acquire(&self, source_id: &str) {
        loop {
            let wait = {
                let mut windows = self.windows.lock();
                let window = windows.entry(source_id.to_string()).or_default();
                let now = Instant::now();

                while let Some(&oldest) = window.front() {
                    if now.duration_since(oldest) >= self.limit.period {
                        window.pop_front();
                    } else {
                        break;
                    }
                }

                if window.len() < self.limit.permits as usize {
                    window.push_back(now);
                    None
                } else {
                    window
                        .front()
                        .map(|&oldest| self.limit.period - now.duration_since(oldest))
                }
            };

            match wait {
                None => return,
                Some(duration) => {
                    log::debug!("[{}] rate limited, waiting {:?}", source_id, duration);
                    tokio::time::sleep(duration).await;
                }
            }
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_rate_limit_permits() -> u32 {
    5
}
fn default_rate_limit_period_ms() -> u64 {
    1000
}
fn default_retry_base_ms() -> u64 {
    1000
}

/// Client settings for one source.
///
/// Site adapters build this in code; it also deserializes from JSON, with
/// every field optional.
///
/// ```rust
/// use multisrc::net::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{ "rate_limit_permits": 1, "rate_limit_period_ms": 2000 }"#,
/// ).unwrap();
/// assert_eq!(config.max_retries, 3);
/// assert_eq!(config.rate_limit().unwrap().permits(), 1);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_rate_limit_permits")]
    pub rate_limit_permits: u32,

    #[serde(default = "default_rate_limit_period_ms")]
    pub rate_limit_period_ms: u64,

    /// Backoff base; retry `n` waits `retry_base_ms * 2^n`.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    pub fn rate_limit(&self) -> crate::Result<RateLimit> {
        RateLimit::per_millis(self.rate_limit_permits, self.rate_limit_period_ms)
    }

    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limit_permits = limit.permits();
        self.rate_limit_period_ms = limit.period().as_millis() as u64;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            rate_limit_permits: default_rate_limit_permits(),
            rate_limit_period_ms: default_rate_limit_period_ms(),
            retry_base_ms: default_retry_base_ms(),
            headers: HashMap::new(),
        }
    }
}

/// HTTP client wrapper with per-source rate limiting and retries.
///
/// Every request waits on the source's [`RateLimiter`] first. Transport
/// errors and HTTP 429 are retried with exponential backoff up to
/// `max_retries` times; other non-success statuses fail immediately.
#[derive(Clone, Debug)]
pub struct HttpClient {
    source_id: String,
    rate_limiter: RateLimiter,
    max_retries: u32,
    retry_base: Duration,
    timeout: Duration,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a client with [`ClientConfig::default()`] settings.
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            rate_limiter: RateLimiter::new(RateLimit::default()),
            max_retries: default_max_retries(),
            retry_base: Duration::from_millis(default_retry_base_ms()),
            timeout: Duration::from_secs(default_timeout_secs()),
            headers: HeaderMap::new(),
        }
        .with_header("User-Agent", DEFAULT_USER_AGENT)
    }

    /// Creates a client from a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) when the configured rate limit is invalid.
    pub fn from_config(source_id: impl Into<String>, config: &ClientConfig) -> crate::Result<Self> {
        let mut client = Self::new(source_id)
            .with_rate_limit(config.rate_limit()?)
            .with_max_retries(config.max_retries)
            .with_retry_base(Duration::from_millis(config.retry_base_ms))
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_header("User-Agent", &config.user_agent);
        for (name, value) in &config.headers {
            client = client.with_header(name, value);
        }
        Ok(client)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limiter.limit()
    }

    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.rate_limiter = RateLimiter::new(limit);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the backoff base: retry `n` waits `base * 2^n`.
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_base.saturating_mul(2_u32.saturating_pow(attempt))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header to all requests. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (name.parse::<HeaderName>(), value.parse::<HeaderValue>()) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => log::warn!("[{}] ignoring invalid header {}", self.source_id, name),
        }
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sends the request built by `build`, retrying as described on the type.
    async fn send<F>(&self, url: &str, build: F) -> crate::Result<Bytes>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempts = 0;

        loop {
            self.rate_limiter.acquire(&self.source_id).await;
            log::debug!("[{}] request {} (attempt {})", self.source_id, url, attempts + 1);

            let request = build(&CLIENT)
                .headers(self.headers.clone())
                .timeout(self.timeout);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.bytes().await?);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.max_retries {
                            attempts += 1;
                            let delay = self.retry_delay(attempts);
                            log::warn!(
                                "[{}] HTTP 429 for {}, retrying in {:?}",
                                self.source_id,
                                url,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }

                        let retry_after = response
                            .headers()
                            .get(reqwest::header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok());

                        return Err(crate::Error::rate_limit(retry_after));
                    }

                    return Err(crate::Error::source(
                        &self.source_id,
                        format!("HTTP {} for {}", status, url),
                    ));
                }
                Err(e) => {
                    if attempts < self.max_retries {
                        attempts += 1;
                        let delay = self.retry_delay(attempts);
                        log::warn!(
                            "[{}] request to {} failed: {}, retrying in {:?}",
                            self.source_id,
                            url,
                            e,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    /// Performs a GET request and returns the body.
    ///
    /// # Errors
    ///
    /// * [`Error::RateLimit`](crate::Error::RateLimit) - If rate limited after retries
    /// * [`Error::Source`](crate::Error::Source) - For HTTP errors (4xx, 5xx)
    /// * [`Error::Network`](crate::Error::Network) - For network/connection errors
    pub async fn get(&self, url: &str) -> crate::Result<Bytes> {
        self.send(url, |client| client.get(url)).await
    }

    /// Performs a GET request and returns the body as UTF-8 text.
    pub async fn get_text(&self, url: &str) -> crate::Result<String> {
        let bytes = self.get(url).await?;
        bytes_to_string(bytes)
    }

    /// Performs a GET request and deserializes the JSON body.
    pub async fn get_json<T>(&self, url: &str) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.get(url).await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    /// Sends a GraphQL query as `GET {endpoint}?query=<urlencoded>` and decodes
    /// `data.<operation>` from the response envelope.
    ///
    /// # Errors
    ///
    /// * [`Error::Api`](crate::Error::Api) - If the response carries an `errors` array
    /// * All errors from [`get()`](HttpClient::get)
    pub async fn get_graphql<T>(&self, endpoint: &str, query: &str, operation: &str) -> crate::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = json::graphql_url(endpoint, query);
        let bytes = self.get(&url).await?;
        json::decode_graphql(&bytes, operation)
    }

    /// POSTs an `application/x-www-form-urlencoded` body and returns the text.
    pub async fn post_form(&self, url: &str, form: &[(&str, &str)], extra: &[(&str, &str)]) -> crate::Result<String> {
        let body = form
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let bytes = self
            .send(url, |client| {
                let mut request = client
                    .post(url)
                    .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(body.clone());
                for (name, value) in extra {
                    request = request.header(*name, *value);
                }
                request
            })
            .await?;
        bytes_to_string(bytes)
    }

    /// POSTs an empty body and returns the text.
    pub async fn post_text(&self, url: &str, extra: &[(&str, &str)]) -> crate::Result<String> {
        let bytes = self
            .send(url, |client| {
                let mut request = client.post(url);
                for (name, value) in extra {
                    request = request.header(*name, *value);
                }
                request
            })
            .await?;
        bytes_to_string(bytes)
    }
}

fn bytes_to_string(bytes: Bytes) -> crate::Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| crate::Error::parse(format!("Invalid UTF-8: {}", e)))
}
