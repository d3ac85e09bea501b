//! Retrying HTTP client for the SOAP endpoint
//!
//! Each request gets `max_attempts` tries. A try is repeated only when it hit
//! a timeout, failed to connect, or came back 429 / 502 / 503 / 504. Every
//! other outcome, a plain 500 carrying a SOAP fault included, goes straight
//! back to the caller.

use std::time::Duration;

use mcreport_domain::{HttpConfig, McReportError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::errors::InfraError;

/// Exponent cap for the backoff doubling.
const MAX_BACKOFF_DOUBLINGS: u32 = 8;

/// Attempt budget and backoff for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_backoff }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_backoff_ms))
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Pause after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let doublings = u32::try_from(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX)
            .min(MAX_BACKOFF_DOUBLINGS);
        self.base_backoff.saturating_mul(1 << doublings)
    }
}

/// Why an attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transient {
    Status(StatusCode),
    Timeout,
    Connect,
}

fn transient_status(status: StatusCode) -> Option<Transient> {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
    .then_some(Transient::Status(status))
}

fn transient_error(err: &reqwest::Error) -> Option<Transient> {
    if err.is_timeout() {
        Some(Transient::Timeout)
    } else if err.is_connect() {
        Some(Transient::Connect)
    } else {
        None
    }
}

/// reqwest client paired with a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Start a client from the HTTP section of the configuration.
    pub fn from_config(config: &HttpConfig) -> HttpClientBuilder {
        HttpClientBuilder {
            timeout: Duration::from_secs(config.timeout_secs),
            policy: RetryPolicy::from_config(config),
            use_system_proxy: config.use_system_proxy,
            user_agent: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.inner.post(url)
    }

    /// Send `request`, repeating transient failures per the policy.
    ///
    /// After the last attempt the final response is returned as-is, even
    /// with a transient status; the final transport error is converted into
    /// `McReportError`.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 1;

        loop {
            let replay = request.try_clone().ok_or_else(|| {
                McReportError::Internal("request body is streamed and cannot be replayed".into())
            })?;

            let outcome = replay.send().await;
            let transient = match &outcome {
                Ok(response) => transient_status(response.status()),
                Err(err) => transient_error(err),
            };

            match transient {
                Some(reason) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    debug!(attempt, ?reason, ?delay, "transient HTTP failure, retrying");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                _ => {
                    return outcome.map_err(|err| McReportError::from(InfraError::from(err)));
                }
            }
        }
    }
}

/// Connection options applied when the client is built.
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    use_system_proxy: bool,
    user_agent: Option<String>,
    headers: HeaderMap,
}

impl HttpClientBuilder {
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Header sent with every request.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder =
            reqwest::Client::builder().timeout(self.timeout).default_headers(self.headers);

        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let inner = builder.build().map_err(|err| McReportError::from(InfraError::from(err)))?;
        Ok(HttpClient { inner, policy: self.policy })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::header::CONTENT_TYPE;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn local_config(max_attempts: usize) -> HttpConfig {
        HttpConfig { timeout_secs: 5, max_attempts, base_backoff_ms: 1, use_system_proxy: false }
    }

    fn client(max_attempts: usize) -> HttpClient {
        HttpClient::from_config(&local_config(max_attempts)).build().expect("http client")
    }

    fn url(server: &MockServer) -> Url {
        Url::parse(&server.uri()).expect("mock server url")
    }

    #[tokio::test]
    async fn gateway_statuses_are_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
            .mount(&server)
            .await;

        let client = client(3);
        let response = client.send(client.post(url(&server)).body("<envelope/>")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn fault_status_is_returned_after_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<Fault/>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(3);
        let response = client.send(client.post(url(&server))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.text().await.unwrap(), "<Fault/>");
    }

    #[tokio::test]
    async fn last_transient_response_is_handed_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(2);
        let response = client.send(client.post(url(&server))).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn refused_connection_becomes_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(2);
        let target = Url::parse(&format!("http://{addr}/Service.asmx")).unwrap();
        let err = client.send(client.post(target)).await.unwrap_err();

        assert!(matches!(err, McReportError::Network(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn configured_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", "text/xml"))
            .and(header("user-agent", "mcreport-test"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::from_config(&local_config(1))
            .user_agent("mcreport-test")
            .header(CONTENT_TYPE, HeaderValue::from_static("text/xml"))
            .build()
            .unwrap();

        let response = client.send(client.post(url(&server))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));

        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
        assert_eq!(policy.delay_after(50), Duration::from_millis(100 * 256));
    }

    #[test]
    fn policy_always_allows_one_attempt() {
        let config = HttpConfig { max_attempts: 0, ..HttpConfig::default() };
        assert_eq!(RetryPolicy::from_config(&config).max_attempts(), 1);
        assert_eq!(
            HttpClient::from_config(&config).build().unwrap().policy().max_attempts(),
            1
        );
    }
}
