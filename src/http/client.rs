//! HTTP client with status classification, retries and optional rate limiting
//!
//! Every attempt first passes through the configured [`RateLimit`]. The
//! response status is then classified with [`HttpConfig`]:
//! - success codes return the response
//! - retry codes are retried with a delay (`Retry-After` or the configured
//!   delay for 429, exponential backoff otherwise)
//! - anything else fails immediately with [`HttpError::Status`]
//!
//! Network errors are retried like retryable statuses.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Method, Request, Response, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{Config, HttpConfig};
use crate::http::error::HttpError;
use crate::http::rate_limit::{RateLimit, SlidingWindowLimiter};

pub struct HttpClient {
    client: reqwest::Client,
    config: HttpConfig,
    rate_limiter: Option<Arc<dyn RateLimit>>,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        info!("HTTP client initialized");

        Ok(Self {
            client,
            config,
            rate_limiter: None,
        })
    }

    /// Build the client and, if configured, its sliding-window rate limiter
    pub fn from_config(config: &Config) -> Result<Self, HttpError> {
        let client = Self::new(config.http.clone())?;
        Ok(match &config.rate_limit {
            Some(rate_limit) => {
                client.with_rate_limiter(Arc::new(SlidingWindowLimiter::from_config(rate_limit)))
            }
            None => client,
        })
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimit>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// GET `url` with query parameters appended
    pub async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<Response, HttpError> {
        self.get_with_headers(url, params, &IndexMap::new()).await
    }

    /// GET with extra headers that override the configured ones
    pub async fn get_with_headers(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &IndexMap<String, String>,
    ) -> Result<Response, HttpError> {
        let url = request_url(url, params)?;
        let request = self
            .client
            .request(Method::GET, url)
            .headers(self.header_map(headers)?)
            .build()?;
        self.send(request).await
    }

    /// POST a JSON body
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Response, HttpError> {
        let request = self
            .client
            .request(Method::POST, url)
            .headers(self.header_map(&IndexMap::new())?)
            .json(body)
            .build()?;
        self.send(request).await
    }

    /// POST a raw body
    pub async fn post_body(
        &self,
        url: &str,
        body: impl Into<Vec<u8>>,
    ) -> Result<Response, HttpError> {
        let request = self
            .client
            .request(Method::POST, url)
            .headers(self.header_map(&IndexMap::new())?)
            .body(body.into())
            .build()?;
        self.send(request).await
    }

    /// Send a prepared request through the retry loop.
    ///
    /// The request body must be cloneable (not a stream) because every retry
    /// sends a fresh copy.
    pub async fn send(&self, request: Request) -> Result<Response, HttpError> {
        let attempts = self.config.max_retries.max(1);
        let url = request.url().to_string();
        let mut last_error = None;

        for attempt in 0..attempts {
            let Some(attempt_request) = request.try_clone() else {
                return Err(HttpError::Config(format!(
                    "request body for {} cannot be retried",
                    url
                )));
            };

            if let Some(rate_limiter) = &self.rate_limiter {
                rate_limiter.acquire().await;
            }

            let delay = match self.client.execute(attempt_request).await {
                Ok(response) => {
                    let status = response.status();
                    if self.config.is_success(status.as_u16()) {
                        debug!("{} {} -> {}", request.method(), url, status);
                        return Ok(response);
                    }

                    log_status(status, &url);
                    if !self.config.is_retryable(status.as_u16()) {
                        return Err(HttpError::Status {
                            status: status.as_u16(),
                            url,
                        });
                    }

                    let delay = self.retry_delay(&response, attempt);
                    last_error = Some(HttpError::Status {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                    delay
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Network error requesting {}", url);
                    last_error = Some(HttpError::Request(e));
                    self.backoff(attempt)
                }
            };

            if attempt + 1 < attempts {
                debug!("Retrying {} in {:?}", url, delay);
                tokio::time::sleep(delay).await;
            }
        }

        error!("HTTP request to {} failed after {} attempts", url, attempts);
        Err(HttpError::RetriesExhausted {
            url: url.clone(),
            attempts,
            source: Box::new(last_error.unwrap_or(HttpError::Status { status: 0, url })),
        })
    }

    /// Consume the client; its connection pool is dropped with it
    pub fn close(self) {
        info!("HTTP client closed");
    }

    fn header_map(&self, request: &IndexMap<String, String>) -> Result<HeaderMap, HttpError> {
        self.config
            .merge_headers(request)
            .iter()
            .map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| HttpError::Config(format!("header name {:?}: {}", name, e)))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| HttpError::Config(format!("header value for {}: {}", name, e)))?;
                Ok((name, value))
            })
            .collect()
    }

    fn retry_delay(&self, response: &Response, attempt: u32) -> Duration {
        if response.status() != StatusCode::TOO_MANY_REQUESTS {
            return self.backoff(attempt);
        }
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.rate_limited_delay())
    }

    /// `retry_delay * 2^attempt`
    fn backoff(&self, attempt: u32) -> Duration {
        self.config
            .retry_delay()
            .saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Parse `url`, appending `params` only when there are any
fn request_url(url: &str, params: &[(&str, &str)]) -> Result<Url, HttpError> {
    let mut parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !params.is_empty() {
        parsed.query_pairs_mut().extend_pairs(params);
    }
    Ok(parsed)
}

fn log_status(status: StatusCode, url: &str) {
    match status.as_u16() {
        300..=399 => info!("Redirect {} from {}", status, url),
        401 => error!("Authentication error ({}): check credentials for {}", status, url),
        403 => error!("Forbidden ({}): access denied to {}", status, url),
        404 => error!("Not found ({}): {} does not exist", status, url),
        429 => warn!("Rate limited ({}): too many requests to {}", status, url),
        400..=499 => error!("Client error {} from {}", status, url),
        500..=599 => error!("Server error {} from {}", status, url),
        _ => warn!("Unexpected status {} from {}", status, url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::rate_limit::MockRateLimit;
    use mockito::{Matcher, Server};
    use rstest::rstest;
    use serde_json::json;

    fn fast_config() -> HttpConfig {
        HttpConfig {
            retry_delay_ms: 1,
            rate_limited_delay_ms: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn get_returns_response_on_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/versions")
            .match_query(Matcher::UrlEncoded("package".into(), "serde".into()))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = HttpClient::new(fast_config()).unwrap();
        let response = client
            .get(&format!("{}/versions", server.url()), &[("package", "serde")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn get_without_params_requests_plain_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/plain")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(fast_config()).unwrap();
        let response = client
            .get(&format!("{}/plain", server.url()), &[])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.url().as_str(), format!("{}/plain", server.url()));
    }

    #[rstest]
    #[case("http://localhost/versions", &[], "http://localhost/versions")]
    #[case("http://localhost/versions?page=2", &[], "http://localhost/versions?page=2")]
    #[case(
        "http://localhost/versions",
        &[("package", "serde"), ("tag", "a b")],
        "http://localhost/versions?package=serde&tag=a+b"
    )]
    fn request_url_appends_only_given_params(
        #[case] url: &str,
        #[case] params: &[(&str, &str)],
        #[case] expected: &str,
    ) {
        assert_eq!(request_url(url, params).unwrap().as_str(), expected);
    }

    #[tokio::test]
    async fn get_retries_retryable_status_then_succeeds() {
        let mut server = Server::new_async().await;
        let unavailable = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/flaky")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(fast_config()).unwrap();
        let response = client
            .get(&format!("{}/flaky", server.url()), &[])
            .await
            .unwrap();

        unavailable.assert_async().await;
        ok.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_fails_immediately_on_non_retryable_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(fast_config()).unwrap();
        let result = client.get(&format!("{}/missing", server.url()), &[]).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(HttpError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn get_gives_up_after_max_retries() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/down")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let client = HttpClient::new(fast_config()).unwrap();
        let result = client.get(&format!("{}/down", server.url()), &[]).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            HttpError::RetriesExhausted { attempts: 3, .. }
        ));
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn get_honors_retry_after_on_too_many_requests() {
        let mut server = Server::new_async().await;
        let limited = server
            .mock("GET", "/limited")
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/limited")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        // Without Retry-After this would wait the full default delay
        let config = HttpConfig {
            retry_delay_ms: 1,
            ..Default::default()
        };
        let client = HttpClient::new(config).unwrap();
        let response = client
            .get(&format!("{}/limited", server.url()), &[])
            .await
            .unwrap();

        limited.assert_async().await;
        ok.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_sends_configured_and_request_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/headers")
            .match_header("x-api-key", "secret")
            .match_header("accept", "application/json")
            .with_status(200)
            .create_async()
            .await;

        let config = HttpConfig {
            headers: IndexMap::from([
                ("X-Api-Key".to_string(), "secret".to_string()),
                ("Accept".to_string(), "*/*".to_string()),
            ]),
            ..fast_config()
        };
        let client = HttpClient::new(config).unwrap();
        let headers = IndexMap::from([("accept".to_string(), "application/json".to_string())]);
        client
            .get_with_headers(&format!("{}/headers", server.url()), &[], &headers)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_rejects_invalid_header_name() {
        let config = HttpConfig {
            headers: IndexMap::from([("bad header".to_string(), "x".to_string())]),
            ..fast_config()
        };
        let client = HttpClient::new(config).unwrap();

        let result = client.get("http://127.0.0.1:1/", &[]).await;

        assert!(matches!(result, Err(HttpError::Config(_))));
    }

    #[tokio::test]
    async fn get_rejects_invalid_url() {
        let client = HttpClient::new(fast_config()).unwrap();

        let result = client.get("not a url", &[]).await;

        assert!(matches!(result, Err(HttpError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn post_json_sends_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/check")
            .match_body(Matcher::Json(json!({ "version": "1.2.*" })))
            .with_status(201)
            .create_async()
            .await;

        let client = HttpClient::new(fast_config()).unwrap();
        let response = client
            .post_json(&format!("{}/check", server.url()), &json!({ "version": "1.2.*" }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn post_body_is_resent_on_retry() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("POST", "/upload")
            .match_body("payload")
            .with_status(502)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("POST", "/upload")
            .match_body("payload")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(fast_config()).unwrap();
        client
            .post_body(&format!("{}/upload", server.url()), "payload")
            .await
            .unwrap();

        failing.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn send_acquires_rate_limiter_once_per_attempt() {
        let mut server = Server::new_async().await;
        let unavailable = server
            .mock("GET", "/limited")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/limited")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let mut rate_limiter = MockRateLimit::new();
        rate_limiter.expect_acquire().times(2).returning(|| ());

        let client = HttpClient::new(fast_config())
            .unwrap()
            .with_rate_limiter(Arc::new(rate_limiter));
        client
            .get(&format!("{}/limited", server.url()), &[])
            .await
            .unwrap();

        unavailable.assert_async().await;
        ok.assert_async().await;
    }

    #[test]
    fn from_config_installs_rate_limiter_when_configured() {
        let config =
            Config::from_json_str(r#"{ "rate_limit": { "max_calls": 2, "period_ms": 1000 } }"#)
                .unwrap();

        let client = HttpClient::from_config(&config).unwrap();

        assert!(client.rate_limiter.is_some());
        assert_eq!(client.config(), &config.http);
        client.close();
    }

    #[test]
    fn backoff_doubles_each_attempt() {
        let client = HttpClient::new(HttpConfig::default()).unwrap();

        assert_eq!(client.backoff(0), Duration::from_millis(1_000));
        assert_eq!(client.backoff(1), Duration::from_millis(2_000));
        assert_eq!(client.backoff(3), Duration::from_millis(8_000));
    }
}
