//! HTTP client for the sentiment API.
//!
//! [`ApiClient`] owns the retry loop and the per-endpoint timeouts. Use
//! [`ClientBuilder`] to configure and create clients.

use crate::{
    metadata::{Endpoint, RequestMetadata, Timeouts},
    models::{BatchRequest, Health, PredictRequest},
    retry::{RetryOnTransient, RetryPredicate, RetryStrategy},
    Envelope, Error, Response, Result,
};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// A client for the sentiment API.
///
/// Cheap to clone; clones share the connection pool and configuration.
///
/// # Examples
///
/// ```no_run
/// use sentiment_client::{ApiClient, Outcome, Prediction};
///
/// # async fn example() -> Result<(), sentiment_client::Error> {
/// let client = ApiClient::builder()
///     .base_url("http://localhost:8000")?
///     .build()?;
///
/// let health = client.health().await?;
/// println!("Serving {:?}", health.data.model_class);
///
/// let envelope = client.predict_one("J'adore ce produit").await?;
/// if let Outcome::Success(p) = envelope.classify::<Prediction>()? {
///     println!("{} ({:.1}%)", p.sentiment, p.confidence * 100.0);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    retry_strategy: RetryStrategy,
    retry_predicate: Box<dyn RetryPredicate>,
    timeouts: Timeouts,
}

/// A completed HTTP exchange, before it is shaped into a response type.
struct Exchange {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    latency: Duration,
    attempts: usize,
}

impl ApiClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL every endpoint path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// `GET /health`.
    ///
    /// Retried on transport failures; non-2xx statuses are returned as
    /// [`Error::HttpError`].
    pub async fn health(&self) -> Result<Response<Health>> {
        let exchange = self.send::<()>(self.metadata(Endpoint::Health), None).await?;
        Self::into_response(exchange)
    }

    /// `POST /predict_one`.
    ///
    /// Retried on transport failures. Never fails on an HTTP status: the
    /// [`Envelope`] carries it so the caller can tell 200 from 422 from the rest.
    pub async fn predict_one(&self, text: impl Into<String>) -> Result<Envelope> {
        let body = PredictRequest::new(text);
        let exchange = self
            .send(self.metadata(Endpoint::PredictOne), Some(&body))
            .await?;
        Self::into_envelope(Endpoint::PredictOne, exchange)
    }

    /// `POST /explain_lime`.
    ///
    /// Same contract as [`ApiClient::predict_one`]; a 501 status means the
    /// server has no explanation support installed.
    pub async fn explain_lime(&self, text: impl Into<String>) -> Result<Envelope> {
        let body = PredictRequest::new(text);
        let exchange = self
            .send(self.metadata(Endpoint::ExplainLime), Some(&body))
            .await?;
        Self::into_envelope(Endpoint::ExplainLime, exchange)
    }

    /// `POST /predict` with several texts. Not retried; raises on non-2xx.
    pub async fn predict_batch<S>(
        &self,
        texts: impl IntoIterator<Item = S>,
    ) -> Result<Response<serde_json::Value>>
    where
        S: Into<String>,
    {
        let body = BatchRequest {
            texts: texts.into_iter().map(Into::into).collect(),
        };
        let exchange = self
            .send(self.metadata(Endpoint::PredictBatch), Some(&body))
            .await?;
        Self::into_response(exchange)
    }

    /// `POST /explain`. Not retried; raises on non-2xx.
    pub async fn explain(&self, text: impl Into<String>) -> Result<Response<serde_json::Value>> {
        let body = PredictRequest::new(text);
        let exchange = self
            .send(self.metadata(Endpoint::Explain), Some(&body))
            .await?;
        Self::into_response(exchange)
    }

    fn metadata(&self, endpoint: Endpoint) -> RequestMetadata {
        RequestMetadata::new(endpoint, &self.inner.timeouts)
    }

    /// Sends a request, retrying transport failures when the endpoint allows it.
    ///
    /// Any HTTP response, whatever its status, ends the loop.
    async fn send<Req>(&self, metadata: RequestMetadata, body: Option<&Req>) -> Result<Exchange>
    where
        Req: Serialize,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| Error::SerializationFailed(e.to_string()))?;

        let endpoint = metadata.endpoint;
        let start_time = Instant::now();
        let mut attempt = 0;
        let mut earlier_failures = Vec::new();

        loop {
            attempt += 1;

            let error = match self.execute_request(&metadata, body.as_ref(), attempt).await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    let body = response
                        .text()
                        .await
                        .map_err(|e| Error::from_transport(e, metadata.timeout));

                    match body {
                        Ok(body) => {
                            let latency = start_time.elapsed();
                            tracing::info!(
                                endpoint = %endpoint,
                                status = status.as_u16(),
                                latency_ms = latency.as_millis(),
                                attempts = attempt,
                                "Received HTTP response"
                            );
                            return Ok(Exchange {
                                status,
                                headers,
                                body,
                                latency,
                                attempts: attempt,
                            });
                        }
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                endpoint = %endpoint,
                "Request failed"
            );

            let delay = if endpoint.is_retried()
                && self.inner.retry_predicate.should_retry(&error, attempt)
            {
                self.inner.retry_strategy.delay_for_attempt(attempt)
            } else {
                None
            };

            match delay {
                Some(delay) => {
                    tracing::info!(
                        delay_ms = delay.as_millis(),
                        attempt = attempt,
                        "Retrying request after delay"
                    );
                    earlier_failures.push(error.to_string());
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(Error::Communication {
                        attempts: attempt,
                        last_error: Box::new(error),
                        earlier_failures,
                    });
                }
            }
        }
    }

    /// Executes a single attempt.
    async fn execute_request(
        &self,
        metadata: &RequestMetadata,
        body: Option<&serde_json::Value>,
        attempt: usize,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint_url(metadata.endpoint);

        tracing::debug!(
            method = %metadata.endpoint.method(),
            url = %url,
            attempt = attempt,
            timeout_ms = metadata.timeout.as_millis(),
            "Executing HTTP request"
        );

        let mut request = self
            .inner
            .http_client
            .request(metadata.endpoint.method(), url)
            .timeout(metadata.timeout);

        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| Error::from_transport(e, metadata.timeout))
    }

    /// Appends the endpoint path to the base URL, keeping any path prefix.
    fn endpoint_url(&self, endpoint: Endpoint) -> Url {
        let mut url = self.inner.base_url.clone();
        let path = format!(
            "{}{}",
            self.inner.base_url.path().trim_end_matches('/'),
            endpoint.path()
        );
        url.set_path(&path);
        url
    }

    fn into_envelope(endpoint: Endpoint, exchange: Exchange) -> Result<Envelope> {
        let is_json = exchange
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let json = if is_json {
            match serde_json::from_str(&exchange.body) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        raw_response = %exchange.body,
                        "Failed to parse JSON response"
                    );
                    return Err(Error::DeserializationFailed {
                        raw_response: exchange.body,
                        serde_error: e.to_string(),
                        status: exchange.status,
                    });
                }
            }
        } else {
            None
        };

        if !exchange.status.is_success() {
            tracing::warn!(
                endpoint = %endpoint,
                status = exchange.status.as_u16(),
                "Server answered with an error status"
            );
        }

        Ok(Envelope {
            endpoint,
            status: exchange.status,
            json,
            text: exchange.body,
            headers: exchange.headers,
            latency: exchange.latency,
            attempts: exchange.attempts,
        })
    }

    fn into_response<Res>(exchange: Exchange) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let Exchange {
            status,
            headers,
            body,
            latency,
            attempts,
        } = exchange;

        if !status.is_success() {
            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %body,
                    "Client error (4xx)"
                );
            } else if status.is_server_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %body,
                    "Server error (5xx)"
                );
            }

            return Err(Error::HttpError {
                status,
                raw_response: body,
                headers,
            });
        }

        match serde_json::from_str::<Res>(&body) {
            Ok(data) => Ok(Response::new(data, body, status, headers, latency, attempts)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %body,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response: body,
                    serde_error: e.to_string(),
                    status,
                })
            }
        }
    }
}

/// Builder for configuring and creating an [`ApiClient`].
///
/// # Examples
///
/// ```no_run
/// use sentiment_client::{ClientBuilder, RetryStrategy, Timeouts};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), sentiment_client::Error> {
/// let client = ClientBuilder::new()
///     .base_url("http://sentiment.internal:8000")?
///     .timeouts(Timeouts {
///         explain_lime: Duration::from_secs(300),
///         ..Timeouts::default()
///     })
///     .retry_strategy(RetryStrategy::Linear {
///         delay: Duration::from_secs(1),
///         max_retries: 4,
///     })
///     .default_header("User-Agent", "sentiment-cli/0.1")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    retry_strategy: RetryStrategy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    timeouts: Timeouts,
}

impl ClientBuilder {
    /// Creates a builder with the sentiment API defaults: `http://localhost:8000`,
    /// three attempts with a 0.8 s incremental backoff, and the standard timeouts.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            retry_strategy: RetryStrategy::default(),
            retry_predicate: None,
            timeouts: Timeouts::default(),
        }
    }

    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the retry strategy of the retried endpoints.
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default, transport failures are retried ([`RetryOnTransient`]).
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the per-endpoint timeouts.
    pub fn timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Builds the configured client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP stack cannot be initialized.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "Base URL cannot carry a path: {}",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnTransient));

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                retry_strategy: self.retry_strategy,
                retry_predicate,
                timeouts: self.timeouts,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let client = ApiClient::builder().build().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
        assert_eq!(
            client.endpoint_url(Endpoint::Health).as_str(),
            "http://localhost:8000/health"
        );
    }

    #[test]
    fn test_endpoint_url_keeps_path_prefix() {
        let client = ApiClient::builder()
            .base_url("http://example.com/api/v1/")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint_url(Endpoint::ExplainLime).as_str(),
            "http://example.com/api/v1/explain_lime"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::builder().base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::builder()
                .base_url("mailto:ops@example.com")
                .unwrap()
                .build(),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_invalid_default_header() {
        assert!(ApiClient::builder().default_header("bad header", "x").is_err());
    }
}
