//! Error types for calls to the sentiment API.
//!
//! Two families matter to callers: communication failures (the server could
//! not be reached, even after retries) and HTTP errors (the server answered
//! with a non-2xx status). [`Error::is_communication`] tells them apart.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// The main error type for sentiment API calls.
///
/// # Examples
///
/// ```no_run
/// use sentiment_client::{ApiClient, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = ApiClient::builder().build()?;
///
/// match client.health().await {
///     Ok(health) => println!("model: {:?}", health.data.model_class),
///     Err(Error::Communication { attempts, .. }) => {
///         eprintln!("server unreachable after {} attempts", attempts);
///     }
///     Err(Error::HttpError { status, raw_response, .. }) => {
///         eprintln!("HTTP error {}: {}", status, raw_response);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A single attempt failed at the network layer (connection refused,
    /// DNS failure, broken connection).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// A single attempt exceeded its per-endpoint timeout.
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that applied to the attempt
        timeout: Duration,
    },

    /// The server could not be reached.
    ///
    /// Returned once the retry budget is spent (or immediately for endpoints
    /// that are not retried). `earlier_failures` holds the messages of the
    /// attempts that were swallowed before the last one.
    #[error("Communication failed after {attempts} attempt(s): {last_error}")]
    Communication {
        /// The number of attempts made
        attempts: usize,
        /// The failure of the final attempt
        last_error: Box<Error>,
        /// Messages of the earlier failed attempts, oldest first
        earlier_failures: Vec<String>,
    },

    /// The server returned a non-2xx HTTP status on an endpoint that raises.
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// The response body could not be deserialized into the expected type.
    ///
    /// The raw body is kept so the payload can be inspected.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Invalid client configuration (bad header, unusable HTTP stack).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The request body could not be serialized.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid base URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Classifies a `reqwest` failure that happened while sending a request.
    pub(crate) fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Error::Timeout { timeout }
        } else {
            Error::Network(error)
        }
    }

    /// Returns `true` for failures at the transport layer.
    ///
    /// These are the only failures the client ever retries. HTTP error
    /// statuses are answers from the server, not transport failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use sentiment_client::Error;
    /// use http::StatusCode;
    /// use std::time::Duration;
    ///
    /// let err = Error::Timeout { timeout: Duration::from_secs(10) };
    /// assert!(err.is_transient());
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     raw_response: "down".to_string(),
    ///     headers: http::HeaderMap::new(),
    /// };
    /// assert!(!err.is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Timeout { .. })
    }

    /// Returns `true` if the server could not be reached at all.
    pub fn is_communication(&self) -> bool {
        matches!(self, Error::Communication { .. })
    }

    /// Returns the number of attempts made, for communication failures.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            Error::Communication { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for sentiment API calls.
pub type Result<T> = std::result::Result<T, Error>;
