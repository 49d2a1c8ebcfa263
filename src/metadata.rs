//! Endpoint table and per-request metadata.

use http::Method;
use std::fmt;
use std::time::Duration;

/// The endpoints exposed by the sentiment API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /health`
    Health,
    /// `POST /predict_one`
    PredictOne,
    /// `POST /explain_lime`
    ExplainLime,
    /// `POST /predict`
    PredictBatch,
    /// `POST /explain`
    Explain,
}

impl Endpoint {
    /// The HTTP method of the endpoint.
    pub fn method(self) -> Method {
        match self {
            Endpoint::Health => Method::GET,
            _ => Method::POST,
        }
    }

    /// The path of the endpoint, relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Health => "/health",
            Endpoint::PredictOne => "/predict_one",
            Endpoint::ExplainLime => "/explain_lime",
            Endpoint::PredictBatch => "/predict",
            Endpoint::Explain => "/explain",
        }
    }

    /// Whether transport failures on this endpoint are retried.
    pub fn is_retried(self) -> bool {
        matches!(
            self,
            Endpoint::Health | Endpoint::PredictOne | Endpoint::ExplainLime
        )
    }

    /// Whether `501 Not Implemented` means "capability unavailable" here.
    pub fn recognizes_unavailable(self) -> bool {
        self == Endpoint::ExplainLime
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// Per-attempt timeouts, one per endpoint.
///
/// Explanations are slow to generate, hence the long `explain_lime` default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub health: Duration,
    pub predict_one: Duration,
    pub explain_lime: Duration,
    pub predict_batch: Duration,
    pub explain: Duration,
}

impl Timeouts {
    /// The same timeout for every endpoint.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            health: timeout,
            predict_one: timeout,
            explain_lime: timeout,
            predict_batch: timeout,
            explain: timeout,
        }
    }

    /// The timeout that applies to one attempt on `endpoint`.
    pub fn for_endpoint(&self, endpoint: Endpoint) -> Duration {
        match endpoint {
            Endpoint::Health => self.health,
            Endpoint::PredictOne => self.predict_one,
            Endpoint::ExplainLime => self.explain_lime,
            Endpoint::PredictBatch => self.predict_batch,
            Endpoint::Explain => self.explain,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(10),
            predict_one: Duration::from_secs(30),
            explain_lime: Duration::from_secs(120),
            predict_batch: Duration::from_secs(30),
            explain: Duration::from_secs(30),
        }
    }
}

/// Metadata for a single call to an endpoint.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The endpoint being called.
    pub endpoint: Endpoint,

    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl RequestMetadata {
    /// Creates metadata for `endpoint` with the timeout taken from `timeouts`.
    pub fn new(endpoint: Endpoint, timeouts: &Timeouts) -> Self {
        Self {
            endpoint,
            timeout: timeouts.for_endpoint(endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_table() {
        assert_eq!(Endpoint::Health.method(), Method::GET);
        assert_eq!(Endpoint::PredictBatch.path(), "/predict");
        assert!(Endpoint::ExplainLime.is_retried());
        assert!(!Endpoint::Explain.is_retried());
        assert!(!Endpoint::PredictBatch.is_retried());
        assert!(Endpoint::ExplainLime.recognizes_unavailable());
        assert!(!Endpoint::PredictOne.recognizes_unavailable());
    }

    #[test]
    fn test_default_timeouts() {
        let timeouts = Timeouts::default();
        assert_eq!(timeouts.for_endpoint(Endpoint::Health), Duration::from_secs(10));
        assert_eq!(
            timeouts.for_endpoint(Endpoint::PredictOne),
            Duration::from_secs(30)
        );
        assert_eq!(
            timeouts.for_endpoint(Endpoint::ExplainLime),
            Duration::from_secs(120)
        );
        assert_eq!(timeouts.for_endpoint(Endpoint::Explain), Duration::from_secs(30));
    }

    #[test]
    fn test_metadata_takes_endpoint_timeout() {
        let timeouts = Timeouts {
            explain_lime: Duration::from_secs(300),
            ..Timeouts::default()
        };
        let metadata = RequestMetadata::new(Endpoint::ExplainLime, &timeouts);
        assert_eq!(metadata.endpoint, Endpoint::ExplainLime);
        assert_eq!(metadata.timeout, Duration::from_secs(300));
    }
}
