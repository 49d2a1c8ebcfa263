//! Response types: typed responses for raising endpoints and the
//! non-raising [`Envelope`] for `/predict_one` and `/explain_lime`.

use crate::{metadata::Endpoint, Error, Outcome, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A successful, deserialized response.
///
/// # Examples
///
/// ```no_run
/// use sentiment_client::ApiClient;
///
/// # async fn example() -> Result<(), sentiment_client::Error> {
/// let client = ApiClient::builder().build()?;
///
/// let health = client.health().await?;
/// println!("Model: {:?}", health.data.model_class);
/// println!("Request took {:?} over {} attempt(s)", health.latency, health.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response data.
    pub data: T,

    /// The raw response body.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until the response arrived, backoff included.
    pub latency: Duration,

    /// The number of attempts made. `1` when the first attempt succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// A normalized response returned whatever the status code.
///
/// `json` is populated only when the server declared a JSON content type;
/// otherwise callers fall back to `text` for diagnostics.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// The endpoint that produced this response.
    pub endpoint: Endpoint,

    /// The HTTP status code.
    pub status: StatusCode,

    /// The parsed body, when the content type is `application/json`.
    pub json: Option<serde_json::Value>,

    /// The raw response body.
    pub text: String,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until the response arrived, backoff included.
    pub latency: Duration,

    /// The number of attempts made.
    pub attempts: usize,
}

impl Envelope {
    /// The numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Deserializes the JSON payload into `T`.
    ///
    /// Returns `Ok(None)` when the response carried no JSON.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let Some(json) = &self.json else {
            return Ok(None);
        };
        serde_json::from_value(json.clone())
            .map(Some)
            .map_err(|e| Error::DeserializationFailed {
                raw_response: self.text.clone(),
                serde_error: e.to_string(),
                status: self.status,
            })
    }

    /// Classifies the envelope into a tagged [`Outcome`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sentiment_client::{ApiClient, Outcome, Prediction};
    ///
    /// # async fn example() -> Result<(), sentiment_client::Error> {
    /// let client = ApiClient::builder().build()?;
    /// let envelope = client.predict_one("J'adore ce produit").await?;
    ///
    /// match envelope.classify::<Prediction>()? {
    ///     Outcome::Success(p) => println!("{} ({:.1}%)", p.sentiment, p.confidence * 100.0),
    ///     Outcome::InvalidInput { .. } => println!("rejected by the server"),
    ///     other => println!("API error: {:?}", other),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn classify<T: DeserializeOwned>(&self) -> Result<Outcome<T>> {
        if self.status == StatusCode::OK {
            if let Some(data) = self.parse::<T>()? {
                return Ok(Outcome::Success(data));
            }
        }
        Ok(Outcome::from_status(
            self.endpoint,
            self.status,
            self.text.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Prediction;
    use serde_json::json;

    fn envelope(status: u16, json: Option<serde_json::Value>, text: &str) -> Envelope {
        Envelope {
            endpoint: Endpoint::PredictOne,
            status: StatusCode::from_u16(status).unwrap(),
            json,
            text: text.to_string(),
            headers: HeaderMap::new(),
            latency: Duration::from_millis(5),
            attempts: 1,
        }
    }

    #[test]
    fn test_classify_success() {
        let env = envelope(
            200,
            Some(json!({
                "sentiment": "positive",
                "confidence": 0.91,
                "probability_positive": 0.91,
                "probability_negative": 0.09
            })),
            "",
        );

        match env.classify::<Prediction>().unwrap() {
            Outcome::Success(p) => assert_eq!(p.sentiment, "positive"),
            other => panic!("Expected Success, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_ok_without_json_is_failure() {
        let env = envelope(200, None, "<html>proxy page</html>");
        match env.classify::<Prediction>().unwrap() {
            Outcome::Failed { status, detail } => {
                assert_eq!(status, StatusCode::OK);
                assert!(detail.contains("proxy"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_other_2xx_with_valid_payload_is_failure() {
        let payload = json!({
            "sentiment": "positive",
            "confidence": 0.91,
            "probability_positive": 0.91,
            "probability_negative": 0.09
        });
        let env = envelope(201, Some(payload.clone()), &payload.to_string());

        match env.classify::<Prediction>().unwrap() {
            Outcome::Failed { status, detail } => {
                assert_eq!(status, StatusCode::CREATED);
                assert!(detail.contains("\"confidence\":0.91"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_wrong_shape_is_deserialization_error() {
        let env = envelope(200, Some(json!({"label": "pos"})), "{\"label\":\"pos\"}");
        match env.classify::<Prediction>() {
            Err(Error::DeserializationFailed { raw_response, .. }) => {
                assert_eq!(raw_response, "{\"label\":\"pos\"}");
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_without_json() {
        let env = envelope(500, None, "boom");
        assert!(env.parse::<Prediction>().unwrap().is_none());
        assert_eq!(env.status_code(), 500);
        assert!(!env.is_success());
    }
}
