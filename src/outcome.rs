//! A single tagged result shape for every endpoint.
//!
//! `/predict_one` and `/explain_lime` return envelopes while the other
//! endpoints raise on error statuses. [`Outcome`] folds both contracts into
//! one enum so a front-end branches the same way everywhere. Communication
//! failures stay in the `Err` channel.

use crate::{metadata::Endpoint, Error, Response, Result};
use http::StatusCode;

/// What the server made of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The request succeeded and the payload was decoded.
    Success(T),

    /// `422 Unprocessable Entity`: the server rejected the input.
    InvalidInput {
        /// The raw response body
        detail: String,
    },

    /// `501 Not Implemented` on `/explain_lime`: explanations are not
    /// installed on the server.
    Unavailable {
        /// The raw response body
        detail: String,
    },

    /// Any other status.
    Failed {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        detail: String,
    },
}

impl<T> Outcome<T> {
    /// Tags a non-success status according to what `endpoint` recognizes.
    pub fn from_status(endpoint: Endpoint, status: StatusCode, detail: String) -> Self {
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            Outcome::InvalidInput { detail }
        } else if status == StatusCode::NOT_IMPLEMENTED && endpoint.recognizes_unavailable() {
            Outcome::Unavailable { detail }
        } else {
            Outcome::Failed { status, detail }
        }
    }

    /// Folds the result of a raising endpoint into an outcome.
    ///
    /// HTTP errors become tags; every other error is passed through.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sentiment_client::{ApiClient, Endpoint, Outcome};
    ///
    /// # async fn example() -> Result<(), sentiment_client::Error> {
    /// let client = ApiClient::builder().build()?;
    /// let result = client.explain("Service déplorable").await;
    ///
    /// if let Outcome::Success(payload) = Outcome::from_result(Endpoint::Explain, result)? {
    ///     println!("{}", payload);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_result(endpoint: Endpoint, result: Result<Response<T>>) -> Result<Self> {
        match result {
            Ok(response) => Ok(Outcome::Success(response.data)),
            Err(Error::HttpError {
                status,
                raw_response,
                ..
            }) => Ok(Outcome::from_status(endpoint, status, raw_response)),
            Err(e) => Err(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The HTTP status behind a failure tag, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Outcome::Success(_) => None,
            Outcome::InvalidInput { .. } => Some(StatusCode::UNPROCESSABLE_ENTITY),
            Outcome::Unavailable { .. } => Some(StatusCode::NOT_IMPLEMENTED),
            Outcome::Failed { status, .. } => Some(*status),
        }
    }
}
