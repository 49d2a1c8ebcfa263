//! # sentiment-client - a retrying client for a sentiment-analysis API
//!
//! Talks to a remote service that classifies short texts as positive or
//! negative and, optionally, explains the prediction with LIME. Built on top
//! of `reqwest`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sentiment_client::{ApiClient, Outcome, Prediction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sentiment_client::Error> {
//!     let client = ApiClient::builder()
//!         .base_url("http://localhost:8000")?
//!         .build()?;
//!
//!     let envelope = client.predict_one("J'adore ce produit").await?;
//!     match envelope.classify::<Prediction>()? {
//!         Outcome::Success(p) => {
//!             println!("{} ({:.1}%)", p.sentiment, p.confidence * 100.0);
//!         }
//!         Outcome::InvalidInput { detail } => eprintln!("rejected: {}", detail),
//!         other => eprintln!("API error: {:?}", other),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Timeout | Retried | Non-2xx |
//! |---|---|---|---|---|
//! | [`ApiClient::health`] | `GET /health` | 10 s | yes | [`Error::HttpError`] |
//! | [`ApiClient::predict_one`] | `POST /predict_one` | 30 s | yes | [`Envelope`] |
//! | [`ApiClient::explain_lime`] | `POST /explain_lime` | 120 s | yes | [`Envelope`] |
//! | [`ApiClient::predict_batch`] | `POST /predict` | 30 s | no | [`Error::HttpError`] |
//! | [`ApiClient::explain`] | `POST /explain` | 30 s | no | [`Error::HttpError`] |
//!
//! ## Retries
//!
//! Only transport failures (refused connections, DNS failures, timeouts) are
//! retried: at most three attempts, waiting 0.8 s after the first failure and
//! 1.6 s after the second. Timeouts apply per attempt. When the budget is
//! spent the caller gets [`Error::Communication`], which also lists the
//! earlier failures. An HTTP error status is an answer, never a retry reason.
//!
//! ```no_run
//! use sentiment_client::{ApiClient, RetryStrategy, retry::RetryOnTimeout};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), sentiment_client::Error> {
//! let client = ApiClient::builder()
//!     .retry_strategy(RetryStrategy::Linear {
//!         delay: Duration::from_millis(500),
//!         max_retries: 5,
//!     })
//!     .retry_predicate(Box::new(RetryOnTimeout))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod metadata;
pub mod models;
mod outcome;
pub mod report;
mod response;
pub mod retry;
pub mod validation;

pub use client::{ApiClient, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use metadata::{Endpoint, Timeouts};
pub use models::{Explanation, FeatureWeight, Health, Prediction};
pub use outcome::Outcome;
pub use response::{Envelope, Response};
pub use retry::{RetryPredicate, RetryStrategy};
