//! Retry strategies and predicates for transient failures.
//!
//! Only transport failures are ever handed to a predicate: a response with an
//! error status is an answer from the server and is never retried.

use crate::Error;
use std::time::Duration;

/// The backoff step of the sentiment API client (0.8 s).
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(800);

/// Retries after the first attempt; three attempts in total.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Defines when and how long to wait before retrying.
///
/// # Examples
///
/// ```
/// use sentiment_client::RetryStrategy;
/// use std::time::Duration;
///
/// // 0.8s after the first failure, 1.6s after the second, then give up.
/// let strategy = RetryStrategy::default();
/// assert_eq!(strategy.delay_for_attempt(1), Some(Duration::from_millis(800)));
/// assert_eq!(strategy.delay_for_attempt(2), Some(Duration::from_millis(1600)));
/// assert_eq!(strategy.delay_for_attempt(3), None);
///
/// // Fixed delay between attempts.
/// let linear = RetryStrategy::Linear {
///     delay: Duration::from_secs(1),
///     max_retries: 3,
/// };
/// assert_eq!(linear.max_attempts(), 4);
/// ```
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// Do not retry.
    None,

    /// Wait the same delay before every retry.
    Linear {
        /// The delay between attempts.
        delay: Duration,
        /// The maximum number of retries after the first attempt.
        max_retries: usize,
    },

    /// Wait `step * n` after the `n`th failed attempt.
    Incremental {
        /// The delay unit multiplied by the attempt number.
        step: Duration,
        /// The maximum number of retries after the first attempt.
        max_retries: usize,
    },
}

impl Default for RetryStrategy {
    fn default() -> Self {
        RetryStrategy::Incremental {
            step: DEFAULT_BACKOFF_STEP,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryStrategy {
    /// Returns the delay to wait after the given failed attempt, or `None`
    /// if no attempt remains.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt that just failed (1-indexed)
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::Linear { delay, max_retries } => {
                if attempt > *max_retries {
                    None
                } else {
                    Some(*delay)
                }
            }
            RetryStrategy::Incremental { step, max_retries } => {
                if attempt > *max_retries {
                    return None;
                }
                let factor = u32::try_from(attempt).unwrap_or(u32::MAX);
                Some(step.saturating_mul(factor))
            }
        }
    }

    /// Returns the maximum number of retries.
    pub fn max_retries(&self) -> usize {
        match self {
            RetryStrategy::None => 0,
            RetryStrategy::Linear { max_retries, .. } => *max_retries,
            RetryStrategy::Incremental { max_retries, .. } => *max_retries,
        }
    }

    /// Returns the total number of attempts, the first one included.
    pub fn max_attempts(&self) -> usize {
        self.max_retries() + 1
    }
}

/// Decides whether a failed attempt should be retried.
///
/// # Examples
///
/// ```
/// use sentiment_client::{Error, RetryPredicate};
///
/// struct OnlyTimeouts;
///
/// impl RetryPredicate for OnlyTimeouts {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         matches!(error, Error::Timeout { .. })
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the request should be attempted again.
    ///
    /// # Arguments
    ///
    /// * `error` - The failure of the attempt
    /// * `attempt` - The attempt number (1-indexed)
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

/// Retry every transport failure: timeouts and network errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTransient;

impl RetryPredicate for RetryOnTransient {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_transient()
    }
}

/// Retry only on timeouts.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnTimeout;

impl RetryPredicate for RetryOnTimeout {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Timeout { .. })
    }
}

/// Retry only on network errors such as a refused connection.
#[derive(Debug, Clone, Copy)]
pub struct RetryOnConnectionError;

impl RetryPredicate for RetryOnConnectionError {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        matches!(error, Error::Network(_))
    }
}
