//! Retry error types

use thiserror::Error;

/// Rejected [`crate::RetryPolicy`] parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPolicy {
    #[error("retry base delay must be greater than zero")]
    ZeroDelay,
}

/// Outcome of a context-aware retry that did not succeed.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed; carries the last error.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u64, last: E },

    /// The context was cancelled before an attempt succeeded.
    #[error("retry cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    /// The context deadline passed before an attempt succeeded.
    #[error("retry deadline exceeded after {attempts} attempts")]
    DeadlineExceeded { attempts: u64 },
}

impl<E> RetryError<E> {
    /// The last action error, if retries ran out.
    pub fn into_last(self) -> Option<E> {
        match self {
            RetryError::Exhausted { last, .. } => Some(last),
            _ => None,
        }
    }

    pub fn attempts(&self) -> u64 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Cancelled { attempts }
            | RetryError::DeadlineExceeded { attempts } => *attempts,
        }
    }

    pub fn is_abandoned(&self) -> bool {
        !matches!(self, RetryError::Exhausted { .. })
    }
}
