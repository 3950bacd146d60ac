//! Error types for element resolution and page assertions

use action_retry::RetryError;
use browser_port::{PortError, PortErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse failure category reported to tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Element never resolved
    NotFound,
    /// Resolved but never actionable, or the budget ran out
    Timeout,
    /// Observable state does not match the expectation
    Assertion,
    /// Browser or query failure
    Other,
}

/// Action error enumeration
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// No element matched
    #[error("Element not found: {0}")]
    NotFound(String),

    /// A strict lookup matched more than one element
    #[error("Multiple elements match {query} ({count} matches)")]
    Ambiguous { query: String, count: usize },

    /// Element resolved but did not become actionable in time
    #[error("Timed out after {timeout_ms}ms: {what}")]
    Timeout { what: String, timeout_ms: u64 },

    /// Expected state not reached within the bounded wait
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// The surrounding context was cancelled
    #[error("Action cancelled: {0}")]
    Cancelled(String),

    /// Collaborator failure
    #[error("Browser error: {0}")]
    Browser(PortError),

    /// Both tiers of a strategy failed
    #[error("{fallback} (primary tier: {primary})")]
    TiersExhausted {
        primary: Box<ActionError>,
        fallback: Box<ActionError>,
    },
}

impl ActionError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ActionError::NotFound(what.into())
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        ActionError::Assertion(message.into())
    }

    /// Category of the failure that decided the outcome.
    ///
    /// For exhausted strategies this is the fallback tier's category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::NotFound(_) | ActionError::Ambiguous { .. } => ErrorKind::NotFound,
            ActionError::Timeout { .. } | ActionError::Cancelled(_) => ErrorKind::Timeout,
            ActionError::Assertion(_) => ErrorKind::Assertion,
            ActionError::Browser(_) => ErrorKind::Other,
            ActionError::TiersExhausted { fallback, .. } => fallback.kind(),
        }
    }

    /// The error that ended resolution; the fallback cause when both tiers failed.
    pub fn last_cause(&self) -> &ActionError {
        match self {
            ActionError::TiersExhausted { fallback, .. } => fallback.last_cause(),
            other => other,
        }
    }

    /// Primary tier cause, present only for exhausted strategies.
    pub fn primary_cause(&self) -> Option<&ActionError> {
        match self {
            ActionError::TiersExhausted { primary, .. } => Some(primary),
            _ => None,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::NotFound(_)
            | ActionError::Ambiguous { .. }
            | ActionError::Timeout { .. }
            | ActionError::Assertion(_) => true,
            ActionError::Browser(err) => err.is_retryable(),
            ActionError::Cancelled(_) => false,
            ActionError::TiersExhausted { fallback, .. } => fallback.is_retryable(),
        }
    }
}

impl From<PortError> for ActionError {
    fn from(err: PortError) -> Self {
        match err.kind {
            PortErrorKind::Detached => {
                ActionError::NotFound(err.hint.unwrap_or_else(|| "element detached".to_string()))
            }
            PortErrorKind::Ambiguous(count) => ActionError::Ambiguous {
                query: err.hint.unwrap_or_default(),
                count,
            },
            _ => ActionError::Browser(err),
        }
    }
}

impl From<RetryError<ActionError>> for ActionError {
    fn from(err: RetryError<ActionError>) -> Self {
        match err {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Cancelled { attempts } => {
                ActionError::Cancelled(format!("retry loop cancelled after {} attempts", attempts))
            }
            RetryError::DeadlineExceeded { attempts } => ActionError::Timeout {
                what: format!("retry deadline exceeded after {} attempts", attempts),
                timeout_ms: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exhausted() -> ActionError {
        ActionError::TiersExhausted {
            primary: Box::new(ActionError::Ambiguous {
                query: "role=button".into(),
                count: 2,
            }),
            fallback: Box::new(ActionError::Timeout {
                what: "button not visible".into(),
                timeout_ms: 5000,
            }),
        }
    }

    #[test]
    fn test_exhausted_reports_fallback() {
        let err = exhausted();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(matches!(err.last_cause(), ActionError::Timeout { .. }));
        assert!(matches!(
            err.primary_cause(),
            Some(ActionError::Ambiguous { count: 2, .. })
        ));
        let text = err.to_string();
        assert!(text.starts_with("Timed out after 5000ms"));
        assert!(text.contains("primary tier: Multiple elements match"));
    }

    #[test]
    fn test_detached_maps_to_not_found() {
        let err: ActionError = PortError::detached("g2-n7").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: ActionError = PortError::navigation("offline").into();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_ambiguous_scope_maps_to_ambiguous() {
        let err: ActionError = PortError::ambiguous(2, "css=.cart_item >> strict").into();
        match err {
            ActionError::Ambiguous { query, count } => {
                assert_eq!(count, 2);
                assert_eq!(query, "css=.cart_item >> strict");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_retry_error_conversion() {
        let err: ActionError = RetryError::Exhausted {
            attempts: 4,
            last: ActionError::assertion("badge shows 2"),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Assertion);

        let err: ActionError = RetryError::<ActionError>::Cancelled { attempts: 1 }.into();
        assert!(!err.is_retryable());
    }
}
