//! Error types for the browser collaborator

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// High-level error categories surfaced by a [`crate::BrowserPort`].
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PortErrorKind {
    #[error("navigation failed")]
    Navigation,
    #[error("element detached")]
    Detached,
    #[error("element not interactable")]
    NotInteractable,
    #[error("invalid query")]
    InvalidQuery,
    #[error("{0} elements matched a single-element scope")]
    Ambiguous(usize),
    #[error("browser launch failed")]
    Launch,
    #[error("browser i/o failure")]
    Io,
}

/// Error returned by browser collaborator calls.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortError {
    pub kind: PortErrorKind,
    pub hint: Option<String>,
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for PortError {}

impl PortError {
    pub fn new(kind: PortErrorKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn navigation(hint: impl Into<String>) -> Self {
        Self::new(PortErrorKind::Navigation).with_hint(hint)
    }

    pub fn detached(hint: impl Into<String>) -> Self {
        Self::new(PortErrorKind::Detached).with_hint(hint)
    }

    pub fn not_interactable(hint: impl Into<String>) -> Self {
        Self::new(PortErrorKind::NotInteractable).with_hint(hint)
    }

    pub fn invalid_query(hint: impl Into<String>) -> Self {
        Self::new(PortErrorKind::InvalidQuery).with_hint(hint)
    }

    /// A [`crate::Query::Single`] scope matched `count` elements.
    pub fn ambiguous(count: usize, scope: impl Into<String>) -> Self {
        Self::new(PortErrorKind::Ambiguous(count)).with_hint(scope)
    }

    pub fn io(hint: impl Into<String>) -> Self {
        Self::new(PortErrorKind::Io).with_hint(hint)
    }

    /// Detached handles and transient I/O can succeed on a fresh lookup.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, PortErrorKind::Detached | PortErrorKind::Io)
    }
}
