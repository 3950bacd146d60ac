//! The browser collaborator trait

use crate::{
    errors::{PortError, PortErrorKind},
    query::*,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Polling interval used by provided wait helpers.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a basic accessibility scan of the current page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityAudit {
    /// `img` elements without an `alt` attribute
    pub images_without_alt: usize,

    /// `input` elements with neither `aria-label` nor `aria-labelledby`
    pub inputs_without_labels: usize,
}

impl AccessibilityAudit {
    pub fn is_clean(&self) -> bool {
        self.images_without_alt == 0 && self.inputs_without_labels == 0
    }
}

/// One isolated browsing context.
///
/// Implementations own a single page. Every call observes live state; no
/// method caches element handles between calls.
#[async_trait]
pub trait BrowserPort: Send + Sync {
    /// Navigate the page to `url`.
    async fn navigate(&self, url: &str) -> Result<(), PortError>;

    /// Reload the current page.
    async fn reload(&self) -> Result<(), PortError>;

    /// Every element matching `query`, in document order.
    async fn find_all(&self, query: &Query) -> Result<Vec<ElementHandle>, PortError>;

    /// Whether the element is rendered and visible right now.
    async fn is_visible(&self, handle: &ElementHandle) -> Result<bool, PortError>;

    /// Full text content of the element.
    async fn text_content(&self, handle: &ElementHandle) -> Result<Option<String>, PortError>;

    async fn click(&self, handle: &ElementHandle) -> Result<(), PortError>;

    /// Replace the element's value with `text`.
    async fn fill(&self, handle: &ElementHandle, text: &str) -> Result<(), PortError>;

    async fn current_url(&self) -> Result<String, PortError>;

    /// Clear local storage, session storage and cookies.
    async fn clear_storage(&self) -> Result<(), PortError>;

    /// Full-page PNG.
    async fn screenshot(&self) -> Result<Vec<u8>, PortError>;

    async fn accessibility_audit(&self) -> Result<AccessibilityAudit, PortError>;

    /// Release the browsing context.
    async fn close(&self) -> Result<(), PortError> {
        Ok(())
    }

    /// Strict lookup: exactly one match is `Found`.
    ///
    /// An ambiguous [`Query::Single`] scope anywhere in `query` makes the
    /// whole lookup ambiguous.
    async fn find_unique(&self, query: &Query) -> Result<Lookup, PortError> {
        query.validate()?;
        match self.find_all(query).await {
            Ok(matches) => Ok(Lookup::from_matches(matches)),
            Err(PortError {
                kind: PortErrorKind::Ambiguous(count),
                ..
            }) => Ok(Lookup::Ambiguous(count)),
            Err(err) => Err(err),
        }
    }

    /// Semantic lookup by ARIA role and accessible-name rule.
    async fn find_by_semantic(&self, role: &str, name: TextMatch) -> Result<Lookup, PortError> {
        self.find_unique(&Query::role(role).named(name)).await
    }

    /// Selector lookup.
    async fn find_by_selector(&self, selector: &str) -> Result<Lookup, PortError> {
        self.find_unique(&Query::css(selector)).await
    }

    async fn count(&self, query: &Query) -> Result<usize, PortError> {
        Ok(self.find_all(query).await?.len())
    }

    /// Poll until the element is visible or `timeout` elapses.
    ///
    /// A detached handle counts as "not visible yet".
    async fn wait_visible(&self, handle: &ElementHandle, timeout: Duration) -> Result<bool, PortError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.is_visible(handle).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(err) if err.is_retryable() => {}
                Err(err) => return Err(err),
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            sleep(DEFAULT_POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}
