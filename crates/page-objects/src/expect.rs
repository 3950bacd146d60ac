//! Bounded-wait assertions

use action_locator::{ActionError, Condition, Waiter};
use browser_port::{BrowserPort, Query, TextMatch};
use std::sync::Arc;
use std::time::Duration;

/// Hard assertions against one port.
///
/// Each method polls until the expectation holds or `timeout` elapses, then
/// fails with [`ActionError::Assertion`]. Nothing here retries on its own.
#[derive(Clone)]
pub struct Expect {
    waiter: Waiter,
    timeout: Duration,
}

impl Expect {
    pub fn new(port: Arc<dyn BrowserPort>, timeout: Duration) -> Self {
        Self {
            waiter: Waiter::new(port),
            timeout,
        }
    }

    pub async fn condition(&self, condition: Condition) -> Result<(), ActionError> {
        self.waiter.expect(&condition, self.timeout).await
    }

    pub async fn visible(&self, query: &Query) -> Result<(), ActionError> {
        self.condition(Condition::Visible(query.clone())).await
    }

    pub async fn hidden(&self, query: &Query) -> Result<(), ActionError> {
        self.condition(Condition::Hidden(query.clone())).await
    }

    pub async fn text(&self, query: &Query, matcher: TextMatch) -> Result<(), ActionError> {
        self.condition(Condition::Text(query.clone(), matcher)).await
    }

    pub async fn count(&self, query: &Query, expected: usize) -> Result<(), ActionError> {
        self.condition(Condition::Count(query.clone(), expected)).await
    }

    pub async fn url(&self, expected: &str) -> Result<(), ActionError> {
        self.condition(Condition::UrlEquals(expected.to_string())).await
    }

    pub async fn url_ends_with(&self, suffix: &str) -> Result<(), ActionError> {
        self.condition(Condition::UrlEndsWith(suffix.to_string())).await
    }
}
