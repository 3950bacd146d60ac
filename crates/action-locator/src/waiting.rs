//! Declarative wait conditions
//!
//! A [`Condition`] is a typed predicate over live page state. [`Waiter`]
//! polls it until it holds or the budget runs out. Nothing here builds
//! scripts at runtime; backends only ever see [`Query`] values.

use crate::errors::ActionError;
use action_retry::ExecCtx;
use browser_port::{BrowserPort, ElementHandle, Lookup, Query, TextMatch, DEFAULT_POLL_INTERVAL};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Observable page state to wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Exactly one element matches and it is visible.
    Visible(Query),

    /// No visible element matches.
    Hidden(Query),

    /// Exactly one element matches and its text satisfies the rule.
    Text(Query, TextMatch),

    /// The query matches exactly this many elements.
    Count(Query, usize),

    /// Current URL equals the value.
    UrlEquals(String),

    /// Current URL ends with the value.
    UrlEndsWith(String),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Visible(q) => write!(f, "{} to be visible", q),
            Condition::Hidden(q) => write!(f, "{} to be hidden", q),
            Condition::Text(q, m) => write!(f, "{} to have text {}", q, m),
            Condition::Count(q, n) => write!(f, "{} to have count {}", q, n),
            Condition::UrlEquals(url) => write!(f, "URL to be '{}'", url),
            Condition::UrlEndsWith(suffix) => write!(f, "URL to end with '{}'", suffix),
        }
    }
}

/// One evaluation of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub met: bool,
    /// What was actually seen, for failure messages.
    pub observed: String,
}

impl Probe {
    fn new(met: bool, observed: impl Into<String>) -> Self {
        Self {
            met,
            observed: observed.into(),
        }
    }
}

impl Condition {
    /// Evaluate once against live state.
    ///
    /// Strict conditions fail outright when their query is ambiguous.
    pub async fn probe(&self, port: &dyn BrowserPort) -> Result<Probe, ActionError> {
        match self {
            Condition::Visible(query) => match strict(port, query).await? {
                Some(handle) => {
                    let visible = port.is_visible(&handle).await?;
                    Ok(Probe::new(visible, if visible { "visible" } else { "hidden" }))
                }
                None => Ok(Probe::new(false, "no element")),
            },
            Condition::Hidden(query) => {
                let handles = port.find_all(query).await?;
                let mut visible = 0usize;
                for handle in &handles {
                    if port.is_visible(handle).await? {
                        visible += 1;
                    }
                }
                Ok(Probe::new(
                    visible == 0,
                    format!("{} visible of {}", visible, handles.len()),
                ))
            }
            Condition::Text(query, matcher) => match strict(port, query).await? {
                Some(handle) => {
                    let text = port.text_content(&handle).await?.unwrap_or_default();
                    Ok(Probe::new(matcher.matches(&text), format!("'{}'", text)))
                }
                None => Ok(Probe::new(false, "no element")),
            },
            Condition::Count(query, expected) => {
                let count = port.count(query).await?;
                Ok(Probe::new(count == *expected, format!("{} elements", count)))
            }
            Condition::UrlEquals(expected) => {
                let url = port.current_url().await?;
                Ok(Probe::new(&url == expected, url))
            }
            Condition::UrlEndsWith(suffix) => {
                let url = port.current_url().await?;
                Ok(Probe::new(url.ends_with(suffix.as_str()), url))
            }
        }
    }
}

async fn strict(
    port: &dyn BrowserPort,
    query: &Query,
) -> Result<Option<ElementHandle>, ActionError> {
    match port.find_unique(query).await? {
        Lookup::Found(handle) => Ok(Some(handle)),
        Lookup::NotFound => Ok(None),
        Lookup::Ambiguous(count) => Err(ActionError::Ambiguous {
            query: query.to_string(),
            count,
        }),
    }
}

/// Polls conditions against one port.
#[derive(Clone)]
pub struct Waiter {
    port: Arc<dyn BrowserPort>,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(port: Arc<dyn BrowserPort>) -> Self {
        Self {
            port,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Wait until `condition` holds; `Timeout` when it never does.
    pub async fn wait_until(
        &self,
        condition: &Condition,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        self.poll(None, condition, timeout).await.map_err(|last| match last {
            Polled::Failed(err) => err,
            Polled::Unmet(observed) => ActionError::Timeout {
                what: format!("waiting for {} (last observed: {})", condition, observed),
                timeout_ms: timeout.as_millis() as u64,
            },
        })
    }

    /// Hard assertion with a bounded wait; `Assertion` when unmet or when
    /// the query matches more than one element.
    pub async fn expect(&self, condition: &Condition, timeout: Duration) -> Result<(), ActionError> {
        self.expect_with(None, condition, timeout).await
    }

    /// [`Waiter::expect`] that also stops on context cancellation.
    pub async fn expect_with(
        &self,
        ctx: Option<&ExecCtx>,
        condition: &Condition,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        self.poll(ctx, condition, timeout).await.map_err(|last| match last {
            Polled::Failed(ActionError::Ambiguous { query, count }) => ActionError::Assertion(
                format!("expected {}, but {} elements matched {}", condition, count, query),
            ),
            Polled::Failed(err) => err,
            Polled::Unmet(observed) => ActionError::Assertion(format!(
                "expected {} within {}ms, last observed: {}",
                condition,
                timeout.as_millis(),
                observed
            )),
        })
    }

    async fn poll(
        &self,
        ctx: Option<&ExecCtx>,
        condition: &Condition,
        timeout: Duration,
    ) -> Result<(), Polled> {
        let timeout = ctx.map_or(timeout, |c| c.bound(timeout));
        let deadline = Instant::now() + timeout;
        let mut observed;
        loop {
            if let Some(ctx) = ctx {
                if ctx.is_cancelled() {
                    return Err(Polled::Failed(ActionError::Cancelled(format!(
                        "waiting for {}",
                        condition
                    ))));
                }
            }
            match condition.probe(self.port.as_ref()).await {
                Ok(probe) if probe.met => return Ok(()),
                Ok(probe) => observed = probe.observed,
                Err(ActionError::Browser(err)) if !err.is_retryable() => {
                    return Err(Polled::Failed(ActionError::Browser(err)))
                }
                Err(ActionError::Browser(_)) | Err(ActionError::NotFound(_)) => {
                    observed = "detached element".to_string();
                }
                Err(err) => return Err(Polled::Failed(err)),
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(%condition, %observed, "Condition not met before deadline");
                return Err(Polled::Unmet(observed));
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

enum Polled {
    Unmet(String),
    Failed(ActionError),
}
