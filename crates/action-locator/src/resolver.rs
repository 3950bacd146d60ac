//! Element resolver with two-tier fallback orchestration

use crate::{errors::ActionError, types::*};
use action_retry::ExecCtx;
use browser_port::{BrowserPort, ElementHandle, Lookup, PortErrorKind, Query, DEFAULT_POLL_INTERVAL};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Default per-tier budget for resolving and acting on an element.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Why a tier has not succeeded yet.
#[derive(Debug)]
enum Pending {
    Missing,
    NotVisible,
    NotInteractable(String),
}

/// Resolves strategies against one port and performs element actions.
#[derive(Clone)]
pub struct LocatorResolver {
    port: Arc<dyn BrowserPort>,
    timeout: Duration,
    poll_interval: Duration,
}

impl LocatorResolver {
    pub fn new(port: Arc<dyn BrowserPort>) -> Self {
        Self {
            port,
            timeout: DEFAULT_ACTION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the per-tier budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn port(&self) -> &Arc<dyn BrowserPort> {
        &self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Strict one-shot lookup.
    pub async fn lookup(&self, query: &Query) -> Result<Lookup, ActionError> {
        Ok(self.port.find_unique(query).await?)
    }

    /// Resolve `strategy` and perform `action` with the default budget.
    pub async fn resolve_and_act(
        &self,
        strategy: &Strategy,
        action: &ElementAction,
    ) -> Result<Resolution, ActionError> {
        self.resolve_and_act_with(&ExecCtx::new(), strategy, action, self.timeout)
            .await
    }

    /// Resolve `strategy` and perform `action`.
    ///
    /// The primary tier gets up to `timeout` to find exactly one visible
    /// element and act on it. Any failure there runs the fallback tier with
    /// the same budget. Cancellation or an expired context deadline during
    /// the primary tier ends resolution without trying the fallback.
    pub async fn resolve_and_act_with(
        &self,
        ctx: &ExecCtx,
        strategy: &Strategy,
        action: &ElementAction,
        timeout: Duration,
    ) -> Result<Resolution, ActionError> {
        info!(
            action_id = %ctx.action_id,
            action = action.name(),
            primary = %strategy.primary,
            "Resolving element"
        );

        let primary_err = match self.run_tier(ctx, Tier::Primary, &strategy.primary, action, timeout).await {
            Ok(handle) => {
                return Ok(Resolution {
                    tier: Tier::Primary,
                    handle,
                })
            }
            Err(err) => err,
        };

        if matches!(primary_err, ActionError::Cancelled(_)) {
            return Err(primary_err);
        }
        if ctx.is_timeout() {
            debug!(action_id = %ctx.action_id, "Context deadline passed during primary tier");
            return Err(primary_err);
        }

        warn!(
            action_id = %ctx.action_id,
            error = %primary_err,
            fallback = %strategy.fallback,
            "Primary tier failed, trying fallback"
        );

        match self.run_tier(ctx, Tier::Fallback, &strategy.fallback, action, timeout).await {
            Ok(handle) => Ok(Resolution {
                tier: Tier::Fallback,
                handle,
            }),
            Err(err @ ActionError::Cancelled(_)) => Err(err),
            Err(fallback_err) => {
                warn!(
                    action_id = %ctx.action_id,
                    error = %fallback_err,
                    "Fallback tier failed"
                );
                Err(ActionError::TiersExhausted {
                    primary: Box::new(primary_err),
                    fallback: Box::new(fallback_err),
                })
            }
        }
    }

    /// Single-tier resolution for callers that already hold a precise selector.
    pub async fn act_on(
        &self,
        query: &Query,
        action: &ElementAction,
    ) -> Result<ElementHandle, ActionError> {
        let ctx = ExecCtx::new();
        info!(action_id = %ctx.action_id, action = action.name(), query = %query, "Acting on element");
        self.run_tier(&ctx, Tier::Primary, query, action, self.timeout).await
    }

    async fn run_tier(
        &self,
        ctx: &ExecCtx,
        tier: Tier,
        query: &Query,
        action: &ElementAction,
        timeout: Duration,
    ) -> Result<ElementHandle, ActionError> {
        let budget = ctx.bound(timeout);
        let deadline = Instant::now() + budget;
        debug!(action_id = %ctx.action_id, %tier, %query, budget_ms = budget.as_millis() as u64, "Trying tier");

        loop {
            if ctx.is_cancelled() {
                return Err(ActionError::Cancelled(format!("{} tier for {}", tier, query)));
            }

            let pending = match self.port.find_unique(query).await {
                Ok(Lookup::Found(handle)) => match self.port.is_visible(&handle).await {
                    Ok(true) => match self.perform(&handle, action).await {
                        Ok(()) => {
                            info!(
                                action_id = %ctx.action_id,
                                %tier,
                                element = %handle.id,
                                "Action performed"
                            );
                            return Ok(handle);
                        }
                        Err(err) if err.is_retryable() => Pending::Missing,
                        Err(err) if err.kind == PortErrorKind::NotInteractable => {
                            Pending::NotInteractable(err.to_string())
                        }
                        Err(err) => return Err(err.into()),
                    },
                    Ok(false) => Pending::NotVisible,
                    Err(err) if err.is_retryable() => Pending::Missing,
                    Err(err) => return Err(err.into()),
                },
                Ok(Lookup::NotFound) => Pending::Missing,
                Ok(Lookup::Ambiguous(count)) => {
                    debug!(action_id = %ctx.action_id, %tier, count, "Ambiguous lookup");
                    return Err(ActionError::Ambiguous {
                        query: query.to_string(),
                        count,
                    });
                }
                Err(err) if err.is_retryable() => Pending::Missing,
                Err(err) => return Err(err.into()),
            };

            let now = Instant::now();
            if now >= deadline {
                let timeout_ms = budget.as_millis() as u64;
                return Err(match pending {
                    Pending::Missing => ActionError::NotFound(format!(
                        "{} not found within {}ms",
                        query, timeout_ms
                    )),
                    Pending::NotVisible => ActionError::Timeout {
                        what: format!("{} never became visible", query),
                        timeout_ms,
                    },
                    Pending::NotInteractable(reason) => ActionError::Timeout {
                        what: reason,
                        timeout_ms,
                    },
                });
            }

            tokio::select! {
                biased;
                _ = ctx.cancel_token.cancelled() => {
                    return Err(ActionError::Cancelled(format!("{} tier for {}", tier, query)));
                }
                _ = sleep(self.poll_interval.min(deadline - now)) => {}
            }
        }
    }

    async fn perform(
        &self,
        handle: &ElementHandle,
        action: &ElementAction,
    ) -> Result<(), browser_port::PortError> {
        match action {
            ElementAction::Click => self.port.click(handle).await,
            ElementAction::Fill(text) => self.port.fill(handle, text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_port::TextMatch;
    use storefront_sim::{SimOptions, SimProduct, Storefront};

    async fn inventory(site: &Storefront) {
        site.navigate("https://www.saucedemo.com/").await.unwrap();
        for (id, value) in [("username", "standard_user"), ("password", "secret_sauce")] {
            let lookup = site.find_unique(&Query::test_id(id)).await.unwrap();
            site.fill(lookup.handle().unwrap(), value).await.unwrap();
        }
        let lookup = site.find_unique(&Query::test_id("login-button")).await.unwrap();
        site.click(lookup.handle().unwrap()).await.unwrap();
    }

    fn add_to_cart(name: &str) -> Strategy {
        let button = Query::role("button").named(TextMatch::contains("add to cart"));
        Strategy::new(
            Query::css(".inventory_item")
                .filter_has_text(TextMatch::contains(name))
                .single()
                .locate(button.clone()),
            Query::text(TextMatch::exact(name))
                .closest(".inventory_item")
                .locate(button),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_tier_acts() {
        let site = Arc::new(Storefront::default());
        inventory(&site).await;
        let resolver = LocatorResolver::new(site.clone());

        let resolution = resolver
            .resolve_and_act(&add_to_cart("Sauce Labs Onesie"), &ElementAction::Click)
            .await
            .unwrap();
        assert_eq!(resolution.tier, Tier::Primary);
        assert_eq!(site.cart(), vec!["sauce-labs-onesie".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ambiguous_primary_resolves_through_fallback() {
        let mut catalog = storefront_sim::default_catalog();
        catalog.push(SimProduct::new(
            "Sauce Labs Onesie Deluxe",
            "$12.99",
            "Same onesie, more snaps.",
        ));
        let site = Arc::new(Storefront::new(SimOptions {
            catalog,
            ..SimOptions::default()
        }));
        inventory(&site).await;
        let resolver = LocatorResolver::new(site.clone());

        let start = Instant::now();
        let resolution = resolver
            .resolve_and_act(&add_to_cart("Sauce Labs Onesie"), &ElementAction::Click)
            .await
            .unwrap();
        assert!(resolution.used_fallback());
        assert_eq!(site.cart(), vec!["sauce-labs-onesie".to_string()]);
        // Ambiguity fails the primary tier without waiting out its budget
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_late_paint() {
        let site = Arc::new(Storefront::new(SimOptions {
            render_delay: Duration::from_millis(400),
            ..SimOptions::default()
        }));
        site.navigate("https://www.saucedemo.com/").await.unwrap();
        let resolver = LocatorResolver::new(site.clone());

        let start = Instant::now();
        let resolution = resolver
            .resolve_and_act(
                &Strategy::new(
                    Query::role("textbox").named(TextMatch::contains("username")),
                    Query::test_id("username"),
                ),
                &ElementAction::fill("standard_user"),
            )
            .await
            .unwrap();
        assert_eq!(resolution.tier, Tier::Primary);
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_tiers_missing_reports_fallback() {
        let site = Arc::new(Storefront::default());
        inventory(&site).await;
        let resolver = LocatorResolver::new(site.clone()).with_timeout(Duration::from_millis(300));

        let start = Instant::now();
        let err = resolver
            .resolve_and_act(&add_to_cart("Sauce Labs Hoodie"), &ElementAction::Click)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
        assert!(matches!(err.last_cause(), ActionError::NotFound(msg) if msg.contains("closest")));
        assert_eq!(start.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_context_skips_fallback() {
        let site = Arc::new(Storefront::default());
        inventory(&site).await;
        let resolver = LocatorResolver::new(site.clone());
        let ctx = ExecCtx::new();
        ctx.cancel();

        let err = resolver
            .resolve_and_act_with(
                &ctx,
                &add_to_cart("Sauce Labs Onesie"),
                &ElementAction::Click,
                DEFAULT_ACTION_TIMEOUT,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Cancelled(_)));
        assert!(site.cart().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_deadline_stops_before_fallback() {
        let site = Arc::new(Storefront::default());
        inventory(&site).await;
        let resolver = LocatorResolver::new(site.clone());
        let ctx = ExecCtx::with_timeout(Duration::from_millis(250));

        let start = Instant::now();
        let err = resolver
            .resolve_and_act_with(
                &ctx,
                &add_to_cart("Sauce Labs Hoodie"),
                &ElementAction::Click,
                DEFAULT_ACTION_TIMEOUT,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }
}
