//! Timeouts and retry defaults shared by every page object

use crate::data::SiteUrls;
use action_locator::DEFAULT_ACTION_TIMEOUT;
use action_retry::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PageSettings {
    pub urls: SiteUrls,

    /// Per-tier budget for resolving and acting on an element
    pub action_timeout: Duration,

    /// Bounded wait for verifications
    pub expect_timeout: Duration,

    /// Policy used by `utils::retry_action`
    pub retry: RetryPolicy,

    /// Pause after each click in `utils::add_products_to_cart`
    pub settle_delay: Duration,

    pub screenshot_dir: PathBuf,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            urls: SiteUrls::default(),
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            expect_timeout: Duration::from_millis(5000),
            retry: RetryPolicy::default(),
            settle_delay: Duration::from_millis(100),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
        }
    }
}
