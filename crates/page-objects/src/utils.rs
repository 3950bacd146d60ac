//! Shared helpers for suites
//!
//! Free functions over a port: login shortcuts, cart helpers, waits,
//! screenshots and a basic accessibility scan.

use crate::{data::UserKind, settings::PageSettings};
use action_locator::{ActionError, Condition, ElementAction, LocatorResolver, Waiter};
use action_retry::{retry, RetryPolicy};
use browser_port::{AccessibilityAudit, BrowserPort, Lookup, PortError, Query, TextMatch};
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum UtilsError {
    #[error("Failed to add product \"{product}\" to cart: {source}")]
    AddToCart {
        product: String,
        #[source]
        source: ActionError,
    },

    #[error("Failed to write screenshot {path}: {source}")]
    Screenshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Action(#[from] ActionError),
}

impl From<PortError> for UtilsError {
    fn from(err: PortError) -> Self {
        UtilsError::Action(err.into())
    }
}

/// Form data for checkout-style inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomUserData {
    pub first_name: String,
    pub last_name: String,
    pub zip_code: String,
}

/// Log in through the `data-test` hooks, bypassing the page objects.
pub async fn perform_login(
    port: Arc<dyn BrowserPort>,
    settings: &PageSettings,
    user: UserKind,
) -> Result<(), ActionError> {
    let cred = user.credential();
    port.navigate(&settings.urls.login()).await?;
    let resolver = LocatorResolver::new(port).with_timeout(settings.action_timeout);
    resolver
        .act_on(&Query::test_id("username"), &ElementAction::fill(cred.username))
        .await?;
    resolver
        .act_on(&Query::test_id("password"), &ElementAction::fill(cred.password))
        .await?;
    resolver
        .act_on(&Query::test_id("login-button"), &ElementAction::Click)
        .await?;
    debug!(user = cred.username, "Submitted login form");
    Ok(())
}

/// Add each product by clicking the add-to-cart button inside its container.
pub async fn add_products_to_cart(
    port: Arc<dyn BrowserPort>,
    settings: &PageSettings,
    names: &[&str],
) -> Result<(), UtilsError> {
    let waiter = Waiter::new(port.clone());
    let resolver = LocatorResolver::new(port).with_timeout(settings.action_timeout);
    for &name in names {
        let container = Query::text(TextMatch::exact(name)).closest(".inventory_item");
        let button = container
            .clone()
            .locate(Query::role("button").named(TextMatch::contains("add to cart")));

        let outcome = async {
            waiter
                .wait_until(&Condition::Visible(container), settings.action_timeout)
                .await?;
            resolver.act_on(&button, &ElementAction::Click).await?;
            Ok::<_, ActionError>(())
        }
        .await;

        outcome.map_err(|source| UtilsError::AddToCart {
            product: name.to_string(),
            source,
        })?;
        sleep(settings.settle_delay).await;
    }
    info!(count = names.len(), "Added products to cart");
    Ok(())
}

/// Wait until the URL ends with `/<expected_suffix>`.
pub async fn wait_for_page_load(
    port: Arc<dyn BrowserPort>,
    expected_suffix: &str,
    timeout: Duration,
) -> Result<(), ActionError> {
    let suffix = format!("/{}", expected_suffix.trim_start_matches('/'));
    Waiter::new(port)
        .wait_until(&Condition::UrlEndsWith(suffix), timeout)
        .await
}

pub fn generate_random_user_data() -> RandomUserData {
    let timestamp = Utc::now().timestamp_millis();
    let zip: u32 = rand::thread_rng().gen_range(10_000..100_000);
    RandomUserData {
        first_name: format!("Test{}", timestamp),
        last_name: format!("User{}", timestamp),
        zip_code: zip.to_string(),
    }
}

/// `<dir>/<test_name>-<timestamp>.png`, with `:` and `.` in the timestamp replaced.
pub fn screenshot_path(dir: &Path, test_name: &str) -> PathBuf {
    let timestamp = Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    dir.join(format!("{}-{}.png", test_name, timestamp))
}

/// Capture a full-page screenshot under `dir`.
pub async fn take_screenshot(
    port: Arc<dyn BrowserPort>,
    dir: &Path,
    test_name: &str,
) -> Result<PathBuf, UtilsError> {
    let png = port.screenshot().await?;
    let path = screenshot_path(dir, test_name);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| UtilsError::Screenshot {
            path: path.clone(),
            source,
        })?;
    tokio::fs::write(&path, png)
        .await
        .map_err(|source| UtilsError::Screenshot {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), "Saved screenshot");
    Ok(path)
}

pub async fn clear_browser_storage(port: Arc<dyn BrowserPort>) -> Result<(), ActionError> {
    port.clear_storage().await?;
    debug!("Cleared browser storage");
    Ok(())
}

/// Badge count, or 0 when the badge is hidden or unreadable.
pub async fn get_cart_count(port: Arc<dyn BrowserPort>) -> usize {
    let badge = Query::test_id("shopping-cart-badge");
    let handle = match port.find_unique(&badge).await {
        Ok(Lookup::Found(handle)) => handle,
        _ => return 0,
    };
    if !port.is_visible(&handle).await.unwrap_or(false) {
        return 0;
    }
    match port.text_content(&handle).await {
        Ok(Some(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Wait until the first element matching `selector` has trimmed text `expected`.
pub async fn wait_for_element_text(
    port: Arc<dyn BrowserPort>,
    selector: &str,
    expected: &str,
    timeout: Duration,
) -> Result<(), ActionError> {
    Waiter::new(port)
        .wait_until(
            &Condition::Text(Query::css(selector).first(), TextMatch::exact(expected)),
            timeout,
        )
        .await
}

/// Run `action` under the Backoff Scheduler.
pub async fn retry_action<T, E, F, Fut>(action: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry(action, policy).await
}

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Names of every listed product, in page order.
pub async fn get_all_product_names(port: Arc<dyn BrowserPort>) -> Result<Vec<String>, ActionError> {
    let handles = port.find_all(&Query::test_id("inventory-item-name")).await?;
    let mut names = Vec::with_capacity(handles.len());
    for handle in &handles {
        names.push(port.text_content(handle).await?.unwrap_or_default());
    }
    Ok(names)
}

/// Warn about images without alt text and inputs without labels.
pub async fn verify_basic_accessibility(
    port: Arc<dyn BrowserPort>,
) -> Result<AccessibilityAudit, ActionError> {
    let audit = port.accessibility_audit().await?;
    if audit.images_without_alt > 0 {
        warn!(count = audit.images_without_alt, "Found images without alt attributes");
    }
    if audit.inputs_without_labels > 0 {
        warn!(count = audit.inputs_without_labels, "Found inputs without proper labels");
    }
    Ok(audit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_data_shape() {
        let data = generate_random_user_data();
        assert!(data.first_name.starts_with("Test"));
        assert!(data.last_name.starts_with("User"));
        assert_eq!(data.zip_code.len(), 5);
        assert!(data.zip_code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn screenshot_path_has_no_colons() {
        let path = screenshot_path(Path::new("shots"), "cart-persistence");
        let file = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file.starts_with("cart-persistence-"));
        assert!(file.ends_with(".png"));
        assert!(!file.trim_end_matches(".png").contains([':', '.']));
    }
}
