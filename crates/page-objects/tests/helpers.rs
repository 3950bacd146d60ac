//! Shared helpers and test data against the simulated storefront.

use action_retry::RetryPolicy;
use browser_port::BrowserPort;
use page_objects::{products, utils, PageSettings, UserKind, UtilsError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront_sim::{default_catalog, Screen, Storefront};

fn settings() -> PageSettings {
    PageSettings {
        action_timeout: Duration::from_millis(500),
        expect_timeout: Duration::from_millis(500),
        settle_delay: Duration::from_millis(10),
        ..PageSettings::default()
    }
}

async fn logged_in() -> (Arc<Storefront>, Arc<dyn BrowserPort>) {
    let site = Arc::new(Storefront::default());
    let port: Arc<dyn BrowserPort> = site.clone();
    utils::perform_login(port.clone(), &settings(), UserKind::Standard)
        .await
        .unwrap();
    (site, port)
}

#[test]
fn product_data_matches_storefront_catalog() {
    let catalog = default_catalog();
    assert_eq!(catalog.len(), products::ALL.len());
    for (listed, known) in catalog.iter().zip(products::ALL.iter()) {
        assert_eq!(listed.name, known.name);
        assert_eq!(listed.price, known.price);
        assert_eq!(listed.slug, known.slug());
        assert_eq!(listed.description, known.description);
    }
}

#[tokio::test(start_paused = true)]
async fn perform_login_opens_inventory() {
    let (site, port) = logged_in().await;
    utils::wait_for_page_load(port.clone(), "inventory.html", Duration::from_millis(500))
        .await
        .unwrap();
    utils::wait_for_element_text(port, ".title", "Products", Duration::from_millis(500))
        .await
        .unwrap();
    assert_eq!(site.screen(), Screen::Inventory);
}

#[tokio::test(start_paused = true)]
async fn bulk_add_counts_in_badge() {
    let (site, port) = logged_in().await;
    assert_eq!(utils::get_cart_count(port.clone()).await, 0);

    let names = [products::BACKPACK.name, products::ONESIE.name, products::BIKE_LIGHT.name];
    utils::add_products_to_cart(port.clone(), &settings(), &names)
        .await
        .unwrap();

    assert_eq!(utils::get_cart_count(port).await, 3);
    assert_eq!(site.cart().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn bulk_add_names_the_missing_product() {
    let (_site, port) = logged_in().await;

    let err = utils::add_products_to_cart(port, &settings(), &["Sauce Labs Umbrella"])
        .await
        .unwrap_err();
    assert!(matches!(err, UtilsError::AddToCart { .. }));
    assert!(err
        .to_string()
        .starts_with("Failed to add product \"Sauce Labs Umbrella\" to cart:"));
}

#[tokio::test(start_paused = true)]
async fn product_names_in_page_order() {
    let (_site, port) = logged_in().await;
    let names = utils::get_all_product_names(port).await.unwrap();
    let expected: Vec<String> = products::ALL.iter().map(|p| p.name.to_string()).collect();
    assert_eq!(names, expected);
}

#[tokio::test(start_paused = true)]
async fn cleared_storage_logs_out() {
    let (site, port) = logged_in().await;
    utils::add_products_to_cart(port.clone(), &settings(), &[products::BACKPACK.name])
        .await
        .unwrap();

    utils::clear_browser_storage(port.clone()).await.unwrap();
    port.navigate(&settings().urls.inventory()).await.unwrap();

    assert_eq!(site.screen(), Screen::Login);
    assert!(site.cart().is_empty());
}

#[tokio::test(start_paused = true)]
async fn login_page_audit_counts_unlabelled_inputs() {
    let site = Arc::new(Storefront::default());
    let port: Arc<dyn BrowserPort> = site.clone();
    port.navigate(&settings().urls.login()).await.unwrap();

    let audit = utils::verify_basic_accessibility(port).await.unwrap();
    assert_eq!(audit.images_without_alt, 0);
    assert_eq!(audit.inputs_without_labels, 3);
}

#[tokio::test]
async fn screenshot_written_under_directory() {
    let site = Arc::new(Storefront::default());
    let port: Arc<dyn BrowserPort> = site.clone();
    let dir = tempfile::tempdir().unwrap();
    let shots = dir.path().join("screenshots");

    let path = utils::take_screenshot(port, &shots, "login-page").await.unwrap();
    assert!(path.starts_with(&shots));
    let bytes = tokio::fs::read(&path).await.unwrap();
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
}

#[tokio::test(start_paused = true)]
async fn retry_action_recovers_flaky_step() {
    let policy = RetryPolicy::from_millis(2, 100).unwrap();
    let calls = AtomicU32::new(0);

    let start = tokio::time::Instant::now();
    let value = utils::retry_action(
        || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(format!("attempt {} failed", n + 1))
                } else {
                    Ok(n)
                }
            }
        },
        &policy,
    )
    .await
    .unwrap();

    assert_eq!(value, 2);
    assert_eq!(start.elapsed(), Duration::from_millis(300));
}
