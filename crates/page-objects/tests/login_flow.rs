//! Login page behavior against the simulated storefront.

use action_locator::ErrorKind;
use browser_port::BrowserPort;
use page_objects::{error_messages, users, InventoryPage, LoginPage, PageSettings};
use std::sync::Arc;
use std::time::Duration;
use storefront_sim::{SimOptions, Storefront};

fn settings() -> Arc<PageSettings> {
    Arc::new(PageSettings {
        action_timeout: Duration::from_millis(1000),
        expect_timeout: Duration::from_millis(1000),
        settle_delay: Duration::from_millis(10),
        ..PageSettings::default()
    })
}

fn pages(site: &Arc<Storefront>) -> (LoginPage, InventoryPage) {
    let port: Arc<dyn BrowserPort> = site.clone();
    let settings = settings();
    (
        LoginPage::new(port.clone(), settings.clone()),
        InventoryPage::new(port, settings),
    )
}

#[tokio::test(start_paused = true)]
async fn standard_user_reaches_inventory() {
    let site = Arc::new(Storefront::default());
    let (login, inventory) = pages(&site);

    login.navigate_to().await.unwrap();
    login.verify_page_elements().await.unwrap();
    login.verify_credentials_help().await.unwrap();
    login
        .login(users::STANDARD.username, users::STANDARD.password)
        .await
        .unwrap();

    inventory.verify_page_loaded().await.unwrap();
    inventory.verify_add_to_cart_button_visible().await.unwrap();
    inventory.verify_cart_badge_count(0).await.unwrap();
    assert_eq!(site.session().as_deref(), Some("standard_user"));
}

#[tokio::test(start_paused = true)]
async fn locked_out_user_stays_on_login() {
    let site = Arc::new(Storefront::default());
    let (login, _) = pages(&site);

    login.navigate_to().await.unwrap();
    login
        .login(users::LOCKED_OUT.username, users::LOCKED_OUT.password)
        .await
        .unwrap();

    login
        .verify_error_message(error_messages::LOCKED_OUT)
        .await
        .unwrap();
    login.verify_current_url().await.unwrap();
    assert!(site.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn validation_messages_follow_form_state() {
    let site = Arc::new(Storefront::default());
    let (login, _) = pages(&site);

    login.navigate_to().await.unwrap();
    login.login("", "").await.unwrap();
    login
        .verify_error_message(error_messages::USERNAME_REQUIRED)
        .await
        .unwrap();

    login.navigate_to().await.unwrap();
    login.login(users::STANDARD.username, "").await.unwrap();
    login
        .verify_error_message(error_messages::PASSWORD_REQUIRED)
        .await
        .unwrap();

    login.navigate_to().await.unwrap();
    login
        .login(users::INVALID.username, users::INVALID.password)
        .await
        .unwrap();
    login
        .verify_error_message(error_messages::INVALID_CREDENTIALS)
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn wrong_error_text_is_an_assertion_failure() {
    let site = Arc::new(Storefront::default());
    let (login, _) = pages(&site);

    login.navigate_to().await.unwrap();
    login
        .login(users::LOCKED_OUT.username, users::LOCKED_OUT.password)
        .await
        .unwrap();

    let start = tokio::time::Instant::now();
    let err = login
        .verify_error_message(error_messages::USERNAME_REQUIRED)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assertion);
    assert!(err.to_string().contains("locked out"));
    assert!(start.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn protected_page_redirects_to_login() {
    let site = Arc::new(Storefront::default());
    let (login, _) = pages(&site);

    site.navigate("https://www.saucedemo.com/inventory.html")
        .await
        .unwrap();

    login.verify_page_loaded().await.unwrap();
    login
        .verify_error_message("You can only access '/inventory.html' when you are logged in.")
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_paint_is_absorbed_by_bounded_waits() {
    let site = Arc::new(Storefront::new(SimOptions {
        glitch_delay: Duration::from_millis(600),
        ..SimOptions::default()
    }));
    let (login, inventory) = pages(&site);

    login.navigate_to().await.unwrap();
    login
        .login(
            users::PERFORMANCE_GLITCH.username,
            users::PERFORMANCE_GLITCH.password,
        )
        .await
        .unwrap();

    let start = tokio::time::Instant::now();
    inventory.verify_page_loaded().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test(start_paused = true)]
async fn logout_returns_to_login() {
    let site = Arc::new(Storefront::default());
    let (login, inventory) = pages(&site);

    login.navigate_to().await.unwrap();
    login
        .login(users::STANDARD.username, users::STANDARD.password)
        .await
        .unwrap();
    inventory.verify_page_loaded().await.unwrap();

    inventory.logout().await.unwrap();
    login.verify_page_loaded().await.unwrap();
    assert!(site.session().is_none());
}
