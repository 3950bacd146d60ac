//! Page sets for one browsing context

use crate::{
    cart::CartPage, data::users, expect::Expect, inventory::InventoryPage, login::LoginPage,
    settings::PageSettings,
};
use action_locator::ActionError;
use browser_port::{BrowserPort, Query};
use std::sync::Arc;
use tracing::{error, info};

/// All three page objects sharing one port.
pub struct PageSet {
    pub login: LoginPage,
    pub inventory: InventoryPage,
    pub cart: CartPage,
    port: Arc<dyn BrowserPort>,
    settings: Arc<PageSettings>,
}

impl PageSet {
    pub fn new(port: Arc<dyn BrowserPort>, settings: Arc<PageSettings>) -> Self {
        Self {
            login: LoginPage::new(port.clone(), settings.clone()),
            inventory: InventoryPage::new(port.clone(), settings.clone()),
            cart: CartPage::new(port.clone(), settings.clone()),
            port,
            settings,
        }
    }

    pub fn port(&self) -> &Arc<dyn BrowserPort> {
        &self.port
    }

    pub fn settings(&self) -> &Arc<PageSettings> {
        &self.settings
    }
}

/// Page set logged in as the standard user and parked on the inventory page.
pub async fn authenticated(
    port: Arc<dyn BrowserPort>,
    settings: Arc<PageSettings>,
) -> Result<PageSet, ActionError> {
    let pages = PageSet::new(port.clone(), settings.clone());
    match sign_in(&pages).await {
        Ok(()) => {
            info!(user = users::STANDARD.username, "Authenticated session ready");
            Ok(pages)
        }
        Err(err) => {
            error!(error = %err, "Authentication setup failed");
            Err(err)
        }
    }
}

async fn sign_in(pages: &PageSet) -> Result<(), ActionError> {
    let expect = Expect::new(pages.port.clone(), pages.settings.expect_timeout);
    pages.login.navigate_to().await?;

    expect.visible(&pages.login.username_input()).await?;
    expect.visible(&pages.login.password_input()).await?;
    expect.visible(&pages.login.login_button()).await?;

    pages
        .login
        .login(users::STANDARD.username, users::STANDARD.password)
        .await?;

    expect.url_ends_with("/inventory.html").await?;
    expect.visible(&Query::test_id("title")).await?;
    pages.inventory.verify_page_loaded().await
}
