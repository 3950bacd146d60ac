//! Inventory (product listing) page

use crate::{expect::Expect, settings::PageSettings};
use action_locator::{ActionError, ElementAction, LocatorResolver, Resolution, Strategy};
use browser_port::{BrowserPort, ElementHandle, Query, TextMatch};
use std::sync::Arc;
use tracing::{debug, info, warn};

const ITEM: &str = ".inventory_item";

pub struct InventoryPage {
    port: Arc<dyn BrowserPort>,
    resolver: LocatorResolver,
    expect: Expect,
    settings: Arc<PageSettings>,
}

impl InventoryPage {
    pub fn new(port: Arc<dyn BrowserPort>, settings: Arc<PageSettings>) -> Self {
        Self {
            resolver: LocatorResolver::new(port.clone()).with_timeout(settings.action_timeout),
            expect: Expect::new(port.clone(), settings.expect_timeout),
            port,
            settings,
        }
    }

    pub fn port(&self) -> &Arc<dyn BrowserPort> {
        &self.port
    }

    pub fn menu_button(&self) -> Query {
        Query::role("button").named(TextMatch::contains("open menu"))
    }

    pub fn logout_link(&self) -> Query {
        Query::role("link").named(TextMatch::contains("logout"))
    }

    pub fn products_title(&self) -> Query {
        Query::test_id("title")
    }

    /// No semantic alternative exists for the badge.
    pub fn cart_badge(&self) -> Query {
        Query::test_id("shopping-cart-badge")
    }

    pub fn cart_link(&self) -> Query {
        Query::role("link")
            .named(TextMatch::contains("shopping cart"))
            .or(Query::test_id("shopping-cart-link"))
    }

    pub fn sorting_dropdown(&self) -> Query {
        Query::role("combobox")
            .named(TextMatch::contains("product sort"))
            .or(Query::test_id("product-sort-container"))
    }

    pub fn product_by_name(&self, name: &str) -> Query {
        Query::text(TextMatch::exact(name))
    }

    /// The one item mentioning `name`, provided its name is exactly `name`.
    /// Ambiguous when several items mention it.
    fn container(name: &str) -> Query {
        Query::css(ITEM)
            .filter_has_text(TextMatch::contains(name))
            .single()
            .filter_has(Query::text(TextMatch::exact(name)))
    }

    fn add_button() -> Query {
        Query::role("button").named(TextMatch::contains("add to cart"))
    }

    fn remove_button_in_item() -> Query {
        Query::role("button").named(TextMatch::contains("remove"))
    }

    pub fn add_to_cart_button(&self, name: &str) -> Query {
        Self::container(name).locate(Self::add_button())
    }

    pub fn remove_button(&self, name: &str) -> Query {
        Self::container(name).locate(Self::remove_button_in_item())
    }

    pub fn add_to_cart_buttons(&self) -> Query {
        Self::add_button()
    }

    /// The item whose name is exactly `name`, climbing from the name text.
    fn scoped_item(name: &str) -> Query {
        Query::text(TextMatch::exact(name)).closest(ITEM)
    }

    fn add_strategy(&self, name: &str) -> Strategy {
        Strategy::new(
            self.add_to_cart_button(name),
            Self::scoped_item(name).locate(Self::add_button()),
        )
    }

    fn remove_strategy(&self, name: &str) -> Strategy {
        Strategy::new(
            self.remove_button(name),
            Self::scoped_item(name).locate(Self::remove_button_in_item()),
        )
    }

    pub async fn logout(&self) -> Result<(), ActionError> {
        self.resolver
            .resolve_and_act(
                &Strategy::new(self.menu_button(), Query::css("#react-burger-menu-btn")),
                &ElementAction::Click,
            )
            .await?;
        self.resolver
            .resolve_and_act(
                &Strategy::new(self.logout_link(), Query::test_id("logout-sidebar-link")),
                &ElementAction::Click,
            )
            .await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn add_product_to_cart(&self, name: &str) -> Result<Resolution, ActionError> {
        let resolution = self
            .resolver
            .resolve_and_act(&self.add_strategy(name), &ElementAction::Click)
            .await?;
        info!(product = name, tier = %resolution.tier, "Added product to cart");
        Ok(resolution)
    }

    pub async fn add_product_to_cart_by_selector(&self, selector: &str) -> Result<ElementHandle, ActionError> {
        self.resolver
            .act_on(&Query::css(selector), &ElementAction::Click)
            .await
    }

    pub async fn remove_product_from_cart(&self, name: &str) -> Result<Resolution, ActionError> {
        let resolution = self
            .resolver
            .resolve_and_act(&self.remove_strategy(name), &ElementAction::Click)
            .await?;
        info!(product = name, tier = %resolution.tier, "Removed product from cart");
        Ok(resolution)
    }

    pub async fn remove_product_from_cart_by_selector(&self, selector: &str) -> Result<ElementHandle, ActionError> {
        self.resolver
            .act_on(&Query::css(selector), &ElementAction::Click)
            .await
    }

    /// Follow the header cart link, falling back to the badge.
    pub async fn navigate_to_cart(&self) -> Result<Resolution, ActionError> {
        self.resolver
            .resolve_and_act(
                &Strategy::new(self.cart_link(), self.cart_badge()),
                &ElementAction::Click,
            )
            .await
    }

    /// Title painted and the URL is the inventory page.
    pub async fn verify_page_loaded(&self) -> Result<(), ActionError> {
        self.expect.visible(&self.products_title()).await?;
        self.expect.url(&self.settings.urls.inventory()).await
    }

    /// A count of zero means the badge is not shown at all.
    pub async fn verify_cart_badge_count(&self, expected: usize) -> Result<(), ActionError> {
        let badge = self.cart_badge();
        if expected == 0 {
            return self.expect.hidden(&badge).await;
        }
        self.expect.visible(&badge).await?;
        self.expect
            .text(&badge, TextMatch::exact(expected.to_string()))
            .await
    }

    pub async fn verify_product_button_text(&self, name: &str, expected: &str) -> Result<(), ActionError> {
        let semantic = if expected.to_lowercase().contains("remove") {
            (self.remove_button(name), TextMatch::contains("remove"))
        } else {
            (self.add_to_cart_button(name), TextMatch::contains("add to cart"))
        };

        let outcome = async {
            self.expect.visible(&semantic.0).await?;
            self.expect.text(&semantic.0, semantic.1.clone()).await
        }
        .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(product = name, error = %err, "Semantic button check failed, using container button");
                let button = Self::scoped_item(name).locate(Query::css("button"));
                self.expect
                    .text(&button, TextMatch::contains(expected))
                    .await
            }
        }
    }

    pub async fn verify_product_button_text_by_selector(&self, selector: &str, expected: &str) -> Result<(), ActionError> {
        self.expect
            .text(&Query::css(selector), TextMatch::exact(expected))
            .await
    }

    pub async fn verify_product_exists(&self, name: &str) -> Result<(), ActionError> {
        debug!(product = name, "Checking product is listed");
        self.expect.visible(&self.product_by_name(name)).await
    }

    pub async fn verify_add_to_cart_button_visible(&self) -> Result<(), ActionError> {
        self.expect.visible(&self.add_to_cart_buttons().first()).await
    }
}
