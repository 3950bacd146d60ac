//! Cart page

use crate::{expect::Expect, settings::PageSettings};
use action_locator::{ActionError, ElementAction, LocatorResolver, Resolution, Strategy};
use browser_port::{BrowserPort, ElementHandle, Query, TextMatch};
use std::sync::Arc;
use tracing::{debug, info};

const CART_ITEM: &str = ".cart_item";

pub struct CartPage {
    port: Arc<dyn BrowserPort>,
    resolver: LocatorResolver,
    expect: Expect,
    settings: Arc<PageSettings>,
}

impl CartPage {
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

    pub fn cart_title(&self) -> Query {
        Query::test_id("title")
    }

    pub fn continue_shopping_button(&self) -> Query {
        Query::role("button").named(TextMatch::contains("continue shopping"))
    }

    pub fn checkout_button(&self) -> Query {
        Query::role("button").named(TextMatch::contains("checkout"))
    }

    pub fn cart_items(&self) -> Query {
        Query::css(CART_ITEM)
    }

    pub fn quantity_column(&self) -> Query {
        Query::role("columnheader")
            .named(TextMatch::contains("qty"))
            .or(Query::text(TextMatch::exact("QTY")))
    }

    pub fn description_column(&self) -> Query {
        Query::role("columnheader")
            .named(TextMatch::contains("description"))
            .or(Query::text(TextMatch::exact("Description")))
    }

    pub fn product_in_cart(&self, name: &str) -> Query {
        Query::text(TextMatch::exact(name))
    }

    /// The one row mentioning `name`, provided its name is exactly `name`.
    /// Ambiguous when several rows mention it.
    fn item(name: &str) -> Query {
        Query::css(CART_ITEM)
            .filter_has_text(TextMatch::contains(name))
            .single()
            .filter_has(Query::text(TextMatch::exact(name)))
    }

    /// The row whose item name is exactly `name`.
    fn scoped_item(name: &str) -> Query {
        Query::text(TextMatch::exact(name)).closest(CART_ITEM)
    }

    fn remove_in_row() -> Query {
        Query::role("button").named(TextMatch::contains("remove"))
    }

    /// Price text inside the product's own cart row.
    pub fn product_price(&self, name: &str) -> Query {
        Self::scoped_item(name).locate(Query::text(TextMatch::contains("$")))
    }

    pub fn remove_button_for_product(&self, name: &str) -> Query {
        Self::item(name).locate(Self::remove_in_row())
    }

    pub fn cart_quantities(&self) -> Query {
        Query::css(".cart_quantity")
    }

    pub async fn remove_product_from_cart(&self, name: &str) -> Result<Resolution, ActionError> {
        let fallback = Self::scoped_item(name).locate(Self::remove_in_row());
        let resolution = self
            .resolver
            .resolve_and_act(
                &Strategy::new(self.remove_button_for_product(name), fallback),
                &ElementAction::Click,
            )
            .await?;
        info!(product = name, tier = %resolution.tier, "Removed product from cart page");
        Ok(resolution)
    }

    pub async fn remove_product_from_cart_by_selector(&self, selector: &str) -> Result<ElementHandle, ActionError> {
        self.resolver
            .act_on(&Query::css(selector), &ElementAction::Click)
            .await
    }

    pub async fn continue_shopping(&self) -> Result<Resolution, ActionError> {
        self.resolver
            .resolve_and_act(
                &Strategy::new(self.continue_shopping_button(), Query::test_id("continue-shopping")),
                &ElementAction::Click,
            )
            .await
    }

    pub async fn proceed_to_checkout(&self) -> Result<Resolution, ActionError> {
        self.resolver
            .resolve_and_act(
                &Strategy::new(self.checkout_button(), Query::test_id("checkout")),
                &ElementAction::Click,
            )
            .await
    }

    pub async fn cart_item_count(&self) -> Result<usize, ActionError> {
        Ok(self.port.count(&self.cart_items()).await?)
    }

    /// Title painted and the URL is the cart page.
    pub async fn verify_page_loaded(&self) -> Result<(), ActionError> {
        self.expect.visible(&self.cart_title()).await?;
        self.expect.url(&self.settings.urls.cart()).await
    }

    pub async fn verify_product_in_cart(&self, name: &str, price: &str) -> Result<(), ActionError> {
        self.expect.visible(&self.product_in_cart(name)).await?;
        let price_text = self.product_price(name);
        self.expect.visible(&price_text).await?;
        self.expect.text(&price_text, TextMatch::exact(price)).await
    }

    pub async fn verify_cart_quantity(&self, expected: usize) -> Result<(), ActionError> {
        let expected = expected.to_string();
        let quantities = self.cart_quantities();
        if self.port.count(&quantities).await? > 0 {
            self.expect
                .text(&quantities.first(), TextMatch::exact(expected))
                .await
        } else {
            self.expect
                .visible(&Query::text(TextMatch::exact(expected)).first())
                .await
        }
    }

    pub async fn verify_empty_cart(&self) -> Result<(), ActionError> {
        self.expect.count(&self.cart_items(), 0).await
    }

    /// Column headers, or at least the cart contents area.
    pub async fn verify_cart_headers(&self) -> Result<(), ActionError> {
        let headers = async {
            self.expect.visible(&self.quantity_column()).await?;
            self.expect.visible(&self.description_column()).await
        }
        .await;
        if let Err(err) = headers {
            debug!(error = %err, "Cart headers not found, checking contents area");
            self.expect.visible(&Query::css(".cart_contents")).await?;
        }
        Ok(())
    }

    pub async fn verify_action_buttons(&self) -> Result<(), ActionError> {
        self.expect.visible(&self.continue_shopping_button()).await?;
        self.expect.visible(&self.checkout_button()).await
    }
}
