//! Shopping cart scenarios, all starting from an authenticated session

use super::{CaseContext, CaseFuture, Suite, TestCase};
use anyhow::ensure;
use browser_port::BrowserPort;
use futures::FutureExt;
use page_objects::{authenticated, products, utils, PageSet};

pub const CASES: &[TestCase] = &[
    TestCase::new(
        Suite::Cart,
        "single-item",
        "Add single item to cart",
        single_item,
    ),
    TestCase::new(
        Suite::Cart,
        "multiple-items",
        "Add multiple items to cart",
        multiple_items,
    ),
    TestCase::new(
        Suite::Cart,
        "multiple-items-utils",
        "Add multiple items using the cart helper",
        multiple_items_utils,
    ),
    TestCase::new(
        Suite::Cart,
        "persistence",
        "Cart state persists across navigation and reload",
        persistence,
    ),
];

async fn signed_in(cx: &CaseContext) -> anyhow::Result<PageSet> {
    Ok(authenticated(cx.port.clone(), cx.settings.clone()).await?)
}

async fn expect_cart_count(cx: &CaseContext, expected: usize) -> anyhow::Result<()> {
    let count = utils::get_cart_count(cx.port.clone()).await;
    ensure!(
        count == expected,
        "cart count is {}, expected {}",
        count,
        expected
    );
    Ok(())
}

fn single_item(cx: CaseContext) -> CaseFuture {
    async move {
        let pages = signed_in(&cx).await?;
        let backpack = products::BACKPACK;
        let policy = cx.settings.retry;

        pages.inventory.verify_product_exists(backpack.name).await?;
        expect_cart_count(&cx, 0).await?;
        pages.inventory.verify_add_to_cart_button_visible().await?;

        pages.inventory.add_product_to_cart(backpack.name).await?;
        utils::retry_action(
            || {
                pages
                    .inventory
                    .verify_product_button_text(backpack.name, "Remove")
            },
            &policy,
        )
        .await?;
        pages.inventory.verify_cart_badge_count(1).await?;

        pages.inventory.navigate_to_cart().await?;
        pages.cart.verify_page_loaded().await?;
        pages
            .cart
            .verify_product_in_cart(backpack.name, backpack.price)
            .await?;
        pages.cart.verify_cart_quantity(1).await?;
        pages.cart.verify_cart_headers().await?;
        pages.cart.verify_action_buttons().await?;

        pages.cart.continue_shopping().await?;
        pages.inventory.verify_page_loaded().await?;
        expect_cart_count(&cx, 1).await
    }
    .boxed()
}

fn multiple_items(cx: CaseContext) -> CaseFuture {
    async move {
        let pages = signed_in(&cx).await?;
        let picks = [products::BACKPACK, products::BIKE_LIGHT, products::BOLT_T_SHIRT];

        for product in &picks {
            pages.inventory.add_product_to_cart(product.name).await?;
        }
        pages.inventory.verify_cart_badge_count(picks.len()).await?;

        pages.inventory.navigate_to_cart().await?;
        pages.cart.verify_page_loaded().await?;
        for product in &picks {
            pages
                .cart
                .verify_product_in_cart(product.name, product.price)
                .await?;
        }
        Ok(())
    }
    .boxed()
}

fn multiple_items_utils(cx: CaseContext) -> CaseFuture {
    async move {
        let pages = signed_in(&cx).await?;
        let policy = cx.settings.retry;
        let picks = [products::BOLT_T_SHIRT, products::BACKPACK, products::BIKE_LIGHT];
        let names: Vec<&str> = picks.iter().map(|p| p.name).collect();

        pages.inventory.verify_page_loaded().await?;
        expect_cart_count(&cx, 0).await?;

        utils::add_products_to_cart(cx.port.clone(), &cx.settings, &names).await?;
        utils::retry_action(
            || pages.inventory.verify_cart_badge_count(picks.len()),
            &policy,
        )
        .await?;

        pages.inventory.navigate_to_cart().await?;
        pages.cart.verify_page_loaded().await?;
        for product in &picks {
            utils::retry_action(
                || pages.cart.verify_product_in_cart(product.name, product.price),
                &policy,
            )
            .await?;
        }
        expect_cart_count(&cx, picks.len()).await
    }
    .boxed()
}

fn persistence(cx: CaseContext) -> CaseFuture {
    async move {
        let pages = signed_in(&cx).await?;

        pages
            .inventory
            .add_product_to_cart(products::BACKPACK.name)
            .await?;
        pages.inventory.navigate_to_cart().await?;
        pages.cart.continue_shopping().await?;
        expect_cart_count(&cx, 1).await?;

        cx.port.reload().await?;
        pages.inventory.verify_page_loaded().await?;
        expect_cart_count(&cx, 1).await
    }
    .boxed()
}
