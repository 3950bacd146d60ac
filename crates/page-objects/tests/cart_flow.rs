//! Inventory and cart page objects driven through the authenticated fixture.

use action_locator::{ActionError, Tier};
use browser_port::BrowserPort;
use page_objects::{authenticated, products, PageSet, PageSettings};
use std::sync::Arc;
use std::time::Duration;
use storefront_sim::{SimOptions, SimProduct, Storefront};

fn settings() -> Arc<PageSettings> {
    Arc::new(PageSettings {
        action_timeout: Duration::from_millis(1000),
        expect_timeout: Duration::from_millis(1000),
        settle_delay: Duration::from_millis(10),
        ..PageSettings::default()
    })
}

async fn signed_in(options: SimOptions) -> (Arc<Storefront>, PageSet) {
    let site = Arc::new(Storefront::new(options));
    let port: Arc<dyn BrowserPort> = site.clone();
    let pages = authenticated(port, settings()).await.unwrap();
    (site, pages)
}

#[tokio::test(start_paused = true)]
async fn single_product_lands_in_cart() {
    let (site, pages) = signed_in(SimOptions::default()).await;
    let backpack = products::BACKPACK;

    let resolution = pages
        .inventory
        .add_product_to_cart(backpack.name)
        .await
        .unwrap();
    assert_eq!(resolution.tier, Tier::Primary);

    pages.inventory.verify_cart_badge_count(1).await.unwrap();
    pages
        .inventory
        .verify_product_button_text(backpack.name, "Remove")
        .await
        .unwrap();

    pages.inventory.navigate_to_cart().await.unwrap();
    pages.cart.verify_page_loaded().await.unwrap();
    pages.cart.verify_cart_headers().await.unwrap();
    pages
        .cart
        .verify_product_in_cart(backpack.name, backpack.price)
        .await
        .unwrap();
    pages.cart.verify_cart_quantity(1).await.unwrap();
    pages.cart.verify_action_buttons().await.unwrap();
    assert_eq!(site.cart(), vec![backpack.slug()]);
}

#[tokio::test(start_paused = true)]
async fn three_products_show_in_badge_and_cart() {
    let (_site, pages) = signed_in(SimOptions::default()).await;
    let picks = [products::BACKPACK, products::BIKE_LIGHT, products::BOLT_T_SHIRT];

    for product in &picks {
        pages.inventory.add_product_to_cart(product.name).await.unwrap();
    }
    pages.inventory.verify_cart_badge_count(3).await.unwrap();

    pages.inventory.navigate_to_cart().await.unwrap();
    pages.cart.verify_page_loaded().await.unwrap();
    assert_eq!(pages.cart.cart_item_count().await.unwrap(), 3);
    for product in &picks {
        pages
            .cart
            .verify_product_in_cart(product.name, product.price)
            .await
            .unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn three_products_count_the_same_in_any_order() {
    let picks = [products::BACKPACK, products::BIKE_LIGHT, products::BOLT_T_SHIRT];
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut expected: Vec<String> = picks.iter().map(|p| p.slug()).collect();
    expected.sort();

    for order in orders {
        let (site, pages) = signed_in(SimOptions::default()).await;
        for &i in &order {
            pages.inventory.add_product_to_cart(picks[i].name).await.unwrap();
        }
        pages.inventory.verify_cart_badge_count(3).await.unwrap();

        pages.inventory.navigate_to_cart().await.unwrap();
        pages.cart.verify_page_loaded().await.unwrap();
        assert_eq!(pages.cart.cart_item_count().await.unwrap(), 3, "order {:?}", order);
        for product in &picks {
            pages
                .cart
                .verify_product_in_cart(product.name, product.price)
                .await
                .unwrap();
        }
        let mut slugs = site.cart();
        slugs.sort();
        assert_eq!(slugs, expected, "order {:?}", order);
    }
}

#[tokio::test(start_paused = true)]
async fn overlapping_names_never_act_on_the_other_product() {
    let options = SimOptions {
        catalog: vec![
            SimProduct::new("Sauce Labs Onesie", "$7.99", "Rib snap infant onesie."),
            SimProduct::new("Sauce Labs Onesie Deluxe", "$17.99", "Now with pockets."),
        ],
        ..SimOptions::default()
    };
    let (site, pages) = signed_in(options).await;
    let deluxe = vec!["sauce-labs-onesie-deluxe".to_string()];

    let resolution = pages
        .inventory
        .add_product_to_cart("Sauce Labs Onesie Deluxe")
        .await
        .unwrap();
    assert_eq!(resolution.tier, Tier::Primary);
    assert_eq!(site.cart(), deluxe);

    let err = pages
        .inventory
        .remove_product_from_cart("Sauce Labs Onesie")
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::TiersExhausted { .. }));
    assert_eq!(site.cart(), deluxe);

    assert!(pages
        .inventory
        .verify_product_button_text("Sauce Labs Onesie", "Remove")
        .await
        .is_err());
    pages
        .inventory
        .verify_product_button_text("Sauce Labs Onesie Deluxe", "Remove")
        .await
        .unwrap();

    pages.inventory.navigate_to_cart().await.unwrap();
    pages.cart.verify_page_loaded().await.unwrap();
    assert!(pages
        .cart
        .verify_product_in_cart("Sauce Labs Onesie", "$7.99")
        .await
        .is_err());
    pages
        .cart
        .verify_product_in_cart("Sauce Labs Onesie Deluxe", "$17.99")
        .await
        .unwrap();

    assert!(pages
        .cart
        .remove_product_from_cart("Sauce Labs Onesie")
        .await
        .is_err());
    assert_eq!(site.cart(), deluxe);

    pages
        .cart
        .remove_product_from_cart("Sauce Labs Onesie Deluxe")
        .await
        .unwrap();
    assert!(site.cart().is_empty());
}

#[tokio::test(start_paused = true)]
async fn ambiguous_name_resolves_through_fallback() {
    let options = SimOptions {
        catalog: vec![
            SimProduct::new("Sauce Labs Onesie", "$7.99", "Rib snap infant onesie."),
            SimProduct::new("Sauce Labs Onesie Deluxe", "$17.99", "Now with pockets."),
        ],
        ..SimOptions::default()
    };
    let (site, pages) = signed_in(options).await;

    let start = tokio::time::Instant::now();
    let resolution = pages
        .inventory
        .add_product_to_cart("Sauce Labs Onesie")
        .await
        .unwrap();
    assert!(resolution.used_fallback());
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(site.cart(), vec!["sauce-labs-onesie".to_string()]);
    pages.inventory.verify_cart_badge_count(1).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn removing_from_inventory_hides_badge() {
    let (site, pages) = signed_in(SimOptions::default()).await;
    let light = products::BIKE_LIGHT;

    pages.inventory.add_product_to_cart(light.name).await.unwrap();
    pages.inventory.verify_cart_badge_count(1).await.unwrap();

    pages
        .inventory
        .remove_product_from_cart(light.name)
        .await
        .unwrap();
    pages.inventory.verify_cart_badge_count(0).await.unwrap();
    pages
        .inventory
        .verify_product_button_text(light.name, "Add to cart")
        .await
        .unwrap();
    assert!(site.cart().is_empty());
}

#[tokio::test(start_paused = true)]
async fn selector_variants_use_data_test_hooks() {
    let (site, pages) = signed_in(SimOptions::default()).await;
    let onesie = products::ONESIE;

    pages
        .inventory
        .add_product_to_cart_by_selector(onesie.primary_selector)
        .await
        .unwrap();
    pages
        .inventory
        .verify_product_button_text_by_selector(onesie.fallback_selector, "Remove")
        .await
        .unwrap();
    pages
        .inventory
        .remove_product_from_cart_by_selector(onesie.fallback_selector)
        .await
        .unwrap();
    assert!(site.cart().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cart_page_removal_empties_cart() {
    let (_site, pages) = signed_in(SimOptions::default()).await;
    let jacket = products::FLEECE_JACKET;

    pages.inventory.add_product_to_cart(jacket.name).await.unwrap();
    pages.inventory.navigate_to_cart().await.unwrap();
    pages.cart.verify_page_loaded().await.unwrap();

    pages.cart.remove_product_from_cart(jacket.name).await.unwrap();
    pages.cart.verify_empty_cart().await.unwrap();
    pages.cart.verify_cart_headers().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cart_survives_reload_and_navigation() {
    let (_site, pages) = signed_in(SimOptions::default()).await;
    let shirt = products::TEST_T_SHIRT_RED;

    pages.inventory.add_product_to_cart(shirt.name).await.unwrap();
    pages.port().reload().await.unwrap();
    pages.inventory.verify_page_loaded().await.unwrap();
    pages.inventory.verify_cart_badge_count(1).await.unwrap();

    pages.inventory.navigate_to_cart().await.unwrap();
    pages.cart.continue_shopping().await.unwrap();
    pages.inventory.verify_page_loaded().await.unwrap();
    pages.inventory.verify_cart_badge_count(1).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn labelled_cart_link_resolves_semantically() {
    let options = SimOptions {
        label_cart_link: true,
        ..SimOptions::default()
    };
    let (_site, pages) = signed_in(options).await;

    let resolution = pages.inventory.navigate_to_cart().await.unwrap();
    assert_eq!(resolution.tier, Tier::Primary);
    pages.cart.verify_page_loaded().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn checkout_opens_step_one() {
    let (site, pages) = signed_in(SimOptions::default()).await;

    pages
        .inventory
        .add_product_to_cart(products::BACKPACK.name)
        .await
        .unwrap();
    pages.inventory.navigate_to_cart().await.unwrap();
    pages.cart.proceed_to_checkout().await.unwrap();

    assert_eq!(
        site.current_url().await.unwrap(),
        pages.settings().urls.checkout_step_one()
    );
}
