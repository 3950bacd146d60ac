//! Screen rendering for the simulated storefront

use crate::catalog::{SimProduct, ACCEPTED_USERS, SHARED_PASSWORD};
use crate::dom::{Behavior, Dom, El};
use crate::site::{Screen, SimOptions, SiteState};

pub(crate) fn render(state: &SiteState, options: &SimOptions) -> Dom {
    let body = match state.screen {
        Screen::Blank => El::new("div"),
        Screen::Login => login(state),
        Screen::Inventory => El::new("div")
            .attr("id", "page_wrapper")
            .child(header(state, options))
            .child(inventory(state, options)),
        Screen::Cart => El::new("div")
            .attr("id", "page_wrapper")
            .child(header(state, options))
            .child(cart(state, options)),
        Screen::CheckoutStepOne => El::new("div")
            .attr("id", "page_wrapper")
            .child(header(state, options))
            .child(checkout_step_one()),
    };
    Dom::build(El::new("body").child(El::new("div").attr("id", "root").child(body)))
}

fn login(state: &SiteState) -> El {
    let mut error_container = El::new("div").class(if state.error.is_some() {
        "error-message-container error"
    } else {
        "error-message-container"
    });
    if let Some(error) = &state.error {
        error_container = error_container.child(El::new("h3").test_id("error").text(error));
    }

    let form = El::new("form").children([
        El::new("div").class("form_group").child(
            El::new("input")
                .class("input_error form_input")
                .test_id("username")
                .attr("id", "user-name")
                .attr("type", "text")
                .attr("placeholder", "Username")
                .attr("value", &state.username),
        ),
        El::new("div").class("form_group").child(
            El::new("input")
                .class("input_error form_input")
                .test_id("password")
                .attr("id", "password")
                .attr("type", "password")
                .attr("placeholder", "Password")
                .attr("value", &state.password),
        ),
        error_container,
        El::new("input")
            .class("submit-button btn_action")
            .test_id("login-button")
            .attr("id", "login-button")
            .attr("type", "submit")
            .attr("value", "Login")
            .on_click(Behavior::SubmitLogin),
    ]);

    let usernames = ACCEPTED_USERS
        .iter()
        .map(|user| El::new("div").text(user));

    El::new("div").class("login_container").children([
        El::new("div").class("login_logo").text("Swag Labs"),
        El::new("div")
            .class("login_wrapper")
            .child(El::new("div").class("login-box").child(form)),
        El::new("div").class("login_credentials_wrap").children([
            El::new("div")
                .class("login_credentials")
                .test_id("login-credentials")
                .child(El::new("h4").text("Accepted usernames are:"))
                .children(usernames),
            El::new("div")
                .class("login_password")
                .test_id("login-password")
                .child(El::new("h4").text("Password for all users:"))
                .child(El::new("div").text(SHARED_PASSWORD)),
        ]),
    ])
}

fn header(state: &SiteState, options: &SimOptions) -> El {
    let mut cart_link = El::new("a")
        .class("shopping_cart_link")
        .test_id("shopping-cart-link")
        .attr("href", "#")
        .on_click(Behavior::OpenCart);
    if options.label_cart_link {
        cart_link = cart_link.attr("aria-label", "Shopping cart");
    }
    if !state.cart.is_empty() {
        cart_link = cart_link.child(
            El::new("span")
                .class("shopping_cart_badge")
                .test_id("shopping-cart-badge")
                .text(&state.cart.len().to_string()),
        );
    }

    El::new("div")
        .class("primary_header")
        .test_id("primary-header")
        .children([
            El::new("div").class("bm-burger-button").child(
                El::new("button")
                    .attr("id", "react-burger-menu-btn")
                    .text("Open Menu")
                    .on_click(Behavior::OpenMenu),
            ),
            El::new("nav")
                .class("bm-menu")
                .hidden(!state.menu_open)
                .children([
                    El::new("a")
                        .attr("id", "inventory_sidebar_link")
                        .test_id("inventory-sidebar-link")
                        .attr("href", "#")
                        .text("All Items")
                        .on_click(Behavior::ContinueShopping),
                    El::new("a")
                        .attr("id", "logout_sidebar_link")
                        .test_id("logout-sidebar-link")
                        .attr("href", "#")
                        .text("Logout")
                        .on_click(Behavior::Logout),
                    El::new("button")
                        .attr("id", "react-burger-cross-btn")
                        .text("Close Menu")
                        .on_click(Behavior::CloseMenu),
                ]),
            El::new("div").class("app_logo").text("Swag Labs"),
            El::new("div")
                .class("shopping_cart_container")
                .child(cart_link),
        ])
}

fn inventory(state: &SiteState, options: &SimOptions) -> El {
    let items = options
        .catalog
        .iter()
        .enumerate()
        .map(|(idx, product)| inventory_item(idx, product, state.cart.contains(&product.slug)));

    El::new("div").class("inventory_container").children([
        El::new("div").class("header_secondary_container").children([
            El::new("span").class("title").test_id("title").text("Products"),
            El::new("select")
                .class("product_sort_container")
                .test_id("product-sort-container")
                .children(
                    [
                        "Name (A to Z)",
                        "Name (Z to A)",
                        "Price (low to high)",
                        "Price (high to low)",
                    ]
                    .into_iter()
                    .map(|label| El::new("option").text(label)),
                ),
        ]),
        El::new("div")
            .class("inventory_list")
            .test_id("inventory-list")
            .children(items),
    ])
}

fn inventory_item(idx: usize, product: &SimProduct, in_cart: bool) -> El {
    let button = if in_cart {
        El::new("button")
            .class("btn btn_secondary btn_small btn_inventory")
            .test_id(&format!("remove-{}", product.slug))
            .text("Remove")
            .on_click(Behavior::RemoveFromCart(product.slug.clone()))
    } else {
        El::new("button")
            .class("btn btn_primary btn_small btn_inventory")
            .test_id(&format!("add-to-cart-{}", product.slug))
            .text("Add to cart")
            .on_click(Behavior::AddToCart(product.slug.clone()))
    };

    El::new("div")
        .class("inventory_item")
        .test_id("inventory-item")
        .children([
            El::new("div").class("inventory_item_img").child(
                El::new("a").attr("href", "#").child(
                    El::new("img")
                        .class("inventory_item_img")
                        .attr("alt", &product.name),
                ),
            ),
            El::new("div")
                .class("inventory_item_description")
                .children([
                    El::new("div").class("inventory_item_label").children([
                        El::new("a")
                            .attr("href", "#")
                            .test_id(&format!("item-{}-title-link", idx))
                            .child(
                                El::new("div")
                                    .class("inventory_item_name")
                                    .test_id("inventory-item-name")
                                    .text(&product.name),
                            ),
                        El::new("div")
                            .class("inventory_item_desc")
                            .test_id("inventory-item-desc")
                            .text(&product.description),
                    ]),
                    El::new("div").class("pricebar").children([
                        El::new("div")
                            .class("inventory_item_price")
                            .test_id("inventory-item-price")
                            .text(&product.price),
                        button,
                    ]),
                ]),
        ])
}

fn cart(state: &SiteState, options: &SimOptions) -> El {
    let items = state
        .cart
        .iter()
        .filter_map(|slug| options.catalog.iter().find(|p| &p.slug == slug))
        .map(|product| {
            El::new("div")
                .class("cart_item")
                .test_id("inventory-item")
                .children([
                    El::new("div")
                        .class("cart_quantity")
                        .test_id("item-quantity")
                        .text("1"),
                    El::new("div").class("cart_item_label").children([
                        El::new("a").attr("href", "#").child(
                            El::new("div")
                                .class("inventory_item_name")
                                .test_id("inventory-item-name")
                                .text(&product.name),
                        ),
                        El::new("div")
                            .class("inventory_item_desc")
                            .text(&product.description),
                        El::new("div").class("item_pricebar").children([
                            El::new("div")
                                .class("inventory_item_price")
                                .test_id("inventory-item-price")
                                .text(&product.price),
                            El::new("button")
                                .class("btn btn_secondary btn_small cart_button")
                                .test_id(&format!("remove-{}", product.slug))
                                .text("Remove")
                                .on_click(Behavior::RemoveFromCart(product.slug.clone())),
                        ]),
                    ]),
                ])
        });

    El::new("div").class("cart_contents_container").children([
        El::new("div")
            .class("header_secondary_container")
            .child(El::new("span").class("title").test_id("title").text("Your Cart")),
        El::new("div")
            .class("cart_contents")
            .attr("id", "cart_contents_container")
            .child(
                El::new("div")
                    .class("cart_list")
                    .test_id("cart-list")
                    .children([
                        El::new("div")
                            .class("cart_quantity_label")
                            .test_id("cart-quantity-label")
                            .text("QTY"),
                        El::new("div")
                            .class("cart_desc_label")
                            .test_id("cart-desc-label")
                            .text("Description"),
                    ])
                    .children(items),
            )
            .child(
                El::new("div").class("cart_footer").children([
                    El::new("button")
                        .class("btn btn_secondary back btn_medium")
                        .attr("id", "continue-shopping")
                        .test_id("continue-shopping")
                        .text("Continue Shopping")
                        .on_click(Behavior::ContinueShopping),
                    El::new("button")
                        .class("btn btn_action btn_medium checkout_button")
                        .attr("id", "checkout")
                        .test_id("checkout")
                        .text("Checkout")
                        .on_click(Behavior::Checkout),
                ]),
            ),
    ])
}

fn checkout_step_one() -> El {
    El::new("div").class("checkout_info_container").children([
        El::new("div")
            .class("header_secondary_container")
            .child(
                El::new("span")
                    .class("title")
                    .test_id("title")
                    .text("Checkout: Your Information"),
            ),
        El::new("form").children([
            El::new("input")
                .test_id("firstName")
                .attr("type", "text")
                .attr("placeholder", "First Name"),
            El::new("input")
                .test_id("lastName")
                .attr("type", "text")
                .attr("placeholder", "Last Name"),
            El::new("input")
                .test_id("postalCode")
                .attr("type", "text")
                .attr("placeholder", "Zip/Postal Code"),
            El::new("button")
                .test_id("cancel")
                .text("Cancel")
                .on_click(Behavior::OpenCart),
        ]),
    ])
}
