//! Login scenarios

use super::{CaseContext, CaseFuture, Suite, TestCase};
use anyhow::ensure;
use browser_port::BrowserPort;
use futures::FutureExt;
use page_objects::{error_messages, users, utils, Credential, InventoryPage, LoginPage};
use tracing::info;

pub const CASES: &[TestCase] = &[
    TestCase::new(
        Suite::Login,
        "standard-user",
        "Successful login with standard user",
        standard_user,
    ),
    TestCase::new(
        Suite::Login,
        "accessibility",
        "Login page accessibility check",
        accessibility,
    ),
    TestCase::new(
        Suite::Login,
        "user-types",
        "Login with different user types",
        user_types,
    ),
    TestCase::new(
        Suite::Login,
        "locked-out",
        "Locked out user sees an error",
        locked_out,
    ),
];

fn pages(cx: &CaseContext) -> (LoginPage, InventoryPage) {
    (
        LoginPage::new(cx.port.clone(), cx.settings.clone()),
        InventoryPage::new(cx.port.clone(), cx.settings.clone()),
    )
}

async fn login_to_inventory(
    cx: &CaseContext,
    login: &LoginPage,
    inventory: &InventoryPage,
    user: Credential,
) -> anyhow::Result<()> {
    login.navigate_to().await?;
    login.login(user.username, user.password).await?;
    utils::wait_for_page_load(cx.port.clone(), "inventory.html", cx.settings.expect_timeout)
        .await?;
    inventory.verify_page_loaded().await?;
    Ok(())
}

fn standard_user(cx: CaseContext) -> CaseFuture {
    async move {
        let (login, inventory) = pages(&cx);
        login.navigate_to().await?;
        login.verify_page_elements().await?;
        login
            .login(users::STANDARD.username, users::STANDARD.password)
            .await?;
        utils::wait_for_page_load(cx.port.clone(), "inventory.html", cx.settings.expect_timeout)
            .await?;
        inventory.verify_page_loaded().await?;
        Ok(())
    }
    .boxed()
}

fn accessibility(cx: CaseContext) -> CaseFuture {
    async move {
        let (login, _) = pages(&cx);
        login.navigate_to().await?;
        let audit = utils::verify_basic_accessibility(cx.port.clone()).await?;
        info!(
            images_without_alt = audit.images_without_alt,
            inputs_without_labels = audit.inputs_without_labels,
            "Login page audit"
        );
        Ok(())
    }
    .boxed()
}

fn user_types(cx: CaseContext) -> CaseFuture {
    async move {
        let (login, inventory) = pages(&cx);
        login_to_inventory(&cx, &login, &inventory, users::PROBLEM).await?;

        utils::clear_browser_storage(cx.port.clone()).await?;
        login_to_inventory(&cx, &login, &inventory, users::PERFORMANCE_GLITCH).await?;
        Ok(())
    }
    .boxed()
}

fn locked_out(cx: CaseContext) -> CaseFuture {
    async move {
        let (login, _) = pages(&cx);
        login.navigate_to().await?;
        login
            .login(users::LOCKED_OUT.username, users::LOCKED_OUT.password)
            .await?;
        login.verify_error_message(error_messages::LOCKED_OUT).await?;
        login.verify_current_url().await?;
        ensure!(
            cx.port.current_url().await? == cx.settings.urls.login(),
            "locked out user left the login page"
        );
        Ok(())
    }
    .boxed()
}
