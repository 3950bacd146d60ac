//! Login page

use crate::{expect::Expect, settings::PageSettings};
use action_locator::{ActionError, ElementAction, LocatorResolver, Resolution, Strategy};
use browser_port::{BrowserPort, Query, TextMatch};
use std::sync::Arc;
use tracing::{debug, info};

pub struct LoginPage {
    port: Arc<dyn BrowserPort>,
    resolver: LocatorResolver,
    expect: Expect,
    settings: Arc<PageSettings>,
}

impl LoginPage {
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

    pub fn username_input(&self) -> Query {
        Query::role("textbox").named(TextMatch::contains("username"))
    }

    pub fn password_input(&self) -> Query {
        Query::role("textbox").named(TextMatch::contains("password"))
    }

    pub fn login_button(&self) -> Query {
        Query::role("button").named(TextMatch::contains("login"))
    }

    pub fn error_message(&self) -> Query {
        Query::text(TextMatch::contains("epic sadface")).or(Query::test_id("error"))
    }

    pub fn swag_labs_title(&self) -> Query {
        Query::role("banner")
            .locate(Query::text(TextMatch::exact("Swag Labs")))
            .or(Query::text(TextMatch::exact("Swag Labs")).first())
    }

    pub fn accepted_users_section(&self) -> Query {
        Query::text(TextMatch::exact("Accepted usernames are:"))
    }

    pub fn password_section(&self) -> Query {
        Query::text(TextMatch::exact("Password for all users:"))
    }

    fn in_form(test_id: &str) -> Query {
        Query::css(".login-box").locate(Query::test_id(test_id))
    }

    fn username_strategy(&self) -> Strategy {
        Strategy::new(self.username_input(), Self::in_form("username"))
    }

    fn password_strategy(&self) -> Strategy {
        Strategy::new(self.password_input(), Self::in_form("password"))
    }

    fn login_strategy(&self) -> Strategy {
        Strategy::new(self.login_button(), Self::in_form("login-button"))
    }

    pub async fn navigate_to(&self) -> Result<(), ActionError> {
        let url = self.settings.urls.login();
        debug!(%url, "Opening login page");
        Ok(self.port.navigate(&url).await?)
    }

    /// Fill whichever of the two fields is non-empty.
    pub async fn enter_credentials(&self, username: &str, password: &str) -> Result<(), ActionError> {
        if !username.is_empty() {
            self.resolver
                .resolve_and_act(&self.username_strategy(), &ElementAction::fill(username))
                .await?;
        }
        if !password.is_empty() {
            self.resolver
                .resolve_and_act(&self.password_strategy(), &ElementAction::fill(password))
                .await?;
        }
        Ok(())
    }

    pub async fn click_login(&self) -> Result<Resolution, ActionError> {
        self.resolver
            .resolve_and_act(&self.login_strategy(), &ElementAction::Click)
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ActionError> {
        info!(%username, "Logging in");
        self.enter_credentials(username, password).await?;
        self.click_login().await?;
        Ok(())
    }

    pub async fn verify_page_elements(&self) -> Result<(), ActionError> {
        self.expect.visible(&self.username_input()).await?;
        self.expect.visible(&self.password_input()).await?;
        self.expect.visible(&self.login_button()).await?;
        if let Err(err) = self.expect.visible(&self.swag_labs_title()).await {
            debug!(error = %err, "Title landmark missing, checking for brand text");
            self.expect
                .visible(&Query::text(TextMatch::contains("Swag Labs")).first())
                .await?;
        }
        Ok(())
    }

    /// The error banner is visible and contains `expected`.
    pub async fn verify_error_message(&self, expected: &str) -> Result<(), ActionError> {
        let banner = self.error_message();
        self.expect.visible(&banner).await?;
        self.expect.text(&banner, TextMatch::contains(expected)).await
    }

    pub async fn verify_current_url(&self) -> Result<(), ActionError> {
        self.expect.url(&self.settings.urls.login()).await
    }

    /// Login button painted and the URL is the login page.
    pub async fn verify_page_loaded(&self) -> Result<(), ActionError> {
        self.expect.visible(&self.login_button()).await?;
        self.verify_current_url().await
    }

    pub async fn verify_credentials_help(&self) -> Result<(), ActionError> {
        self.expect.visible(&self.accepted_users_section()).await?;
        self.expect.visible(&self.password_section()).await
    }
}
