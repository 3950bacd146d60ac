//! The simulated storefront and its [`BrowserPort`] implementation

use crate::catalog::{
    default_catalog, SimProduct, ACCEPTED_USERS, LOCKED_USERS, MSG_INVALID, MSG_LOCKED_OUT,
    MSG_PASSWORD_REQUIRED, MSG_USERNAME_REQUIRED, SHARED_PASSWORD,
};
use crate::dom::{Behavior, Dom};
use crate::render::render;
use async_trait::async_trait;
use browser_port::{AccessibilityAudit, BrowserPort, ElementHandle, PortError, Query};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// 1x1 transparent PNG returned by [`Storefront::screenshot`].
const BLANK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Simulation knobs.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Site origin, with trailing slash.
    pub base_url: String,

    /// Time after each navigation before anything counts as visible.
    pub render_delay: Duration,

    /// Extra paint delay applied after `performance_glitch_user` logs in.
    pub glitch_delay: Duration,

    pub catalog: Vec<SimProduct>,

    /// Give the header cart link an `aria-label` so it has an accessible name.
    pub label_cart_link: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com/".to_string(),
            render_delay: Duration::ZERO,
            glitch_delay: Duration::ZERO,
            catalog: default_catalog(),
            label_cart_link: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Blank,
    Login,
    Inventory,
    Cart,
    CheckoutStepOne,
}

impl Screen {
    fn path(self) -> &'static str {
        match self {
            Screen::Blank | Screen::Login => "",
            Screen::Inventory => "inventory.html",
            Screen::Cart => "cart.html",
            Screen::CheckoutStepOne => "checkout-step-one.html",
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "index.html" => Some(Screen::Login),
            "inventory.html" => Some(Screen::Inventory),
            "cart.html" => Some(Screen::Cart),
            "checkout-step-one.html" => Some(Screen::CheckoutStepOne),
            _ => None,
        }
    }
}

pub(crate) struct SiteState {
    pub(crate) screen: Screen,
    pub(crate) url: String,
    pub(crate) session: Option<String>,
    pub(crate) cart: Vec<String>,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) error: Option<String>,
    pub(crate) menu_open: bool,
    generation: u64,
    visible_at: Instant,
    dom: Dom,
}

/// In-memory Swag Labs storefront.
///
/// One instance is one isolated browsing context: session and cart live in
/// "storage" and survive navigation and reload until [`BrowserPort::clear_storage`].
/// Every re-render bumps a generation counter; handles from an older
/// generation report `Detached`.
pub struct Storefront {
    options: SimOptions,
    state: Mutex<SiteState>,
    clicks: Mutex<Vec<String>>,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new(SimOptions::default())
    }
}

impl Storefront {
    pub fn new(options: SimOptions) -> Self {
        let mut state = SiteState {
            screen: Screen::Blank,
            url: "about:blank".to_string(),
            session: None,
            cart: Vec::new(),
            username: String::new(),
            password: String::new(),
            error: None,
            menu_open: false,
            generation: 0,
            visible_at: Instant::now(),
            dom: Dom::build(crate::dom::El::new("body")),
        };
        state.dom = render(&state, &options);
        Self {
            options,
            state: Mutex::new(state),
            clicks: Mutex::new(Vec::new()),
        }
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    /// Origins of every handle clicked so far, oldest first.
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().clone()
    }

    /// Slugs currently in the cart.
    pub fn cart(&self) -> Vec<String> {
        self.state.lock().cart.clone()
    }

    /// Logged-in username, if any.
    pub fn session(&self) -> Option<String> {
        self.state.lock().session.clone()
    }

    pub fn screen(&self) -> Screen {
        self.state.lock().screen
    }

    fn base(&self) -> String {
        format!("{}/", self.options.base_url.trim_end_matches('/'))
    }

    fn rerender(&self, state: &mut SiteState) {
        state.generation += 1;
        state.dom = render(state, &self.options);
    }

    /// Switch screens as a full page load.
    fn load(&self, state: &mut SiteState, screen: Screen) {
        let (screen, error) = match screen {
            Screen::Inventory | Screen::Cart | Screen::CheckoutStepOne
                if state.session.is_none() =>
            {
                (
                    Screen::Login,
                    Some(format!(
                        "Epic sadface: You can only access '/{}' when you are logged in.",
                        screen.path()
                    )),
                )
            }
            other => (other, None),
        };
        state.screen = screen;
        state.url = format!("{}{}", self.base(), screen.path());
        state.error = error;
        state.username.clear();
        state.password.clear();
        state.menu_open = false;
        state.visible_at = Instant::now() + self.options.render_delay;
        self.rerender(state);
        debug!(url = %state.url, generation = state.generation, "Simulated page load");
    }

    fn node_id(&self, state: &SiteState, handle: &ElementHandle) -> Result<usize, PortError> {
        let (generation, id) = handle
            .id
            .strip_prefix('g')
            .and_then(|rest| rest.split_once("-n"))
            .and_then(|(g, n)| Some((g.parse::<u64>().ok()?, n.parse::<usize>().ok()?)))
            .ok_or_else(|| PortError::detached(format!("unknown handle {}", handle.id)))?;
        if generation != state.generation || id >= state.dom.len() {
            return Err(PortError::detached(format!(
                "{} no longer attached to the page",
                handle
            )));
        }
        Ok(id)
    }

    fn visible(&self, state: &SiteState, id: usize) -> bool {
        Instant::now() >= state.visible_at && !state.dom.is_hidden(id)
    }

    fn submit_login(&self, state: &mut SiteState) {
        let username = state.username.clone();
        let password = state.password.clone();
        let error = if username.is_empty() {
            Some(MSG_USERNAME_REQUIRED)
        } else if password.is_empty() {
            Some(MSG_PASSWORD_REQUIRED)
        } else if !ACCEPTED_USERS.contains(&username.as_str()) || password != SHARED_PASSWORD {
            Some(MSG_INVALID)
        } else if LOCKED_USERS.contains(&username.as_str()) {
            Some(MSG_LOCKED_OUT)
        } else {
            None
        };

        match error {
            Some(message) => {
                debug!(%username, "Simulated login rejected");
                state.error = Some(message.to_string());
                self.rerender(state);
            }
            None => {
                state.session = Some(username.clone());
                self.load(state, Screen::Inventory);
                if username == "performance_glitch_user" {
                    state.visible_at += self.options.glitch_delay;
                }
            }
        }
    }

    fn apply(&self, state: &mut SiteState, behavior: Behavior) {
        match behavior {
            Behavior::SubmitLogin => self.submit_login(state),
            Behavior::AddToCart(slug) => {
                if !state.cart.contains(&slug) {
                    state.cart.push(slug);
                }
                self.rerender(state);
            }
            Behavior::RemoveFromCart(slug) => {
                state.cart.retain(|s| s != &slug);
                self.rerender(state);
            }
            Behavior::OpenMenu => {
                state.menu_open = true;
                self.rerender(state);
            }
            Behavior::CloseMenu => {
                state.menu_open = false;
                self.rerender(state);
            }
            Behavior::Logout => {
                state.session = None;
                self.load(state, Screen::Login);
            }
            Behavior::OpenCart => self.load(state, Screen::Cart),
            Behavior::ContinueShopping => self.load(state, Screen::Inventory),
            Behavior::Checkout => self.load(state, Screen::CheckoutStepOne),
        }
    }
}

#[async_trait]
impl BrowserPort for Storefront {
    async fn navigate(&self, url: &str) -> Result<(), PortError> {
        let mut state = self.state.lock();
        if url == "about:blank" {
            state.screen = Screen::Blank;
            state.url = url.to_string();
            self.rerender(&mut state);
            return Ok(());
        }
        let base = self.base();
        let path = if url == base.trim_end_matches('/') {
            ""
        } else {
            url.strip_prefix(base.as_str())
                .ok_or_else(|| PortError::navigation(format!("{} is outside {}", url, base)))?
        };
        let screen = Screen::from_path(path)
            .ok_or_else(|| PortError::navigation(format!("404 for {}", url)))?;
        self.load(&mut state, screen);
        Ok(())
    }

    async fn reload(&self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        let screen = state.screen;
        if screen == Screen::Blank {
            self.rerender(&mut state);
            return Ok(());
        }
        self.load(&mut state, screen);
        Ok(())
    }

    async fn find_all(&self, query: &Query) -> Result<Vec<ElementHandle>, PortError> {
        let state = self.state.lock();
        let ids = state.dom.evaluate(query)?;
        Ok(ids
            .into_iter()
            .map(|id| ElementHandle::new(format!("g{}-n{}", state.generation, id), query))
            .collect())
    }

    async fn is_visible(&self, handle: &ElementHandle) -> Result<bool, PortError> {
        let state = self.state.lock();
        let id = self.node_id(&state, handle)?;
        Ok(self.visible(&state, id))
    }

    async fn text_content(&self, handle: &ElementHandle) -> Result<Option<String>, PortError> {
        let state = self.state.lock();
        let id = self.node_id(&state, handle)?;
        Ok(Some(state.dom.text_content(id)))
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), PortError> {
        let mut state = self.state.lock();
        let id = self.node_id(&state, handle)?;
        if !self.visible(&state, id) {
            return Err(PortError::not_interactable(format!("{} is not visible", handle)));
        }
        self.clicks.lock().push(handle.origin.clone());

        let mut current = Some(id);
        while let Some(idx) = current {
            let node = match state.dom.node(idx) {
                Some(node) => node,
                None => break,
            };
            if let Some(behavior) = node.behavior.clone() {
                debug!(?behavior, "Simulated click");
                self.apply(&mut state, behavior);
                break;
            }
            current = node.parent;
        }
        Ok(())
    }

    async fn fill(&self, handle: &ElementHandle, text: &str) -> Result<(), PortError> {
        let mut state = self.state.lock();
        let id = self.node_id(&state, handle)?;
        if !self.visible(&state, id) {
            return Err(PortError::not_interactable(format!("{} is not visible", handle)));
        }
        let test_id = match state.dom.node(id) {
            Some(node) if node.tag == "input" => node.attr("data-test").map(str::to_string),
            _ => {
                return Err(PortError::not_interactable(format!(
                    "{} is not an input",
                    handle
                )))
            }
        };
        match test_id.as_deref() {
            Some("username") => state.username = text.to_string(),
            Some("password") => state.password = text.to_string(),
            _ => {}
        }
        if let Some(node) = state.dom.node_mut(id) {
            match node.attrs.iter_mut().find(|(k, _)| k == "value") {
                Some((_, v)) => *v = text.to_string(),
                None => node.attrs.push(("value".to_string(), text.to_string())),
            }
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PortError> {
        Ok(self.state.lock().url.clone())
    }

    async fn clear_storage(&self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        state.session = None;
        state.cart.clear();
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, PortError> {
        Ok(BLANK_PNG.to_vec())
    }

    async fn accessibility_audit(&self) -> Result<AccessibilityAudit, PortError> {
        let state = self.state.lock();
        Ok(AccessibilityAudit {
            images_without_alt: state.dom.evaluate(&Query::css("img:not([alt])"))?.len(),
            inputs_without_labels: state
                .dom
                .evaluate(&Query::css("input:not([aria-label]):not([aria-labelledby])"))?
                .len(),
        })
    }
}
