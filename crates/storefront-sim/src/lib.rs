//! Simulated Swag Labs storefront
//!
//! Renders the login, inventory, cart and checkout screens into a small
//! arena DOM and implements [`browser_port::BrowserPort`] over it, so page
//! objects and suites run without a real browser. Knobs in [`SimOptions`]
//! reproduce the situations the locator strategies exist for: late paint,
//! unlabeled controls and ambiguous product names.

pub mod catalog;
pub mod dom;
mod render;
pub mod selector;
pub mod site;

pub use catalog::*;
pub use site::*;
