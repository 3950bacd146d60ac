//! Page Action Facade for the Swag Labs storefront
//!
//! Page objects expose three kinds of methods:
//! - query accessors returning [`browser_port::Query`] values, re-resolved on every use
//! - actions built on the two-tier [`action_locator::LocatorResolver`]
//! - verifications: hard assertions with a bounded wait
//!
//! [`fixtures`] builds page sets (optionally logged in) and [`utils`] holds
//! the free-standing helpers the suites share.

pub mod cart;
pub mod data;
pub mod expect;
pub mod fixtures;
pub mod inventory;
pub mod login;
pub mod settings;
pub mod utils;

pub use cart::CartPage;
pub use data::*;
pub use expect::Expect;
pub use fixtures::{authenticated, PageSet};
pub use inventory::InventoryPage;
pub use login::LoginPage;
pub use settings::PageSettings;
pub use utils::UtilsError;
