//! Browser collaborator seam
//!
//! Everything above this crate talks to a browser through [`BrowserPort`]:
//! - typed [`Query`] values instead of selector strings built at runtime
//! - opaque [`ElementHandle`]s that are re-resolved on every interaction
//! - [`Lookup`] outcomes that keep "not found" out of the error path
//! - a Chromium backend speaking CDP through `chromiumoxide`

pub mod chromium;
pub mod errors;
pub mod port;
pub mod query;

pub use chromium::{ChromiumConfig, ChromiumPort};
pub use errors::*;
pub use port::*;
pub use query::*;
