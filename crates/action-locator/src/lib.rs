//! Locator Resolver - two-tier element resolution
//!
//! Every page action names its target twice: a semantic primary query
//! (role and accessible name, or text) and a structurally scoped fallback
//! that narrows to one container. The resolver tries the primary tier
//! first and only consults the fallback when the primary fails. Lookups are
//! strict: a query matching more than one element fails its tier.

pub mod errors;
pub mod resolver;
pub mod types;
pub mod waiting;

pub use errors::*;
pub use resolver::*;
pub use types::*;
pub use waiting::*;
