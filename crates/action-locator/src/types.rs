//! Core types for two-tier resolution

use browser_port::{ElementHandle, Query};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a resolved element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementAction {
    Click,
    /// Replace the element's value.
    Fill(String),
}

impl ElementAction {
    pub fn fill(text: impl Into<String>) -> Self {
        ElementAction::Fill(text.into())
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementAction::Click => "click",
            ElementAction::Fill(_) => "fill",
        }
    }
}

/// Which tier of a [`Strategy`] acted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Primary,
    Fallback,
}

impl Tier {
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two ways to reach the same logical target, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Semantic query (role and accessible name, or text)
    pub primary: Query,

    /// Structurally scoped query narrowing to a single container
    pub fallback: Query,
}

impl Strategy {
    pub fn new(primary: Query, fallback: Query) -> Self {
        Self { primary, fallback }
    }

    /// Tiers in evaluation order.
    pub fn tiers(&self) -> [(Tier, &Query); 2] {
        [(Tier::Primary, &self.primary), (Tier::Fallback, &self.fallback)]
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} || {}", self.primary, self.fallback)
    }
}

/// Successful resolution: the element acted on and the tier that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub tier: Tier,
    pub handle: ElementHandle,
}

impl Resolution {
    pub fn used_fallback(&self) -> bool {
        self.tier == Tier::Fallback
    }
}
