//! Typed element queries
//!
//! A [`Query`] describes *how* to find elements, never *which* element was
//! found last time. Backends evaluate it against live page state on every
//! call, so a query can be stored and reused freely.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text matching rule used by role names, text lookups and container filters.
///
/// Both variants compare whitespace-normalized text. `Exact` is
/// case-sensitive; `Contains` is a case-insensitive substring match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextMatch {
    Exact(String),
    Contains(String),
}

impl TextMatch {
    pub fn exact(value: impl Into<String>) -> Self {
        TextMatch::Exact(value.into())
    }

    pub fn contains(value: impl Into<String>) -> Self {
        TextMatch::Contains(value.into())
    }

    /// Check whether `text` satisfies this rule.
    pub fn matches(&self, text: &str) -> bool {
        let normalized = normalize_whitespace(text);
        match self {
            TextMatch::Exact(expected) => normalized == normalize_whitespace(expected),
            TextMatch::Contains(needle) => normalized
                .to_lowercase()
                .contains(&normalize_whitespace(needle).to_lowercase()),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            TextMatch::Exact(v) | TextMatch::Contains(v) => v,
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Exact(v) => write!(f, "'{}'", v),
            TextMatch::Contains(v) => write!(f, "/{}/i", v),
        }
    }
}

/// Collapse runs of whitespace and trim, the way accessible names are computed.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Element query.
///
/// Leaf variants select from the whole document; combinators refine the
/// result of an inner query. Results are always in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Query {
    /// ARIA role with an optional accessible-name rule. Hidden elements never match.
    Role {
        role: String,
        name: Option<TextMatch>,
    },

    /// Elements whose own text matches.
    Text(TextMatch),

    /// CSS selector.
    Css(String),

    /// Keep elements of `base` whose full text content matches `has_text`.
    Filter {
        base: Box<Query>,
        has_text: TextMatch,
    },

    /// Keep elements of `base` that have a descendant matching `inner`.
    Has { base: Box<Query>, inner: Box<Query> },

    /// Descendants of any `scope` element that match `inner`.
    Within { scope: Box<Query>, inner: Box<Query> },

    /// Nearest ancestor-or-self of each `base` element matching `selector`.
    Closest { base: Box<Query>, selector: String },

    /// First element of `base`.
    First(Box<Query>),

    /// `base`, which must match at most one element. Several matches make
    /// the whole query ambiguous instead of yielding any of them.
    Single(Box<Query>),

    /// Union of both queries.
    Or(Box<Query>, Box<Query>),
}

impl Query {
    pub fn role(role: impl Into<String>) -> Self {
        Query::Role {
            role: role.into(),
            name: None,
        }
    }

    pub fn text(matcher: TextMatch) -> Self {
        Query::Text(matcher)
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Query::Css(selector.into())
    }

    /// `[data-test="<id>"]`
    pub fn test_id(id: &str) -> Self {
        Query::Css(format!("[data-test=\"{}\"]", id))
    }

    /// Attach an accessible-name rule to a role query.
    ///
    /// On any other query this filters by text content instead.
    pub fn named(self, name: TextMatch) -> Self {
        match self {
            Query::Role { role, .. } => Query::Role {
                role,
                name: Some(name),
            },
            other => other.filter_has_text(name),
        }
    }

    pub fn filter_has_text(self, has_text: TextMatch) -> Self {
        Query::Filter {
            base: Box::new(self),
            has_text,
        }
    }

    pub fn filter_has(self, inner: Query) -> Self {
        Query::Has {
            base: Box::new(self),
            inner: Box::new(inner),
        }
    }

    pub fn locate(self, inner: Query) -> Self {
        Query::Within {
            scope: Box::new(self),
            inner: Box::new(inner),
        }
    }

    pub fn closest(self, selector: impl Into<String>) -> Self {
        Query::Closest {
            base: Box::new(self),
            selector: selector.into(),
        }
    }

    pub fn first(self) -> Self {
        Query::First(Box::new(self))
    }

    pub fn single(self) -> Self {
        Query::Single(Box::new(self))
    }

    pub fn or(self, other: Query) -> Self {
        Query::Or(Box::new(self), Box::new(other))
    }

    /// Reject queries no backend can evaluate.
    pub fn validate(&self) -> Result<(), crate::PortError> {
        match self {
            Query::Role { role, .. } if role.trim().is_empty() => {
                Err(crate::PortError::invalid_query("empty ARIA role"))
            }
            Query::Css(selector) if selector.trim().is_empty() => {
                Err(crate::PortError::invalid_query("empty CSS selector"))
            }
            Query::Closest { selector, .. } if selector.trim().is_empty() => {
                Err(crate::PortError::invalid_query("empty closest() selector"))
            }
            Query::Text(m) if m.value().trim().is_empty() => {
                Err(crate::PortError::invalid_query("empty text matcher"))
            }
            Query::Filter { base, .. }
            | Query::First(base)
            | Query::Single(base)
            | Query::Closest { base, .. } => base.validate(),
            Query::Within { scope, inner } | Query::Has { base: scope, inner } => {
                scope.validate()?;
                inner.validate()
            }
            Query::Or(a, b) => {
                a.validate()?;
                b.validate()
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Role { role, name: None } => write!(f, "role={}", role),
            Query::Role {
                role,
                name: Some(name),
            } => write!(f, "role={}[name={}]", role, name),
            Query::Text(m) => write!(f, "text={}", m),
            Query::Css(s) => write!(f, "css={}", s),
            Query::Filter { base, has_text } => write!(f, "{} >> has-text={}", base, has_text),
            Query::Has { base, inner } => write!(f, "{} >> has=({})", base, inner),
            Query::Within { scope, inner } => write!(f, "{} >> {}", scope, inner),
            Query::Closest { base, selector } => write!(f, "{} >> closest({})", base, selector),
            Query::First(base) => write!(f, "{} >> nth=0", base),
            Query::Single(base) => write!(f, "{} >> strict", base),
            Query::Or(a, b) => write!(f, "({}) | ({})", a, b),
        }
    }
}

/// Opaque reference to one resolved element.
///
/// The `id` is backend specific. A handle may go stale when the page
/// re-renders; backends then report [`crate::PortErrorKind::Detached`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: String,
    pub origin: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>, origin: &Query) -> Self {
        Self {
            id: id.into(),
            origin: origin.to_string(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.origin)
    }
}

/// Outcome of a strict lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ElementHandle),
    NotFound,
    /// More than one element matched; carries the match count.
    Ambiguous(usize),
}

impl Lookup {
    pub fn from_matches(mut matches: Vec<ElementHandle>) -> Self {
        match matches.len() {
            0 => Lookup::NotFound,
            1 => Lookup::Found(matches.remove(0)),
            n => Lookup::Ambiguous(n),
        }
    }

    pub fn handle(&self) -> Option<&ElementHandle> {
        match self {
            Lookup::Found(handle) => Some(handle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_case_insensitive_and_whitespace_tolerant() {
        let m = TextMatch::contains("add to cart");
        assert!(m.matches("  Add   to\ncart "));
        assert!(!m.matches("Remove"));
    }

    #[test]
    fn exact_requires_full_text() {
        let m = TextMatch::exact("Sauce Labs Backpack");
        assert!(m.matches("Sauce Labs  Backpack"));
        assert!(!m.matches("Sauce Labs Backpack (Limited)"));
        assert!(!m.matches("sauce labs backpack"));
    }

    #[test]
    fn named_on_role_sets_accessible_name() {
        let q = Query::role("button").named(TextMatch::contains("remove"));
        assert_eq!(
            q,
            Query::Role {
                role: "button".into(),
                name: Some(TextMatch::contains("remove")),
            }
        );
        assert_eq!(q.to_string(), "role=button[name=/remove/i]");
    }

    #[test]
    fn composed_query_display() {
        let q = Query::css(".inventory_item")
            .filter_has_text(TextMatch::contains("Bike Light"))
            .locate(Query::role("button"));
        assert_eq!(
            q.to_string(),
            "css=.inventory_item >> has-text=/Bike Light/i >> role=button"
        );
    }

    #[test]
    fn single_scope_display_and_validation() {
        let q = Query::css(".cart_item")
            .filter_has_text(TextMatch::contains("Onesie"))
            .single()
            .locate(Query::role("button"));
        assert_eq!(
            q.to_string(),
            "css=.cart_item >> has-text=/Onesie/i >> strict >> role=button"
        );
        assert!(q.validate().is_ok());
        assert!(Query::css(" ").single().validate().is_err());

        let q = Query::css(".cart_item").filter_has(Query::text(TextMatch::exact("Onesie")));
        assert_eq!(q.to_string(), "css=.cart_item >> has=(text='Onesie')");
        assert!(Query::css(".cart_item")
            .filter_has(Query::css(""))
            .validate()
            .is_err());
    }

    #[test]
    fn validate_rejects_nested_empty_selector() {
        let q = Query::text(TextMatch::exact("Onesie")).closest("  ");
        assert!(q.validate().is_err());
        let q = Query::role("link").or(Query::css(""));
        assert!(q.validate().is_err());
        assert!(Query::test_id("title").validate().is_ok());
    }

    #[test]
    fn lookup_from_matches() {
        let q = Query::css("button");
        assert_eq!(Lookup::from_matches(vec![]), Lookup::NotFound);
        let one = vec![ElementHandle::new("a", &q)];
        assert!(matches!(Lookup::from_matches(one), Lookup::Found(_)));
        let two = vec![ElementHandle::new("a", &q), ElementHandle::new("b", &q)];
        assert_eq!(Lookup::from_matches(two), Lookup::Ambiguous(2));
    }

    #[test]
    fn query_serializes_for_script_backends() {
        let q = Query::test_id("shopping-cart-badge").first();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["First"]["Css"], "[data-test=\"shopping-cart-badge\"]");
    }
}
