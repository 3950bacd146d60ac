//! Arena-backed DOM used by the simulated storefront

use crate::selector::Selector;
use browser_port::{normalize_whitespace, PortError, Query, TextMatch};

/// What happens when a node is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    SubmitLogin,
    AddToCart(String),
    RemoveFromCart(String),
    OpenMenu,
    CloseMenu,
    Logout,
    OpenCart,
    ContinueShopping,
    Checkout,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
    pub hidden: bool,
    pub behavior: Option<Behavior>,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }
}

/// Element description used while building a page.
#[derive(Debug, Clone)]
pub struct El {
    node: Node,
    children: Vec<El>,
}

impl El {
    pub fn new(tag: &str) -> Self {
        Self {
            node: Node {
                tag: tag.to_string(),
                attrs: Vec::new(),
                text: None,
                children: Vec::new(),
                parent: None,
                hidden: false,
                behavior: None,
            },
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.node.set_attr(name, value);
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn test_id(self, id: &str) -> Self {
        self.attr("data-test", id)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.node.text = Some(text.to_string());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.node.hidden = hidden;
        self
    }

    pub fn on_click(mut self, behavior: Behavior) -> Self {
        self.node.behavior = Some(behavior);
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Rendered document. Node 0 is the root.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub fn build(root: El) -> Self {
        let mut dom = Dom { nodes: Vec::new() };
        dom.insert(root, None);
        dom
    }

    fn insert(&mut self, el: El, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        let mut node = el.node;
        node.parent = parent;
        self.nodes.push(node);
        for child in el.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id].children.push(child_id);
        }
        id
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hidden if the node or any ancestor is hidden.
    pub fn is_hidden(&self, id: usize) -> bool {
        let mut current = Some(id);
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.hidden {
                return true;
            }
            current = node.parent;
        }
        false
    }

    pub fn text_content(&self, id: usize) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        normalize_whitespace(&out)
    }

    fn collect_text(&self, id: usize, out: &mut String) {
        let node = &self.nodes[id];
        if let Some(text) = &node.text {
            out.push(' ');
            out.push_str(text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    pub fn role(&self, id: usize) -> Option<&'static str> {
        let node = &self.nodes[id];
        if let Some(role) = node.attr("role") {
            return ROLES.iter().find(|r| **r == role).copied();
        }
        match node.tag.as_str() {
            "button" => Some("button"),
            "a" if node.attr("href").is_some() => Some("link"),
            "select" => Some("combobox"),
            "header" => Some("banner"),
            "nav" => Some("navigation"),
            "li" => Some("listitem"),
            "th" => Some("columnheader"),
            "input" => match node.attr("type").unwrap_or("text") {
                "submit" | "button" | "reset" => Some("button"),
                "text" | "password" | "email" | "search" => Some("textbox"),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn accessible_name(&self, id: usize) -> String {
        let node = &self.nodes[id];
        if let Some(label) = node.attr("aria-label") {
            return normalize_whitespace(label);
        }
        if node.tag == "input" {
            let key = match node.attr("type") {
                Some("submit" | "button" | "reset") => "value",
                _ => "placeholder",
            };
            return normalize_whitespace(node.attr(key).unwrap_or_default());
        }
        self.text_content(id)
    }

    fn is_ancestor(&self, ancestor: usize, mut id: usize) -> bool {
        while let Some(parent) = self.nodes[id].parent {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    fn matches_selector(&self, id: usize, selector: &Selector) -> bool {
        let (subject, ancestors) = match selector.chain.split_last() {
            Some(split) => split,
            None => return false,
        };
        if !subject.matches(&self.nodes[id]) {
            return false;
        }
        // Greedy right-to-left walk over ancestors
        let mut remaining = ancestors.iter().rev().peekable();
        let mut current = self.nodes[id].parent;
        while let (Some(compound), Some(idx)) = (remaining.peek(), current) {
            if compound.matches(&self.nodes[idx]) {
                remaining.next();
            }
            current = self.nodes[idx].parent;
        }
        remaining.peek().is_none()
    }

    /// Evaluate a query; results are node ids in document order.
    pub fn evaluate(&self, query: &Query) -> Result<Vec<usize>, PortError> {
        let ids = match query {
            Query::Role { role, name } => (0..self.nodes.len())
                .filter(|&id| self.role(id) == Some(role.as_str()) && !self.is_hidden(id))
                .filter(|&id| name.as_ref().map_or(true, |m| m.matches(&self.accessible_name(id))))
                .collect(),
            Query::Text(matcher) => (0..self.nodes.len())
                .filter(|&id| self.own_text_matches(id, matcher))
                .collect(),
            Query::Css(raw) => {
                let selector = Selector::parse(raw)?;
                (0..self.nodes.len())
                    .filter(|&id| self.matches_selector(id, &selector))
                    .collect()
            }
            Query::Filter { base, has_text } => self
                .evaluate(base)?
                .into_iter()
                .filter(|&id| has_text.matches(&self.text_content(id)))
                .collect(),
            Query::Has { base, inner } => {
                let inner = self.evaluate(inner)?;
                self.evaluate(base)?
                    .into_iter()
                    .filter(|&id| inner.iter().any(|&i| self.is_ancestor(id, i)))
                    .collect()
            }
            Query::Within { scope, inner } => {
                let scopes = self.evaluate(scope)?;
                self.evaluate(inner)?
                    .into_iter()
                    .filter(|&id| scopes.iter().any(|&s| self.is_ancestor(s, id)))
                    .collect()
            }
            Query::Closest { base, selector } => {
                let selector = Selector::parse(selector)?;
                let mut found: Vec<usize> = self
                    .evaluate(base)?
                    .into_iter()
                    .filter_map(|id| {
                        let mut current = Some(id);
                        while let Some(idx) = current {
                            if self.matches_selector(idx, &selector) {
                                return Some(idx);
                            }
                            current = self.nodes[idx].parent;
                        }
                        None
                    })
                    .collect();
                found.sort_unstable();
                found.dedup();
                found
            }
            Query::First(base) => self.evaluate(base)?.into_iter().take(1).collect(),
            Query::Single(base) => {
                let found = self.evaluate(base)?;
                if found.len() > 1 {
                    return Err(PortError::ambiguous(found.len(), base.to_string()));
                }
                found
            }
            Query::Or(a, b) => {
                let mut found = self.evaluate(a)?;
                found.extend(self.evaluate(b)?);
                found.sort_unstable();
                found.dedup();
                found
            }
        };
        Ok(ids)
    }

    fn own_text_matches(&self, id: usize, matcher: &TextMatch) -> bool {
        self.nodes[id]
            .text
            .as_deref()
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty())
            .map_or(false, |t| matcher.matches(&t))
    }
}

const ROLES: &[&str] = &[
    "button",
    "link",
    "textbox",
    "combobox",
    "banner",
    "navigation",
    "listitem",
    "columnheader",
    "heading",
    "list",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dom {
        Dom::build(
            El::new("body").child(
                El::new("div").class("inventory_list").children([
                    El::new("div").class("inventory_item").children([
                        El::new("div").class("inventory_item_name").text("Sauce Labs Backpack"),
                        El::new("button").test_id("add-to-cart-backpack").text("Add to cart"),
                    ]),
                    El::new("div").class("inventory_item").children([
                        El::new("div").class("inventory_item_name").text("Sauce Labs Onesie"),
                        El::new("button").test_id("add-to-cart-onesie").text("Add to cart"),
                    ]),
                    El::new("nav").hidden(true).child(
                        El::new("a").attr("href", "#").text("Logout"),
                    ),
                ]),
            ),
        )
    }

    #[test]
    fn role_query_respects_name_and_visibility() {
        let dom = sample();
        let buttons = dom
            .evaluate(&Query::role("button").named(TextMatch::contains("add to cart")))
            .unwrap();
        assert_eq!(buttons.len(), 2);
        let logout = dom.evaluate(&Query::role("link")).unwrap();
        assert!(logout.is_empty());
    }

    #[test]
    fn filter_then_locate_scopes_to_container() {
        let dom = sample();
        let q = Query::css(".inventory_item")
            .filter_has_text(TextMatch::contains("onesie"))
            .locate(Query::role("button"));
        let ids = dom.evaluate(&q).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(dom.node(ids[0]).unwrap().attr("data-test"), Some("add-to-cart-onesie"));
    }

    #[test]
    fn closest_walks_up_to_container() {
        let dom = sample();
        let q = Query::text(TextMatch::exact("Sauce Labs Backpack"))
            .closest(".inventory_item")
            .locate(Query::css("button"));
        let ids = dom.evaluate(&q).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(dom.node(ids[0]).unwrap().attr("data-test"), Some("add-to-cart-backpack"));
    }

    #[test]
    fn single_scope_rejects_several_containers() {
        let dom = sample();
        let button = Query::role("button");
        let shared = Query::css(".inventory_item")
            .filter_has_text(TextMatch::contains("sauce labs"))
            .single()
            .locate(button.clone());
        let err = dom.evaluate(&shared).unwrap_err();
        assert_eq!(err.kind, browser_port::PortErrorKind::Ambiguous(2));

        let one = Query::css(".inventory_item")
            .filter_has_text(TextMatch::contains("onesie"))
            .single()
            .locate(button);
        assert_eq!(dom.evaluate(&one).unwrap().len(), 1);
    }

    #[test]
    fn has_keeps_containers_with_matching_descendant() {
        let dom = sample();
        let exact = Query::css(".inventory_item")
            .filter_has(Query::text(TextMatch::exact("Sauce Labs Onesie")));
        let ids = dom.evaluate(&exact).unwrap();
        assert_eq!(ids.len(), 1);
        assert!(dom.text_content(ids[0]).contains("Onesie"));

        let partial = Query::css(".inventory_item")
            .filter_has(Query::text(TextMatch::exact("Sauce Labs")));
        assert!(dom.evaluate(&partial).unwrap().is_empty());
    }

    #[test]
    fn descendant_css_and_or_union_in_document_order() {
        let dom = sample();
        let q = Query::css(".inventory_list button");
        assert_eq!(dom.evaluate(&q).unwrap().len(), 2);
        let q = Query::test_id("add-to-cart-onesie").or(Query::test_id("add-to-cart-backpack"));
        let ids = dom.evaluate(&q).unwrap();
        assert!(ids[0] < ids[1]);
        assert_eq!(dom.evaluate(&q.first()).unwrap(), vec![ids[0]]);
    }

    #[test]
    fn text_content_joins_descendants() {
        let dom = sample();
        let items = dom.evaluate(&Query::css(".inventory_item")).unwrap();
        assert_eq!(dom.text_content(items[0]), "Sauce Labs Backpack Add to cart");
    }
}
