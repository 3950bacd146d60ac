//! Minimal CSS selector support for the simulated DOM
//!
//! Handles descendant combinators over compound selectors made of an
//! optional tag, `#id`, `.class`, `[attr]`, `[attr="value"]` and
//! `:not([attr])`. That covers every selector the page objects use.

use crate::dom::Node;
use browser_port::PortError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Tag(String),
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
    NotAttr(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    parts: Vec<Part>,
}

impl Compound {
    pub fn matches(&self, node: &Node) -> bool {
        self.parts.iter().all(|part| match part {
            Part::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
            Part::Id(id) => node.attr("id") == Some(id.as_str()),
            Part::Class(class) => node.has_class(class),
            Part::HasAttr(name) => node.attr(name).is_some(),
            Part::AttrEquals(name, value) => node.attr(name) == Some(value.as_str()),
            Part::NotAttr(name) => node.attr(name).is_none(),
        })
    }
}

/// Parsed selector: compounds from outermost ancestor to the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub chain: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, PortError> {
        let chain = split_descendants(input)
            .iter()
            .map(|s| parse_compound(s))
            .collect::<Result<Vec<_>, _>>()?;
        if chain.is_empty() {
            return Err(PortError::invalid_query("empty CSS selector"));
        }
        Ok(Self { chain })
    }

    pub fn subject(&self) -> &Compound {
        // parse() guarantees at least one compound
        &self.chain[self.chain.len() - 1]
    }
}

fn split_descendants(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for ch in input.trim().chars() {
        match (ch, quote) {
            ('"' | '\'', None) => {
                quote = Some(ch);
                current.push(ch);
            }
            (c, Some(q)) if c == q => {
                quote = None;
                current.push(ch);
            }
            ('[' | '(', None) => {
                depth += 1;
                current.push(ch);
            }
            (']' | ')', None) => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            (c, None) if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn parse_compound(input: &str) -> Result<Compound, PortError> {
    let chars: Vec<char> = input.chars().collect();
    let mut parts = Vec::new();
    let mut i = 0;

    let ident_end = |from: usize| {
        let mut j = from;
        while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '-' || chars[j] == '_')
        {
            j += 1;
        }
        j
    };

    if i < chars.len() && chars[i].is_alphabetic() {
        let end = ident_end(i);
        parts.push(Part::Tag(chars[i..end].iter().collect()));
        i = end;
    }

    while i < chars.len() {
        match chars[i] {
            '.' | '#' => {
                let end = ident_end(i + 1);
                if end == i + 1 {
                    return Err(PortError::invalid_query(format!("bad selector '{input}'")));
                }
                let name: String = chars[i + 1..end].iter().collect();
                parts.push(if chars[i] == '.' {
                    Part::Class(name)
                } else {
                    Part::Id(name)
                });
                i = end;
            }
            '[' => {
                let (part, next) = parse_attr(&chars, i, input)?;
                parts.push(part);
                i = next;
            }
            ':' => {
                let rest: String = chars[i..].iter().collect();
                if !rest.starts_with(":not([") {
                    return Err(PortError::invalid_query(format!(
                        "unsupported pseudo-class in '{input}'"
                    )));
                }
                let (part, next) = parse_attr(&chars, i + 5, input)?;
                let Part::HasAttr(name) = part else {
                    return Err(PortError::invalid_query(format!(
                        "only :not([attr]) is supported in '{input}'"
                    )));
                };
                if chars.get(next) != Some(&')') {
                    return Err(PortError::invalid_query(format!("unclosed :not in '{input}'")));
                }
                parts.push(Part::NotAttr(name));
                i = next + 1;
            }
            _ => {
                return Err(PortError::invalid_query(format!(
                    "unexpected '{}' in '{input}'",
                    chars[i]
                )))
            }
        }
    }

    Ok(Compound { parts })
}

/// Parse `[name]` or `[name="value"]` starting at the `[` index.
fn parse_attr(chars: &[char], start: usize, input: &str) -> Result<(Part, usize), PortError> {
    let close = chars[start..]
        .iter()
        .scan(None::<char>, |quote, &c| {
            let inside = quote.is_some();
            match (c, *quote) {
                ('"' | '\'', None) => *quote = Some(c),
                (c, Some(q)) if c == q => *quote = None,
                _ => {}
            }
            Some((c, inside))
        })
        .position(|(c, inside)| c == ']' && !inside)
        .map(|p| start + p)
        .ok_or_else(|| PortError::invalid_query(format!("unclosed attribute in '{input}'")))?;

    let body: String = chars[start + 1..close].iter().collect();
    let part = match body.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Part::AttrEquals(name.trim().to_string(), unquoted.to_string())
        }
        None => Part::HasAttr(body.trim().to_string()),
    };
    Ok((part, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_test_with_punctuation() {
        let sel = Selector::parse(r#"[data-test="add-to-cart-test.allthethings()-t-shirt-(red)"]"#)
            .unwrap();
        assert_eq!(sel.chain.len(), 1);
        assert_eq!(
            sel.subject().parts,
            vec![Part::AttrEquals(
                "data-test".into(),
                "add-to-cart-test.allthethings()-t-shirt-(red)".into()
            )]
        );
    }

    #[test]
    fn parses_descendant_chain() {
        let sel = Selector::parse(".inventory_item button.btn_inventory").unwrap();
        assert_eq!(sel.chain.len(), 2);
        assert_eq!(
            sel.subject().parts,
            vec![Part::Tag("button".into()), Part::Class("btn_inventory".into())]
        );
    }

    #[test]
    fn parses_not_attr() {
        let sel = Selector::parse("input:not([aria-label]):not([aria-labelledby])").unwrap();
        assert_eq!(
            sel.subject().parts,
            vec![
                Part::Tag("input".into()),
                Part::NotAttr("aria-label".into()),
                Part::NotAttr("aria-labelledby".into()),
            ]
        );
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(Selector::parse("div > span").is_err());
        assert!(Selector::parse("li:first-child").is_err());
        assert!(Selector::parse("[data-test=\"x\"").is_err());
        assert!(Selector::parse("   ").is_err());
    }
}
