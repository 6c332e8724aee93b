//! Compound CSS selector parsing and matching for the headless host.
//!
//! The browser evaluates selectors natively; the in-memory document needs its
//! own matcher. Only what the page's DOM contract uses is supported: selector
//! lists of compound selectors, no combinators or pseudo-classes.
//!
//! ```text
//! .theme-toggle            class
//! #contact-form            id
//! section[id]              tag + attribute presence
//! a[href^="#"]             attribute prefix
//! input, textarea, select  selector list
//! ```
//!
//! The same parser doubles as a tiny element builder in tests:
//! `img.thumb[data-src="a.jpg"]` describes a tag, its classes and attributes.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: &'static str,
}

/// Attribute test inside `[...]`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrTest {
    pub name: String,
    pub op: AttrOp,
}

impl AttrTest {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Prefix(v) => value.starts_with(v.as_str()),
            AttrOp::Suffix(v) => value.ends_with(v.as_str()),
            AttrOp::Contains(v) => value.contains(v.as_str()),
        }
    }
}

/// Read access an element needs to be matched.
pub trait Matchable {
    /// Lowercase tag name.
    fn tag(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

/// One compound selector: optional tag, optional id, classes, attribute tests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrTest>,
}

impl Compound {
    pub fn matches(&self, element: &impl Matchable) -> bool {
        if self.tag.as_deref().is_some_and(|t| element.tag() != t) {
            return false;
        }
        if self.id.is_some() && element.attribute("id") != self.id.as_deref() {
            return false;
        }
        self.classes.iter().all(|c| element.has_class(c))
            && self
                .attrs
                .iter()
                .all(|a| a.matches(element.attribute(&a.name)))
    }
}

/// Comma-separated list of compound selectors; matches if any member does.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<Compound>);

impl SelectorList {
    pub fn matches(&self, element: &impl Matchable) -> bool {
        self.0.iter().any(|c| c.matches(element))
    }
}

/// Parse a selector list such as `input, textarea` or `a[href^="#"]`.
pub fn parse(selector: &str) -> Result<SelectorList, SelectorError> {
    selector
        .split(',')
        .map(|part| parse_compound(part).map_err(|reason| error(selector, reason)))
        .collect::<Result<Vec<_>, _>>()
        .map(SelectorList)
}

/// Parse a single compound selector.
pub fn parse_compound_selector(selector: &str) -> Result<Compound, SelectorError> {
    parse_compound(selector).map_err(|reason| error(selector, reason))
}

fn error(selector: &str, reason: &'static str) -> SelectorError {
    SelectorError {
        selector: selector.to_string(),
        reason,
    }
}

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl Cursor<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
    }

    fn ident(&mut self) -> Result<String, &'static str> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                out.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if out.is_empty() {
            Err("expected a name")
        } else {
            Ok(out)
        }
    }

    fn value(&mut self) -> Result<String, &'static str> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut out = String::new();
                loop {
                    match self.chars.next() {
                        Some(c) if c == quote => return Ok(out),
                        Some(c) => out.push(c),
                        None => return Err("unterminated string"),
                    }
                }
            }
            _ => self.ident(),
        }
    }
}

fn parse_compound(input: &str) -> Result<Compound, &'static str> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty selector");
    }
    let mut cur = Cursor {
        chars: input.chars().peekable(),
    };
    let mut compound = Compound::default();

    if cur.eat('*') {
        // Universal selector: no tag constraint.
    } else if cur.peek().is_some_and(|c| c.is_alphabetic()) {
        compound.tag = Some(cur.ident()?.to_ascii_lowercase());
    }

    while let Some(c) = cur.peek() {
        match c {
            '#' => {
                cur.chars.next();
                compound.id = Some(cur.ident()?);
            }
            '.' => {
                cur.chars.next();
                compound.classes.push(cur.ident()?);
            }
            '[' => {
                cur.chars.next();
                compound.attrs.push(parse_attr(&mut cur)?);
            }
            c if c.is_whitespace() => return Err("combinators are not supported"),
            _ => return Err("unexpected character"),
        }
    }
    Ok(compound)
}

fn parse_attr(cur: &mut Cursor<'_>) -> Result<AttrTest, &'static str> {
    cur.skip_whitespace();
    let name = cur.ident()?.to_ascii_lowercase();
    cur.skip_whitespace();
    if cur.eat(']') {
        return Ok(AttrTest {
            name,
            op: AttrOp::Exists,
        });
    }
    let op = match cur.chars.next() {
        Some('=') => '=',
        Some(prefix @ ('^' | '$' | '*')) => {
            if !cur.eat('=') {
                return Err("expected '='");
            }
            prefix
        }
        _ => return Err("unsupported attribute operator"),
    };
    cur.skip_whitespace();
    let value = cur.value()?;
    cur.skip_whitespace();
    if !cur.eat(']') {
        return Err("expected ']'");
    }
    let op = match op {
        '^' => AttrOp::Prefix(value),
        '$' => AttrOp::Suffix(value),
        '*' => AttrOp::Contains(value),
        _ => AttrOp::Equals(value),
    };
    Ok(AttrTest { name, op })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct El {
        tag: &'static str,
        attrs: BTreeMap<&'static str, &'static str>,
    }

    impl Matchable for El {
        fn tag(&self) -> &str {
            self.tag
        }
        fn attribute(&self, name: &str) -> Option<&str> {
            self.attrs.get(name).copied()
        }
        fn has_class(&self, class: &str) -> bool {
            self.attrs
                .get("class")
                .is_some_and(|c| c.split_whitespace().any(|x| x == class))
        }
    }

    fn el(tag: &'static str, attrs: &[(&'static str, &'static str)]) -> El {
        El {
            tag,
            attrs: attrs.iter().copied().collect(),
        }
    }

    #[test]
    fn parse_class() {
        let c = parse_compound_selector(".theme-toggle").unwrap();
        assert_eq!(c.tag, None);
        assert_eq!(c.classes, vec!["theme-toggle"]);
    }

    #[test]
    fn parse_id() {
        let c = parse_compound_selector("#contact-form").unwrap();
        assert_eq!(c.id.as_deref(), Some("contact-form"));
    }

    #[test]
    fn parse_tag_with_attribute_presence() {
        let c = parse_compound_selector("section[id]").unwrap();
        assert_eq!(c.tag.as_deref(), Some("section"));
        assert_eq!(
            c.attrs,
            vec![AttrTest {
                name: "id".into(),
                op: AttrOp::Exists
            }]
        );
    }

    #[test]
    fn parse_prefix_with_quotes() {
        let c = parse_compound_selector(r##"a[href^="#"]"##).unwrap();
        assert_eq!(c.attrs[0].op, AttrOp::Prefix("#".into()));
    }

    #[test]
    fn parse_builder_style_description() {
        let c = parse_compound_selector("img.thumb.wide[data-src='a.jpg'][alt=x]").unwrap();
        assert_eq!(c.tag.as_deref(), Some("img"));
        assert_eq!(c.classes, vec!["thumb", "wide"]);
        assert_eq!(c.attrs[0].op, AttrOp::Equals("a.jpg".into()));
        assert_eq!(c.attrs[1].op, AttrOp::Equals("x".into()));
    }

    #[test]
    fn dotted_attribute_values_must_be_quoted() {
        let err = parse_compound_selector("img[data-src=a.avif]").unwrap_err();
        assert_eq!(err.reason, "expected ']'");
        let c = parse_compound_selector("img[data-src='a.avif']").unwrap();
        assert_eq!(c.attrs[0].op, AttrOp::Equals("a.avif".into()));
        let c = parse_compound_selector(r#"div[data-speed="0.3"]"#).unwrap();
        assert_eq!(c.attrs[0].op, AttrOp::Equals("0.3".into()));
    }

    #[test]
    fn matches_tag_and_id() {
        let list = parse("form#contact-form").unwrap();
        assert!(list.matches(&el("form", &[("id", "contact-form")])));
        assert!(!list.matches(&el("form", &[("id", "other")])));
        assert!(!list.matches(&el("form", &[])));
        assert!(!list.matches(&el("div", &[("id", "contact-form")])));
    }

    #[test]
    fn parse_list() {
        let list = parse("input, textarea,select").unwrap();
        assert_eq!(list.0.len(), 3);
        assert_eq!(list.0[2].tag.as_deref(), Some("select"));
    }

    #[test]
    fn parse_rejects_combinators_and_garbage() {
        assert!(parse("#contact-form input").is_err());
        assert!(parse("").is_err());
        assert!(parse("a[href~=x]").is_err());
        assert!(parse("a[href=\"x]").is_err());
        assert!(parse(".").is_err());
    }

    #[test]
    fn error_names_the_selector() {
        let err = parse("a b").unwrap_err();
        assert_eq!(err.selector, "a b");
        assert!(err.to_string().contains("combinators"));
    }

    #[test]
    fn matches_anchor_prefix() {
        let list = parse(r##"a[href^="#"]"##).unwrap();
        assert!(list.matches(&el("a", &[("href", "#about")])));
        assert!(!list.matches(&el("a", &[("href", "/about")])));
        assert!(!list.matches(&el("a", &[])));
        assert!(!list.matches(&el("div", &[("href", "#about")])));
    }

    #[test]
    fn matches_classes_all_required() {
        let list = parse(".btn.active").unwrap();
        assert!(list.matches(&el("button", &[("class", "btn active")])));
        assert!(!list.matches(&el("button", &[("class", "btn")])));
    }

    #[test]
    fn matches_any_in_list() {
        let list = parse("input, textarea").unwrap();
        assert!(list.matches(&el("textarea", &[])));
        assert!(!list.matches(&el("button", &[])));
    }

    #[test]
    fn matches_suffix_and_contains() {
        let el = el("img", &[("src", "photo-800.avif")]);
        assert!(parse("img[src$='.avif']").unwrap().matches(&el));
        assert!(parse("img[src*=800]").unwrap().matches(&el));
        assert!(!parse("img[src*=1400]").unwrap().matches(&el));
    }
}
