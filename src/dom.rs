//! The document abstraction every behavior is written against.
//!
//! Behaviors never touch `web-sys` directly. They are generic over
//! [`Document`], which has two implementations:
//!
//! - `web::WebDocument` (wasm32 only): the live browser DOM.
//! - [`crate::headless::HeadlessDocument`]: an in-memory tree with a virtual
//!   clock and viewport, used by the test suite and native tooling.
//!
//! Element handles are resolved once when a behavior mounts and every later
//! operation goes through the handle. A selector that matches nothing simply
//! leaves the behavior without that element; nothing here fails.
//!
//! Long-running effects are chains of scheduled callbacks rather than loops:
//! [`Document::set_timeout`], [`Document::set_interval`] (whose task returns
//! [`Tick`] as its continuation predicate) and [`Document::request_frame`].

use crate::visibility::ObserverOptions;
use std::fmt;

/// Whether a repeating task keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Stop,
}

/// Event types the page listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Blur,
    Submit,
    Scroll,
}

impl EventKind {
    /// DOM event name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Blur => "blur",
            EventKind::Submit => "submit",
            EventKind::Scroll => "scroll",
        }
    }
}

/// What a listener is attached to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<E> {
    Window,
    Element(E),
}

/// Per-dispatch state handed to listeners.
#[derive(Debug, Default)]
pub struct EventCtx {
    default_prevented: bool,
}

impl EventCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the browser's default action (navigation, form submission).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Integer prefix of an attribute value, read the way `parseInt` does:
/// leading whitespace, an optional sign, then as many digits as follow.
/// `None` when no digit follows.
///
/// ```
/// use portfolio_interact::dom::parse_int;
/// assert_eq!(parse_int(" 42px"), Some(42));
/// assert_eq!(parse_int("-7"), Some(-7));
/// assert_eq!(parse_int("abc"), None);
/// ```
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].bytes().fold(0i64, |acc, d| {
        let digit = i64::from(d - b'0');
        acc.saturating_mul(10).saturating_add(digit)
    });
    Some(if negative { -magnitude } else { magnitude })
}

pub type Task<D> = Box<dyn FnOnce(&D)>;
pub type RepeatingTask<D> = Box<dyn FnMut(&D) -> Tick>;
pub type Listener<D> = Box<dyn FnMut(&D, &mut EventCtx)>;
pub type VisibleCallback<D, E> = Box<dyn FnMut(&D, &E)>;

/// A host document: element lookup and mutation, window scroll state,
/// scheduling, events and visibility observation.
///
/// Writes are infallible from the caller's point of view; hosts swallow (and
/// log) platform errors so a single broken element never takes the page down.
pub trait Document: Clone + 'static {
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// First element matching `selector` in document order.
    fn query(&self, selector: &str) -> Option<Self::Element>;
    /// All elements matching `selector` in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    /// All descendants of `scope` matching `selector`.
    fn query_within(&self, scope: &Self::Element, selector: &str) -> Vec<Self::Element>;
    /// The `<html>` element.
    fn root(&self) -> Self::Element;
    fn body(&self) -> Option<Self::Element>;
    fn next_sibling(&self, element: &Self::Element) -> Option<Self::Element>;

    // -------------------------------------------------------------------------
    // Attributes, classes, text, style
    // -------------------------------------------------------------------------

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    fn has_attribute(&self, element: &Self::Element, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    /// `data-*` attribute shorthand: `data(el, "speed")` reads `data-speed`.
    fn data(&self, element: &Self::Element, key: &str) -> Option<String> {
        self.attribute(element, &format!("data-{key}"))
    }

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);

    /// Flip `class` and return whether it is now present.
    fn toggle_class(&self, element: &Self::Element, class: &str) -> bool {
        if self.has_class(element, class) {
            self.remove_class(element, class);
            false
        } else {
            self.add_class(element, class);
            true
        }
    }

    fn text(&self, element: &Self::Element) -> String;
    fn set_text(&self, element: &Self::Element, text: &str);

    /// Inline style property, `None` when unset.
    fn style(&self, element: &Self::Element, property: &str) -> Option<String>;
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    /// Current value of an input, textarea or select; empty for anything else.
    fn value(&self, element: &Self::Element) -> String;
    /// Lowercased `type` of an input (`"text"` when absent), the tag name otherwise.
    fn input_type(&self, element: &Self::Element) -> String;
    /// Restore every control of `form` to its initial value.
    fn reset_form(&self, form: &Self::Element);

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    fn create_element(&self, tag: &str) -> Option<Self::Element>;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element);
    /// Detach `element` from the tree.
    fn remove(&self, element: &Self::Element);

    // -------------------------------------------------------------------------
    // Geometry and window scroll
    // -------------------------------------------------------------------------

    /// Distance from the document top to the element's top edge.
    fn offset_top(&self, element: &Self::Element) -> f64;
    /// Current vertical scroll offset of the window.
    fn scroll_y(&self) -> f64;
    /// Smoothly scroll the window back to the top.
    fn scroll_to_top(&self);
    /// Smoothly scroll `element` to the top of the viewport.
    fn scroll_into_view(&self, element: &Self::Element);

    // -------------------------------------------------------------------------
    // Scheduling
    // -------------------------------------------------------------------------

    /// Run `task` once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u32, task: Task<Self>);
    /// Run `task` every `period_ms` until it returns [`Tick::Stop`].
    fn set_interval(&self, period_ms: u32, task: RepeatingTask<Self>);
    /// Run `task` before the next repaint.
    fn request_frame(&self, task: Task<Self>);

    // -------------------------------------------------------------------------
    // Events and visibility
    // -------------------------------------------------------------------------

    fn listen(&self, target: Target<Self::Element>, kind: EventKind, listener: Listener<Self>);

    /// Watch `targets` and call `on_visible` the first time each one satisfies
    /// `options`. Each target fires at most once and is then unobserved.
    fn observe_visibility(
        &self,
        options: &ObserverOptions,
        targets: Vec<Self::Element>,
        on_visible: VisibleCallback<Self, Self::Element>,
    );
}
