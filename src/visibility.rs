//! One-shot visibility triggers.
//!
//! Every scroll-driven effect on the page (reveal, counters, typing, lazy
//! images) follows the same shape: watch a set of elements, and the first time
//! an element is sufficiently inside the viewport run its effect once and stop
//! watching it. This module holds the host-independent part of that:
//!
//! - [`ObserverOptions`]: threshold and viewport margin, mirroring
//!   `IntersectionObserverInit`.
//! - [`intersection_ratio`]: the geometry the headless host uses in place of
//!   the browser's observer.
//! - [`TriggerSet`]: the armed/fired bookkeeping both hosts share, which is what
//!   guarantees an element fires at most once.

/// A single CSS length in a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f64),
    /// Percentage of the viewport dimension on the same axis.
    Percent(f64),
}

impl Length {
    /// Resolve to pixels against the viewport dimension on this length's axis.
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Length::Px(px) => px,
            Length::Percent(pct) => reference * pct / 100.0,
        }
    }

    fn parse(token: &str) -> Option<Self> {
        let (number, percent) = if let Some(n) = token.strip_suffix("px") {
            (n, false)
        } else if let Some(n) = token.strip_suffix('%') {
            (n, true)
        } else if token == "0" {
            (token, false)
        } else {
            return None;
        };
        let value: f64 = number.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(if percent {
            Length::Percent(value)
        } else {
            Length::Px(value)
        })
    }

    fn to_css(self) -> String {
        match self {
            Length::Px(px) => format!("{px}px"),
            Length::Percent(pct) => format!("{pct}%"),
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Px(0.0)
    }
}

/// Viewport inset/outset, in CSS margin order. Positive values grow the
/// viewport, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    /// Parse the CSS margin shorthand (1 to 4 values, `px` or `%`).
    ///
    /// - `"10px"` → all sides
    /// - `"10px 5%"` → vertical, horizontal
    /// - `"10px 5% 0px"` → top, horizontal, bottom
    /// - `"0px 0px -50px 0px"` → top, right, bottom, left
    ///
    /// An empty string is no margin.
    pub fn parse(input: &str) -> Option<Self> {
        let lengths = input
            .split_whitespace()
            .map(Length::parse)
            .collect::<Option<Vec<_>>>()?;
        let margin = match lengths.as_slice() {
            [] => RootMargin::default(),
            [all] => RootMargin {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            },
            [vertical, horizontal] => RootMargin {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            },
            [top, horizontal, bottom] => RootMargin {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            },
            [top, right, bottom, left] => RootMargin {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            },
            _ => return None,
        };
        Some(margin)
    }

    /// Render as the four-value form `IntersectionObserverInit.rootMargin` takes.
    pub fn to_css(&self) -> String {
        format!(
            "{} {} {} {}",
            self.top.to_css(),
            self.right.to_css(),
            self.bottom.to_css(),
            self.left.to_css()
        )
    }
}

/// Threshold and margin for one family of triggers.
///
/// The default is the page's standard scroll trigger: 10% visible, with the
/// viewport's bottom edge pulled up by 50px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Minimum visible fraction of the element, `0.0..=1.0`.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin {
                bottom: Length::Px(-50.0),
                ..RootMargin::default()
            },
        }
    }
}

impl ObserverOptions {
    /// Fire on any contact with the unmodified viewport, like an
    /// `IntersectionObserver` created without options.
    pub fn any_overlap() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::default(),
        }
    }

    pub fn is_satisfied(&self, ratio: f64, intersecting: bool) -> bool {
        intersecting && ratio >= self.threshold
    }
}

/// Axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Visible fraction of `target` inside `root` grown (or shrunk) by `margin`.
///
/// Returns `(ratio, intersecting)`. Edge-adjacent rectangles intersect with a
/// ratio of zero; zero-area targets inside the root count as fully visible.
pub fn intersection_ratio(target: Rect, root: Rect, margin: &RootMargin) -> (f64, bool) {
    let top = root.y - margin.top.resolve(root.height);
    let bottom = root.bottom() + margin.bottom.resolve(root.height);
    let left = root.x - margin.left.resolve(root.width);
    let right = root.right() + margin.right.resolve(root.width);

    let overlap_w = target.right().min(right) - target.x.max(left);
    let overlap_h = target.bottom().min(bottom) - target.y.max(top);
    if overlap_w < 0.0 || overlap_h < 0.0 {
        return (0.0, false);
    }

    let area = target.width * target.height;
    if area <= 0.0 {
        return (1.0, true);
    }
    ((overlap_w * overlap_h) / area, true)
}

/// Armed elements of one trigger family.
///
/// `fire` reports true exactly once per armed key, the first time the
/// visibility condition holds, and disarms the key. Keys never armed never fire.
#[derive(Debug, Clone)]
pub struct TriggerSet<K> {
    options: ObserverOptions,
    armed: Vec<K>,
    fired: usize,
}

impl<K: PartialEq> TriggerSet<K> {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            armed: Vec::new(),
            fired: 0,
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Start watching `key`. Arming an already-armed key is a no-op.
    pub fn arm(&mut self, key: K) {
        if !self.armed.contains(&key) {
            self.armed.push(key);
        }
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.armed.contains(key)
    }

    /// Armed keys in arming order.
    pub fn armed(&self) -> &[K] {
        &self.armed
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Number of keys that have fired so far.
    pub fn fired(&self) -> usize {
        self.fired
    }

    pub fn fire(&mut self, key: &K, ratio: f64, intersecting: bool) -> bool {
        if !self.options.is_satisfied(ratio, intersecting) {
            return false;
        }
        let Some(pos) = self.armed.iter().position(|k| k == key) else {
            return false;
        };
        self.armed.remove(pos);
        self.fired += 1;
        true
    }
}
