//! Scroll-linked vertical translation of `.parallax` layers.
//!
//! Unlike the one-shot effects this runs for the life of the page. Each layer
//! moves by `scroll_y * speed`, where speed comes from `data-speed`. With
//! throttling on (the default), a burst of scroll events produces one update
//! on the next animation frame.

use crate::config::InteractConfig;
use crate::dom::{Document, EventCtx, EventKind, Target};
use std::cell::Cell;
use std::rc::Rc;

/// Per-layer speed from `data-speed`; missing or non-numeric values use `default`.
pub fn parse_speed(raw: Option<&str>, default: f64) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|s| s.is_finite())
        .unwrap_or(default)
}

/// CSS transform for a layer at the given scroll offset.
pub fn transform(scroll_y: f64, speed: f64) -> String {
    format!("translateY({}px)", scroll_y * speed)
}

pub struct Parallax<D: Document> {
    layers: Vec<(D::Element, f64)>,
    frame_pending: Cell<bool>,
    updates: Cell<u64>,
}

impl<D: Document> Parallax<D> {
    pub fn layers(&self) -> &[(D::Element, f64)] {
        &self.layers
    }

    /// How many times the layers have been repositioned.
    pub fn updates(&self) -> u64 {
        self.updates.get()
    }

    pub fn apply(&self, doc: &D) {
        let scroll_y = doc.scroll_y();
        for (element, speed) in &self.layers {
            doc.set_style(element, "transform", &transform(scroll_y, *speed));
        }
        self.updates.set(self.updates.get() + 1);
    }

    fn schedule(self: &Rc<Self>, doc: &D) {
        if self.frame_pending.replace(true) {
            return;
        }
        let this = self.clone();
        doc.request_frame(Box::new(move |doc: &D| {
            this.frame_pending.set(false);
            this.apply(doc);
        }));
    }
}

/// Resolve layers and start following the scroll. `None` when the page has no
/// parallax layers.
pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Option<Rc<Parallax<D>>> {
    let default_speed = config.parallax.default_speed;
    let layers: Vec<_> = doc
        .query_all(&config.selectors.parallax)
        .into_iter()
        .map(|el| {
            let speed = parse_speed(doc.data(&el, "speed").as_deref(), default_speed);
            (el, speed)
        })
        .collect();
    if layers.is_empty() {
        return None;
    }
    let parallax = Rc::new(Parallax {
        layers,
        frame_pending: Cell::new(false),
        updates: Cell::new(0),
    });
    let throttle = config.parallax.throttle;
    let handle = parallax.clone();
    doc.listen(
        Target::Window,
        EventKind::Scroll,
        Box::new(move |doc: &D, _: &mut EventCtx| {
            if throttle {
                handle.schedule(doc);
            } else {
                handle.apply(doc);
            }
        }),
    );
    tracing::debug!(layers = parallax.layers.len(), throttle, "parallax mounted");
    Some(parallax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{FRAME_MS, HeadlessDocument, NodeId};

    #[test]
    fn speed_parsing() {
        assert_eq!(parse_speed(None, 0.5), 0.5);
        assert_eq!(parse_speed(Some("0.3"), 0.5), 0.3);
        assert_eq!(parse_speed(Some(" -0.2 "), 0.5), -0.2);
        assert_eq!(parse_speed(Some("fast"), 0.5), 0.5);
        assert_eq!(parse_speed(Some("inf"), 0.5), 0.5);
        assert_eq!(parse_speed(Some(""), 0.5), 0.5);
    }

    #[test]
    fn transform_formatting() {
        assert_eq!(transform(0.0, 0.5), "translateY(0px)");
        assert_eq!(transform(200.0, 0.5), "translateY(100px)");
        assert_eq!(transform(100.0, 0.25), "translateY(25px)");
    }

    #[test]
    fn no_layers_no_listener() {
        let doc = HeadlessDocument::new();
        assert!(mount(&doc, &InteractConfig::default()).is_none());
    }

    #[test]
    fn throttled_updates_once_per_frame() {
        let doc = HeadlessDocument::new();
        let slow = doc.append(doc.body_id(), "div.parallax").unwrap();
        let fast = doc
            .append(doc.body_id(), "div.parallax[data-speed='0.8']")
            .unwrap();
        let parallax = mount(&doc, &InteractConfig::default()).unwrap();

        for y in [10.0, 50.0, 120.0, 200.0] {
            doc.scroll_to(y);
        }
        let transform = |layer: &NodeId| doc.style(layer, "transform");
        assert_eq!(transform(&slow), None);
        doc.advance(FRAME_MS);
        assert_eq!(parallax.updates(), 1);
        assert_eq!(transform(&slow).as_deref(), Some("translateY(100px)"));
        assert_eq!(transform(&fast).as_deref(), Some("translateY(160px)"));

        doc.scroll_to(400.0);
        doc.advance(FRAME_MS);
        assert_eq!(parallax.updates(), 2);
        assert_eq!(transform(&slow).as_deref(), Some("translateY(200px)"));
    }

    #[test]
    fn unthrottled_updates_every_event() {
        let doc = HeadlessDocument::new();
        let layer = doc.append(doc.body_id(), "div.parallax").unwrap();
        let mut config = InteractConfig::default();
        config.parallax.throttle = false;
        let parallax = mount(&doc, &config).unwrap();
        doc.scroll_to(40.0);
        let transform = doc.style(&layer, "transform");
        assert_eq!(transform.as_deref(), Some("translateY(20px)"));
        doc.scroll_to(80.0);
        assert_eq!(parallax.updates(), 2);
        assert_eq!(doc.pending_tasks(), 0);
    }

    #[test]
    fn configured_default_speed() {
        let doc = HeadlessDocument::new();
        doc.append(doc.body_id(), "div.parallax").unwrap();
        let mut config = InteractConfig::default();
        config.parallax.default_speed = 0.2;
        let parallax = mount(&doc, &config).unwrap();
        assert_eq!(parallax.layers()[0].1, 0.2);
    }
}
