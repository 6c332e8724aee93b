//! Scroll reveal: elements gain the `visible` class once, and CSS animates
//! the rest.

use crate::config::{InteractConfig, observer_options};
use crate::dom::Document;

pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Vec<D::Element> {
    let elements = doc.query_all(&config.selectors.reveal);
    if elements.is_empty() {
        return elements;
    }
    let visible = config.classes.visible.clone();
    let options = observer_options(config.reveal.threshold, &config.reveal.root_margin);
    doc.observe_visibility(
        &options,
        elements.clone(),
        Box::new(move |doc: &D, element: &D::Element| doc.add_class(element, &visible)),
    );
    tracing::debug!(count = elements.len(), "scroll reveal armed");
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;

    fn page() -> (HeadlessDocument, Vec<crate::headless::NodeId>) {
        let doc = HeadlessDocument::new();
        let body = doc.body_id();
        let cards = (0..3)
            .map(|i| {
                let card = doc.append(body, "div.card.animate-on-scroll").unwrap();
                doc.set_layout(card, 400.0 + 600.0 * f64::from(i), 200.0);
                card
            })
            .collect();
        (doc, cards)
    }

    #[test]
    fn reveals_in_scroll_order() {
        let (doc, cards) = page();
        mount(&doc, &InteractConfig::default());
        doc.settle();
        assert!(doc.has_class(&cards[0], "visible"));
        assert!(!doc.has_class(&cards[1], "visible"));

        doc.scroll_to(500.0);
        assert!(doc.has_class(&cards[1], "visible"));
        assert!(!doc.has_class(&cards[2], "visible"));
    }

    #[test]
    fn bottom_inset_delays_reveal() {
        let doc = HeadlessDocument::new();
        let el = doc.append(doc.body_id(), "div.animate-on-scroll").unwrap();
        // 30px of the element peeks into the viewport, but the bottom 50px
        // of the viewport do not count.
        doc.set_layout(el, 770.0, 200.0);
        mount(&doc, &InteractConfig::default());
        doc.settle();
        assert!(!doc.has_class(&el, "visible"));
        doc.scroll_to(100.0);
        assert!(doc.has_class(&el, "visible"));
    }

    #[test]
    fn threshold_requires_ten_percent() {
        let doc = HeadlessDocument::new();
        let el = doc.append(doc.body_id(), "div.animate-on-scroll").unwrap();
        doc.set_layout(el, 1_000.0, 1_000.0);
        mount(&doc, &InteractConfig::default());
        // Effective viewport bottom is scroll + 750; 50px of 1000 is 5%.
        doc.scroll_to(300.0);
        assert!(!doc.has_class(&el, "visible"));
        // 100px of 1000 is 10%.
        doc.scroll_to(350.0);
        assert!(doc.has_class(&el, "visible"));
    }

    #[test]
    fn class_stays_after_leaving() {
        let (doc, cards) = page();
        mount(&doc, &InteractConfig::default());
        doc.settle();
        doc.scroll_to(500.0);
        doc.scroll_to(1_200.0);
        doc.scroll_to(5_000.0);
        assert!(cards.iter().all(|c| doc.has_class(c, "visible")));
        assert_eq!(doc.observed(), 0);
    }
}
