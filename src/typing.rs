//! Typewriter effect for `.typing-effect` elements.
//!
//! The element's text is captured and cleared at mount, then typed back one
//! character per interval tick the first time the element becomes visible.

use crate::config::{InteractConfig, observer_options};
use crate::dom::{Document, Tick};

/// Progress through one string, one character per tick.
#[derive(Debug, Clone)]
pub struct TypingAnimation {
    chars: Vec<char>,
    index: usize,
}

impl TypingAnimation {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            index: 0,
        }
    }

    /// Reveal the next character. `None` once the text is exhausted.
    pub fn tick(&mut self) -> Option<char> {
        let c = self.chars.get(self.index).copied()?;
        self.index += 1;
        Some(c)
    }

    /// Text revealed so far.
    pub fn typed(&self) -> String {
        self.chars[..self.index].iter().collect()
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.chars.len()
    }
}

/// Capture and blank every typing element, then arm them.
pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Vec<D::Element> {
    let elements = doc.query_all(&config.selectors.typing);
    if elements.is_empty() {
        return elements;
    }
    let texts: Vec<(D::Element, String)> = elements
        .iter()
        .map(|el| {
            let text = doc.text(el);
            doc.set_text(el, "");
            (el.clone(), text)
        })
        .collect();

    let interval = config.typing.interval_ms;
    let options = observer_options(config.typing.threshold, &config.typing.root_margin);
    doc.observe_visibility(
        &options,
        elements.clone(),
        Box::new(move |doc: &D, element: &D::Element| {
            let Some((_, text)) = texts.iter().find(|(el, _)| el == element) else {
                return;
            };
            doc.set_text(element, "");
            let mut animation = TypingAnimation::new(text);
            if animation.is_done() {
                return;
            }
            let element = element.clone();
            doc.set_interval(
                interval,
                Box::new(move |doc: &D| {
                    if animation.tick().is_none() {
                        return Tick::Stop;
                    }
                    doc.set_text(&element, &animation.typed());
                    if animation.is_done() {
                        Tick::Stop
                    } else {
                        Tick::Continue
                    }
                }),
            );
        }),
    );
    tracing::debug!(count = elements.len(), "typing effects armed");
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;

    #[test]
    fn ticks_through_every_character() {
        let mut animation = TypingAnimation::new("héllo");
        let mut typed = Vec::new();
        while let Some(c) = animation.tick() {
            typed.push(animation.typed());
            assert_eq!(typed.last().unwrap().chars().last(), Some(c));
        }
        assert_eq!(typed, vec!["h", "hé", "hél", "héll", "héllo"]);
        assert!(animation.is_done());
        assert_eq!(animation.tick(), None);
    }

    #[test]
    fn empty_string_is_done_immediately() {
        let mut animation = TypingAnimation::new("");
        assert!(animation.is_done());
        assert_eq!(animation.tick(), None);
        assert_eq!(animation.typed(), "");
    }

    #[test]
    fn text_is_cleared_at_mount() {
        let doc = HeadlessDocument::new();
        let el = doc
            .append_text(doc.body_id(), "h1.typing-effect", "Hello")
            .unwrap();
        doc.set_layout(el, 2_000.0, 50.0);
        mount(&doc, &InteractConfig::default());
        assert_eq!(doc.text(&el), "");
    }

    #[test]
    fn types_one_character_per_interval() {
        let doc = HeadlessDocument::new();
        let el = doc
            .append_text(doc.body_id(), "h1.typing-effect", "Hi there")
            .unwrap();
        doc.set_layout(el, 100.0, 50.0);
        mount(&doc, &InteractConfig::default());
        doc.settle();
        assert_eq!(doc.text(&el), "");
        for n in 1..="Hi there".len() {
            doc.advance(100);
            assert_eq!(doc.text(&el).len(), n);
        }
        assert_eq!(doc.text(&el), "Hi there");
        assert_eq!(doc.pending_tasks(), 0);
        doc.advance(1_000);
        assert_eq!(doc.text(&el), "Hi there");
    }

    #[test]
    fn waits_for_visibility() {
        let doc = HeadlessDocument::new();
        let el = doc
            .append_text(doc.body_id(), "p.typing-effect", "abc")
            .unwrap();
        doc.set_layout(el, 3_000.0, 20.0);
        mount(&doc, &InteractConfig::default());
        doc.advance(1_000);
        assert_eq!(doc.text(&el), "");
        doc.scroll_to(2_500.0);
        doc.advance(300);
        assert_eq!(doc.text(&el), "abc");
    }

    #[test]
    fn reentering_viewport_does_not_retype() {
        let doc = HeadlessDocument::new();
        let el = doc
            .append_text(doc.body_id(), "p.typing-effect", "ok")
            .unwrap();
        doc.set_layout(el, 100.0, 20.0);
        mount(&doc, &InteractConfig::default());
        doc.advance(500);
        doc.scroll_to(4_000.0);
        doc.scroll_to(0.0);
        doc.advance(50);
        assert_eq!(doc.text(&el), "ok");
        assert_eq!(doc.pending_tasks(), 0);
    }
}
