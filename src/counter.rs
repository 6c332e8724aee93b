//! Count-up animation for numeric stats.
//!
//! Each `.counter` element carries its final value in `data-target`. The first
//! time it scrolls into view it counts from zero to the target over a fixed
//! duration, one step per animation frame.
//!
//! The frame sequence is a plain [`Iterator`] ([`CounterAnimation`]) so its
//! guarantees can be tested without a document: values never decrease, never
//! exceed the target, the last value is exactly the target, and the sequence
//! ends within `ceil(duration / frame) + 1` frames.

use crate::config::{InteractConfig, observer_options};
use crate::dom::{Document, parse_int};

/// Frame-by-frame values of one count-up.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: i64,
    increment: f64,
    running: f64,
    frames: u32,
    max_frames: u32,
    finished: bool,
}

impl CounterAnimation {
    pub fn new(target: i64, duration_ms: u32, frame_ms: u32) -> Self {
        let steps = f64::from(duration_ms) / f64::from(frame_ms.max(1));
        let increment = if steps > 0.0 {
            target as f64 / steps
        } else {
            target as f64
        };
        Self {
            target,
            increment,
            running: 0.0,
            frames: 0,
            max_frames: (steps.ceil() as u32).saturating_add(1),
            finished: false,
        }
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Iterator for CounterAnimation {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.finished {
            return None;
        }
        self.frames += 1;
        self.running += self.increment;
        if self.running < self.target as f64 && self.frames < self.max_frames {
            Some((self.running.ceil() as i64).min(self.target))
        } else {
            self.finished = true;
            Some(self.target)
        }
    }
}

/// Write the next frame and schedule the one after it.
fn run<D: Document>(doc: &D, element: D::Element, mut animation: CounterAnimation) {
    let Some(value) = animation.next() else {
        return;
    };
    doc.set_text(&element, &value.to_string());
    if !animation.is_finished() {
        doc.request_frame(Box::new(move |doc: &D| run(doc, element, animation)));
    }
}

/// Arm every counter on the page. Counters whose target does not parse are
/// blanked and left alone. Returns the armed elements.
pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Vec<D::Element> {
    let mut armed = Vec::new();
    let mut targets = Vec::new();
    for element in doc.query_all(&config.selectors.counter) {
        match doc.data(&element, "target").as_deref().and_then(parse_int) {
            Some(target) => {
                armed.push(element.clone());
                targets.push((element, target));
            }
            None => {
                tracing::warn!(?element, "counter target is not a number");
                doc.set_text(&element, "");
            }
        }
    }
    if armed.is_empty() {
        return armed;
    }

    let counter = config.counter.clone();
    let options = observer_options(counter.threshold, &counter.root_margin);
    doc.observe_visibility(
        &options,
        armed.clone(),
        Box::new(move |doc: &D, element: &D::Element| {
            let Some((_, target)) = targets.iter().find(|(el, _)| el == element) else {
                return;
            };
            tracing::debug!(value = *target, "counter started");
            let animation = CounterAnimation::new(*target, counter.duration_ms, counter.frame_ms);
            run(doc, element.clone(), animation);
        }),
    );
    tracing::debug!(count = armed.len(), "counters armed");
    armed
}
