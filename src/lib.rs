//! # Portfolio Interact
//!
//! Client-side interactivity for a single-page portfolio: a persisted
//! light/dark theme, a navbar that compacts and tracks the current section,
//! scroll-triggered reveals, counters and typing, lazy images, parallax, smooth
//! anchor scrolling, a validated contact form, and a category filter for the
//! projects grid.
//!
//! The crate compiles to a wasm module that mounts itself on page load, and to
//! a native library that renders the page shell and runs every behavior
//! against an in-memory document.
//!
//! # Architecture: One Document Trait, Two Hosts
//!
//! ```text
//!                   ┌── web::WebDocument        (wasm32: web-sys, IntersectionObserver, rAF)
//! behaviors ── Document
//!                   └── headless::HeadlessDocument (native: node tree, virtual clock, viewport)
//! ```
//!
//! Every behavior is a plain function or small controller generic over
//! [`dom::Document`]. The browser host forwards to the real DOM; the headless
//! host simulates layout, timers and visibility so the test suite drives whole
//! pages deterministically with `scroll_to`, `click` and `advance`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`portfolio`] | Mounts every behavior against one document, in page order |
//! | [`theme`] | Light/dark flag on `<html>`, persisted through a [`storage::KeyValueStore`] |
//! | [`nav`] | Mobile menu, navbar compaction, active section link, scroll-to-top control |
//! | [`reveal`] | Adds `visible` to `.animate-on-scroll` elements as they enter view |
//! | [`counter`] | Counts `.counter` elements up to `data-target` once visible |
//! | [`typing`] | Types `.typing-effect` text one character at a time once visible |
//! | [`lazy`] | Swaps `data-src` into `src` for lazy images once visible |
//! | [`parallax`] | Frame-throttled `translateY` for `.parallax` layers |
//! | [`anchors`] | Smooth scrolling for in-page `#fragment` links |
//! | [`form`] | Contact form validation, submission and reset |
//! | [`filter`] | Projects grid category filter |
//! | [`config`] | Layered configuration: stock defaults, `config.toml`, embedded JSON |
//! | [`markup`] | Maud rendering of a page shell that satisfies the DOM contract |
//! | [`dom`] | The [`dom::Document`] trait and event/scheduling types |
//! | [`visibility`] | Root margins, intersection ratios and one-shot trigger sets |
//! | [`selector`] | The CSS selector subset the headless host matches |
//! | [`headless`] | In-memory document host |
//! | [`storage`] | Key-value persistence seam |
//! | `web` | Browser host and wasm entry point (wasm32 only) |
//!
//! # Design Decisions
//!
//! ## One-Shot Visibility Triggers
//!
//! Reveals, counters, typing and lazy images each fire at most once per
//! element. Both hosts route observation through [`visibility::TriggerSet`],
//! which disarms an element the moment it fires, so scrolling back and forth
//! never restarts an animation.
//!
//! ## Frame-Throttled Parallax
//!
//! Scroll events can arrive many times per frame. Parallax only records that an
//! update is due and applies it on the next animation frame; further scroll
//! events before then are absorbed.
//!
//! ## Last Click Wins
//!
//! Filter clicks schedule deferred fades. Each click bumps a generation counter
//! and deferred steps from an older generation do nothing, so rapid clicks
//! settle on the state of the final one.
//!
//! ## Config Layering
//!
//! Stock defaults reproduce the reference page exactly. Site tooling overlays a
//! `config.toml`; the rendered page embeds the result as JSON, which the wasm
//! entry point reads back. Unknown keys are rejected at every layer.

pub mod anchors;
pub mod config;
pub mod counter;
pub mod dom;
pub mod filter;
pub mod form;
pub mod headless;
pub mod lazy;
pub mod markup;
pub mod nav;
pub mod parallax;
pub mod portfolio;
pub mod reveal;
pub mod selector;
pub mod storage;
pub mod theme;
pub mod typing;
pub mod visibility;

#[cfg(target_arch = "wasm32")]
pub mod web;
