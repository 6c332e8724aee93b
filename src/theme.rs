//! Light/dark theme flag, persisted in browser-local storage.
//!
//! The root element carries the active theme as `data-theme`; stylesheets key
//! their custom properties off it (see [`crate::config::generate_theme_css`]).
//! The stored value is read once at mount and written on every toggle.

use crate::config::{InteractConfig, ThemeConfig};
use crate::dom::{Document, EventCtx, EventKind, Target};
use crate::storage::KeyValueStore;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeFlag {
    #[default]
    Light,
    Dark,
}

impl ThemeFlag {
    /// Read a stored or attribute value. Anything but `"dark"` is light.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("dark") => ThemeFlag::Dark,
            _ => ThemeFlag::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeFlag::Light => "light",
            ThemeFlag::Dark => "dark",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ThemeFlag::Light => ThemeFlag::Dark,
            ThemeFlag::Dark => ThemeFlag::Light,
        }
    }
}

impl fmt::Display for ThemeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeController<D: Document, S: KeyValueStore> {
    doc: D,
    store: S,
    config: ThemeConfig,
}

impl<D: Document, S: KeyValueStore> ThemeController<D, S> {
    /// Apply the persisted theme (light when absent or unrecognized).
    pub fn init(doc: &D, store: S, config: &ThemeConfig) -> Self {
        let controller = Self {
            doc: doc.clone(),
            store,
            config: config.clone(),
        };
        let stored = ThemeFlag::parse(controller.store.get(&config.storage_key).as_deref());
        controller.apply(stored);
        tracing::debug!(theme = %stored, "theme initialized");
        controller
    }

    /// Theme currently applied to the root element.
    pub fn current(&self) -> ThemeFlag {
        let root = self.doc.root();
        ThemeFlag::parse(self.doc.attribute(&root, &self.config.attribute).as_deref())
    }

    /// Flip the theme, persist it and apply it. Returns the new theme.
    pub fn toggle(&self) -> ThemeFlag {
        let next = self.current().flipped();
        self.apply(next);
        if let Err(err) = self.store.set(&self.config.storage_key, next.as_str()) {
            tracing::warn!(%err, theme = %next, "could not persist theme");
        }
        if let Some(body) = self.doc.body() {
            self.doc
                .set_style(&body, "transition", &self.config.transition);
        }
        tracing::debug!(theme = %next, "theme toggled");
        next
    }

    fn apply(&self, flag: ThemeFlag) {
        let root = self.doc.root();
        self.doc
            .set_attribute(&root, &self.config.attribute, flag.as_str());
    }
}

/// Initialize the theme and wire the toggle control, if the page has one.
pub fn mount<D, S>(doc: &D, store: S, config: &InteractConfig) -> Rc<ThemeController<D, S>>
where
    D: Document,
    S: KeyValueStore + 'static,
{
    let controller = Rc::new(ThemeController::init(doc, store, &config.theme));
    if let Some(toggle) = doc.query(&config.selectors.theme_toggle) {
        // Weak: the controller owns the document and its listeners.
        let handle = Rc::downgrade(&controller);
        doc.listen(
            Target::Element(toggle),
            EventKind::Click,
            Box::new(move |_: &D, _: &mut EventCtx| {
                if let Some(controller) = handle.upgrade() {
                    controller.toggle();
                }
            }),
        );
    }
    controller
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDocument;
    use crate::storage::{MemoryStore, StorageError};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _: &str) -> Option<String> {
            None
        }
        fn set(&self, _: &str, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    fn root_theme(doc: &HeadlessDocument) -> Option<String> {
        doc.attribute(&doc.root(), "data-theme")
    }

    #[test]
    fn flag_parse_defaults_to_light() {
        assert_eq!(ThemeFlag::parse(None), ThemeFlag::Light);
        assert_eq!(ThemeFlag::parse(Some("dark")), ThemeFlag::Dark);
        assert_eq!(ThemeFlag::parse(Some("light")), ThemeFlag::Light);
        assert_eq!(ThemeFlag::parse(Some("solarized")), ThemeFlag::Light);
        assert_eq!(ThemeFlag::parse(Some("DARK")), ThemeFlag::Light);
    }

    #[test]
    fn flipped_is_an_involution() {
        for flag in [ThemeFlag::Light, ThemeFlag::Dark] {
            assert_ne!(flag.flipped(), flag);
            assert_eq!(flag.flipped().flipped(), flag);
        }
    }

    #[test]
    fn init_applies_default_without_writing() {
        let doc = HeadlessDocument::new();
        let store = MemoryStore::new();
        let theme = ThemeController::init(&doc, store.clone(), &ThemeConfig::default());
        assert_eq!(theme.current(), ThemeFlag::Light);
        assert_eq!(root_theme(&doc).as_deref(), Some("light"));
        assert!(store.is_empty());
    }

    #[test]
    fn init_applies_stored_value() {
        let doc = HeadlessDocument::new();
        let store = MemoryStore::with("theme", "dark");
        ThemeController::init(&doc, store, &ThemeConfig::default());
        assert_eq!(root_theme(&doc).as_deref(), Some("dark"));
    }

    #[test]
    fn init_treats_unknown_stored_value_as_light() {
        let doc = HeadlessDocument::new();
        let store = MemoryStore::with("theme", "sepia");
        ThemeController::init(&doc, store, &ThemeConfig::default());
        assert_eq!(root_theme(&doc).as_deref(), Some("light"));
    }

    #[test]
    fn toggle_round_trip_persists() {
        let doc = HeadlessDocument::new();
        let store = MemoryStore::new();
        let theme = ThemeController::init(&doc, store.clone(), &ThemeConfig::default());

        assert_eq!(theme.toggle(), ThemeFlag::Dark);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        assert_eq!(root_theme(&doc).as_deref(), Some("dark"));

        assert_eq!(theme.toggle(), ThemeFlag::Light);
        assert_eq!(store.get("theme").as_deref(), Some("light"));
        assert_eq!(root_theme(&doc).as_deref(), Some("light"));
    }

    #[test]
    fn toggle_sets_body_transition() {
        let doc = HeadlessDocument::new();
        let theme = ThemeController::init(&doc, MemoryStore::new(), &ThemeConfig::default());
        theme.toggle();
        let body = doc.body().unwrap();
        assert_eq!(
            doc.style(&body, "transition").as_deref(),
            Some("background 0.3s ease, color 0.3s ease")
        );
    }

    #[test]
    fn storage_failure_still_applies_theme() {
        let doc = HeadlessDocument::new();
        let theme = ThemeController::init(&doc, BrokenStore, &ThemeConfig::default());
        assert_eq!(theme.toggle(), ThemeFlag::Dark);
        assert_eq!(root_theme(&doc).as_deref(), Some("dark"));
    }

    #[test]
    fn custom_key_and_attribute() {
        let doc = HeadlessDocument::new();
        let store = MemoryStore::with("site-theme", "dark");
        let config = ThemeConfig {
            storage_key: "site-theme".into(),
            attribute: "data-mode".into(),
            ..ThemeConfig::default()
        };
        let theme = ThemeController::init(&doc, store.clone(), &config);
        let mode = doc.attribute(&doc.root(), "data-mode");
        assert_eq!(mode.as_deref(), Some("dark"));
        theme.toggle();
        assert_eq!(store.get("site-theme").as_deref(), Some("light"));
    }

    #[test]
    fn mount_wires_toggle_click() {
        let doc = HeadlessDocument::new();
        let toggle = doc.append(doc.body_id(), "button.theme-toggle").unwrap();
        let store = MemoryStore::new();
        let theme = mount(&doc, store.clone(), &InteractConfig::default());
        doc.click(toggle);
        assert_eq!(theme.current(), ThemeFlag::Dark);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn mount_without_toggle_still_applies_theme() {
        let doc = HeadlessDocument::new();
        let store = MemoryStore::with("theme", "dark");
        mount(&doc, store, &InteractConfig::default());
        assert_eq!(root_theme(&doc).as_deref(), Some("dark"));
    }
}
