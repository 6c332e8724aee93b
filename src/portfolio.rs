//! Page-ready entry point: mounts every behavior against one document.

use crate::config::InteractConfig;
use crate::dom::Document;
use crate::filter::ProjectFilter;
use crate::form::{FormValidator, Outbox};
use crate::nav::NavController;
use crate::parallax::Parallax;
use crate::storage::KeyValueStore;
use crate::theme::ThemeController;
use crate::{anchors, counter, filter, form, lazy, nav, parallax, reveal, theme, typing};
use std::rc::Rc;

/// Handles to everything mounted on a page.
///
/// Listeners only hold weak handles to the controllers, so the page stays
/// interactive for as long as this value is kept. The handles also serve for
/// inspection and for driving a behavior directly.
pub struct Portfolio<D: Document, S: KeyValueStore> {
    pub theme: Rc<ThemeController<D, S>>,
    pub nav: Rc<NavController<D>>,
    pub revealed: Vec<D::Element>,
    pub parallax: Option<Rc<Parallax<D>>>,
    pub counters: Vec<D::Element>,
    pub typing: Vec<D::Element>,
    pub lazy_images: Vec<D::Element>,
    pub anchors: Vec<D::Element>,
    pub form: Option<Rc<FormValidator<D>>>,
    pub filter: Option<Rc<ProjectFilter<D>>>,
}

impl<D: Document, S: KeyValueStore + 'static> Portfolio<D, S> {
    /// Mount in page order: theme first so the right colors are in place
    /// before anything animates, then navigation, scroll effects,
    /// animations, lazy images, anchors, the contact form and the filter.
    pub fn mount(doc: &D, store: S, config: &InteractConfig, outbox: Rc<dyn Outbox>) -> Self {
        let theme = theme::mount(doc, store, config);
        let nav = nav::mount(doc, config);
        let revealed = reveal::mount(doc, config);
        let parallax = parallax::mount(doc, config);
        let counters = counter::mount(doc, config);
        let typing = typing::mount(doc, config);
        let lazy_images = lazy::mount(doc, config);
        let anchors = anchors::mount(doc, config);
        let form = form::mount(doc, config, outbox);
        let filter = filter::mount(doc, config);
        tracing::info!(
            reveal = revealed.len(),
            counters = counters.len(),
            typing = typing.len(),
            lazy = lazy_images.len(),
            parallax = parallax.is_some(),
            form = form.is_some(),
            filter = filter.is_some(),
            "portfolio mounted"
        );
        Self {
            theme,
            nav,
            revealed,
            parallax,
            counters,
            typing,
            lazy_images,
            anchors,
            form,
            filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::LogOutbox;
    use crate::headless::HeadlessDocument;
    use crate::storage::MemoryStore;
    use crate::theme::ThemeFlag;

    #[test]
    fn empty_page_mounts_without_panicking() {
        let doc = HeadlessDocument::new();
        let page = Portfolio::mount(
            &doc,
            MemoryStore::new(),
            &InteractConfig::default(),
            Rc::new(LogOutbox),
        );
        assert_eq!(page.theme.current(), ThemeFlag::Light);
        assert!(page.revealed.is_empty());
        assert!(page.parallax.is_none());
        assert!(page.form.is_none());
        assert!(page.filter.is_none());
        doc.scroll_to(1_000.0);
        doc.advance(10_000);
        assert!(page.nav.state().compact);
    }

    #[test]
    fn stored_theme_applies_at_mount() {
        let doc = HeadlessDocument::new();
        Portfolio::mount(
            &doc,
            MemoryStore::with("theme", "dark"),
            &InteractConfig::default(),
            Rc::new(LogOutbox),
        );
        assert_eq!(
            doc.attribute(&doc.root(), "data-theme").as_deref(),
            Some("dark")
        );
    }
}
