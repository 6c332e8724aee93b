//! Navigation chrome: mobile menu, navbar compaction, active-section
//! highlighting and the scroll-to-top control.
//!
//! ```text
//! menu            closed ──hamburger──▶ open ──hamburger / nav link──▶ closed
//! navbar          expanded ◀──scroll_y > compact_after──▶ compact
//! active section  last section with scroll_y >= offset_top - section_offset
//! scroll-to-top   visible while scroll_y > scroll_top_after
//! ```

use crate::config::{InteractConfig, NavConfig};
use crate::dom::{Document, EventCtx, EventKind, Target};
use std::cell::RefCell;
use std::rc::Rc;

/// Id of the section the viewport is in.
///
/// Sections are scanned in document order and every one whose top, less
/// `offset`, is at or above `scroll_y` replaces the previous candidate, so
/// the last qualifying section wins.
pub fn active_section(scroll_y: f64, offset: f64, sections: &[(String, f64)]) -> Option<&str> {
    sections
        .iter()
        .rev()
        .find(|(_, top)| scroll_y >= top - offset)
        .map(|(id, _)| id.as_str())
}

/// Whether a link's `href` points at the section `id`.
pub fn link_targets(href: &str, id: &str) -> bool {
    href.rsplit_once('#')
        .is_some_and(|(_, fragment)| fragment == id)
}

/// Observable navigation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavState {
    pub menu_open: bool,
    pub compact: bool,
    pub active: Option<String>,
    pub scroll_top_visible: bool,
    /// Offset seen by the last scroll event.
    pub last_scroll: f64,
}

pub struct NavController<D: Document> {
    doc: D,
    toggle: Option<D::Element>,
    menu: Option<D::Element>,
    links: Vec<D::Element>,
    navbar: Option<D::Element>,
    sections: Vec<D::Element>,
    scroll_top: Option<D::Element>,
    config: NavConfig,
    active_class: String,
    visible_class: String,
    state: RefCell<NavState>,
}

impl<D: Document> NavController<D> {
    pub fn resolve(doc: &D, config: &InteractConfig) -> Self {
        let selectors = &config.selectors;
        Self {
            doc: doc.clone(),
            toggle: doc.query(&selectors.mobile_toggle),
            menu: doc.query(&selectors.nav_menu),
            links: doc.query_all(&selectors.nav_link),
            navbar: doc.query(&selectors.navbar),
            sections: doc.query_all(&selectors.section),
            scroll_top: doc.query(&selectors.scroll_top),
            config: config.nav.clone(),
            active_class: config.classes.active.clone(),
            visible_class: config.classes.visible.clone(),
            state: RefCell::new(NavState::default()),
        }
    }

    pub fn state(&self) -> NavState {
        self.state.borrow().clone()
    }

    pub fn toggle_menu(&self) {
        let open = !self.state.borrow().menu_open;
        self.set_menu(open);
    }

    /// Close the menu if it is open.
    pub fn close_menu(&self) {
        if self.state.borrow().menu_open {
            self.set_menu(false);
        }
    }

    fn set_menu(&self, open: bool) {
        for element in self.toggle.iter().chain(self.menu.iter()) {
            if open {
                self.doc.add_class(element, &self.active_class);
            } else {
                self.doc.remove_class(element, &self.active_class);
            }
        }
        self.state.borrow_mut().menu_open = open;
    }

    /// Recompute everything that depends on the scroll offset.
    pub fn on_scroll(&self) {
        let doc = &self.doc;
        let scroll_y = doc.scroll_y();

        let compact = scroll_y > self.config.compact_after;
        if let Some(navbar) = &self.navbar {
            let padding = if compact {
                &self.config.compact_padding
            } else {
                &self.config.expanded_padding
            };
            doc.set_style(navbar, "padding", padding);
        }

        let sections: Vec<(String, f64)> = self
            .sections
            .iter()
            .filter_map(|s| Some((doc.attribute(s, "id")?, doc.offset_top(s))))
            .collect();
        let offset = self.config.section_offset;
        let active = active_section(scroll_y, offset, &sections);
        let active = active.map(str::to_string);
        for link in &self.links {
            let targeted = match (&active, doc.attribute(link, "href")) {
                (Some(id), Some(href)) => link_targets(&href, id),
                _ => false,
            };
            if targeted {
                doc.add_class(link, &self.active_class);
            } else {
                doc.remove_class(link, &self.active_class);
            }
        }

        let scroll_top_visible = scroll_y > self.config.scroll_top_after;
        if let Some(button) = &self.scroll_top {
            if scroll_top_visible {
                doc.add_class(button, &self.visible_class);
            } else {
                doc.remove_class(button, &self.visible_class);
            }
        }

        let mut state = self.state.borrow_mut();
        state.compact = compact;
        state.active = active;
        state.scroll_top_visible = scroll_top_visible;
        state.last_scroll = scroll_y;
    }

    pub fn scroll_to_top(&self) {
        self.doc.scroll_to_top();
    }
}

/// The controller owns the document, so listeners only hold a weak handle.
fn on_click<D: Document>(
    doc: &D,
    element: D::Element,
    nav: &Rc<NavController<D>>,
    action: fn(&NavController<D>),
) {
    let handle = Rc::downgrade(nav);
    doc.listen(
        Target::Element(element),
        EventKind::Click,
        Box::new(move |_: &D, _: &mut EventCtx| {
            if let Some(nav) = handle.upgrade() {
                action(&nav);
            }
        }),
    );
}

pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Rc<NavController<D>> {
    let nav = Rc::new(NavController::resolve(doc, config));

    if let Some(toggle) = nav.toggle.clone() {
        on_click(doc, toggle, &nav, NavController::toggle_menu);
    }
    for link in &nav.links {
        on_click(doc, link.clone(), &nav, NavController::close_menu);
    }
    if let Some(button) = nav.scroll_top.clone() {
        on_click(doc, button, &nav, NavController::scroll_to_top);
    }
    let handle = Rc::downgrade(&nav);
    doc.listen(
        Target::Window,
        EventKind::Scroll,
        Box::new(move |_: &D, _: &mut EventCtx| {
            if let Some(nav) = handle.upgrade() {
                nav.on_scroll();
            }
        }),
    );

    tracing::debug!(
        links = nav.links.len(),
        sections = nav.sections.len(),
        "navigation mounted"
    );
    nav
}
