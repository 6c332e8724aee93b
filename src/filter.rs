//! Category filter for the projects grid.
//!
//! Clicking a `.filter-btn` makes it the only active button and shows the
//! `.project-item`s whose `data-category` equals its `data-filter` (every item
//! for `"all"`). Items fade in and out with inline styles:
//!
//! ```text
//! show, already displayed   display:block, opacity:1, scale(1)
//! show, currently hidden    display:block, then after reveal_delay_ms opacity:1, scale(1)
//! hide                      opacity:0, scale(hidden_scale), then after fade_ms display:none
//! ```
//!
//! Every click bumps a generation counter. Deferred steps carry the generation
//! they were scheduled under and do nothing once a newer click has happened,
//! so the last click's styling is what sticks.

use crate::config::{FilterConfig, InteractConfig};
use crate::dom::{Document, EventCtx, EventKind, Target};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const ALL: &str = "all";

/// What one item needs for a given category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Show { delayed: bool },
    Hide,
}

/// The parts of an item the plan depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemView<'a> {
    pub category: Option<&'a str>,
    pub hidden: bool,
}

pub fn matches(category: &str, item_category: Option<&str>) -> bool {
    category == ALL || item_category == Some(category)
}

pub fn plan(category: &str, items: &[ItemView<'_>]) -> Vec<Step> {
    items
        .iter()
        .map(|item| {
            if matches(category, item.category) {
                Step::Show {
                    delayed: item.hidden,
                }
            } else {
                Step::Hide
            }
        })
        .collect()
}

pub struct ProjectFilter<D: Document> {
    doc: D,
    buttons: Vec<D::Element>,
    items: Vec<D::Element>,
    config: FilterConfig,
    active_class: String,
    active: RefCell<String>,
    generation: Rc<Cell<u64>>,
}

impl<D: Document> ProjectFilter<D> {
    pub fn new(doc: &D, config: &InteractConfig) -> Self {
        Self {
            doc: doc.clone(),
            buttons: doc.query_all(&config.selectors.filter_button),
            items: doc.query_all(&config.selectors.project_item),
            config: config.filter.clone(),
            active_class: config.classes.active.clone(),
            active: RefCell::new(ALL.to_string()),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn buttons(&self) -> &[D::Element] {
        &self.buttons
    }

    /// Category of the last click, `"all"` before any.
    pub fn active_category(&self) -> String {
        self.active.borrow().clone()
    }

    /// Activate `button` and apply its category.
    pub fn select(&self, button: &D::Element) {
        let doc = &self.doc;
        let category = doc
            .data(button, "filter")
            .unwrap_or_else(|| ALL.to_string());
        for other in &self.buttons {
            doc.remove_class(other, &self.active_class);
        }
        doc.add_class(button, &self.active_class);
        self.apply(&category);
        *self.active.borrow_mut() = category;
    }

    /// Show and hide items for `category`.
    pub fn apply(&self, category: &str) {
        let doc = &self.doc;
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let categories: Vec<Option<String>> = self
            .items
            .iter()
            .map(|item| doc.data(item, "category"))
            .collect();
        let views: Vec<ItemView<'_>> = self
            .items
            .iter()
            .zip(&categories)
            .map(|(item, category)| ItemView {
                category: category.as_deref(),
                hidden: doc.style(item, "display").as_deref() == Some("none"),
            })
            .collect();
        let steps = plan(category, &views);
        tracing::debug!(category, generation, "filtering projects");

        for (item, step) in self.items.iter().zip(steps) {
            match step {
                Step::Show { delayed: false } => {
                    doc.set_style(item, "display", "block");
                    show(doc, item);
                }
                Step::Show { delayed: true } => {
                    doc.set_style(item, "display", "block");
                    let item = item.clone();
                    let current = self.generation.clone();
                    doc.set_timeout(
                        self.config.reveal_delay_ms,
                        Box::new(move |doc: &D| {
                            if current.get() == generation {
                                show(doc, &item);
                            }
                        }),
                    );
                }
                Step::Hide => {
                    doc.set_style(item, "opacity", "0");
                    doc.set_style(
                        item,
                        "transform",
                        &format!("scale({})", self.config.hidden_scale),
                    );
                    let item = item.clone();
                    let current = self.generation.clone();
                    doc.set_timeout(
                        self.config.fade_ms,
                        Box::new(move |doc: &D| {
                            if current.get() == generation {
                                doc.set_style(&item, "display", "none");
                            }
                        }),
                    );
                }
            }
        }
    }
}

fn show<D: Document>(doc: &D, item: &D::Element) {
    doc.set_style(item, "opacity", "1");
    doc.set_style(item, "transform", "scale(1)");
}

/// Wire the filter buttons. `None` when the page has no projects grid.
pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Option<Rc<ProjectFilter<D>>> {
    doc.query(&config.selectors.projects_grid)?;
    let filter = Rc::new(ProjectFilter::new(doc, config));
    for button in filter.buttons() {
        let handle = Rc::downgrade(&filter);
        let target = button.clone();
        doc.listen(
            Target::Element(button.clone()),
            EventKind::Click,
            Box::new(move |_: &D, _: &mut EventCtx| {
                if let Some(filter) = handle.upgrade() {
                    filter.select(&target);
                }
            }),
        );
    }
    tracing::debug!(
        buttons = filter.buttons.len(),
        items = filter.items.len(),
        "project filter mounted"
    );
    Some(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessDocument, NodeId};

    fn view(category: Option<&str>, hidden: bool) -> ItemView<'_> {
        ItemView { category, hidden }
    }

    #[test]
    fn matches_all_and_exact_category() {
        assert!(matches("all", Some("web")));
        assert!(matches("all", None));
        assert!(matches("web", Some("web")));
        assert!(!matches("web", Some("design")));
        assert!(!matches("web", Some("all")));
        assert!(!matches("web", None));
    }

    #[test]
    fn plan_delays_only_hidden_matches() {
        let items = [
            view(Some("web"), false),
            view(Some("web"), true),
            view(Some("design"), false),
            view(None, true),
        ];
        assert_eq!(
            plan("web", &items),
            vec![
                Step::Show { delayed: false },
                Step::Show { delayed: true },
                Step::Hide,
                Step::Hide,
            ]
        );
        assert_eq!(
            plan("all", &items),
            vec![
                Step::Show { delayed: false },
                Step::Show { delayed: true },
                Step::Show { delayed: false },
                Step::Show { delayed: true },
            ]
        );
    }

    struct Grid {
        doc: HeadlessDocument,
        filter: Rc<ProjectFilter<HeadlessDocument>>,
        all: NodeId,
        web: NodeId,
        design: NodeId,
        items: Vec<NodeId>,
    }

    fn grid() -> Grid {
        let doc = HeadlessDocument::new();
        let body = doc.body_id();
        let bar = doc.append(body, "div.filters").unwrap();
        let all = doc
            .append(bar, "button.filter-btn.active[data-filter=all]")
            .unwrap();
        let web = doc
            .append(bar, "button.filter-btn[data-filter=web]")
            .unwrap();
        let design = doc
            .append(bar, "button.filter-btn[data-filter=design]")
            .unwrap();
        let container = doc.append(body, "div.projects-grid").unwrap();
        let items = ["web", "design", "web", "all"]
            .iter()
            .map(|c| {
                doc.append(container, &format!("div.project-item[data-category={c}]"))
                    .unwrap()
            })
            .collect();
        let filter = mount(&doc, &InteractConfig::default()).unwrap();
        Grid {
            doc,
            filter,
            all,
            web,
            design,
            items,
        }
    }

    fn displayed(g: &Grid) -> Vec<bool> {
        g.items
            .iter()
            .map(|i| g.doc.style(i, "display").as_deref() != Some("none"))
            .collect()
    }

    fn active_buttons(g: &Grid) -> Vec<NodeId> {
        [g.all, g.web, g.design]
            .into_iter()
            .filter(|b| g.doc.has_class(b, "active"))
            .collect()
    }

    #[test]
    fn no_grid_no_filter() {
        let doc = HeadlessDocument::new();
        doc.append(doc.body_id(), "button.filter-btn[data-filter=web]")
            .unwrap();
        assert!(mount(&doc, &InteractConfig::default()).is_none());
    }

    #[test]
    fn click_filters_items_and_moves_active_marker() {
        let g = grid();
        g.doc.click(g.web);
        assert_eq!(active_buttons(&g), vec![g.web]);
        assert_eq!(g.filter.active_category(), "web");

        let hidden = g.items[1];
        assert_eq!(g.doc.style(&hidden, "opacity").as_deref(), Some("0"));
        let transform = g.doc.style(&hidden, "transform");
        assert_eq!(transform.as_deref(), Some("scale(0.8)"));
        assert_eq!(g.doc.style(&g.items[0], "opacity").as_deref(), Some("1"));

        g.doc.advance(299);
        assert_eq!(displayed(&g), vec![true, true, true, true]);
        g.doc.advance(1);
        assert_eq!(displayed(&g), vec![true, false, true, false]);
    }

    #[test]
    fn hidden_items_fade_back_in_after_delay() {
        let g = grid();
        g.doc.click(g.design);
        g.doc.advance(300);
        assert_eq!(displayed(&g), vec![false, true, false, false]);

        g.doc.click(g.all);
        assert_eq!(displayed(&g), vec![true; 4]);
        assert_eq!(g.doc.style(&g.items[0], "opacity").as_deref(), Some("0"));
        assert_eq!(g.doc.style(&g.items[1], "opacity").as_deref(), Some("1"));
        g.doc.advance(10);
        for item in &g.items {
            assert_eq!(g.doc.style(item, "opacity").as_deref(), Some("1"));
            assert_eq!(g.doc.style(item, "transform").as_deref(), Some("scale(1)"));
        }
        assert_eq!(active_buttons(&g), vec![g.all]);
    }

    #[test]
    fn rapid_clicks_last_one_wins() {
        let g = grid();
        g.doc.click(g.design);
        g.doc.advance(100);
        g.doc.click(g.web);
        g.doc.advance(1_000);
        // The design click's pending hide of the web items was dropped.
        assert_eq!(displayed(&g), vec![true, false, true, false]);
        assert_eq!(g.doc.style(&g.items[0], "opacity").as_deref(), Some("1"));
        assert_eq!(active_buttons(&g), vec![g.web]);
        assert_eq!(g.doc.pending_tasks(), 0);
    }

    #[test]
    fn button_without_category_shows_everything() {
        let doc = HeadlessDocument::new();
        let body = doc.body_id();
        doc.append(body, "div.projects-grid").unwrap();
        let button = doc.append(body, "button.filter-btn").unwrap();
        let item = doc
            .append(body, "div.project-item[data-category=web]")
            .unwrap();
        doc.set_style(&item, "display", "none");
        let _filter = mount(&doc, &InteractConfig::default()).unwrap();
        doc.click(button);
        doc.advance(10);
        assert_eq!(doc.style(&item, "display").as_deref(), Some("block"));
        assert_eq!(doc.style(&item, "opacity").as_deref(), Some("1"));
    }
}
