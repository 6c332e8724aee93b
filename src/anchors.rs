//! Smooth scrolling for in-page `#fragment` links.

use crate::config::InteractConfig;
use crate::dom::{Document, EventCtx, EventKind, Target};

/// Fragment id of an in-page link, `None` for a bare `#`.
pub fn fragment(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Intercept clicks on every in-page link. Returns the links wired.
pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Vec<D::Element> {
    let anchors = doc.query_all(&config.selectors.anchor);
    for anchor in &anchors {
        let link = anchor.clone();
        doc.listen(
            Target::Element(anchor.clone()),
            EventKind::Click,
            Box::new(move |doc: &D, ctx: &mut EventCtx| {
                ctx.prevent_default();
                let Some(href) = doc.attribute(&link, "href") else {
                    return;
                };
                let Some(id) = fragment(&href) else {
                    return;
                };
                if id.contains(['"', '\\']) {
                    return;
                }
                match doc.query(&format!("[id=\"{id}\"]")) {
                    Some(target) => doc.scroll_into_view(&target),
                    None => tracing::debug!(%href, "anchor target not found"),
                }
            }),
        );
    }
    anchors
}
