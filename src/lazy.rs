//! Deferred image loading: `img[data-src]` gets its real `src` on first sight.

use crate::config::{InteractConfig, observer_options};
use crate::dom::Document;

pub fn mount<D: Document>(doc: &D, config: &InteractConfig) -> Vec<D::Element> {
    let images = doc.query_all(&config.selectors.lazy_image);
    if images.is_empty() {
        return images;
    }
    let loaded = config.classes.loaded.clone();
    let options = observer_options(config.lazy.threshold, &config.lazy.root_margin);
    doc.observe_visibility(
        &options,
        images.clone(),
        Box::new(move |doc: &D, img: &D::Element| {
            let Some(src) = doc.data(img, "src") else {
                return;
            };
            doc.set_attribute(img, "src", &src);
            doc.add_class(img, &loaded);
            tracing::debug!(%src, "image loaded");
        }),
    );
    images
}
