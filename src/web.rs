//! Browser host: [`Document`] over `web-sys`, `localStorage`, and the wasm
//! entry point.
//!
//! Listeners and interval callbacks live as long as the page, so their
//! closures are leaked with `forget`. One-shot timers and animation frames go
//! through `Closure::once_into_js`, which frees the closure after it runs.
//!
//! Platform errors on writes are logged and swallowed; nothing here panics.

use crate::config::{self, InteractConfig};
use crate::dom::{
    Document, EventCtx, EventKind, Listener, RepeatingTask, Target, Task, Tick, VisibleCallback,
};
use crate::form::LogOutbox;
use crate::markup::CONFIG_SCRIPT_ID;
use crate::portfolio::Portfolio;
use crate::storage::{KeyValueStore, StorageError};
use crate::visibility::{ObserverOptions, TriggerSet};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, EventTarget, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, NodeList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, ScrollToOptions, Window,
};

fn log_js_error(action: &str, err: JsValue) {
    tracing::warn!(action, error = ?err, "DOM call failed");
}

fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// The live page.
#[derive(Clone)]
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
    root: Element,
}

impl WebDocument {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let root = document.document_element()?;
        Some(Self {
            window,
            document,
            root,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Document for WebDocument {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        elements(self.document.query_selector_all(selector))
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Vec<Element> {
        elements(scope.query_selector_all(selector))
    }

    fn root(&self) -> Element {
        self.root.clone()
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn next_sibling(&self, element: &Element) -> Option<Element> {
        element.next_element_sibling()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        if let Err(err) = element.set_attribute(name, value) {
            log_js_error("set_attribute", err);
        }
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().add_1(class) {
            log_js_error("add_class", err);
        }
    }

    fn remove_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().remove_1(class) {
            log_js_error("remove_class", err);
        }
    }

    fn text(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn style(&self, element: &Element, property: &str) -> Option<String> {
        element
            .dyn_ref::<HtmlElement>()?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(html) = element.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(err) = html.style().set_property(property, value) {
            log_js_error("set_style", err);
        }
    }

    fn value(&self, element: &Element) -> String {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn input_type(&self, element: &Element) -> String {
        match element.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.type_().to_ascii_lowercase(),
            None => element.tag_name().to_ascii_lowercase(),
        }
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        if let Err(err) = parent.append_child(child) {
            log_js_error("append_child", err);
        }
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn offset_top(&self, element: &Element) -> f64 {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => f64::from(html.offset_top()),
            None => element.get_bounding_client_rect().top() + self.scroll_y(),
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to_top(&self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_into_view(&self, element: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn set_timeout(&self, delay_ms: u32, task: Task<Self>) {
        let doc = self.clone();
        let callback = Closure::once_into_js(move || task(&doc));
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        let window = &self.window;
        let handler = callback.unchecked_ref();
        let scheduled =
            window.set_timeout_with_callback_and_timeout_and_arguments_0(handler, delay);
        if let Err(err) = scheduled {
            log_js_error("set_timeout", err);
        }
    }

    fn set_interval(&self, period_ms: u32, mut task: RepeatingTask<Self>) {
        let doc = self.clone();
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let own_handle = handle.clone();
        let callback = Closure::wrap(Box::new(move || {
            if task(&doc) == Tick::Continue {
                return;
            }
            if let Some(id) = own_handle.take() {
                doc.window.clear_interval_with_handle(id);
            }
        }) as Box<dyn FnMut()>);
        let period = i32::try_from(period_ms).unwrap_or(i32::MAX);
        let window = &self.window;
        let scheduled = window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            period,
        );
        match scheduled {
            Ok(id) => handle.set(Some(id)),
            Err(err) => log_js_error("set_interval", err),
        }
        callback.forget();
    }

    fn request_frame(&self, task: Task<Self>) {
        let doc = self.clone();
        let callback = Closure::once_into_js(move || task(&doc));
        let window = &self.window;
        if let Err(err) = window.request_animation_frame(callback.unchecked_ref()) {
            log_js_error("request_animation_frame", err);
        }
    }

    fn listen(&self, target: Target<Element>, kind: EventKind, mut listener: Listener<Self>) {
        let target: EventTarget = match target {
            Target::Window => self.window.clone().into(),
            Target::Element(element) => element.into(),
        };
        let doc = self.clone();
        let callback = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let mut ctx = EventCtx::new();
            listener(&doc, &mut ctx);
            if ctx.default_prevented() {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        let handler = callback.as_ref().unchecked_ref();
        if let Err(err) = target.add_event_listener_with_callback(kind.as_str(), handler) {
            log_js_error("add_event_listener", err);
        }
        callback.forget();
    }

    fn observe_visibility(
        &self,
        options: &ObserverOptions,
        targets: Vec<Element>,
        mut on_visible: VisibleCallback<Self, Element>,
    ) {
        let mut triggers = TriggerSet::new(*options);
        for target in &targets {
            triggers.arm(target.clone());
        }
        let triggers = Rc::new(RefCell::new(triggers));
        let doc = self.clone();
        let on_entries = move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                let target = entry.target();
                let ratio = entry.intersection_ratio();
                let fired = triggers
                    .borrow_mut()
                    .fire(&target, ratio, entry.is_intersecting());
                if fired {
                    observer.unobserve(&target);
                    on_visible(&doc, &target);
                }
            }
        };
        let callback = Closure::wrap(
            Box::new(on_entries) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_css());
        let handler = callback.as_ref().unchecked_ref();
        match IntersectionObserver::new_with_options(handler, &init) {
            Ok(observer) => {
                for target in &targets {
                    observer.observe(target);
                }
                callback.forget();
            }
            Err(err) => log_js_error("IntersectionObserver", err),
        }
    }
}

/// `window.localStorage`, when the browser grants it.
pub struct LocalStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStore {
    pub fn open(window: &Window) -> Self {
        let storage = window.local_storage().ok().flatten();
        if storage.is_none() {
            tracing::warn!("localStorage unavailable; theme will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage.as_ref().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|err| StorageError::Rejected(format!("{err:?}")))
    }
}

/// Config embedded in the page, or the stock defaults.
fn page_config(document: &web_sys::Document) -> InteractConfig {
    let Some(script) = document.get_element_by_id(CONFIG_SCRIPT_ID) else {
        return InteractConfig::default();
    };
    let json = script.text_content().unwrap_or_default();
    if json.trim().is_empty() {
        return InteractConfig::default();
    }
    config::from_json_str(&json).unwrap_or_else(|err| {
        tracing::warn!(%err, "ignoring invalid page config");
        InteractConfig::default()
    })
}

thread_local! {
    // Listeners hold weak handles; the mounted page lives here until unload.
    static PAGE: RefCell<Option<Portfolio<WebDocument, LocalStore>>> = const { RefCell::new(None) };
}

fn mount_page(doc: &WebDocument) {
    let config = page_config(&doc.document);
    let store = LocalStore::open(&doc.window);
    let page = Portfolio::mount(doc, store, &config, Rc::new(LogOutbox));
    PAGE.with(|slot| *slot.borrow_mut() = Some(page));
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let Some(doc) = WebDocument::new() else {
        return;
    };
    if doc.document.ready_state() != "loading" {
        mount_page(&doc);
        return;
    }
    let pending = doc.clone();
    let callback = Closure::once_into_js(move || mount_page(&pending));
    let document = &doc.document;
    let handler = callback.unchecked_ref();
    if let Err(err) = document.add_event_listener_with_callback("DOMContentLoaded", handler) {
        log_js_error("DOMContentLoaded", err);
    }
}
