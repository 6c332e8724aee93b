//! In-memory [`Document`] with a virtual clock and viewport.
//!
//! The headless host runs every page behavior without a browser. It keeps a
//! small element tree, evaluates selectors with [`crate::selector`], computes
//! visibility from element layouts with [`crate::visibility`], and runs
//! timers, intervals and animation frames from one queue ordered by
//! `(due time, scheduling order)`. Time only moves when the caller advances it.
//!
//! ```text
//! let doc = HeadlessDocument::new();
//! let body = doc.body_id();
//! let counter = doc.append(body, "span.counter[data-target=50]")?;
//! let page = Portfolio::mount(&doc, MemoryStore::new(), &config, outbox);
//! doc.settle();          // deliver initial visibility
//! doc.advance(2_000);    // run two seconds of frames
//! doc.scroll_to(400.0);  // fire scroll listeners, re-check visibility
//! ```
//!
//! Layout is explicit: elements sit at `top = 0, height = 0` until
//! [`HeadlessDocument::set_layout`] places them, and span the viewport width.

use crate::dom::{
    Document, EventCtx, EventKind, Listener, RepeatingTask, Target, Task, Tick, VisibleCallback,
};
use crate::selector::{self, Matchable, SelectorError, SelectorList};
use crate::visibility::{ObserverOptions, Rect, TriggerSet, intersection_ratio};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Length of one animation frame on the virtual clock.
pub const FRAME_MS: u64 = 16;

/// Handle to an element of a [`HeadlessDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    style: BTreeMap<String, String>,
    value: String,
    default_value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    top: f64,
    height: f64,
}

impl Matchable for Node {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }
}

enum TimerTask {
    Once(Task<HeadlessDocument>),
    Repeat {
        period: u64,
        task: RepeatingTask<HeadlessDocument>,
    },
}

struct Timer {
    due: u64,
    seq: u64,
    task: TimerTask,
}

struct ListenerEntry {
    target: Target<NodeId>,
    kind: EventKind,
    listener: Option<Listener<HeadlessDocument>>,
}

struct ObserverEntry {
    triggers: TriggerSet<NodeId>,
    callback: Option<VisibleCallback<HeadlessDocument, NodeId>>,
}

struct State {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
    now: u64,
    seq: u64,
    timers: Vec<Timer>,
    listeners: Vec<ListenerEntry>,
    observers: Vec<ObserverEntry>,
}

impl State {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != child);
        }
    }

    fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Descendants of `scope` in document order, excluding `scope` itself.
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(scope).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn matching(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(list) = parse_selector(selector) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if scope == self.root && list.matches(self.node(scope)) {
            out.push(scope);
        }
        out.extend(
            self.descendants(scope)
                .into_iter()
                .filter(|id| list.matches(self.node(*id))),
        );
        out
    }

    fn text_content(&self, id: NodeId) -> String {
        let mut out = self.node(id).text.clone();
        for child in &self.node(id).children {
            out.push_str(&self.text_content(*child));
        }
        out
    }

    fn layout_rect(&self, id: NodeId) -> Rect {
        let node = self.node(id);
        Rect::new(0.0, node.top, self.viewport_width, node.height)
    }

    fn viewport_rect(&self) -> Rect {
        let (width, height) = (self.viewport_width, self.viewport_height);
        Rect::new(0.0, self.scroll_y, width, height)
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn schedule(&mut self, delay: u64, task: TimerTask) {
        let seq = self.next_seq();
        let due = self.now + delay;
        self.timers.push(Timer { due, seq, task });
    }
}

fn parse_selector(selector: &str) -> Option<SelectorList> {
    match selector::parse(selector) {
        Ok(list) => Some(list),
        Err(err) => {
            tracing::warn!(%err, "ignoring unsupported selector");
            None
        }
    }
}

fn is_form_control(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select")
}

/// In-memory document. Clones share the same tree, clock and listeners.
#[derive(Clone)]
pub struct HeadlessDocument {
    state: Rc<RefCell<State>>,
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDocument {
    /// Empty `<html><body></body></html>` with a 1280×800 viewport at the top.
    pub fn new() -> Self {
        Self::with_viewport(1280.0, 800.0)
    }

    pub fn with_viewport(width: f64, height: f64) -> Self {
        let mut state = State {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            viewport_width: width,
            viewport_height: height,
            scroll_y: 0.0,
            now: 0,
            seq: 0,
            timers: Vec::new(),
            listeners: Vec::new(),
            observers: Vec::new(),
        };
        let root = state.push_node(Node {
            tag: "html".to_string(),
            ..Node::default()
        });
        let body = state.push_node(Node {
            tag: "body".to_string(),
            ..Node::default()
        });
        state.attach(root, body);
        state.root = root;
        state.body = body;
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn body_id(&self) -> NodeId {
        self.state.borrow().body
    }

    // -------------------------------------------------------------------------
    // Building
    // -------------------------------------------------------------------------

    /// Append a new element described by a compound selector, e.g.
    /// `input#email[type=email][required][name=email]`. Attribute presence
    /// tests become empty attributes; a `value` attribute also becomes the
    /// control's initial value.
    pub fn append(&self, parent: NodeId, description: &str) -> Result<NodeId, SelectorError> {
        let compound = selector::parse_compound_selector(description)?;
        let mut node = Node {
            tag: compound.tag.unwrap_or_else(|| "div".to_string()),
            ..Node::default()
        };
        if let Some(id) = compound.id {
            node.attrs.insert("id".to_string(), id);
        }
        if !compound.classes.is_empty() {
            node.attrs
                .insert("class".to_string(), compound.classes.join(" "));
        }
        for attr in compound.attrs {
            let value = match attr.op {
                selector::AttrOp::Exists => String::new(),
                selector::AttrOp::Equals(v)
                | selector::AttrOp::Prefix(v)
                | selector::AttrOp::Suffix(v)
                | selector::AttrOp::Contains(v) => v,
            };
            node.attrs.insert(attr.name, value);
        }
        if let Some(initial) = node.attrs.get("value") {
            node.value = initial.clone();
            node.default_value = initial.clone();
        }
        let mut state = self.state.borrow_mut();
        let id = state.push_node(node);
        state.attach(parent, id);
        Ok(id)
    }

    /// Append an element and set its text content.
    pub fn append_text(
        &self,
        parent: NodeId,
        description: &str,
        text: &str,
    ) -> Result<NodeId, SelectorError> {
        let id = self.append(parent, description)?;
        self.state.borrow_mut().node_mut(id).text = text.to_string();
        Ok(id)
    }

    /// Place an element vertically in the document.
    pub fn set_layout(&self, id: NodeId, top: f64, height: f64) {
        let mut state = self.state.borrow_mut();
        let node = state.node_mut(id);
        node.top = top;
        node.height = height;
    }

    /// Simulate the user typing into a control.
    pub fn set_value(&self, id: NodeId, value: &str) {
        self.state.borrow_mut().node_mut(id).value = value.to_string();
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.state
            .borrow()
            .node(id)
            .attrs
            .get("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.state.borrow().is_attached(id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.state.borrow().node(id).children.clone()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    /// Timers, intervals and frames still queued.
    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Elements still watched by any visibility observer.
    pub fn observed(&self) -> usize {
        self.state
            .borrow()
            .observers
            .iter()
            .map(|o| o.triggers.len())
            .sum()
    }

    // -------------------------------------------------------------------------
    // Driving
    // -------------------------------------------------------------------------

    /// Deliver pending visibility changes without moving the clock.
    pub fn settle(&self) {
        self.advance(0);
    }

    /// Move the clock forward, running every task that falls due in order.
    pub fn advance(&self, ms: u64) {
        self.flush_visibility();
        let target = self.state.borrow().now + ms;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.seq))
                    .map(|(idx, _)| idx);
                due.map(|idx| {
                    let timer = state.timers.remove(idx);
                    state.now = timer.due;
                    timer.task
                })
            };
            let Some(task) = next else { break };
            match task {
                TimerTask::Once(task) => task(self),
                TimerTask::Repeat { period, mut task } => {
                    if task(self) == Tick::Continue {
                        self.state
                            .borrow_mut()
                            .schedule(period, TimerTask::Repeat { period, task });
                    }
                }
            }
            self.flush_visibility();
        }
        self.state.borrow_mut().now = target;
        self.flush_visibility();
    }

    /// Set the window scroll offset, fire scroll listeners and re-check
    /// visibility.
    pub fn scroll_to(&self, y: f64) {
        self.state.borrow_mut().scroll_y = y.max(0.0);
        self.dispatch(Target::Window, EventKind::Scroll);
        self.flush_visibility();
    }

    pub fn click(&self, id: NodeId) -> EventCtx {
        self.dispatch(Target::Element(id), EventKind::Click)
    }

    pub fn blur(&self, id: NodeId) -> EventCtx {
        self.dispatch(Target::Element(id), EventKind::Blur)
    }

    pub fn submit(&self, form: NodeId) -> EventCtx {
        self.dispatch(Target::Element(form), EventKind::Submit)
    }

    /// Run every listener registered for `kind` on `target`, in registration
    /// order.
    pub fn dispatch(&self, target: Target<NodeId>, kind: EventKind) -> EventCtx {
        let mut ctx = EventCtx::new();
        let count = self.state.borrow().listeners.len();
        for idx in 0..count {
            let taken = {
                let mut state = self.state.borrow_mut();
                let entry = &mut state.listeners[idx];
                if entry.kind == kind && entry.target == target {
                    entry.listener.take()
                } else {
                    None
                }
            };
            if let Some(mut listener) = taken {
                listener(self, &mut ctx);
                self.state.borrow_mut().listeners[idx].listener = Some(listener);
            }
        }
        ctx
    }

    fn flush_visibility(&self) {
        let count = self.state.borrow().observers.len();
        for idx in 0..count {
            let fired: Vec<NodeId> = {
                let mut guard = self.state.borrow_mut();
                let state = &mut *guard;
                let root = state.viewport_rect();
                let entry = &mut state.observers[idx];
                let margin = entry.triggers.options().root_margin;
                let candidates = entry.triggers.armed().to_vec();
                let mut fired = Vec::new();
                for id in candidates {
                    let attached = {
                        let mut current = id;
                        loop {
                            if current == state.root {
                                break true;
                            }
                            match state.nodes[current.0].parent {
                                Some(parent) => current = parent,
                                None => break false,
                            }
                        }
                    };
                    if !attached {
                        continue;
                    }
                    let node = &state.nodes[id.0];
                    let rect = Rect::new(0.0, node.top, state.viewport_width, node.height);
                    let (ratio, intersecting) = intersection_ratio(rect, root, &margin);
                    if entry.triggers.fire(&id, ratio, intersecting) {
                        fired.push(id);
                    }
                }
                fired
            };
            if fired.is_empty() {
                continue;
            }
            let callback = self.state.borrow_mut().observers[idx].callback.take();
            if let Some(mut callback) = callback {
                for id in &fired {
                    callback(self, id);
                }
                self.state.borrow_mut().observers[idx].callback = Some(callback);
            }
        }
    }
}

impl Document for HeadlessDocument {
    type Element = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let state = self.state.borrow();
        state.matching(state.root, selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Vec<NodeId> {
        let state = self.state.borrow();
        let Some(list) = parse_selector(selector) else {
            return Vec::new();
        };
        state
            .descendants(*scope)
            .into_iter()
            .filter(|id| list.matches(state.node(*id)))
            .collect()
    }

    fn root(&self) -> NodeId {
        self.state.borrow().root
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.state.borrow().body)
    }

    fn next_sibling(&self, element: &NodeId) -> Option<NodeId> {
        let state = self.state.borrow();
        let parent = state.node(*element).parent?;
        let siblings = &state.node(parent).children;
        let pos = siblings.iter().position(|c| c == element)?;
        siblings.get(pos + 1).copied()
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.state.borrow().node(*element).attrs.get(name).cloned()
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .node_mut(*element)
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.state.borrow().node(*element).has_class(class)
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        if self.has_class(element, class) {
            return;
        }
        let mut state = self.state.borrow_mut();
        let classes = state
            .node_mut(*element)
            .attrs
            .entry("class".to_string())
            .or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(classes) = state.node_mut(*element).attrs.get_mut("class") {
            *classes = classes
                .split_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
        }
    }

    fn text(&self, element: &NodeId) -> String {
        self.state.borrow().text_content(*element)
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        let mut state = self.state.borrow_mut();
        for child in state.node(*element).children.clone() {
            state.detach(child);
        }
        state.node_mut(*element).text = text.to_string();
    }

    fn style(&self, element: &NodeId, property: &str) -> Option<String> {
        let state = self.state.borrow();
        state.node(*element).style.get(property).cloned()
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        self.state
            .borrow_mut()
            .node_mut(*element)
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn value(&self, element: &NodeId) -> String {
        let state = self.state.borrow();
        let node = state.node(*element);
        if is_form_control(&node.tag) {
            node.value.clone()
        } else {
            String::new()
        }
    }

    fn input_type(&self, element: &NodeId) -> String {
        let state = self.state.borrow();
        let node = state.node(*element);
        if node.tag == "input" {
            node.attrs
                .get("type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string())
        } else {
            node.tag.clone()
        }
    }

    fn reset_form(&self, form: &NodeId) {
        let mut state = self.state.borrow_mut();
        for id in state.descendants(*form) {
            let node = state.node_mut(id);
            if is_form_control(&node.tag) {
                node.value = node.default_value.clone();
            }
        }
    }

    fn create_element(&self, tag: &str) -> Option<NodeId> {
        let node = Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        };
        Some(self.state.borrow_mut().push_node(node))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.state.borrow_mut().attach(*parent, *child);
    }

    fn remove(&self, element: &NodeId) {
        self.state.borrow_mut().detach(*element);
    }

    fn offset_top(&self, element: &NodeId) -> f64 {
        self.state.borrow().layout_rect(*element).y
    }

    fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    fn scroll_to_top(&self) {
        self.scroll_to(0.0);
    }

    fn scroll_into_view(&self, element: &NodeId) {
        let top = self.offset_top(element);
        self.scroll_to(top);
    }

    fn set_timeout(&self, delay_ms: u32, task: Task<Self>) {
        self.state
            .borrow_mut()
            .schedule(u64::from(delay_ms), TimerTask::Once(task));
    }

    fn set_interval(&self, period_ms: u32, task: RepeatingTask<Self>) {
        let period = u64::from(period_ms.max(1));
        self.state
            .borrow_mut()
            .schedule(period, TimerTask::Repeat { period, task });
    }

    fn request_frame(&self, task: Task<Self>) {
        self.state
            .borrow_mut()
            .schedule(FRAME_MS, TimerTask::Once(task));
    }

    fn listen(&self, target: Target<NodeId>, kind: EventKind, listener: Listener<Self>) {
        self.state.borrow_mut().listeners.push(ListenerEntry {
            target,
            kind,
            listener: Some(listener),
        });
    }

    fn observe_visibility(
        &self,
        options: &ObserverOptions,
        targets: Vec<NodeId>,
        on_visible: VisibleCallback<Self, NodeId>,
    ) {
        let mut triggers = TriggerSet::new(*options);
        for target in targets {
            triggers.arm(target);
        }
        self.state.borrow_mut().observers.push(ObserverEntry {
            triggers,
            callback: Some(on_visible),
        });
    }
}
