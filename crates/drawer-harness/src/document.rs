#![forbid(unsafe_code)]

//! An in-memory element tree implementing [`Environment`].
//!
//! Elements form a tree rooted at the body. Detaching an element unlinks its
//! subtree, which stays addressable but reports `is_attached == false`, so
//! stale-id paths can be exercised. The clock only moves when told to.

use std::collections::{BTreeMap, HashMap};

use drawer_core::{Axis, ElementId, Environment, ListenerId, PointerId};
use web_time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    tabbable: bool,
    programmatic_focus: bool,
    width: f32,
    height: f32,
}

/// Fake document for drawer tests.
#[derive(Debug)]
pub struct FakeDocument {
    nodes: BTreeMap<ElementId, Node>,
    next_id: u64,
    body: ElementId,
    focused: Option<ElementId>,
    focus_history: Vec<ElementId>,
    now: Instant,
    selectors: HashMap<String, ElementId>,
    captures: HashMap<PointerId, ElementId>,
    listeners: Vec<ListenerId>,
}

impl Default for FakeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDocument {
    /// A document holding only a body.
    pub fn new() -> Self {
        let body = ElementId(1);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            body,
            Node {
                name: "body".into(),
                parent: None,
                children: Vec::new(),
                tabbable: false,
                programmatic_focus: false,
                width: 1280.0,
                height: 800.0,
            },
        );
        Self {
            nodes,
            next_id: 2,
            body,
            focused: None,
            focus_history: Vec::new(),
            now: Instant::now(),
            selectors: HashMap::new(),
            captures: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    fn insert(&mut self, parent: ElementId, name: &str, tabbable: bool) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                name: name.to_owned(),
                parent: Some(parent),
                children: Vec::new(),
                tabbable,
                programmatic_focus: false,
                width: 0.0,
                height: 0.0,
            },
        );
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }
        id
    }

    /// Append a non-focusable element.
    pub fn create(&mut self, parent: ElementId, name: &str) -> ElementId {
        self.insert(parent, name, false)
    }

    /// Append a tabbable element (a button, an input).
    pub fn create_focusable(&mut self, parent: ElementId, name: &str) -> ElementId {
        self.insert(parent, name, true)
    }

    /// Set an element's rendered size.
    pub fn set_size(&mut self, element: ElementId, width: f32, height: f32) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.width = width;
            node.height = height;
        }
    }

    /// Make `selector` resolve to `element`.
    pub fn register_selector(&mut self, selector: &str, element: ElementId) {
        self.selectors.insert(selector.to_owned(), element);
    }

    /// Unlink `element` (and its subtree) from the document.
    pub fn detach(&mut self, element: ElementId) {
        let Some(parent) = self.nodes.get_mut(&element).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|&child| child != element);
        }
        tracing::trace!(element = element.0, "element detached");
        if self.focused.is_some_and(|f| !self.is_attached(f)) {
            self.focused = None;
        }
    }

    /// Debug name of an element.
    pub fn name(&self, element: ElementId) -> Option<&str> {
        self.nodes.get(&element).map(|n| n.name.as_str())
    }

    /// Currently focused element.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Every element that received focus, in order.
    pub fn focus_history(&self) -> &[ElementId] {
        &self.focus_history
    }

    /// Whether `make_focusable` was applied to `element`.
    pub fn is_programmatically_focusable(&self, element: ElementId) -> bool {
        self.nodes
            .get(&element)
            .is_some_and(|n| n.programmatic_focus)
    }

    /// Element capturing `pointer`.
    pub fn capture_of(&self, pointer: PointerId) -> Option<ElementId> {
        self.captures.get(&pointer).copied()
    }

    /// Number of active pointer captures.
    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    /// Registered keydown listeners.
    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    /// Move the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    fn collect_tabbable(&self, element: ElementId, out: &mut Vec<ElementId>) {
        let Some(node) = self.nodes.get(&element) else {
            return;
        };
        for &child in &node.children {
            if self.nodes.get(&child).is_some_and(|n| n.tabbable) {
                out.push(child);
            }
            self.collect_tabbable(child, out);
        }
    }
}

impl Environment for FakeDocument {
    fn now(&self) -> Instant {
        self.now
    }

    fn active_element(&self) -> Option<ElementId> {
        self.focused
    }

    fn focus(&mut self, element: ElementId) -> bool {
        let focusable = element == self.body
            || self
                .nodes
                .get(&element)
                .is_some_and(|n| n.tabbable || n.programmatic_focus);
        if !focusable || !self.is_attached(element) {
            tracing::trace!(element = element.0, "focus refused");
            return false;
        }
        tracing::trace!(element = element.0, name = self.name(element), "focus moved");
        self.focused = Some(element);
        self.focus_history.push(element);
        true
    }

    fn is_attached(&self, element: ElementId) -> bool {
        let mut current = element;
        loop {
            if current == self.body {
                return true;
            }
            match self.nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if id == ancestor {
                return self.nodes.contains_key(&id);
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn focusable_descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if self.is_attached(root) {
            self.collect_tabbable(root, &mut out);
        }
        out
    }

    fn make_focusable(&mut self, element: ElementId) {
        if let Some(node) = self.nodes.get_mut(&element) {
            node.programmatic_focus = true;
        }
    }

    fn extent(&self, element: ElementId, axis: Axis) -> f32 {
        match self.nodes.get(&element) {
            Some(node) if self.is_attached(element) => match axis {
                Axis::Horizontal => node.width,
                Axis::Vertical => node.height,
            },
            _ => 0.0,
        }
    }

    fn set_pointer_capture(&mut self, element: ElementId, pointer: PointerId) {
        self.captures.insert(pointer, element);
    }

    fn release_pointer_capture(&mut self, element: ElementId, pointer: PointerId) {
        if self.captures.get(&pointer) == Some(&element) {
            self.captures.remove(&pointer);
        }
    }

    fn add_keydown_listener(&mut self, listener: ListenerId) {
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    fn remove_keydown_listener(&mut self, listener: ListenerId) {
        self.listeners.retain(|&l| l != listener);
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.selectors
            .get(selector)
            .copied()
            .filter(|&element| self.is_attached(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_queries() {
        let mut doc = FakeDocument::new();
        let body = doc.body();
        let panel = doc.create(body, "panel");
        let a = doc.create_focusable(panel, "a");
        let group = doc.create(panel, "group");
        let b = doc.create_focusable(group, "b");

        assert!(doc.contains(panel, b));
        assert!(doc.contains(panel, panel));
        assert!(!doc.contains(a, panel));
        assert_eq!(doc.focusable_descendants(panel), vec![a, b]);
        assert_eq!(doc.name(group), Some("group"));
    }

    #[test]
    fn focus_requires_focusability() {
        let mut doc = FakeDocument::new();
        let body = doc.body();
        let div = doc.create(body, "div");
        assert!(!doc.focus(div));
        doc.make_focusable(div);
        assert!(doc.focus(div));
        assert_eq!(doc.active_element(), Some(div));
        assert!(doc.focusable_descendants(body).is_empty());
    }

    #[test]
    fn detached_subtree() {
        let mut doc = FakeDocument::new();
        let body = doc.body();
        let panel = doc.create(body, "panel");
        let button = doc.create_focusable(panel, "button");
        doc.focus(button);
        doc.register_selector("#panel", panel);

        doc.detach(panel);
        assert!(!doc.is_attached(button));
        assert_eq!(doc.focused(), None);
        assert!(!doc.focus(button));
        assert_eq!(doc.query_selector("#panel"), None);
    }

    #[test]
    fn capture_and_listeners() {
        let mut doc = FakeDocument::new();
        let body = doc.body();
        doc.set_pointer_capture(body, PointerId(3));
        assert_eq!(doc.capture_of(PointerId(3)), Some(body));
        doc.release_pointer_capture(body, PointerId(3));
        assert_eq!(doc.capture_count(), 0);

        doc.add_keydown_listener(ListenerId(7));
        doc.add_keydown_listener(ListenerId(7));
        assert_eq!(doc.listeners(), &[ListenerId(7)]);
        doc.remove_keydown_listener(ListenerId(7));
        assert!(doc.listeners().is_empty());
    }

    #[test]
    fn clock_moves_only_when_advanced() {
        let mut doc = FakeDocument::new();
        let t0 = doc.now();
        assert_eq!(doc.now(), t0);
        doc.advance(Duration::from_millis(16));
        assert_eq!(doc.now() - t0, Duration::from_millis(16));
    }
}
