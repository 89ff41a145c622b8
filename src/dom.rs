//! In-memory document model
//!
//! A small DOM: elements live in an arena keyed by [`NodeId`], carry classes,
//! attributes, inline styles and children, and can have event listeners
//! attached. The titlebar only ever talks to the document through this module,
//! so a host can mirror the tree into a real webview or native widgets.
//!
//! Listeners are invoked without any borrow of the document held, which means a
//! listener is free to mutate the tree, register new listeners or dispose
//! existing ones (including itself).

use serde::Serialize;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::lifecycle::Disposable;

new_key_type! {
    /// Handle to an element in a [`Document`]
    pub struct NodeId;

    /// Handle to a registered event listener
    pub struct ListenerId;
}

/// Shared, single-threaded handle to a document
pub type Dom = Rc<RefCell<Document>>;

/// Event kinds the titlebar listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseOut,
    MouseOver,
    KeyDown,
}

/// Keys relevant to menu navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Space,
    Escape,
    Tab,
    Alt,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

/// An input event travelling through the tree
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub kind: EventType,
    /// Mouse button index, 0 is the primary button
    pub button: u16,
    pub key: Option<Key>,
    pub alt_key: bool,
    pub shift_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub target: Option<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn new(kind: EventType) -> Self {
        Self {
            kind,
            button: 0,
            key: None,
            alt_key: false,
            shift_key: false,
            ctrl_key: false,
            meta_key: false,
            target: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Mouse event with the given button
    pub fn mouse(kind: EventType, button: u16) -> Self {
        Self {
            button,
            ..Self::new(kind)
        }
    }

    /// Primary-button click
    pub fn click() -> Self {
        Self::mouse(EventType::Click, 0)
    }

    pub fn key_down(key: Key) -> Self {
        Self {
            key: Some(key),
            ..Self::new(EventType::KeyDown)
        }
    }

    pub fn with_alt(mut self) -> Self {
        self.alt_key = true;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Prevent the default action, and stop bubbling when `cancel_bubble` is set
    pub fn stop(&mut self, cancel_bubble: bool) {
        self.prevent_default();
        if cancel_bubble {
            self.stop_propagation();
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// A single element
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub text: String,
    pub inner_html: Option<String>,
    pub tab_index: Option<i32>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Serializable view of a subtree, used for debugging and comparisons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

type Callback = Rc<RefCell<dyn FnMut(&mut DomEvent)>>;

struct ListenerEntry {
    node: NodeId,
    kind: EventType,
    seq: u64,
    callback: Callback,
}

/// The document: element arena, listener table, title and focus
pub struct Document {
    nodes: SlotMap<NodeId, Element>,
    listeners: SlotMap<ListenerId, ListenerEntry>,
    next_seq: u64,
    body: NodeId,
    title: String,
    active_element: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(Element {
            tag: "body".to_string(),
            ..Default::default()
        });
        Self {
            nodes,
            listeners: SlotMap::with_key(),
            next_seq: 0,
            body,
            title: String::new(),
            active_element: None,
        }
    }

    /// Create a document behind a shared handle
    pub fn shared() -> Dom {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Create a detached element from a `tag.class1.class2` selector
    pub fn create_element(&mut self, selector: &str) -> NodeId {
        let mut parts = selector.split('.');
        let tag = match parts.next() {
            Some(tag) if !tag.is_empty() => tag.to_string(),
            _ => "div".to_string(),
        };
        let classes = parts
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        self.nodes.insert(Element {
            tag,
            classes,
            ..Default::default()
        })
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Append `child` to `parent`, detaching it from its previous parent first
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Insert `child` as the first child of `parent`
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.insert(0, child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Create an element from `selector` and append it to `parent`
    pub fn append_new(&mut self, parent: NodeId, selector: &str) -> NodeId {
        let node = self.create_element(selector);
        self.append(parent, node);
        node
    }

    /// Detach a node from the tree. The node stays valid and can be re-attached.
    pub fn remove_node(&mut self, node: NodeId) {
        self.detach(node);
        if let Some(active) = self.active_element {
            if active == node || self.is_ancestor(node, active) {
                self.active_element = None;
            }
        }
    }

    /// Detach a node and free it together with its subtree and their listeners
    pub fn destroy_node(&mut self, node: NodeId) {
        if node == self.body || !self.contains(node) {
            return;
        }
        self.remove_node(node);
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(el) = self.nodes.remove(current) {
                stack.extend(el.children);
            }
        }
        let nodes = &self.nodes;
        self.listeners.retain(|_, l| nodes.contains_key(l.node));
    }

    /// Number of live elements, the body included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        self.contains(parent)
            && self.contains(child)
            && parent != child
            && !self.is_ancestor(child, parent)
    }

    fn detach(&mut self, node: NodeId) {
        let parent = match self.nodes.get_mut(node) {
            Some(el) => el.parent.take(),
            None => return,
        };
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.retain(|c| *c != node);
        }
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Whether the node is connected to the body
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.body || self.is_ancestor(self.body, node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|el| el.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|el| el.children.first().copied())
    }

    /// Destroy every child of `node`
    pub fn clear_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.destroy_node(child);
        }
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    /// Add the class when `on` is set, remove it otherwise
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.attributes.remove(name);
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.style.remove(property);
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|el| el.style.get(property))
            .map(String::as_str)
    }

    /// `display: none`
    pub fn hide(&mut self, node: NodeId) {
        self.set_style(node, "display", "none");
    }

    pub fn show(&mut self, node: NodeId) {
        self.remove_style(node, "display");
    }

    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node, "display") == Some("none")
    }

    /// Replace the content of a node with plain text
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.clear_children(node);
        if let Some(el) = self.nodes.get_mut(node) {
            el.text = text.to_string();
            el.inner_html = None;
        }
    }

    pub fn text(&self, node: NodeId) -> &str {
        self.nodes.get(node).map(|el| el.text.as_str()).unwrap_or("")
    }

    /// Replace the content of a node with markup
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.clear_children(node);
        if let Some(el) = self.nodes.get_mut(node) {
            el.text.clear();
            el.inner_html = Some(html.to_string());
        }
    }

    pub fn inner_html(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).and_then(|el| el.inner_html.as_deref())
    }

    pub fn set_tab_index(&mut self, node: NodeId, index: Option<i32>) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.tab_index = index;
        }
    }

    pub fn tab_index(&self, node: NodeId) -> Option<i32> {
        self.nodes.get(node).and_then(|el| el.tab_index)
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.contains(node) {
            self.active_element = Some(node);
        }
    }

    pub fn blur(&mut self, node: NodeId) {
        if self.active_element == Some(node) {
            self.active_element = None;
        }
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// First descendant of `root` (depth first, document order) carrying `class`
    pub fn query_selector(&self, root: NodeId, class: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.has_class(node, class) {
                return Some(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        None
    }

    /// Every descendant of `root` carrying `class`, in document order
    pub fn query_selector_all(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            if self.has_class(node, class) {
                found.push(node);
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        found
    }

    /// Serializable copy of the subtree rooted at `node`
    pub fn snapshot(&self, node: NodeId) -> Option<NodeSnapshot> {
        let el = self.nodes.get(node)?;
        Some(NodeSnapshot {
            tag: el.tag.clone(),
            classes: el.classes.clone(),
            attributes: el.attributes.clone(),
            style: el.style.clone(),
            text: el.text.clone(),
            inner_html: el.inner_html.clone(),
            children: el
                .children
                .iter()
                .filter_map(|c| self.snapshot(*c))
                .collect(),
        })
    }

    /// Number of live listeners, optionally restricted to one node
    pub fn listener_count(&self, node: Option<NodeId>) -> usize {
        self.listeners
            .values()
            .filter(|l| node.map_or(true, |n| l.node == n))
            .count()
    }

    fn insert_listener(&mut self, node: NodeId, kind: EventType, callback: Callback) -> ListenerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.listeners.insert(ListenerEntry {
            node,
            kind,
            seq,
            callback,
        })
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    fn listeners_for(&self, node: NodeId, kind: EventType) -> Vec<(ListenerId, Callback)> {
        let mut found: Vec<(u64, ListenerId, Callback)> = self
            .listeners
            .iter()
            .filter(|(_, l)| l.node == node && l.kind == kind)
            .map(|(id, l)| (l.seq, id, l.callback.clone()))
            .collect();
        found.sort_by_key(|(seq, _, _)| *seq);
        found.into_iter().map(|(_, id, cb)| (id, cb)).collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener registration that unregisters itself on dispose or drop
pub struct ListenerGuard {
    dom: Weak<RefCell<Document>>,
    id: Option<ListenerId>,
}

impl ListenerGuard {
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }
}

impl Disposable for ListenerGuard {
    fn dispose(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(dom) = self.dom.upgrade() {
            if let Ok(mut doc) = dom.try_borrow_mut() {
                doc.remove_listener(id);
            } else {
                log::warn!("Document busy while removing listener {:?}", id);
            }
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Register `callback` for `kind` events reaching `node`
pub fn add_disposable_listener(
    dom: &Dom,
    node: NodeId,
    kind: EventType,
    callback: impl FnMut(&mut DomEvent) + 'static,
) -> ListenerGuard {
    let callback: Callback = Rc::new(RefCell::new(callback));
    let id = dom.borrow_mut().insert_listener(node, kind, callback);
    ListenerGuard {
        dom: Rc::downgrade(dom),
        id: Some(id),
    }
}

/// Deliver an event to `target` and bubble it up to the root
///
/// Returns the event so callers can inspect whether it was stopped.
pub fn dispatch_event(dom: &Dom, target: NodeId, mut event: DomEvent) -> DomEvent {
    event.target = Some(target);

    let path: Vec<NodeId> = {
        let doc = dom.borrow();
        if !doc.contains(target) {
            return event;
        }
        let mut path = vec![target];
        let mut current = doc.parent(target);
        while let Some(p) = current {
            path.push(p);
            current = doc.parent(p);
        }
        path
    };

    for node in path {
        let listeners = dom.borrow().listeners_for(node, event.kind);
        for (id, callback) in listeners {
            if !dom.borrow().listeners.contains_key(id) {
                continue;
            }
            // A listener re-dispatching onto itself is skipped rather than re-entered
            let Ok(mut f) = callback.try_borrow_mut() else {
                continue;
            };
            (&mut *f)(&mut event);
        }
        if event.is_propagation_stopped() {
            break;
        }
    }

    event
}
