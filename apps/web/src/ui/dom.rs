//! In-memory document tree: the server-held stand-in for the browser DOM.
//!
//! A `Document` is an ordered list of mounted top-level elements. Each mount
//! gets a `NodeId` that stays valid until the node is removed; removal is
//! idempotent so timers and user dismissals can race freely.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use v_htmlescape::escape;

/// Tags serialised without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta"];

/// Upper bound on retained journal entries per document.
const JOURNAL_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        NodeId(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Element tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds one or more whitespace-separated classes.
    pub fn class(mut self, class: &str) -> Self {
        for c in class.split_whitespace() {
            if !self.has_class(c) {
                self.classes.push(c.to_string());
            }
        }
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr_value(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Concatenated text of this element and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| match c {
            Node::Element(el) => el.find_by_id_mut(id),
            Node::Text(_) => None,
        })
    }

    pub fn find_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| match c {
            Node::Element(el) => el.find_by_class_mut(class),
            Node::Text(_) => None,
        })
    }

    /// Number of elements in this subtree (self included) carrying `class`.
    pub fn count_class(&self, class: &str) -> usize {
        let own = usize::from(self.has_class(class));
        own + self
            .child_elements()
            .map(|c| c.count_class(class))
            .sum::<usize>()
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Serialises the subtree as HTML, escaping text and attribute values.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        f(self);
        for c in self.child_elements() {
            c.visit(f);
        }
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for c in &el.children {
        match c {
            Node::Text(t) => out.push_str(t),
            Node::Element(child) => collect_text(child, out),
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(el.tag);
    if let Some(id) = &el.id {
        out.push_str(" id=\"");
        escape_into(id, out);
        out.push('"');
    }
    if !el.classes.is_empty() {
        out.push_str(" class=\"");
        escape_into(&el.classes.join(" "), out);
        out.push('"');
    }
    for (k, v) in &el.attrs {
        out.push(' ');
        out.push_str(k);
        out.push_str("=\"");
        escape_into(v, out);
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&el.tag) {
        return;
    }

    for c in &el.children {
        match c {
            Node::Text(t) => escape_into(t, out),
            Node::Element(child) => write_element(child, out),
        }
    }
    out.push_str("</");
    out.push_str(el.tag);
    out.push('>');
}

fn escape_into(raw: &str, out: &mut String) {
    // Writing into a String cannot fail.
    let _ = write!(out, "{}", escape(raw));
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Mounted {
    id: NodeId,
    element: Element,
    created_at: DateTime<Utc>,
}

/// Journal entry. The label is the element's first class, or its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Inserted(NodeId, String),
    Updated(NodeId, String),
    Removed(NodeId, String),
}

#[derive(Debug, Default)]
pub struct Document {
    next_id: u64,
    nodes: Vec<Mounted>,
    journal: VecDeque<Mutation>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element at the end of the body. The builder receives the
    /// id the node will be mounted under so it can wire its own close control.
    pub fn mount(&mut self, build: impl FnOnce(NodeId) -> Element) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        let element = build(id);
        self.record(Mutation::Inserted(id, label_of(&element)));
        self.nodes.push(Mounted {
            id,
            element,
            created_at: Utc::now(),
        });
        id
    }

    pub fn append(&mut self, element: Element) -> NodeId {
        self.mount(|_| element)
    }

    /// Removes a mounted node. Returns `false` when it is already gone.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(pos) = self.nodes.iter().position(|m| m.id == id) else {
            return false;
        };
        let removed = self.nodes.remove(pos);
        self.record(Mutation::Removed(id, label_of(&removed.element)));
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|m| m.id == id)
    }

    /// Copies the node's mount time onto its root element as
    /// `data-created-at` (RFC 3339, millisecond precision).
    pub fn stamp_created_at(&mut self, id: NodeId) -> bool {
        let Some(mounted) = self.nodes.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        let stamp = mounted.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        mounted.element.set_attr("data-created-at", stamp);
        true
    }

    /// Swaps the element of a mounted node in place, keeping its id.
    pub fn replace(&mut self, id: NodeId, element: Element) -> bool {
        let Some(mounted) = self.nodes.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        let label = label_of(&element);
        mounted.element = element;
        self.record(Mutation::Updated(id, label));
        true
    }

    /// Top-level node whose root element carries the given DOM id.
    pub fn mounted_with_dom_id(&self, dom_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|m| m.element.id.as_deref() == Some(dom_id))
            .map(|m| m.id)
    }

    /// Equivalent of `getElementById` across every mounted tree.
    pub fn element_by_id(&self, dom_id: &str) -> Option<&Element> {
        self.nodes
            .iter()
            .find_map(|m| m.element.find_by_id(dom_id))
    }

    pub fn element_by_id_mut(&mut self, dom_id: &str) -> Option<&mut Element> {
        self.nodes
            .iter_mut()
            .find_map(|m| m.element.find_by_id_mut(dom_id))
    }

    pub fn first_by_class_mut(&mut self, class: &str) -> Option<&mut Element> {
        self.nodes
            .iter_mut()
            .find_map(|m| m.element.find_by_class_mut(class))
    }

    pub fn replace_children(&mut self, dom_id: &str, children: Vec<Node>) -> bool {
        match self.element_by_id_mut(dom_id) {
            Some(el) => {
                el.children = children;
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, dom_id: &str, text: impl Into<String>) -> bool {
        match self.element_by_id_mut(dom_id) {
            Some(el) => {
                el.set_text(text);
                true
            }
            None => false,
        }
    }

    pub fn set_attr(&mut self, dom_id: &str, key: &str, value: impl Into<String>) -> bool {
        match self.element_by_id_mut(dom_id) {
            Some(el) => {
                el.set_attr(key, value);
                true
            }
            None => false,
        }
    }

    pub fn count_class(&self, class: &str) -> usize {
        self.nodes.iter().map(|m| m.element.count_class(class)).sum()
    }

    /// `(dom id, attribute value)` for every element that has both an id and
    /// the given attribute.
    pub fn elements_with_attr(&self, key: &str) -> Vec<(String, String)> {
        let mut found = Vec::new();
        for m in &self.nodes {
            m.element.visit(&mut |el| {
                if let (Some(id), Some(v)) = (&el.id, el.attr_value(key)) {
                    found.push((id.clone(), v.to_string()));
                }
            });
        }
        found
    }

    pub fn journal(&self) -> impl Iterator<Item = &Mutation> {
        self.journal.iter()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<body>");
        for m in &self.nodes {
            write_element(&m.element, &mut out);
        }
        out.push_str("</body>");
        out
    }

    fn record(&mut self, mutation: Mutation) {
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(mutation);
    }
}

fn label_of(el: &Element) -> String {
    el.classes
        .first()
        .cloned()
        .unwrap_or_else(|| el.tag.to_string())
}

/// Shared handle to one session's document. The lock is never held across
/// an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument(Arc<Mutex<Document>>);

impl SharedDocument {
    pub fn new(doc: Document) -> Self {
        Self(Arc::new(Mutex::new(doc)))
    }

    pub fn lock(&self) -> MutexGuard<'_, Document> {
        // Document mutations cannot leave the tree half-written, so a
        // poisoned lock is still safe to read through.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.lock())
    }
}
