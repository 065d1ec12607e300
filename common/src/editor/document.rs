//! The Editable Document: the in-memory tree of one editing session.
//!
//! Elements are addressed by [`NodeId`], assigned in document order when the
//! document is parsed and for every element inserted afterwards. Ids are
//! never reused within a session, so a command or undo entry that refers to a
//! removed element still resolves to the same (detached) node.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, Attribute, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};
use serde::{Deserialize, Serialize};

use crate::editor::error::{EditorError, EditorResult};

/// Attribute carrying an element's [`NodeId`] inside the sandbox frame.
pub const NODE_ATTR: &str = "data-pe-node";
/// Marks elements injected by the editor (style block, context menu).
pub const EDITOR_ATTR: &str = "data-pe-editor";
/// Set on the root element once the injector has run.
pub const INITIALIZED_ATTR: &str = "data-pe-initialized";
pub const EDITABLE_ATTR: &str = "contenteditable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = EditorError;

    /// Parses the value of a `data-pe-node` attribute.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map(NodeId)
            .map_err(|_| EditorError::InvalidNodeId(s.to_string()))
    }
}

pub struct EditableDocument {
    dom: RcDom,
    nodes: Vec<Handle>,
    ids: HashMap<usize, NodeId>,
}

impl EditableDocument {
    /// Parses a complete HTML document. Parsing is lenient: malformed markup
    /// is repaired the way a browser would.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        let mut doc = EditableDocument {
            dom,
            nodes: Vec::new(),
            ids: HashMap::new(),
        };
        let document = doc.dom.document.clone();
        doc.register_subtree(&document);
        doc
    }

    /// The document node (parent of the doctype and the root element).
    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    /// Number of ids handed out so far, including detached elements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn handle(&self, id: NodeId) -> EditorResult<&Handle> {
        self.nodes.get(id.0).ok_or(EditorError::UnknownNode(id))
    }

    pub fn id_of(&self, handle: &Handle) -> Option<NodeId> {
        self.ids.get(&key(handle)).copied()
    }

    /// The `<html>` element.
    pub fn root(&self) -> Option<NodeId> {
        self.dom
            .document
            .children
            .borrow()
            .iter()
            .find(|c| element_name(c).is_some())
            .and_then(|h| self.id_of(h))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.root_child("head")
    }

    /// The content wrapper (`<body>`).
    pub fn body(&self) -> Option<NodeId> {
        self.root_child("body")
    }

    fn root_child(&self, tag: &str) -> Option<NodeId> {
        let root = self.root()?;
        self.element_children(root)
            .into_iter()
            .find(|id| self.tag(*id) == Some(tag))
    }

    /// True for the root element, `<head>` and the content wrapper: removing
    /// any of them would destroy the page.
    pub fn is_structural(&self, id: NodeId) -> bool {
        Some(id) == self.root() || Some(id) == self.head() || Some(id) == self.body()
    }

    /// Lower-case local name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).and_then(|h| element_name(h))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        let handle = self.nodes.get(id.0)?;
        match &handle.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| &*a.name.local == name)
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Sets an attribute and returns its previous value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> EditorResult<Option<String>> {
        let handle = self.handle(id)?;
        match &handle.data {
            NodeData::Element { attrs, .. } => {
                let mut attrs = attrs.borrow_mut();
                if let Some(existing) = attrs.iter_mut().find(|a| &*a.name.local == name) {
                    let previous = existing.value.to_string();
                    existing.value = StrTendril::from(value);
                    Ok(Some(previous))
                } else {
                    attrs.push(Attribute {
                        name: attr_name(name),
                        value: StrTendril::from(value),
                    });
                    Ok(None)
                }
            }
            _ => Err(EditorError::UnknownNode(id)),
        }
    }

    /// Removes an attribute and returns its previous value.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> EditorResult<Option<String>> {
        let handle = self.handle(id)?;
        match &handle.data {
            NodeData::Element { attrs, .. } => {
                let mut attrs = attrs.borrow_mut();
                let position = attrs.iter().position(|a| &*a.name.local == name);
                Ok(position.map(|pos| attrs.remove(pos).value.to_string()))
            }
            _ => Err(EditorError::UnknownNode(id)),
        }
    }

    /// Restores an attribute to a value captured by `set_attr`/`remove_attr`.
    pub fn restore_attr(&mut self, id: NodeId, name: &str, value: Option<&str>) -> EditorResult<()> {
        match value {
            Some(v) => self.set_attr(id, name, v).map(|_| ()),
            None => self.remove_attr(id, name).map(|_| ()),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let handle = self.nodes.get(id.0)?;
        parent_of(handle).and_then(|p| self.id_of(&p))
    }

    /// The element itself or its nearest ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.tag(node) == Some(tag) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Whether the element or any ancestor was injected by the editor.
    pub fn is_editor_owned(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.has_attr(node, EDITOR_ATTR) {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        match self.nodes.get(id.0) {
            Some(handle) => handle
                .children
                .borrow()
                .iter()
                .filter_map(|c| self.id_of(c))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Whether the element holds anything besides text and `<br>` line
    /// breaks.
    pub fn has_markup_children(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|h| {
            h.children
                .borrow()
                .iter()
                .any(|c| element_name(c).is_some_and(|tag| tag != "br"))
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(handle) = self.nodes.get(id.0) {
            collect_text(handle, &mut out);
        }
        out
    }

    /// Text as the user sees it in an editable element: `<br>` reads as
    /// `\n`.
    pub fn text_with_breaks(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(handle) = self.nodes.get(id.0) {
            for child in handle.children.borrow().iter() {
                collect_text_with_breaks(child, &mut out);
            }
        }
        out
    }

    /// Replaces the element's children with `text`, one `<br>` per line
    /// break, and returns the removed children.
    pub fn replace_children_with_text(&mut self, id: NodeId, text: &str) -> EditorResult<Vec<Handle>> {
        let handle = self.handle(id)?.clone();
        let previous = std::mem::take(&mut *handle.children.borrow_mut());
        for child in &previous {
            child.parent.set(None);
        }
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.append_markup(id, "<br>")?;
            }
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                let text_node = Node::new(NodeData::Text {
                    contents: RefCell::new(StrTendril::from(line)),
                });
                text_node.parent.set(Some(Rc::downgrade(&handle)));
                handle.children.borrow_mut().push(text_node);
            }
        }
        Ok(previous)
    }

    /// Puts back children captured by `replace_children_with_text`.
    pub fn restore_children(&mut self, id: NodeId, children: Vec<Handle>) -> EditorResult<()> {
        let handle = self.handle(id)?.clone();
        for child in &children {
            child.parent.set(Some(Rc::downgrade(&handle)));
        }
        let replaced = std::mem::replace(&mut *handle.children.borrow_mut(), children);
        for child in &replaced {
            child.parent.set(None);
        }
        Ok(())
    }

    /// Whether the element is still reachable from the document node.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let Some(handle) = self.nodes.get(id.0) else {
            return false;
        };
        let mut current = handle.clone();
        loop {
            if Rc::ptr_eq(&current, &self.dom.document) {
                return true;
            }
            match parent_of(&current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Detaches an element (and its subtree) from its parent. Returns the
    /// parent and the child index it occupied.
    pub fn detach(&mut self, id: NodeId) -> EditorResult<(NodeId, usize)> {
        let handle = self.handle(id)?.clone();
        let parent = parent_of(&handle).ok_or(EditorError::UnknownNode(id))?;
        let parent_id = self.id_of(&parent).ok_or(EditorError::UnknownNode(id))?;
        let mut children = parent.children.borrow_mut();
        let index = children
            .iter()
            .position(|c| Rc::ptr_eq(c, &handle))
            .ok_or(EditorError::UnknownNode(id))?;
        children.remove(index);
        handle.parent.set(None);
        Ok((parent_id, index))
    }

    /// Inserts a detached element under `parent` at `index` (clamped).
    pub fn insert_at(&mut self, parent: NodeId, index: usize, id: NodeId) -> EditorResult<()> {
        let parent_handle = self.handle(parent)?.clone();
        let handle = self.handle(id)?.clone();
        handle.parent.set(Some(Rc::downgrade(&parent_handle)));
        let mut children = parent_handle.children.borrow_mut();
        let index = index.min(children.len());
        children.insert(index, handle);
        Ok(())
    }

    /// Parses a markup fragment, appends the resulting nodes to `parent` and
    /// registers every new element. Returns the ids of the top-level
    /// elements appended.
    pub fn append_markup(&mut self, parent: NodeId, markup: &str) -> EditorResult<Vec<NodeId>> {
        let parent_handle = self.handle(parent)?.clone();
        let scratch = parse_document(RcDom::default(), ParseOpts::default())
            .one(format!("<!DOCTYPE html><html><head></head><body>{markup}</body></html>"));
        let Some(scratch_body) = find_element(&scratch.document, "body") else {
            return Ok(Vec::new());
        };
        let fragment: Vec<Handle> = std::mem::take(&mut *scratch_body.children.borrow_mut());
        let mut appended = Vec::new();
        for node in fragment {
            node.parent.set(Some(Rc::downgrade(&parent_handle)));
            parent_handle.children.borrow_mut().push(node.clone());
            self.register_subtree(&node);
            if let Some(id) = self.id_of(&node) {
                appended.push(id);
            }
        }
        Ok(appended)
    }

    /// Attached elements in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(&self.dom.document, &mut out);
        out
    }

    fn walk(&self, handle: &Handle, out: &mut Vec<NodeId>) {
        for child in handle.children.borrow().iter() {
            if let Some(id) = self.id_of(child) {
                out.push(id);
            }
            self.walk(child, out);
        }
    }

    fn register_subtree(&mut self, handle: &Handle) {
        if element_name(handle).is_some() && !self.ids.contains_key(&key(handle)) {
            let id = NodeId(self.nodes.len());
            self.nodes.push(handle.clone());
            self.ids.insert(key(handle), id);
        }
        let children: Vec<Handle> = handle.children.borrow().clone();
        for child in &children {
            self.register_subtree(child);
        }
    }
}

fn key(handle: &Handle) -> usize {
    Rc::as_ptr(handle) as usize
}

pub(crate) fn element_name(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub(crate) fn parent_of(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    handle.parent.set(weak);
    parent
}

fn attr_name(name: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(name))
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn collect_text_with_breaks(handle: &Handle, out: &mut String) {
    match &handle.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } if &*name.local == "br" => out.push('\n'),
        _ => {
            for child in handle.children.borrow().iter() {
                collect_text_with_breaks(child, out);
            }
        }
    }
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if element_name(handle) == Some(tag) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|c| find_element(c, tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html><html><head><title>T</title></head>
<body><main id="m"><h1>Hi</h1><p class="x">one <b>two</b></p><a href="/a"><img src="a.png"></a></main></body></html>"#;

    fn find(doc: &EditableDocument, tag: &str) -> NodeId {
        doc.elements()
            .into_iter()
            .find(|id| doc.tag(*id) == Some(tag))
            .unwrap()
    }

    #[test]
    fn parses_structure() {
        let doc = EditableDocument::parse(PAGE);
        let root = doc.root().unwrap();
        assert_eq!(doc.tag(root), Some("html"));
        assert_eq!(doc.tag(doc.body().unwrap()), Some("body"));
        assert_eq!(doc.tag(doc.head().unwrap()), Some("head"));
        let p = find(&doc, "p");
        assert_eq!(doc.text_content(p), "one two");
        assert!(doc.has_markup_children(p));
        assert_eq!(doc.attr(p, "class").as_deref(), Some("x"));
    }

    #[test]
    fn closest_walks_ancestors() {
        let doc = EditableDocument::parse(PAGE);
        let img = find(&doc, "img");
        let a = find(&doc, "a");
        assert_eq!(doc.closest(img, "a"), Some(a));
        assert_eq!(doc.closest(img, "img"), Some(img));
        assert_eq!(doc.closest(img, "section"), None);
    }

    #[test]
    fn detach_and_reinsert() {
        let mut doc = EditableDocument::parse(PAGE);
        let p = find(&doc, "p");
        let (parent, index) = doc.detach(p).unwrap();
        assert!(!doc.is_attached(p));
        assert!(!doc.elements().contains(&p));
        doc.insert_at(parent, index, p).unwrap();
        assert!(doc.is_attached(p));
        assert_eq!(doc.parent(p), Some(find(&doc, "main")));
    }

    #[test]
    fn attributes_round_trip() {
        let mut doc = EditableDocument::parse(PAGE);
        let img = find(&doc, "img");
        assert_eq!(doc.set_attr(img, "src", "b.png").unwrap().as_deref(), Some("a.png"));
        assert_eq!(doc.set_attr(img, "alt", "x").unwrap(), None);
        assert_eq!(doc.remove_attr(img, "alt").unwrap().as_deref(), Some("x"));
        doc.restore_attr(img, "src", Some("a.png")).unwrap();
        assert_eq!(doc.attr(img, "src").as_deref(), Some("a.png"));
    }

    #[test]
    fn node_ids_parse_from_attribute_values() {
        assert_eq!("12".parse::<NodeId>().unwrap(), NodeId(12));
        assert!(matches!(
            "x".parse::<NodeId>(),
            Err(EditorError::InvalidNodeId(_))
        ));
    }

    #[test]
    fn appended_markup_is_registered() {
        let mut doc = EditableDocument::parse(PAGE);
        let before = doc.len();
        let body = doc.body().unwrap();
        let ids = doc
            .append_markup(body, r#"<div data-k="1"><span>s</span></div>"#)
            .unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(doc.len(), before + 2);
        assert_eq!(doc.parent(ids[0]), Some(body));
    }

    #[test]
    fn text_line_breaks_become_br_elements() {
        let mut doc = EditableDocument::parse(PAGE);
        let h1 = find(&doc, "h1");
        let previous = doc.replace_children_with_text(h1, "first\r\nsecond\n").unwrap();
        assert_eq!(doc.text_with_breaks(h1), "first\nsecond\n");
        assert_eq!(doc.text_content(h1), "firstsecond");
        let breaks = doc.element_children(h1);
        assert_eq!(breaks.len(), 2);
        assert!(breaks.iter().all(|id| doc.tag(*id) == Some("br")));
        assert!(!doc.has_markup_children(h1));

        doc.restore_children(h1, previous).unwrap();
        assert_eq!(doc.text_with_breaks(h1), "Hi");
        assert!(doc.has_markup_children(find(&doc, "p")));
    }
}
