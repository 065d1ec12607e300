//! Turns the Editable Document back into a complete HTML string.
//!
//! Two views of the same tree are serialized: the persisted form, with every
//! editor marker stripped, and the sandbox form, which keeps the markers so
//! the frame can map elements back to node ids.

use std::io;

use html5ever::serialize::{serialize as write_html, Serialize, SerializeOpts, Serializer, TraversalScope};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};

use crate::editor::document::{element_name, EditableDocument, EDITABLE_ATTR, EDITOR_ATTR};
use crate::editor::error::{EditorError, EditorResult};

const MARKER_PREFIX: &str = "data-pe-";

/// Serializes the document for persistence. The output carries no
/// `contenteditable` attributes, no `data-pe-*` attributes and none of the
/// injected style or context-menu elements.
pub fn serialize(doc: &EditableDocument) -> EditorResult<String> {
    render(doc, true)
}

/// Serializes the document as loaded into the sandbox frame, markers included.
pub fn serialize_for_sandbox(doc: &EditableDocument) -> EditorResult<String> {
    render(doc, false)
}

fn render(doc: &EditableDocument, strip: bool) -> EditorResult<String> {
    let view = DocumentView {
        root: doc.document(),
        strip,
    };
    let mut out = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    write_html(&mut out, &view, opts).map_err(|e| EditorError::Serialize(e.to_string()))?;
    String::from_utf8(out).map_err(|e| EditorError::Serialize(e.to_string()))
}

struct DocumentView<'a> {
    root: &'a Handle,
    strip: bool,
}

impl Serialize for DocumentView<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => self.write_node(self.root, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for child in self.root.children.borrow().iter() {
                    self.write_node(child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

impl DocumentView<'_> {
    fn write_node<S: Serializer>(&self, handle: &Handle, serializer: &mut S) -> io::Result<()> {
        match &handle.data {
            NodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.write_node(child, serializer)?;
                }
                Ok(())
            }
            NodeData::Doctype { name, .. } => serializer.write_doctype(name),
            NodeData::Text { contents } => serializer.write_text(&contents.borrow()),
            NodeData::Comment { contents } => serializer.write_comment(contents),
            NodeData::ProcessingInstruction { target, contents } => {
                serializer.write_processing_instruction(target, contents)
            }
            NodeData::Element { name, attrs, .. } => {
                // template content lives outside the child list and is never
                // touched by the editor
                if element_name(handle) == Some("template") {
                    return SerializableHandle::from(handle.clone())
                        .serialize(serializer, TraversalScope::IncludeNode);
                }
                let attrs = attrs.borrow();
                if self.strip && attrs.iter().any(|a| &*a.name.local == EDITOR_ATTR) {
                    return Ok(());
                }
                serializer.start_elem(
                    name.clone(),
                    attrs
                        .iter()
                        .filter(|a| !self.strip || !is_marker(&a.name.local))
                        .map(|a| (&a.name, &*a.value)),
                )?;
                for child in handle.children.borrow().iter() {
                    self.write_node(child, serializer)?;
                }
                serializer.end_elem(name.clone())
            }
        }
    }
}

fn is_marker(attr: &str) -> bool {
    attr == EDITABLE_ATTR || attr.starts_with(MARKER_PREFIX)
}
