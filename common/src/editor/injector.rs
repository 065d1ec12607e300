//! Editability Injector.
//!
//! Runs once per sandbox load. It stamps every element with its [`NodeId`]
//! (so the frame's hit-test results map back to document nodes), marks leaf
//! text elements `contenteditable` (and only those), and appends the editor's style block and
//! context-menu overlay. Everything it adds is stripped again by the
//! serializer.

use crate::editor::document::{
    EditableDocument, NodeId, EDITABLE_ATTR, EDITOR_ATTR, INITIALIZED_ATTR, NODE_ATTR,
};
use crate::editor::error::EditorResult;

/// Tags whose leaf instances become editable in place.
pub const EDITABLE_TAGS: [&str; 10] = ["h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "li", "a"];

pub const CONTEXT_MENU_CLASS: &str = "pe-context-menu";
/// Attribute on context-menu items naming the action they trigger.
pub const ACTION_ATTR: &str = "data-pe-action";

pub const EDITOR_STYLES: &str = r#"
[contenteditable="true"] {
  outline: 2px dashed rgba(59, 130, 246, 0.5);
  cursor: text;
}
[contenteditable="true"]:focus {
  outline: 2px solid #3B82F6;
  background-color: rgba(59, 130, 246, 0.05);
}
img {
  cursor: pointer;
  transition: opacity 0.2s;
}
img:hover {
  opacity: 0.8;
  outline: 2px solid #3B82F6;
}
.pe-context-menu {
  position: absolute;
  z-index: 10000;
  background: white;
  border: 1px solid #e2e8f0;
  border-radius: 6px;
  box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1), 0 2px 4px -1px rgba(0, 0, 0, 0.06);
  min-width: 160px;
  overflow: hidden;
  display: none;
}
.pe-context-menu-item {
  padding: 8px 12px;
  font-family: system-ui, -apple-system, sans-serif;
  font-size: 14px;
  color: #1e293b;
  cursor: pointer;
  display: none;
}
.pe-context-menu-item:hover {
  background-color: #f1f5f9;
  color: #0f172a;
}
.pe-context-menu-item.delete {
  color: #ef4444;
}
.pe-context-menu-item.delete:hover {
  background-color: #fef2f2;
  color: #dc2626;
}
"#;

const CONTEXT_MENU: &str = concat!(
    r#"<div class="pe-context-menu" data-pe-editor="menu">"#,
    r#"<div class="pe-context-menu-item" data-pe-action="edit-link">Edit Link</div>"#,
    r#"<div class="pe-context-menu-item" data-pe-action="change-image">Change Image</div>"#,
    r#"<div class="pe-context-menu-item delete" data-pe-action="delete">Delete Element</div>"#,
    r#"</div>"#,
);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionReport {
    /// The document already carried the initialization marker; nothing was
    /// changed.
    pub already_initialized: bool,
    /// Elements marked `contenteditable` by this run.
    pub editable: Vec<NodeId>,
    /// The injected context-menu container.
    pub context_menu: Option<NodeId>,
}

/// Whether an element qualifies for in-place text editing.
pub fn is_editable_candidate(doc: &EditableDocument, id: NodeId) -> bool {
    let Some(tag) = doc.tag(id) else {
        return false;
    };
    EDITABLE_TAGS.contains(&tag)
        && !doc.has_markup_children(id)
        && !doc.text_content(id).trim().is_empty()
        && !doc.is_editor_owned(id)
}

/// Injects editing affordances. Idempotent: a document whose root already
/// carries the initialization marker is left untouched.
pub fn inject(doc: &mut EditableDocument) -> EditorResult<InjectionReport> {
    let Some(root) = doc.root() else {
        log::warn!("document has no root element, skipping injection");
        return Ok(InjectionReport::default());
    };
    if doc.has_attr(root, INITIALIZED_ATTR) {
        return Ok(InjectionReport {
            already_initialized: true,
            ..InjectionReport::default()
        });
    }

    let mut editable = Vec::new();
    for id in doc.elements() {
        if is_editable_candidate(doc, id) {
            doc.set_attr(id, EDITABLE_ATTR, "true")?;
            editable.push(id);
        } else if doc.remove_attr(id, EDITABLE_ATTR)?.is_some() {
            // template-authored editing regions would let typing reach
            // markup the session cannot track as text
            log::debug!("dropped contenteditable from container {id}");
        }
    }

    if let Some(head) = doc.head() {
        doc.append_markup(head, &format!("<style {EDITOR_ATTR}=\"styles\">{EDITOR_STYLES}</style>"))?;
    }
    let context_menu = match doc.body() {
        Some(body) => doc.append_markup(body, CONTEXT_MENU)?.into_iter().next(),
        None => None,
    };

    stamp_node_ids(doc)?;
    doc.set_attr(root, INITIALIZED_ATTR, "true")?;
    log::debug!(
        "injected editor affordances: {} editable elements",
        editable.len()
    );

    Ok(InjectionReport {
        already_initialized: false,
        editable,
        context_menu,
    })
}

/// Writes each attached element's id into its `data-pe-node` attribute.
/// `<template>` elements are skipped: their content is inert.
pub fn stamp_node_ids(doc: &mut EditableDocument) -> EditorResult<()> {
    for id in doc.elements() {
        if doc.tag(id) == Some("template") {
            continue;
        }
        doc.set_attr(id, NODE_ATTR, &id.0.to_string())?;
    }
    Ok(())
}
