//! Edits as values.
//!
//! Every change the editor makes to a document goes through [`apply`], which
//! returns an [`Applied`] record holding the patches needed to mirror the
//! change onto the live frame and the information needed to revert it.

use markup5ever_rcdom::Handle;
use serde::{Deserialize, Serialize};

use crate::editor::document::{EditableDocument, NodeId};
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::image::lightbox_anchor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Points an `<img>` at a new source (usually a data URI).
    ReplaceImage { target: NodeId, src: String },
    /// Sets the `href` of the anchor that is or encloses `target`.
    RetargetLink { target: NodeId, href: String },
    /// Removes an element and its subtree.
    DeleteElement { target: NodeId },
    /// Records text typed into a plain text element. `\n` is a line break.
    EditText { target: NodeId, text: String },
}

impl Command {
    pub fn target(&self) -> NodeId {
        match self {
            Command::ReplaceImage { target, .. }
            | Command::RetargetLink { target, .. }
            | Command::DeleteElement { target }
            | Command::EditText { target, .. } => *target,
        }
    }
}

/// A change to mirror onto the sandbox frame's live DOM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DomPatch {
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    Remove { node: NodeId },
    /// Replaces the element's content; `\n` becomes `<br>`.
    SetText { node: NodeId, text: String },
}

/// How to undo an applied command.
pub(crate) enum Revert {
    Attributes(Vec<(NodeId, &'static str, Option<String>)>),
    Reinsert { node: NodeId, parent: NodeId, index: usize },
    Children { node: NodeId, children: Vec<Handle> },
}

pub struct Applied {
    pub command: Command,
    pub patches: Vec<DomPatch>,
    pub(crate) revert: Revert,
}

impl std::fmt::Debug for Applied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applied")
            .field("command", &self.command)
            .field("patches", &self.patches)
            .finish()
    }
}

/// Applies a command to the document. On error the document is unchanged.
pub fn apply(doc: &mut EditableDocument, command: Command) -> EditorResult<Applied> {
    let target = command.target();
    if !doc.is_attached(target) {
        return Err(EditorError::UnknownNode(target));
    }
    if doc.is_editor_owned(target) {
        return Err(EditorError::Protected {
            node: target,
            reason: "element belongs to the editor",
        });
    }

    let (patches, revert) = match &command {
        Command::ReplaceImage { target, src } => replace_image(doc, *target, src)?,
        Command::RetargetLink { target, href } => retarget_link(doc, *target, href)?,
        Command::DeleteElement { target } => delete_element(doc, *target)?,
        Command::EditText { target, text } => edit_text(doc, *target, text)?,
    };
    log::debug!("applied {:?} with {} patches", command, patches.len());
    Ok(Applied {
        command,
        patches,
        revert,
    })
}

/// Undoes an applied command. Returns the patches that mirror the undo when
/// they can be expressed as patches; reinserting a deleted subtree cannot,
/// and yields `None` (the caller re-renders the frame instead).
pub(crate) fn revert(doc: &mut EditableDocument, revert: Revert) -> EditorResult<Option<Vec<DomPatch>>> {
    match revert {
        Revert::Attributes(changes) => {
            let mut patches = Vec::with_capacity(changes.len());
            for (node, name, value) in changes.into_iter().rev() {
                doc.restore_attr(node, name, value.as_deref())?;
                patches.push(match value {
                    Some(value) => DomPatch::SetAttribute {
                        node,
                        name: name.to_string(),
                        value,
                    },
                    None => DomPatch::RemoveAttribute {
                        node,
                        name: name.to_string(),
                    },
                });
            }
            Ok(Some(patches))
        }
        Revert::Reinsert {
            node,
            parent,
            index,
        } => {
            doc.insert_at(parent, index, node)?;
            Ok(None)
        }
        Revert::Children { node, children } => {
            doc.restore_children(node, children)?;
            Ok(Some(vec![DomPatch::SetText {
                node,
                text: doc.text_with_breaks(node),
            }]))
        }
    }
}

fn replace_image(doc: &mut EditableDocument, target: NodeId, src: &str) -> EditorResult<(Vec<DomPatch>, Revert)> {
    if doc.tag(target) != Some("img") {
        return Err(EditorError::NotAnImage(target));
    }
    let lightbox = lightbox_anchor(doc, target);

    let mut changes = Vec::new();
    let mut patches = Vec::new();
    changes.push((target, "src", doc.set_attr(target, "src", src)?));
    patches.push(DomPatch::SetAttribute {
        node: target,
        name: "src".to_string(),
        value: src.to_string(),
    });
    for name in ["srcset", "sizes"] {
        if let Some(previous) = doc.remove_attr(target, name)? {
            changes.push((target, name, Some(previous)));
            patches.push(DomPatch::RemoveAttribute {
                node: target,
                name: name.to_string(),
            });
        }
    }
    if let Some(anchor) = lightbox {
        changes.push((anchor, "href", doc.set_attr(anchor, "href", src)?));
        patches.push(DomPatch::SetAttribute {
            node: anchor,
            name: "href".to_string(),
            value: src.to_string(),
        });
    }
    Ok((patches, Revert::Attributes(changes)))
}

fn retarget_link(doc: &mut EditableDocument, target: NodeId, href: &str) -> EditorResult<(Vec<DomPatch>, Revert)> {
    let anchor = doc.closest(target, "a").ok_or(EditorError::NotALink(target))?;
    let previous = doc.set_attr(anchor, "href", href)?;
    Ok((
        vec![DomPatch::SetAttribute {
            node: anchor,
            name: "href".to_string(),
            value: href.to_string(),
        }],
        Revert::Attributes(vec![(anchor, "href", previous)]),
    ))
}

fn delete_element(doc: &mut EditableDocument, target: NodeId) -> EditorResult<(Vec<DomPatch>, Revert)> {
    if doc.is_structural(target) {
        return Err(EditorError::Protected {
            node: target,
            reason: "the page root and content wrapper cannot be deleted",
        });
    }
    let (parent, index) = doc.detach(target)?;
    Ok((
        vec![DomPatch::Remove { node: target }],
        Revert::Reinsert {
            node: target,
            parent,
            index,
        },
    ))
}

fn edit_text(doc: &mut EditableDocument, target: NodeId, text: &str) -> EditorResult<(Vec<DomPatch>, Revert)> {
    if doc.is_structural(target) {
        return Err(EditorError::Protected {
            node: target,
            reason: "text can only be edited on content elements",
        });
    }
    if doc.has_markup_children(target) {
        return Err(EditorError::Protected {
            node: target,
            reason: "only plain text elements can be edited as text",
        });
    }
    let children = doc.replace_children_with_text(target, text)?;
    Ok((
        vec![DomPatch::SetText {
            node: target,
            text: text.to_string(),
        }],
        Revert::Children {
            node: target,
            children,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r##"<!DOCTYPE html><html><head></head><body>
<section id="hero"><h1>Jane</h1>
<a class="glightbox" href="/big.jpg"><img src="/a.jpg" srcset="/a-2x.jpg 2x" sizes="50vw"></a>
<p>About <a href="#about">me</a></p>
</section></body></html>"##;

    fn by_tag(doc: &EditableDocument, tag: &str) -> NodeId {
        doc.elements()
            .into_iter()
            .find(|id| doc.tag(*id) == Some(tag))
            .unwrap()
    }

    #[test]
    fn replace_image_clears_responsive_sources_and_updates_lightbox() {
        let mut doc = EditableDocument::parse(PAGE);
        let img = by_tag(&doc, "img");
        let anchor = doc.closest(img, "a").unwrap();
        let applied = apply(
            &mut doc,
            Command::ReplaceImage {
                target: img,
                src: "data:image/png;base64,AAAA".to_string(),
            },
        )
        .unwrap();

        assert_eq!(doc.attr(img, "src").as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(doc.attr(img, "srcset"), None);
        assert_eq!(doc.attr(img, "sizes"), None);
        assert_eq!(doc.attr(anchor, "href").as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(applied.patches.len(), 4);

        revert(&mut doc, applied.revert).unwrap();
        assert_eq!(doc.attr(img, "src").as_deref(), Some("/a.jpg"));
        assert_eq!(doc.attr(img, "srcset").as_deref(), Some("/a-2x.jpg 2x"));
        assert_eq!(doc.attr(anchor, "href").as_deref(), Some("/big.jpg"));
    }

    #[test]
    fn replace_image_rejects_other_elements() {
        let mut doc = EditableDocument::parse(PAGE);
        let h1 = by_tag(&doc, "h1");
        let err = apply(
            &mut doc,
            Command::ReplaceImage {
                target: h1,
                src: "x".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, EditorError::NotAnImage(h1));
    }

    #[test]
    fn retarget_resolves_enclosing_anchor() {
        let mut doc = EditableDocument::parse(
            r#"<body><a href="/old"><span>inner</span></a><p>no link</p></body>"#,
        );
        let span = by_tag(&doc, "span");
        let a = by_tag(&doc, "a");
        apply(
            &mut doc,
            Command::RetargetLink {
                target: span,
                href: "https://example.com".to_string(),
            },
        )
        .unwrap();
        assert_eq!(doc.attr(a, "href").as_deref(), Some("https://example.com"));

        let p = by_tag(&doc, "p");
        let err = apply(
            &mut doc,
            Command::RetargetLink {
                target: p,
                href: "#".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, EditorError::NotALink(p));
    }

    #[test]
    fn delete_removes_subtree_and_guards_structure() {
        let mut doc = EditableDocument::parse(PAGE);
        let section = by_tag(&doc, "section");
        let h1 = by_tag(&doc, "h1");
        apply(&mut doc, Command::DeleteElement { target: section }).unwrap();
        assert!(!doc.is_attached(section));
        assert!(!doc.is_attached(h1));

        for guarded in [doc.root().unwrap(), doc.body().unwrap(), doc.head().unwrap()] {
            let err = apply(&mut doc, Command::DeleteElement { target: guarded }).unwrap_err();
            assert!(matches!(err, EditorError::Protected { .. }));
            assert!(doc.is_attached(guarded));
        }

        let err = apply(&mut doc, Command::DeleteElement { target: h1 }).unwrap_err();
        assert_eq!(err, EditorError::UnknownNode(h1));
    }

    #[test]
    fn deleted_element_is_reinserted_in_place() {
        let mut doc = EditableDocument::parse(PAGE);
        let h1 = by_tag(&doc, "h1");
        let section = by_tag(&doc, "section");
        let before = doc.element_children(section);
        let applied = apply(&mut doc, Command::DeleteElement { target: h1 }).unwrap();
        assert_eq!(revert(&mut doc, applied.revert).unwrap(), None);
        assert_eq!(doc.element_children(section), before);
    }

    #[test]
    fn edit_text_replaces_content() {
        let mut doc = EditableDocument::parse(PAGE);
        let h1 = by_tag(&doc, "h1");
        let applied = apply(
            &mut doc,
            Command::EditText {
                target: h1,
                text: "John".to_string(),
            },
        )
        .unwrap();
        assert_eq!(doc.text_content(h1), "John");
        revert(&mut doc, applied.revert).unwrap();
        assert_eq!(doc.text_content(h1), "Jane");
    }

    #[test]
    fn edit_text_keeps_line_breaks() {
        let mut doc = EditableDocument::parse(PAGE);
        let h1 = by_tag(&doc, "h1");
        apply(
            &mut doc,
            Command::EditText {
                target: h1,
                text: "Jane\nDoe".to_string(),
            },
        )
        .unwrap();
        let html = crate::editor::serializer::serialize(&doc).unwrap();
        assert!(html.contains("<h1>Jane<br>Doe</h1>"), "{html}");

        // typing again on the same heading is still a plain text edit
        let applied = apply(
            &mut doc,
            Command::EditText {
                target: h1,
                text: "Jane\nM. Doe".to_string(),
            },
        )
        .unwrap();
        assert_eq!(
            revert(&mut doc, applied.revert).unwrap(),
            Some(vec![DomPatch::SetText {
                node: h1,
                text: "Jane\nDoe".to_string(),
            }])
        );
    }

    #[test]
    fn edit_text_refuses_elements_holding_markup() {
        let mut doc = EditableDocument::parse(
            r#"<body><div contenteditable id="card"><img src="a.png"><span>x</span></div></body>"#,
        );
        let card = by_tag(&doc, "div");
        let before = crate::editor::serializer::serialize(&doc).unwrap();
        let err = apply(
            &mut doc,
            Command::EditText {
                target: card,
                text: "Caption!".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::Protected { node, .. } if node == card));
        assert_eq!(crate::editor::serializer::serialize(&doc).unwrap(), before);
    }
}
