//! Image replacement rules: which dropped payloads are accepted, how a file
//! becomes a data URI, and which anchors count as lightbox wrappers.

use base64::{engine::general_purpose, Engine as _};

use crate::editor::document::{EditableDocument, NodeId};
use crate::editor::error::{EditorError, EditorResult};

/// `accept` filter for the image file picker.
pub const IMAGE_ACCEPT: &str = "image/*";

/// A file chosen or dropped by the user, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// Picks the file to use from a drop. Only a single image file is accepted;
/// anything else is ignored without an error.
pub fn select_dropped_image<T, F>(files: &[T], mime_of: F) -> Option<&T>
where
    F: Fn(&T) -> String,
{
    match files {
        [file] if is_image_mime(&mime_of(file)) => Some(file),
        _ => None,
    }
}

/// Encodes the file as a `data:` URI suitable for an `<img src>`.
pub fn to_data_uri(file: &ImageFile) -> EditorResult<String> {
    if !is_image_mime(&file.mime) {
        return Err(EditorError::FileRead {
            name: file.name.clone(),
            reason: format!("'{}' is not an image type", file.mime),
        });
    }
    if file.bytes.is_empty() {
        return Err(EditorError::FileRead {
            name: file.name.clone(),
            reason: "file is empty".to_string(),
        });
    }
    Ok(format!(
        "data:{};base64,{}",
        file.mime.trim().to_ascii_lowercase(),
        general_purpose::STANDARD.encode(&file.bytes)
    ))
}

/// The anchor wrapping an image when it opens the image in a lightbox
/// (`glightbox`-style class, or a `data-lightbox`/`data-gallery` attribute).
pub fn lightbox_anchor(doc: &EditableDocument, image: NodeId) -> Option<NodeId> {
    let anchor = doc.closest(image, "a")?;
    let class_match = doc
        .attr(anchor, "class")
        .is_some_and(|class| class.split_whitespace().any(|name| name.contains("lightbox")));
    if class_match || doc.has_attr(anchor, "data-lightbox") || doc.has_attr(anchor, "data-gallery") {
        Some(anchor)
    } else {
        None
    }
}
