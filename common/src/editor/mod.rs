//! Template editor core.
//!
//! Pipeline: `loader` resolves the HTML of a new or resumed document, the
//! `document` module parses it into an [`EditableDocument`], `injector` adds
//! editing affordances, `command` applies edits (with `hit_test` resolving
//! context-menu targets and `link`/`image` holding the per-affordance rules),
//! and `serializer` produces the clean HTML that gets persisted. `session`
//! ties these together for one open editor.
//!
//! Nothing here touches a browser: the frontend translates DOM events into
//! [`Command`] values and mirrors the returned [`DomPatch`]es onto the live
//! frame.

pub mod command;
pub mod document;
pub mod error;
pub mod hit_test;
pub mod image;
pub mod injector;
pub mod link;
pub mod loader;
pub mod sandbox;
pub mod serializer;
pub mod session;

pub use command::{Command, DomPatch};
pub use document::{EditableDocument, NodeId};
pub use error::{EditorError, EditorResult};
pub use session::EditorSession;
