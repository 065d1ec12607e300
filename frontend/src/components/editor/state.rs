//! Component state for the template editor.
//!
//! The `EditorSession` (from `common`) is the single source of truth for the
//! document being edited; the sandbox frame is only a live view of it. The
//! rest of the state tracks how that view is mounted and what the user is in
//! the middle of (a pending image pick, a save in flight).

use common::editor::sandbox::ViewMode;
use common::editor::{EditorSession, NodeId};
use yew::prelude::*;

use super::frame::FrameListeners;
use super::helpers::UnloadGuard;

pub struct EditorComponent {
    /// The open editing session. `None` until the document has loaded.
    pub session: Option<EditorSession>,

    /// HTML currently mounted in the frame's `srcdoc`.
    pub srcdoc: String,

    /// Bumped on every remount so the `<iframe>` element is recreated even
    /// when `srcdoc` is unchanged.
    pub frame_generation: u32,

    pub view_mode: ViewMode,

    /// Reference to the sandbox `<iframe>`.
    pub frame_ref: NodeRef,

    /// Reference to the hidden `<input type="file">` used to pick images.
    pub file_input_ref: NodeRef,

    /// Listeners attached to the frame's document; replaced on every load.
    pub listeners: Option<FrameListeners>,

    /// Image the next picked file will replace.
    pub pending_image: Option<NodeId>,

    /// Public link of the saved portfolio, once there is one.
    pub share_link: Option<String>,

    /// A save or publish request is in flight.
    pub saving: bool,

    /// Cached result of `EditorSession::is_dirty`, refreshed after every
    /// change to the document or its saved state.
    pub dirty: bool,

    /// Fatal loading error shown instead of the editor.
    pub load_error: Option<String>,

    /// Guards the one-time fetch in `rendered`.
    pub loaded: bool,

    /// `beforeunload` handler warning about unsaved changes.
    pub unload_guard: Option<UnloadGuard>,
}

impl EditorComponent {
    pub fn new() -> Self {
        Self {
            session: None,
            srcdoc: String::new(),
            frame_generation: 0,
            view_mode: ViewMode::default(),
            frame_ref: NodeRef::default(),
            file_input_ref: NodeRef::default(),
            listeners: None,
            pending_image: None,
            share_link: None,
            saving: false,
            dirty: false,
            load_error: None,
            loaded: false,
            unload_guard: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recomputes the dirty flag from the session. Serializing the document
    /// is not free, so this runs once per change rather than per render.
    pub fn refresh_dirty(&mut self) -> bool {
        self.dirty = self.session.as_ref().is_some_and(|s| s.is_dirty());
        self.dirty
    }

    /// Document of the mounted frame, if it is ready.
    pub fn frame_document(&self) -> Option<web_sys::Document> {
        self.frame_ref
            .cast::<web_sys::HtmlIFrameElement>()
            .and_then(|frame| frame.content_document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::catalog::find_template;
    use common::editor::Command;

    #[test]
    fn dirty_flag_is_cached_until_refreshed() {
        let mut component = EditorComponent::new();
        assert!(!component.refresh_dirty());

        let template = find_template(1).unwrap();
        let mut session =
            EditorSession::open_template(&template, "<html><body><h1>Jane</h1></body></html>").unwrap();
        session.render_sandbox_html().unwrap();
        let h1 = session
            .document()
            .elements()
            .into_iter()
            .find(|id| session.document().tag(*id) == Some("h1"))
            .unwrap();
        component.session = Some(session);
        assert!(!component.refresh_dirty());

        if let Some(session) = component.session.as_mut() {
            session.apply(Command::EditText { target: h1, text: "John".to_string() }).unwrap();
        }
        // render reads the cached value
        assert!(!component.is_dirty());
        assert!(component.refresh_dirty());
        assert!(component.is_dirty());
    }
}
