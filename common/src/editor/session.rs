//! One open editor: the Editable Document plus everything needed to save it.
//!
//! The session owns exactly one document for its whole life. Undo/redo is a
//! linear history with a cursor: applying a new command truncates whatever
//! was undone past the cursor. Dirty tracking compares the MD5 of the
//! current serialization against the one recorded at load or last save.

use crate::editor::command::{self, Command, DomPatch, Revert};
use crate::editor::document::EditableDocument;
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::hit_test::{resolve_context_menu, ContextMenu, HitStack, Point};
use crate::editor::injector::{self, InjectionReport};
use crate::editor::loader::{self, DocumentOrigin, LoadedDocument};
use crate::editor::serializer;
use crate::model::portfolio::{NewPortfolio, PortfolioUpdate, SavedPortfolio};
use crate::model::template::{Template, TemplateStyle};

/// How the sandbox frame must follow a document change.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameUpdate {
    /// Apply these patches to the live frame.
    Patch(Vec<DomPatch>),
    /// Reload the frame from [`EditorSession::render_sandbox_html`].
    Remount,
}

/// What the next save has to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveAction {
    Create(NewPortfolio),
    Update { id: String, update: PortfolioUpdate },
}

/// A save on its way to the store, with the MD5 of the HTML it carries.
/// Edits made while it is in flight stay dirty after it succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub action: SaveAction,
    pub snapshot_md5: String,
}

struct HistoryEntry {
    command: Command,
    revert: Option<Revert>,
}

pub struct EditorSession {
    document: EditableDocument,
    origin: DocumentOrigin,
    template_id: u32,
    template_name: String,
    preview_image: String,
    style: TemplateStyle,
    name: String,
    is_public: bool,
    history: Vec<HistoryEntry>,
    history_index: usize,
    saved_md5: String,
    context_menu: Option<ContextMenu>,
}

impl EditorSession {
    /// Starts editing a fresh copy of a template. `raw_html` is the template
    /// file as fetched; relative asset paths are rewritten here.
    pub fn open_template(template: &Template, raw_html: &str) -> EditorResult<Self> {
        Self::open_loaded(template, loader::load_template_document(template, raw_html))
    }

    /// Starts editing a template document the backend has already run
    /// through the loader.
    pub fn open_loaded(template: &Template, loaded: LoadedDocument) -> EditorResult<Self> {
        let mut session = EditorSession {
            document: EditableDocument::parse(&loaded.html),
            origin: loaded.origin,
            template_id: template.id,
            template_name: template.name.clone(),
            preview_image: template.preview_image.clone(),
            style: loaded.style,
            name: format!("{} Portfolio", template.name),
            is_public: false,
            history: Vec::new(),
            history_index: 0,
            saved_md5: String::new(),
            context_menu: None,
        };
        // a template that was never saved is not dirty until edited
        session.saved_md5 = session.current_md5()?;
        Ok(session)
    }

    /// Resumes editing a saved portfolio.
    pub fn resume(portfolio: &SavedPortfolio) -> EditorResult<Self> {
        let loaded = loader::load_saved_document(portfolio);
        let mut session = EditorSession {
            document: EditableDocument::parse(&loaded.html),
            origin: loaded.origin,
            template_id: portfolio.template_id,
            template_name: portfolio.template_name.clone(),
            preview_image: portfolio.preview_image.clone(),
            style: loaded.style,
            name: portfolio.name.clone(),
            is_public: portfolio.is_public,
            history: Vec::new(),
            history_index: 0,
            saved_md5: String::new(),
            context_menu: None,
        };
        session.saved_md5 = session.current_md5()?;
        Ok(session)
    }

    pub fn document(&self) -> &EditableDocument {
        &self.document
    }

    pub fn origin(&self) -> &DocumentOrigin {
        &self.origin
    }

    pub fn template_id(&self) -> u32 {
        self.template_id
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn style(&self) -> &TemplateStyle {
        &self.style
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether the stored portfolio is visible at its share link.
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Id of the stored portfolio, once the session has been saved at least
    /// once.
    pub fn portfolio_id(&self) -> Option<&str> {
        match &self.origin {
            DocumentOrigin::Portfolio { portfolio_id, .. } => Some(portfolio_id),
            DocumentOrigin::Template { .. } => None,
        }
    }

    pub fn version(&self) -> Option<u64> {
        match &self.origin {
            DocumentOrigin::Portfolio { version, .. } => Some(*version),
            DocumentOrigin::Template { .. } => None,
        }
    }

    /// Injects editing affordances (first call only) and returns the HTML to
    /// load into the sandbox frame.
    pub fn render_sandbox_html(&mut self) -> EditorResult<String> {
        let InjectionReport {
            already_initialized,
            editable,
            ..
        } = injector::inject(&mut self.document)?;
        if !already_initialized {
            log::info!(
                "editor ready for template {}: {} editable elements",
                self.template_id,
                editable.len()
            );
        }
        serializer::serialize_for_sandbox(&self.document)
    }

    /// Applies a command and records it for undo. Consecutive text edits of
    /// the same element collapse into one history entry.
    pub fn apply(&mut self, command: Command) -> EditorResult<FrameUpdate> {
        let applied = command::apply(&mut self.document, command).inspect_err(|e| {
            log::warn!("command rejected: {e}");
        })?;
        self.context_menu = None;

        let coalesce = matches!(
            (&applied.command, self.history.last()),
            (Command::EditText { target, .. }, Some(HistoryEntry { command: Command::EditText { target: last, .. }, .. }))
                if target == last && self.history_index == self.history.len()
        );
        if coalesce {
            if let Some(last) = self.history.last_mut() {
                last.command = applied.command;
            }
        } else {
            self.history.truncate(self.history_index);
            self.history.push(HistoryEntry {
                command: applied.command,
                revert: Some(applied.revert),
            });
            self.history_index = self.history.len();
        }
        Ok(FrameUpdate::Patch(applied.patches))
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index < self.history.len()
    }

    pub fn undo(&mut self) -> EditorResult<FrameUpdate> {
        if !self.can_undo() {
            return Err(EditorError::EmptyHistory("undo"));
        }
        self.context_menu = None;
        let entry = &mut self.history[self.history_index - 1];
        let revert = entry.revert.take().ok_or(EditorError::EmptyHistory("undo"))?;
        let patches = command::revert(&mut self.document, revert)?;
        self.history_index -= 1;
        Ok(match patches {
            Some(patches) => FrameUpdate::Patch(patches),
            None => FrameUpdate::Remount,
        })
    }

    pub fn redo(&mut self) -> EditorResult<FrameUpdate> {
        if !self.can_redo() {
            return Err(EditorError::EmptyHistory("redo"));
        }
        self.context_menu = None;
        let entry = &mut self.history[self.history_index];
        let applied = command::apply(&mut self.document, entry.command.clone())?;
        entry.revert = Some(applied.revert);
        self.history_index += 1;
        Ok(FrameUpdate::Patch(applied.patches))
    }

    /// Resolves and remembers the context menu for a right-click.
    pub fn context_menu(&mut self, stack: &HitStack, position: Point) -> Option<&ContextMenu> {
        let menu = resolve_context_menu(&self.document, stack, position);
        self.context_menu = (!menu.is_empty()).then_some(menu);
        self.context_menu.as_ref()
    }

    pub fn open_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn dismiss_menu(&mut self) {
        self.context_menu = None;
    }

    /// The persisted form of the document.
    pub fn snapshot(&self) -> EditorResult<String> {
        serializer::serialize(&self.document)
    }

    pub fn is_dirty(&self) -> bool {
        match self.current_md5() {
            Ok(md5) => md5 != self.saved_md5,
            Err(_) => true,
        }
    }

    /// Builds the request for the next save: a create for a session that
    /// started from a template, an update guarded by the loaded version
    /// otherwise.
    pub fn save_action(&self) -> EditorResult<PendingSave> {
        let html_content = self.snapshot()?;
        let snapshot_md5 = md5_of(&html_content);
        let action = match &self.origin {
            DocumentOrigin::Template { template_id } => SaveAction::Create(NewPortfolio {
                template_id: *template_id,
                template_name: self.template_name.clone(),
                preview_image: self.preview_image.clone(),
                name: self.name.clone(),
                html_content,
                style: self.style.clone(),
            }),
            DocumentOrigin::Portfolio {
                portfolio_id,
                version,
                ..
            } => SaveAction::Update {
                id: portfolio_id.clone(),
                update: PortfolioUpdate {
                    name: Some(self.name.clone()),
                    html_content: Some(html_content),
                    style: Some(self.style.clone()),
                    is_public: None,
                    expected_version: Some(*version),
                },
            },
        };
        Ok(PendingSave {
            action,
            snapshot_md5,
        })
    }

    /// Records a successful save of the snapshot hashed to `snapshot_md5`.
    /// After the first save the session edits the stored portfolio, so later
    /// saves become updates.
    pub fn mark_saved(&mut self, saved: &SavedPortfolio, snapshot_md5: &str) {
        self.record_stored(saved);
        self.saved_md5 = snapshot_md5.to_string();
    }

    /// Update that publishes or unpublishes the stored portfolio. `None`
    /// until the session has been saved once.
    pub fn visibility_update(&self, public: bool) -> Option<(String, PortfolioUpdate)> {
        let (id, version) = (self.portfolio_id()?, self.version()?);
        Some((
            id.to_string(),
            PortfolioUpdate {
                is_public: Some(public),
                expected_version: Some(version),
                ..PortfolioUpdate::default()
            },
        ))
    }

    /// Takes the stored version and visibility from the store's answer
    /// without touching dirty tracking.
    pub fn record_stored(&mut self, saved: &SavedPortfolio) {
        self.origin = DocumentOrigin::Portfolio {
            portfolio_id: saved.id.clone(),
            template_id: saved.template_id,
            version: saved.version,
        };
        self.is_public = saved.is_public;
    }

    fn current_md5(&self) -> EditorResult<String> {
        Ok(md5_of(&self.snapshot()?))
    }
}

fn md5_of(html: &str) -> String {
    format!("{:x}", md5::compute(html))
}
