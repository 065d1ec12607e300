use common::editor::hit_test::{MenuAction, Point};
use common::editor::image::ImageFile;
use common::editor::loader::LoadedDocument;
use common::editor::NodeId;
use common::model::portfolio::SavedPortfolio;
use common::model::template::Template;

#[derive(Clone)]
pub enum Msg {
    // loading
    TemplateFetched { template: Template, document: LoadedDocument },
    PortfolioFetched(SavedPortfolio),
    LoadFailed(String),
    FrameLoaded,

    // events forwarded by the frame listeners
    TextEdited { target: NodeId, text: String },
    ImageClicked(NodeId),
    LinkClicked(NodeId),
    ImageDropped { target: NodeId, file: web_sys::File },
    ContextMenu { stack: Vec<NodeId>, position: Point },
    MenuChosen(MenuAction),
    DismissMenu,

    // image picker
    ImageFileChosen(web_sys::File),
    ImageRead { target: NodeId, file: ImageFile },
    ImageReadFailed { name: String, reason: String },

    // toolbar
    Undo,
    Redo,
    ToggleViewMode,
    SetName(String),
    Save,
    /// `snapshot_md5` identifies the HTML that was sent, not what the
    /// session holds when the answer arrives.
    SaveSucceeded { saved: SavedPortfolio, created: bool, snapshot_md5: String },
    SaveFailed(String),
    TogglePublish,
    VisibilityChanged(SavedPortfolio),
    Share,
}
