//! Isolation settings for the frames that host template documents.
//!
//! Template scripts need to run (carousels, typed text, animations), and the
//! editor needs same-origin access to attach its listeners. Top-level
//! navigation and escaping popups stay blocked.

use serde::{Deserialize, Serialize};

/// `sandbox` attribute of the editor frame.
pub const EDITOR_SANDBOX: &str = "allow-scripts allow-same-origin allow-forms allow-modals";

/// `sandbox` attribute of the public portfolio frame. Visitors may open
/// links in new tabs; nothing else is added.
pub const PUBLIC_SANDBOX: &str = "allow-scripts allow-same-origin allow-forms allow-modals allow-popups";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Desktop,
    Mobile,
}

impl ViewMode {
    /// Inline style of the frame for this viewport.
    pub fn frame_style(&self) -> &'static str {
        match self {
            ViewMode::Desktop => "width: 100%; height: 100%; border: 0;",
            ViewMode::Mobile => "width: 375px; height: 667px; border: 0;",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Desktop => "Desktop",
            ViewMode::Mobile => "Mobile",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::Desktop => ViewMode::Mobile,
            ViewMode::Mobile => ViewMode::Desktop,
        }
    }
}
