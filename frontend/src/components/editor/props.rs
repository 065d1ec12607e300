//! Properties for the `EditorComponent`.
//!
//! Exactly one of the two ids is expected. With neither, the editor shows a
//! "nothing to edit" message instead of an empty frame.

use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct EditorProps {
    /// Catalog template to start a new portfolio from.
    #[prop_or_default]
    pub template_id: Option<u32>,

    /// Saved portfolio to resume editing.
    #[prop_or_default]
    pub portfolio_id: Option<String>,
}
