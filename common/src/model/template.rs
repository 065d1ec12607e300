use serde::{Deserialize, Serialize};

/// Visual layout variant a template is designed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Modern,
    Classic,
    Minimal,
    Bold,
    Creative,
}

/// Department tag used to group templates in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Department {
    It,
    Cse,
    Mech,
}

/// Style metadata carried from a template to every portfolio created from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStyle {
    pub primary_color: String,
    pub secondary_color: String,
    pub font_family: String,
    pub layout: Layout,
}

/// A catalog entry pointing at a canonical HTML document.
///
/// Templates are defined at build time (see `crate::catalog`) and are never
/// mutated by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: u32,
    pub name: String,
    pub department: Department,
    pub category: String,
    pub rating: f32,
    pub uses: u32,
    pub description: String,
    /// Site-absolute path of the template's `index.html`, e.g.
    /// `/templates/Hudson/index.html`.
    pub template_path: String,
    pub preview_image: String,
    pub style: TemplateStyle,
}
