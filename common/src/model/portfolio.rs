use serde::{Deserialize, Serialize};

use crate::model::template::TemplateStyle;

/// The persisted unit: serialized HTML plus metadata and engagement counters.
///
/// `html_content` is always a complete document without editor markers.
/// `version` starts at 1 and is bumped by every update; callers pass the
/// version they loaded as `PortfolioUpdate::expected_version` so that two
/// tabs saving the same portfolio cannot silently overwrite each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPortfolio {
    pub id: String,
    pub owner_id: String,
    pub template_id: u32,
    pub template_name: String,
    pub preview_image: String,
    pub name: String,
    pub html_content: String,
    pub style: TemplateStyle,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub share_id: String,
    pub share_link: String,
    pub is_public: bool,
    pub views: u64,
    pub visitors: u64,
    pub version: u64,
}

/// Payload for the first save of an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub template_id: u32,
    pub template_name: String,
    pub preview_image: String,
    pub name: String,
    pub html_content: String,
    pub style: TemplateStyle,
}

/// Partial update; `None` fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub style: Option<TemplateStyle>,
    #[serde(default)]
    pub is_public: Option<bool>,
    /// When set, the update is rejected unless the stored version matches.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl PortfolioUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.html_content.is_none()
            && self.style.is_none()
            && self.is_public.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_fields_are_camel_case_and_optional() {
        let update: PortfolioUpdate =
            serde_json::from_value(json!({ "htmlContent": "<html></html>", "expectedVersion": 3 })).unwrap();
        assert_eq!(update.html_content.as_deref(), Some("<html></html>"));
        assert_eq!(update.expected_version, Some(3));
        assert!(update.name.is_none());
        assert!(!update.is_empty());

        // the version guard alone is not a change
        let guard_only = PortfolioUpdate {
            expected_version: Some(1),
            ..Default::default()
        };
        assert!(guard_only.is_empty());
    }
}
