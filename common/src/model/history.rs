use serde::{Deserialize, Serialize};

/// Category of a recorded user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Create,
    Edit,
    View,
    Profile,
}

impl HistoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Create => "create",
            HistoryKind::Edit => "edit",
            HistoryKind::View => "view",
            HistoryKind::Profile => "profile",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(HistoryKind::Create),
            "edit" => Some(HistoryKind::Edit),
            "view" => Some(HistoryKind::View),
            "profile" => Some(HistoryKind::Profile),
            _ => None,
        }
    }
}

/// One entry of the activity log shown on the history page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub portfolio: Option<String>,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_uses_type_for_the_kind() {
        let item = HistoryItem {
            id: "h1".into(),
            action: "Created new portfolio".into(),
            kind: HistoryKind::Create,
            portfolio: Some("Jane".into()),
            timestamp: "2024-05-01T10:00:00.000Z".into(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], json!("create"));
        assert!(value.get("kind").is_none());

        let back: HistoryItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn kinds_parse_from_their_stored_names() {
        for kind in [HistoryKind::Create, HistoryKind::Edit, HistoryKind::View, HistoryKind::Profile] {
            assert_eq!(HistoryKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(HistoryKind::parse("deleted"), None);
    }
}
