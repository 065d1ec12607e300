//! Link retargeting rules: prompt wording and destination normalization.

use serde::{Deserialize, Serialize};

const CONTACT_HINTS: [&str; 4] = ["mail", "contact", "message", "hire"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkPromptKind {
    Url,
    EmailOrUrl,
}

/// What to show the user when asking for a new destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPrompt {
    pub kind: LinkPromptKind,
    pub message: &'static str,
    /// Pre-filled value: the current `href`, or `https://` when there is none.
    pub default: String,
}

/// Builds the prompt for a link. Links that look like a contact affordance
/// (visible text or current `href`) ask for "an email or URL"; this only
/// changes the wording, not how the answer is normalized.
pub fn prompt_for(link_text: &str, current_href: Option<&str>) -> LinkPrompt {
    let text = link_text.to_lowercase();
    let href = current_href.unwrap_or_default();
    let contact = CONTACT_HINTS
        .iter()
        .any(|hint| text.contains(hint) || href.to_lowercase().contains(hint))
        || href.starts_with("mailto:");

    let (kind, message) = if contact {
        (
            LinkPromptKind::EmailOrUrl,
            "Enter email address (e.g. name@example.com) or URL:",
        )
    } else {
        (LinkPromptKind::Url, "Enter the URL for this link:")
    };

    LinkPrompt {
        kind,
        message,
        default: match current_href {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => "https://".to_string(),
        },
    }
}

/// Normalizes the value entered for a link.
///
/// Returns `None` when nothing was entered, which leaves the link unmodified.
/// An address containing `@` and no `/` becomes a `mailto:` link; any other
/// value not starting with `http`, `#` or `mailto:` gets `https://`.
pub fn normalize_href(input: &str) -> Option<String> {
    let value = input.trim();
    if value.is_empty() {
        return None;
    }
    let normalized = if value.contains('@') && !value.contains('/') && !value.starts_with("mailto:") {
        format!("mailto:{value}")
    } else if !value.starts_with("http") && !value.starts_with('#') && !value.starts_with("mailto:") {
        format!("https://{value}")
    } else {
        value.to_string()
    };
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_becomes_mailto() {
        assert_eq!(
            normalize_href("jdoe@example.com").as_deref(),
            Some("mailto:jdoe@example.com")
        );
        assert_eq!(
            normalize_href("mailto:jdoe@example.com").as_deref(),
            Some("mailto:jdoe@example.com")
        );
    }

    #[test]
    fn bare_domain_gets_https() {
        assert_eq!(normalize_href("example.com").as_deref(), Some("https://example.com"));
        // '@' with a path is a URL, not an address
        assert_eq!(
            normalize_href("medium.com/@jdoe").as_deref(),
            Some("https://medium.com/@jdoe")
        );
    }

    #[test]
    fn absolute_and_fragment_links_are_kept() {
        assert_eq!(
            normalize_href("https://example.com/x").as_deref(),
            Some("https://example.com/x")
        );
        assert_eq!(normalize_href("#contact").as_deref(), Some("#contact"));
    }

    #[test]
    fn blank_input_cancels() {
        assert_eq!(normalize_href(""), None);
        assert_eq!(normalize_href("   "), None);
    }

    #[test]
    fn contact_links_ask_for_email() {
        let prompt = prompt_for("Hire me", Some("#"));
        assert_eq!(prompt.kind, LinkPromptKind::EmailOrUrl);
        assert_eq!(prompt.default, "#");

        let prompt = prompt_for("Say hi", Some("mailto:a@b.c"));
        assert_eq!(prompt.kind, LinkPromptKind::EmailOrUrl);

        let prompt = prompt_for("GitHub", None);
        assert_eq!(prompt.kind, LinkPromptKind::Url);
        assert_eq!(prompt.default, "https://");
    }
}
