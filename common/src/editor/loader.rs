//! Template Loader: resolves the HTML a new or resumed editing session starts
//! from.
//!
//! Templates reference their assets relative to their own directory. Since
//! the editor renders them from an `srcdoc` frame (no base URL), every
//! relative `src`/`href` is rewritten to a site-absolute path rooted at the
//! template's directory before the document is handed to the sandbox.
//! Saved portfolios were rewritten at their first save and are returned
//! unmodified.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::model::portfolio::SavedPortfolio;
use crate::model::template::{Template, TemplateStyle};

/// `src=` / `href=` attributes with a double- or single-quoted value.
static ASSET_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(src|href)(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)
        .expect("ASSET_ATTR regex is valid")
});

static URI_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("URI_SCHEME regex is valid")
});

/// Where the document of an editing session came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DocumentOrigin {
    Template { template_id: u32 },
    Portfolio { portfolio_id: String, template_id: u32, version: u64 },
}

/// Output of the loader: the HTML to render plus the style descriptor that
/// travels with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedDocument {
    pub html: String,
    pub style: TemplateStyle,
    pub origin: DocumentOrigin,
}

/// Directory component of a template path, with its trailing slash:
/// `/templates/Hudson/index.html` gives `/templates/Hudson/`.
pub fn base_dir(template_path: &str) -> &str {
    match template_path.rfind('/') {
        Some(pos) => &template_path[..=pos],
        None => "",
    }
}

/// Whether an attribute value is a relative reference that must be rooted at
/// the template directory. Values with a scheme (`https:`, `data:`,
/// `mailto:` …), protocol-relative (`//`), root-absolute (`/`) and fragment
/// (`#`) references are left alone, as is an empty value.
pub fn is_relative_reference(value: &str) -> bool {
    !(value.is_empty()
        || value.starts_with('/')
        || value.starts_with('#')
        || URI_SCHEME.is_match(value))
}

/// Prefixes every relative `src`/`href` value with `base`, after stripping a
/// leading `./`. Everything else in `html` is preserved byte for byte.
pub fn rewrite_relative_paths(html: &str, base: &str) -> String {
    ASSET_ATTR
        .replace_all(html, |caps: &Captures| {
            let (value, quote) = match (caps.get(3), caps.get(4)) {
                (Some(v), _) => (v.as_str(), '"'),
                (None, Some(v)) => (v.as_str(), '\''),
                (None, None) => return caps[0].to_string(),
            };
            if !is_relative_reference(value) {
                return caps[0].to_string();
            }
            let clean = value.strip_prefix("./").unwrap_or(value);
            format!("{}{}{quote}{base}{clean}{quote}", &caps[1], &caps[2])
        })
        .into_owned()
}

/// New-document path: rewrites the raw template HTML against the template's
/// directory.
pub fn load_template_document(template: &Template, raw_html: &str) -> LoadedDocument {
    let base = base_dir(&template.template_path);
    log::debug!("rewriting template {} assets against {}", template.id, base);
    LoadedDocument {
        html: rewrite_relative_paths(raw_html, base),
        style: template.style.clone(),
        origin: DocumentOrigin::Template {
            template_id: template.id,
        },
    }
}

/// Resume path: the stored HTML is returned as-is.
pub fn load_saved_document(portfolio: &SavedPortfolio) -> LoadedDocument {
    LoadedDocument {
        html: portfolio.html_content.clone(),
        style: portfolio.style.clone(),
        origin: DocumentOrigin::Portfolio {
            portfolio_id: portfolio.id.clone(),
            template_id: portfolio.template_id,
            version: portfolio.version,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "/templates/T1/";

    #[test]
    fn base_dir_keeps_trailing_slash() {
        assert_eq!(base_dir("/templates/Hudson/index.html"), "/templates/Hudson/");
        assert_eq!(base_dir("index.html"), "");
    }

    #[test]
    fn relative_paths_are_rooted_at_template_dir() {
        let html = r#"<img src="./img/a.png"><link href="css/site.css"><script src='js/app.js'></script>"#;
        assert_eq!(
            rewrite_relative_paths(html, BASE),
            r#"<img src="/templates/T1/img/a.png"><link href="/templates/T1/css/site.css"><script src='/templates/T1/js/app.js'></script>"#
        );
    }

    #[test]
    fn absolute_references_are_untouched() {
        let html = concat!(
            r#"<a href="https://example.com/x">x</a>"#,
            r#"<a href="http://example.com">y</a>"#,
            r#"<script src="//cdn.example.com/lib.js"></script>"#,
            r#"<img src="data:image/png;base64,AAAA">"#,
            r##"<a href="#about">about</a>"##,
            r#"<a href="mailto:me@example.com">mail</a>"#,
            r#"<a href="/root.html">root</a>"#,
            r#"<a href="">empty</a>"#,
        );
        assert_eq!(rewrite_relative_paths(html, BASE), html);
    }

    #[test]
    fn attribute_spacing_and_case_survive() {
        let html = r#"<IMG SRC = "pic.jpg">"#;
        assert_eq!(
            rewrite_relative_paths(html, BASE),
            r#"<IMG SRC = "/templates/T1/pic.jpg">"#
        );
    }

    #[test]
    fn srcset_is_not_an_asset_attribute() {
        let html = r#"<img srcset="a.png 1x, b.png 2x">"#;
        assert_eq!(rewrite_relative_paths(html, BASE), html);
    }
}
