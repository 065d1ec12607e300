//! # Public Renderer
//!
//! `GET /portfolio/{share_id}` serves a shared portfolio to visitors. The
//! stored HTML is embedded read-only in a sandboxed `<iframe srcdoc>` with the
//! "Built with Portfolio Builder" badge on top; no editor script or
//! affordance is ever attached on this path.
//!
//! The path segment is normally the 11-character share id. Portfolio ids are
//! accepted too, so links built from either keep working. Unknown and private
//! portfolios get the same not-found page.
//!
//! Each successful render queues one view on the `ViewCounter`; counting never
//! delays the response.

use actix_web::web::{get, resource};
use actix_web::{web, HttpResponse, Resource};
use common::editor::sandbox::PUBLIC_SANDBOX;
use common::model::portfolio::SavedPortfolio;

use super::{with_store, Store};
use crate::error::ServiceResult;
use crate::storage::is_share_id;
use crate::view_counter::ViewCounter;

const PUBLIC_PATH: &str = "/portfolio/{share_id}";

pub fn configure_routes() -> Resource {
    resource(PUBLIC_PATH).route(get().to(process))
}

async fn process(
    store: Store,
    counter: web::Data<ViewCounter>,
    share_id: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let key = share_id.into_inner();
    let found = with_store(&store, move |s| {
        let by_share = if is_share_id(&key) {
            s.get_by_share_id(&key)?
        } else {
            None
        };
        match by_share {
            Some(p) => Ok(Some(p)),
            None => s.get(&key),
        }
    })
    .await?;

    match found {
        Some(portfolio) if portfolio.is_public => {
            counter.record(&portfolio.id);
            Ok(HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(render_page(&portfolio)))
        }
        _ => Ok(HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(render_not_found())),
    }
}

/// Host page embedding the stored document.
pub fn render_page(portfolio: &SavedPortfolio) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
html, body {{ margin: 0; height: 100%; overflow: hidden; background: #fff; }}
iframe {{ width: 100%; height: 100%; border: none; display: block; }}
.pb-badge {{ position: fixed; bottom: 16px; right: 16px; z-index: 50; }}
.pb-badge a {{ background: rgba(0, 0, 0, 0.8); color: #fff; padding: 4px 12px; border-radius: 9999px;
  font: 12px system-ui, -apple-system, sans-serif; text-decoration: none; }}
.pb-badge a:hover {{ background: #000; }}
</style>
</head>
<body>
<iframe title="Portfolio" sandbox="{sandbox}" srcdoc="{srcdoc}"></iframe>
<div class="pb-badge"><a href="/" target="_blank" rel="noopener noreferrer">Built with Portfolio Builder</a></div>
</body>
</html>"#,
        title = escape_attr(&portfolio.name),
        sandbox = PUBLIC_SANDBOX,
        srcdoc = escape_attr(&portfolio.html_content),
    )
}

pub fn render_not_found() -> String {
    r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Portfolio Not Found</title></head>
<body style="display:flex;flex-direction:column;align-items:center;justify-content:center;height:100vh;margin:0;font-family:system-ui,sans-serif;gap:16px">
<h1 style="font-size:24px;margin:0">Portfolio Not Found</h1>
<p style="color:#64748b;margin:0">The portfolio you are looking for does not exist or has been removed.</p>
</body>
</html>"#
        .to_string()
}

/// Escapes text for a double-quoted attribute value.
fn escape_attr(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{fixtures::new_portfolio, new_record};

    #[test]
    fn stored_html_is_embedded_as_escaped_srcdoc() {
        let mut new = new_portfolio("Jane & Co");
        new.html_content = r#"<p class="x">a & b</p>"#.to_string();
        let portfolio = new_record("u1", new, "http://localhost");
        let page = render_page(&portfolio);

        assert!(page.contains(r#"srcdoc="&lt;p class=&quot;x&quot;&gt;a &amp; b&lt;/p&gt;""#));
        assert!(page.contains(&format!(r#"sandbox="{PUBLIC_SANDBOX}""#)));
        assert!(page.contains("Built with Portfolio Builder"));
        assert!(page.contains("<title>Jane &amp; Co</title>"));
        assert!(!page.contains("contenteditable"));
    }
}
