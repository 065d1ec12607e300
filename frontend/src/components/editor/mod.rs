//! Template editor: root module wiring the Yew `Component` implementation
//! with submodules for state, update logic, view rendering, the sandbox
//! frame bridge and helpers.
//!
//! Responsibilities
//! - Re-export `Msg`, `EditorProps` and `EditorComponent`.
//! - Provide the `Component` implementation that delegates to
//!   `update::update` and `view::view`.
//! - On first render, load the document to edit: the template document the
//!   backend loader prepared for `template_id`, or the saved portfolio for
//!   `portfolio_id`.

use common::catalog::find_template;
use common::editor::loader::LoadedDocument;
use common::editor::EditorError;
use common::model::portfolio::SavedPortfolio;
use common::requests::OWNER_HEADER;
use gloo_net::http::Request;
use yew::platform::spawn_local;
use yew::prelude::*;

mod frame;
mod helpers;
mod messages;
mod props;
mod state;
mod update;
mod view;

use helpers::{error_message, owner_id, UnloadGuard};
pub use messages::Msg;
pub use props::EditorProps;
pub use state::EditorComponent;

impl Component for EditorComponent {
    type Message = Msg;
    type Properties = EditorProps;

    fn create(_ctx: &Context<Self>) -> Self {
        let mut component = EditorComponent::new();
        component.unload_guard = UnloadGuard::install();
        component
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        update::update(self, ctx, msg)
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        view::view(self, ctx)
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render && !self.loaded {
            self.loaded = true;
            let props = ctx.props();
            let link = ctx.link().clone();

            if let Some(template_id) = props.template_id {
                spawn_local(async move {
                    link.send_message(fetch_template(template_id).await);
                });
            } else if let Some(portfolio_id) = props.portfolio_id.clone() {
                spawn_local(async move {
                    link.send_message(fetch_portfolio(&portfolio_id).await);
                });
            } else {
                link.send_message(Msg::LoadFailed("Nothing to edit.".to_string()));
            }
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        helpers::set_window_dirty_flag(false);
    }
}

/// Fetches the template document with its asset paths already rewritten
/// against the template directory.
async fn fetch_template(template_id: u32) -> Msg {
    let Some(template) = find_template(template_id) else {
        return Msg::LoadFailed(format!("Template {template_id} not found."));
    };
    let path = format!("/api/templates/{template_id}/document");
    let template_path = template.template_path.clone();
    let fetch_error = |reason: String| {
        Msg::LoadFailed(
            EditorError::TemplateFetch {
                path: template_path.clone(),
                reason,
            }
            .to_string(),
        )
    };

    match Request::get(&path).send().await {
        Ok(resp) if resp.ok() => match resp.json::<LoadedDocument>().await {
            Ok(document) => Msg::TemplateFetched { template, document },
            Err(e) => fetch_error(e.to_string()),
        },
        // the backend already phrases its failures for the user
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Msg::LoadFailed(error_message(status, &body))
        }
        Err(e) => fetch_error(e.to_string()),
    }
}

async fn fetch_portfolio(portfolio_id: &str) -> Msg {
    let response = Request::get(&format!("/api/portfolios/{portfolio_id}"))
        .header(OWNER_HEADER, &owner_id())
        .send()
        .await;

    match response {
        Ok(resp) if resp.ok() => match resp.json::<SavedPortfolio>().await {
            Ok(portfolio) => Msg::PortfolioFetched(portfolio),
            Err(e) => Msg::LoadFailed(format!("Failed to read portfolio: {e}")),
        },
        Ok(resp) => {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            Msg::LoadFailed(error_message(status, &body))
        }
        Err(e) => Msg::LoadFailed(format!("Failed to load portfolio: {e}")),
    }
}
