//! Application shell: picks what to show from the page path.
//!
//! The backend serves `index.html` for every unknown path, so the editor is
//! reached directly at `/editor/template/{id}` (fresh copy of a catalog
//! template) or `/editor/portfolio/{id}` (resume a saved portfolio). Any other
//! path shows the template catalog.

use common::catalog::templates;
use yew::{html, Component, Context, Html};

use crate::components::editor::EditorComponent;

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Template(u32),
    Portfolio(String),
    Catalog,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["editor", "template", id] => id.parse().map(Route::Template).unwrap_or(Route::Catalog),
            ["editor", "portfolio", id] => Route::Portfolio(id.to_string()),
            _ => Route::Catalog,
        }
    }

    pub fn current() -> Route {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .map(|p| Route::parse(&p))
            .unwrap_or(Route::Catalog)
    }
}

pub struct App {
    route: Route,
}

impl Component for App {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            route: Route::current(),
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        match &self.route {
            Route::Template(id) => html! { <EditorComponent template_id={Some(*id)} /> },
            Route::Portfolio(id) => html! { <EditorComponent portfolio_id={Some(id.clone())} /> },
            Route::Catalog => catalog_view(),
        }
    }
}

fn catalog_view() -> Html {
    html! {
        <div class="catalog">
            <h1>{"Choose a template"}</h1>
            <div class="catalog-grid">
                { for templates().into_iter().map(|t| html! {
                    <a class="catalog-card" href={format!("/editor/template/{}", t.id)}>
                        <img src={t.preview_image.clone()} alt={t.name.clone()} />
                        <div class="catalog-card-body">
                            <strong>{ &t.name }</strong>
                            <span>{ &t.description }</span>
                        </div>
                    </a>
                }) }
            </div>
        </div>
    }
}
