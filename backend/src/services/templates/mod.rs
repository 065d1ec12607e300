//! # Template Service Module
//!
//! Read-only access to the template catalog and to the template documents
//! the editor starts from.
//!
//! ## Registered Routes
//! - **`GET /api/templates`** (`list::process`): the catalog, optionally
//!   filtered with `?category=IT|CSE|MECH`.
//! - **`GET /api/templates/{template_id}`** (`get::process`): one catalog
//!   entry.
//! - **`GET /api/templates/{template_id}/document`** (`document::process`):
//!   the template's HTML with relative asset paths rewritten against the
//!   template directory, ready to be parsed by the editor.
//!
//! The asset files themselves are served statically under `/templates` (see
//! `crate::configure_app`).

mod document;
mod get;
mod list;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/templates";

/// URL prefix the templates directory is served under.
pub const TEMPLATES_URL_PREFIX: &str = "/templates";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/{template_id}", get().to(get::process))
        .route("/{template_id}/document", get().to(document::process))
}
