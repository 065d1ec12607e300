//! # Portfolio Service Module
//!
//! CRUD over saved portfolios for the owner named by the `X-Owner-Id`
//! header. Every handler reaches storage through the injected
//! `Arc<dyn PortfolioStore>`.
//!
//! ## Registered Routes
//! - **`POST /api/portfolios`** (`create::process`): first save of an editing
//!   session. Records a `create` history entry.
//! - **`GET /api/portfolios`** (`list::process`): the owner's portfolios.
//! - **`GET /api/portfolios/{id}`** (`get::process`): resume editing.
//! - **`PUT /api/portfolios/{id}`** (`update::process`): later saves. A stale
//!   `expectedVersion` is answered with `409 Conflict` and nothing is written.
//!   Records an `edit` history entry.
//! - **`DELETE /api/portfolios/{id}`** (`delete::process`).
//!
//! A portfolio owned by someone else is reported as not found.

mod create;
mod delete;
mod get;
mod list;
mod update;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;
use common::model::portfolio::SavedPortfolio;

use super::{with_store, Store};
use crate::error::{ServiceError, ServiceResult};

const API_PATH: &str = "/api/portfolios";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("", get().to(list::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}", put().to(update::process))
        .route("/{id}", delete().to(delete::process))
}

/// Loads a portfolio that belongs to `owner`.
async fn load_owned(store: &Store, id: String, owner: String) -> ServiceResult<SavedPortfolio> {
    let found = with_store(store, {
        let id = id.clone();
        move |s| s.get(&id)
    })
    .await?;
    match found {
        Some(portfolio) if portfolio.owner_id == owner => Ok(portfolio),
        _ => Err(ServiceError::NotFound(format!("Portfolio {id}"))),
    }
}
