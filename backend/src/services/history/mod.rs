//! # History Service Module
//!
//! The owner's activity log, written by the portfolio service on every
//! create and update.
//!
//! ## Registered Routes
//! - **`GET /api/history?limit=N`**: newest first, `limit` defaults to 50
//!   and is capped at 200.
//! - **`DELETE /api/history`**: clears the owner's log.

use actix_web::web::{delete, get, scope};
use actix_web::{web, HttpRequest, HttpResponse, Scope};
use common::requests::HistoryQuery;

use super::{owner_id, with_store, Store};
use crate::error::ServiceResult;

const API_PATH: &str = "/api/history";
const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", delete().to(clear))
}

async fn list(req: HttpRequest, store: Store, query: web::Query<HistoryQuery>) -> ServiceResult<HttpResponse> {
    let owner = owner_id(&req);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let items = with_store(&store, move |s| s.list_history(&owner, limit)).await?;
    Ok(HttpResponse::Ok().json(items))
}

async fn clear(req: HttpRequest, store: Store) -> ServiceResult<HttpResponse> {
    let owner = owner_id(&req);
    let removed = with_store(&store, {
        let owner = owner.clone();
        move |s| s.clear_history(&owner)
    })
    .await?;
    log::info!("cleared {removed} history entries for {owner}");
    Ok(HttpResponse::NoContent().finish())
}
