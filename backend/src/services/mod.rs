//! HTTP services. Each submodule exposes `configure_routes()` returning the
//! actix `Scope` it owns; `crate::configure_app` mounts them all.

pub mod history;
pub mod portfolios;
pub mod public;
pub mod templates;

use std::sync::Arc;

use actix_web::{web, HttpRequest};
use common::requests::{ANONYMOUS_OWNER, OWNER_HEADER};

use crate::error::ServiceResult;
use crate::storage::PortfolioStore;

/// The store as registered in the application data.
pub type Store = web::Data<Arc<dyn PortfolioStore>>;

/// Owner of the request, from the `X-Owner-Id` header.
pub(crate) fn owner_id(req: &HttpRequest) -> String {
    req.headers()
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_OWNER)
        .to_string()
}

/// Runs a store call on the blocking pool.
pub(crate) async fn with_store<T, F>(store: &Store, f: F) -> ServiceResult<T>
where
    F: FnOnce(&dyn PortfolioStore) -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store.get_ref());
    web::block(move || f(store.as_ref())).await?
}
