use actix_web::{web, HttpRequest, HttpResponse};
use common::model::history::HistoryKind;
use common::model::portfolio::PortfolioUpdate;

use super::load_owned;
use crate::error::{ServiceError, ServiceResult};
use crate::services::{owner_id, with_store, Store};

/// `PUT /api/portfolios/{id}`
pub(crate) async fn process(
    req: HttpRequest,
    store: Store,
    id: web::Path<String>,
    payload: web::Json<PortfolioUpdate>,
) -> ServiceResult<HttpResponse> {
    let update = payload.into_inner();
    if update.is_empty() {
        return Err(ServiceError::BadRequest("nothing to update".to_string()));
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ServiceError::BadRequest("portfolio name cannot be empty".to_string()));
    }
    let owner = owner_id(&req);
    let id = id.into_inner();
    load_owned(&store, id.clone(), owner.clone()).await?;

    let saved = with_store(&store, move |s| {
        let saved = s.update(&id, update)?;
        s.add_history(&owner, HistoryKind::Edit, "Updated portfolio", Some(&saved.name))?;
        Ok(saved)
    })
    .await?;
    log::info!("updated portfolio {} to version {}", saved.id, saved.version);
    Ok(HttpResponse::Ok().json(saved))
}
