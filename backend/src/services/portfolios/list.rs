use actix_web::{HttpRequest, HttpResponse};

use crate::error::ServiceResult;
use crate::services::{owner_id, with_store, Store};

/// `GET /api/portfolios`
pub(crate) async fn process(req: HttpRequest, store: Store) -> ServiceResult<HttpResponse> {
    let owner = owner_id(&req);
    let portfolios = with_store(&store, move |s| s.list(&owner)).await?;
    Ok(HttpResponse::Ok().json(portfolios))
}
