use actix_web::{web, HttpRequest, HttpResponse};

use super::load_owned;
use crate::error::ServiceResult;
use crate::services::{owner_id, Store};

/// `GET /api/portfolios/{id}`
pub(crate) async fn process(
    req: HttpRequest,
    store: Store,
    id: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let portfolio = load_owned(&store, id.into_inner(), owner_id(&req)).await?;
    Ok(HttpResponse::Ok().json(portfolio))
}
