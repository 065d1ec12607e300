use actix_web::{web, HttpRequest, HttpResponse};

use super::load_owned;
use crate::error::{ServiceError, ServiceResult};
use crate::services::{owner_id, with_store, Store};

/// `DELETE /api/portfolios/{id}`
pub(crate) async fn process(
    req: HttpRequest,
    store: Store,
    id: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let id = id.into_inner();
    load_owned(&store, id.clone(), owner_id(&req)).await?;
    let removed = with_store(&store, {
        let id = id.clone();
        move |s| s.delete(&id)
    })
    .await?;
    if !removed {
        return Err(ServiceError::NotFound(format!("Portfolio {id}")));
    }
    log::info!("deleted portfolio {id}");
    Ok(HttpResponse::NoContent().finish())
}
