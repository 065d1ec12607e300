use actix_web::{web, HttpResponse};
use common::catalog::find_template;

use crate::error::{ServiceError, ServiceResult};

/// `GET /api/templates/{template_id}`
pub(crate) async fn process(template_id: web::Path<u32>) -> ServiceResult<HttpResponse> {
    let id = template_id.into_inner();
    let template = find_template(id).ok_or_else(|| ServiceError::NotFound(format!("Template {id}")))?;
    Ok(HttpResponse::Ok().json(template))
}
