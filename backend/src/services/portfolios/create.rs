use actix_web::{web, HttpRequest, HttpResponse};
use common::catalog::find_template;
use common::model::history::HistoryKind;
use common::model::portfolio::NewPortfolio;

use crate::error::{ServiceError, ServiceResult};
use crate::services::{owner_id, with_store, Store};

/// `POST /api/portfolios`
pub(crate) async fn process(
    req: HttpRequest,
    store: Store,
    payload: web::Json<NewPortfolio>,
) -> ServiceResult<HttpResponse> {
    let portfolio = payload.into_inner();
    validate(&portfolio)?;
    let owner = owner_id(&req);

    let saved = with_store(&store, move |s| {
        let saved = s.create(&owner, portfolio)?;
        s.add_history(&owner, HistoryKind::Create, "Created new portfolio", Some(&saved.name))?;
        Ok(saved)
    })
    .await?;
    log::info!("created portfolio {} ({}) for {}", saved.id, saved.name, saved.owner_id);
    Ok(HttpResponse::Created().json(saved))
}

fn validate(portfolio: &NewPortfolio) -> ServiceResult<()> {
    if find_template(portfolio.template_id).is_none() {
        return Err(ServiceError::BadRequest(format!(
            "unknown template {}",
            portfolio.template_id
        )));
    }
    if portfolio.name.trim().is_empty() {
        return Err(ServiceError::BadRequest("portfolio name cannot be empty".to_string()));
    }
    if portfolio.html_content.trim().is_empty() {
        return Err(ServiceError::BadRequest("portfolio content cannot be empty".to_string()));
    }
    Ok(())
}
