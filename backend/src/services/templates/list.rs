use actix_web::{web, HttpResponse, Responder};
use common::catalog::{templates, templates_in};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogQuery {
    category: Option<String>,
}

pub(crate) async fn process(query: web::Query<CatalogQuery>) -> impl Responder {
    let catalog = match query.category.as_deref() {
        Some(category) => templates_in(category),
        None => templates(),
    };
    HttpResponse::Ok().json(catalog)
}
