//! Portfolio builder backend: template catalog and documents, portfolio
//! persistence, activity history and the public portfolio renderer.

pub mod assets;
pub mod config;
pub mod error;
pub mod services;
pub mod storage;
pub mod view_counter;

use std::sync::Arc;

use actix_files::Files;
use actix_web::web;

use crate::config::Config;
use crate::services::templates::TEMPLATES_URL_PREFIX;
use crate::storage::PortfolioStore;
use crate::view_counter::ViewCounter;

/// Maximum JSON body size; saved documents carry inline data-URI images.
pub const JSON_LIMIT: usize = 10 * 1024 * 1024; // 10 MB

/// Registers application data and every API and public route. The frontend
/// fallback (`assets::serve_frontend`) is added by the caller as the
/// default service.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    store: Arc<dyn PortfolioStore>,
    counter: ViewCounter,
    config: Config,
) {
    let templates_dir = config.templates_dir.clone();
    cfg.app_data(web::JsonConfig::default().limit(JSON_LIMIT))
        .app_data(web::Data::new(store))
        .app_data(web::Data::new(counter))
        .app_data(web::Data::new(config))
        .service(services::templates::configure_routes())
        .service(services::portfolios::configure_routes())
        .service(services::history::configure_routes())
        .service(services::public::configure_routes())
        .service(Files::new(TEMPLATES_URL_PREFIX, templates_dir));
}
