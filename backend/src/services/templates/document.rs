//! # Template Document Service
//!
//! Backs `GET /api/templates/{template_id}/document`, the first step of a new
//! editing session.
//!
//! 1. The id is looked up in the compiled-in catalog (`404` when unknown).
//! 2. The template file is read from the configured templates directory on
//!    the blocking pool. A missing or unreadable file is a
//!    `ServiceError::TemplateFetch`; the editor shows it and stays closed.
//! 3. `common::editor::loader::load_template_document` rewrites relative
//!    asset paths against the template's directory, and the resulting
//!    `LoadedDocument` is returned as JSON.

use std::path::{Path, PathBuf};

use actix_web::{web, HttpResponse};
use common::catalog::find_template;
use common::editor::loader::{load_template_document, LoadedDocument};
use common::model::template::Template;

use super::TEMPLATES_URL_PREFIX;
use crate::config::Config;
use crate::error::{ServiceError, ServiceResult};

pub(crate) async fn process(
    template_id: web::Path<u32>,
    config: web::Data<Config>,
) -> ServiceResult<HttpResponse> {
    let id = template_id.into_inner();
    let template = find_template(id).ok_or_else(|| ServiceError::NotFound(format!("Template {id}")))?;
    let templates_dir = config.templates_dir.clone();
    let document = web::block(move || read_template_document(&templates_dir, &template)).await??;
    Ok(HttpResponse::Ok().json(document))
}

/// File backing a template, below `templates_dir`.
pub fn template_file(templates_dir: &Path, template: &Template) -> PathBuf {
    let relative = template
        .template_path
        .strip_prefix(TEMPLATES_URL_PREFIX)
        .unwrap_or(&template.template_path)
        .trim_start_matches('/');
    templates_dir.join(relative)
}

/// Reads the template file and prepares it for the editor.
pub fn read_template_document(templates_dir: &Path, template: &Template) -> ServiceResult<LoadedDocument> {
    let path = template_file(templates_dir, template);
    let raw = std::fs::read_to_string(&path).map_err(|e| ServiceError::TemplateFetch {
        path: template.template_path.clone(),
        reason: format!("{}: {e}", path.display()),
    })?;
    log::info!("loaded template {} from {}", template.id, path.display());
    Ok(load_template_document(template, &raw))
}
