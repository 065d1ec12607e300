//! Serves the editor frontend.
//!
//! The compiled frontend (`frontend/dist`) is embedded at build time. With
//! `PB_STATIC_DIR` set, files are read from that directory instead, which is
//! handy while iterating on the frontend. Unknown paths fall back to
//! `index.html` so client-side routes such as `/editor/template/1` load the
//! app.

use std::path::{Component, Path, PathBuf};

use actix_web::{web, HttpRequest, HttpResponse};
use include_dir::{include_dir, Dir};
use mime_guess::from_path;

use crate::config::Config;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

const INDEX: &str = "index.html";

pub async fn serve_frontend(req: HttpRequest, config: web::Data<Config>) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { INDEX } else { path };

    match &config.static_dir {
        Some(dir) => serve_from_disk(dir.clone(), file_path.to_string()).await,
        None => serve_embedded(file_path),
    }
}

fn serve_embedded(file_path: &str) -> HttpResponse {
    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file(INDEX) {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Frontend bundle not found"),
        },
    }
}

async fn serve_from_disk(dir: PathBuf, file_path: String) -> HttpResponse {
    let Some(relative) = safe_relative(&file_path) else {
        return HttpResponse::NotFound().body("Not Found");
    };
    let read = web::block(move || {
        let candidate = dir.join(&relative);
        match std::fs::read(&candidate) {
            Ok(bytes) => Ok((relative, bytes)),
            Err(_) => std::fs::read(dir.join(INDEX)).map(|bytes| (PathBuf::from(INDEX), bytes)),
        }
    })
    .await;

    match read {
        Ok(Ok((served, bytes))) => {
            let mime = from_path(&served).first_or_octet_stream();
            HttpResponse::Ok().content_type(mime.as_ref()).body(bytes)
        }
        Ok(Err(e)) => {
            log::warn!("frontend file {file_path} unavailable: {e}");
            HttpResponse::NotFound().body("Not Found")
        }
        Err(e) => {
            log::error!("frontend read failed: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Rejects paths that would leave the static directory.
fn safe_relative(path: &str) -> Option<PathBuf> {
    let relative = Path::new(path);
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| relative.to_path_buf())
}
