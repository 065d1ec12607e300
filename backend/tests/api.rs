use std::path::Path;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use backend::config::Config;
use backend::storage::{MemoryStore, PortfolioStore};
use backend::view_counter::ViewCounter;
use common::catalog::find_template;
use common::editor::loader::LoadedDocument;
use common::model::history::{HistoryItem, HistoryKind};
use common::model::portfolio::{NewPortfolio, PortfolioUpdate, SavedPortfolio};
use common::model::template::Template;
use common::requests::{ApiError, OWNER_HEADER};
use pretty_assertions::assert_eq;

fn test_config(templates_dir: &Path) -> Config {
    Config::from_lookup(|key| match key {
        "PB_TEMPLATES_DIR" => Some(templates_dir.display().to_string()),
        "PB_PUBLIC_BASE_URL" => Some("https://folio.example.com".to_string()),
        _ => None,
    })
}

fn new_portfolio(name: &str) -> NewPortfolio {
    let template = find_template(1).unwrap();
    NewPortfolio {
        template_id: template.id,
        template_name: template.name,
        preview_image: template.preview_image,
        name: name.to_string(),
        html_content: "<!DOCTYPE html><html><head></head><body><h1>Jane</h1></body></html>".to_string(),
        style: template.style,
    }
}

macro_rules! app {
    ($store:expr, $counter:expr, $config:expr) => {{
        let store: Arc<dyn PortfolioStore> = $store.clone();
        let counter = $counter.clone();
        let config = $config.clone();
        test::init_service(
            App::new().configure(move |cfg| backend::configure_app(cfg, store, counter, config)),
        )
        .await
    }};
}

#[actix_web::test]
async fn portfolio_lifecycle_with_version_check() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn PortfolioStore> = Arc::new(MemoryStore::new("https://folio.example.com"));
    let (counter, _rx) = ViewCounter::channel(16);
    let app = app!(store, counter, test_config(dir.path()));

    let req = test::TestRequest::post()
        .uri("/api/portfolios")
        .insert_header((OWNER_HEADER, "u1"))
        .set_json(new_portfolio("Hudson Portfolio"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: SavedPortfolio = test::read_body_json(resp).await;
    assert_eq!(created.owner_id, "u1");
    assert_eq!(created.version, 1);
    assert!(!created.is_public);
    assert!(created.share_link.starts_with("https://folio.example.com/portfolio/"));

    let req = test::TestRequest::get()
        .uri("/api/portfolios")
        .insert_header((OWNER_HEADER, "u1"))
        .to_request();
    let listed: Vec<SavedPortfolio> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, vec![created.clone()]);

    let update = PortfolioUpdate {
        html_content: Some("<!DOCTYPE html><html><head></head><body><h1>John</h1></body></html>".into()),
        expected_version: Some(1),
        ..Default::default()
    };
    let req = test::TestRequest::put()
        .uri(&format!("/api/portfolios/{}", created.id))
        .insert_header((OWNER_HEADER, "u1"))
        .set_json(&update)
        .to_request();
    let updated: SavedPortfolio = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.version, 2);
    assert!(updated.html_content.contains("John"));

    // a second tab still holding version 1
    let req = test::TestRequest::put()
        .uri(&format!("/api/portfolios/{}", created.id))
        .insert_header((OWNER_HEADER, "u1"))
        .set_json(&update)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let err: ApiError = test::read_body_json(resp).await;
    assert_eq!(err.kind, "conflict");

    let req = test::TestRequest::get()
        .uri("/api/history")
        .insert_header((OWNER_HEADER, "u1"))
        .to_request();
    let history: Vec<HistoryItem> = test::call_and_read_body_json(&app, req).await;
    let kinds: Vec<HistoryKind> = history.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HistoryKind::Edit, HistoryKind::Create]);
    assert_eq!(history[1].portfolio.as_deref(), Some("Hudson Portfolio"));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/portfolios/{}", created.id))
        .insert_header((OWNER_HEADER, "u1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/portfolios/{}", created.id))
        .insert_header((OWNER_HEADER, "u1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri("/api/history")
        .insert_header((OWNER_HEADER, "u1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    assert!(store.list_history("u1", 50).unwrap().is_empty());
}

#[actix_web::test]
async fn other_owners_cannot_see_or_change_a_portfolio() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn PortfolioStore> = Arc::new(MemoryStore::new("http://localhost"));
    let (counter, _rx) = ViewCounter::channel(16);
    let app = app!(store, counter, test_config(dir.path()));
    let saved = store.create("u1", new_portfolio("Private")).unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/portfolios/{}", saved.id))
        .insert_header((OWNER_HEADER, "u2"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&format!("/api/portfolios/{}", saved.id))
        .set_json(PortfolioUpdate {
            name: Some("Taken".into()),
            ..Default::default()
        })
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.get(&saved.id).unwrap().unwrap().name, "Private");
}

#[actix_web::test]
async fn invalid_payloads_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn PortfolioStore> = Arc::new(MemoryStore::new("http://localhost"));
    let (counter, _rx) = ViewCounter::channel(16);
    let app = app!(store, counter, test_config(dir.path()));

    let mut unknown_template = new_portfolio("X");
    unknown_template.template_id = 999;
    let req = test::TestRequest::post()
        .uri("/api/portfolios")
        .set_json(unknown_template)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let saved = store.create("anonymous", new_portfolio("Mine")).unwrap();
    let req = test::TestRequest::put()
        .uri(&format!("/api/portfolios/{}", saved.id))
        .set_json(PortfolioUpdate::default())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn template_catalog_and_documents() {
    let dir = tempfile::tempdir().unwrap();
    let template = find_template(3).unwrap();
    let file = dir.path().join("mark/index.html");
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(
        &file,
        r#"<!DOCTYPE html><html><head><link href="css/style.css" rel="stylesheet"></head><body><img src="./img/a.png"></body></html>"#,
    )
    .unwrap();
    std::fs::create_dir_all(dir.path().join("mark/css")).unwrap();
    std::fs::write(dir.path().join("mark/css/style.css"), "body { color: red; }").unwrap();

    let store: Arc<dyn PortfolioStore> = Arc::new(MemoryStore::new("http://localhost"));
    let (counter, _rx) = ViewCounter::channel(16);
    let app = app!(store, counter, test_config(dir.path()));

    let req = test::TestRequest::get().uri("/api/templates?category=MECH").to_request();
    let catalog: Vec<Template> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(catalog, vec![template.clone()]);

    let req = test::TestRequest::get().uri("/api/templates/3/document").to_request();
    let loaded: LoadedDocument = test::call_and_read_body_json(&app, req).await;
    assert!(loaded.html.contains(r#"href="/templates/mark/css/style.css""#));
    assert!(loaded.html.contains(r#"src="/templates/mark/img/a.png""#));

    // the rewritten asset path is served
    let req = test::TestRequest::get().uri("/templates/mark/css/style.css").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // catalog entry whose file is missing
    let req = test::TestRequest::get().uri("/api/templates/1/document").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ApiError = test::read_body_json(resp).await;
    assert_eq!(err.kind, "template_fetch");

    let req = test::TestRequest::get().uri("/api/templates/42").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn public_page_shows_published_portfolios_only() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn PortfolioStore> = Arc::new(MemoryStore::new("http://localhost"));
    let (counter, mut rx) = ViewCounter::channel(16);
    let app = app!(store, counter, test_config(dir.path()));

    // new portfolios are drafts until published
    let draft = store.create("u1", new_portfolio("Draft")).unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/portfolio/{}", draft.share_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    assert!(rx.try_recv().is_err());

    let publish = |public: bool, version: u64| {
        test::TestRequest::put()
            .uri(&format!("/api/portfolios/{}", draft.id))
            .insert_header((OWNER_HEADER, "u1"))
            .set_json(PortfolioUpdate {
                is_public: Some(public),
                expected_version: Some(version),
                ..Default::default()
            })
            .to_request()
    };
    let published: SavedPortfolio = test::call_and_read_body_json(&app, publish(true, 1)).await;
    assert!(published.is_public);
    assert_eq!(published.version, 2);
    assert_eq!(published.html_content, draft.html_content);

    let req = test::TestRequest::get()
        .uri(&format!("/portfolio/{}", draft.share_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("srcdoc="));
    assert!(body.contains("Built with Portfolio Builder"));
    assert!(!body.contains("pe-context-menu"));
    assert!(rx.try_recv().is_ok());

    let hidden: SavedPortfolio = test::call_and_read_body_json(&app, publish(false, 2)).await;
    assert!(!hidden.is_public);
    let req = test::TestRequest::get()
        .uri(&format!("/portfolio/{}", draft.share_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/portfolio/doesNotExist").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Portfolio Not Found"));
    assert!(rx.try_recv().is_err());
}
