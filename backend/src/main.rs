use std::sync::Arc;
use std::thread;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use backend::assets::serve_frontend;
use backend::config::Config;
use backend::storage::{MemoryStore, PortfolioStore, SqliteStore};
use backend::view_counter::{start_view_updater, ViewCounter, VIEW_CHANNEL_CAPACITY};
use env_logger::Env;
use log::info;

const IN_MEMORY: &str = ":memory:";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();
    let url = config.bind_url();

    let store: Arc<dyn PortfolioStore> = if config.database.as_os_str() == IN_MEMORY {
        info!("using in-memory storage; portfolios are lost on exit");
        Arc::new(MemoryStore::new(config.public_base_url.clone()))
    } else {
        let sqlite = SqliteStore::open(&config.database, config.public_base_url.clone())
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Arc::new(sqlite)
    };

    let (counter, rx) = ViewCounter::channel(VIEW_CHANNEL_CAPACITY);
    let updater_store = store.clone();
    tokio::spawn(async move {
        start_view_updater(updater_store, rx).await;
    });

    if config.open_browser {
        let browser_url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            if let Err(e) = webbrowser::open(&browser_url) {
                log::warn!("could not open browser: {e}");
            }
        });
    }

    info!("Server running at {}", url);
    info!("Templates served from {}", config.templates_dir.display());

    let bind = (config.host.clone(), config.port);
    HttpServer::new(move || {
        let store = store.clone();
        let counter = counter.clone();
        let config = config.clone();
        App::new()
            .configure(move |cfg| backend::configure_app(cfg, store, counter, config))
            .default_service(web::route().to(serve_frontend))
    })
    .bind(bind)?
    .run()
    .await
}
