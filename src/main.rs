mod api;
mod auth;
mod catalog;
mod config;
mod db;
mod error;
mod game;
mod services;
mod session;

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use api::AppState;
use config::Config;
use session::SessionStore;

#[tokio::main]
async fn main() {
    // Try loading config from current directory, then parent directory
    let config = Config::load("config.toml")
        .or_else(|_| Config::load("../config.toml"))
        .expect("Failed to load config.toml");

    let host = config.server.host.clone();
    let port = config.server.port;

    let db = db::pool::init_pool(&config.database.url)
        .await
        .expect("Failed to initialize database");
    println!("Database initialized, catalog seeded");
    println!(
        "Catalog: {} heroes, {} chapters, {} banners",
        catalog::HERO_TEMPLATES.len(),
        catalog::CHAPTERS.len(),
        catalog::BANNERS.len()
    );

    let sessions = SessionStore::new();
    println!("Battle session store ready");

    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE]);

    let state = Arc::new(AppState { config, db, sessions });

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(api::router(state))
        .layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    println!("Tam Quốc backend listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}

async fn health_check() -> &'static str {
    "OK"
}
