mod error;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use env_logger::Env;
use tower_http::cors::CorsLayer;

use state::AppState;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut builder = optcg_companion::AsyncCompanion::builder()
        .offline(env_var("COMPANION_OFFLINE").is_some_and(|v| v == "1" || v == "true"));
    if let Some(dir) = env_var("COMPANION_CACHE_DIR") {
        builder = builder.cache_dir(dir);
    }
    if let Some(path) = env_var("COMPANION_DB") {
        builder = builder.database_path(path);
    }
    if let Some(url) = env_var("COMPANION_CATALOG_URL") {
        builder = builder.catalog_url(&url);
    }

    log::info!("Initializing companion...");
    let companion = builder.build().await?;
    match companion.catalog().await {
        Ok(catalog) => log::info!("Catalog ready ({} cards)", catalog.len()),
        Err(e) => log::warn!("Catalog not loaded yet: {e}"),
    }

    let state = Arc::new(AppState {
        companion,
        http: reqwest::Client::new(),
        image_http: state::image_client()?,
        marketplace_url: env_var("COMPANION_TCGPLAYER_URL"),
    });

    let app = Router::new()
        .route("/api/cards/full", get(routes::cards::full_cards))
        .route("/api/cards/leaders", get(routes::cards::leaders))
        .route(
            "/api/logs",
            get(routes::logs::list_logs).post(routes::logs::create_log),
        )
        .route("/api/logs/stats", get(routes::logs::log_stats))
        .route("/api/logs/{id}", axum::routing::delete(routes::logs::delete_log))
        .route(
            "/api/decks",
            get(routes::decks::list_decks).post(routes::decks::save_deck),
        )
        .route(
            "/api/decks/{id}",
            get(routes::decks::get_deck).delete(routes::decks::delete_deck),
        )
        .route("/api/decks/{id}/price", get(routes::decks::deck_price))
        .route("/api/decks/{id}/proxy-sheet", get(routes::decks::deck_proxy_sheet))
        .route(
            "/api/lists",
            get(routes::lists::list_lists).post(routes::lists::create_list),
        )
        .route(
            "/api/lists/{id}",
            get(routes::lists::get_list).delete(routes::lists::delete_list),
        )
        .route(
            "/api/lists/{id}/cards/{card_id}",
            put(routes::lists::set_card_quantity),
        )
        .route("/api/lists/{id}/proxy-sheet", get(routes::proxy::list_proxy_sheet))
        .route("/api/proxy-sheet", post(routes::proxy::proxy_sheet))
        .route("/api/proxy-image", get(routes::proxy::proxy_image))
        .route("/api/admin/decks/user/{id}", get(routes::admin::user_decks))
        .route("/api/admin/cards/{id}", get(routes::admin::get_card))
        .route(
            "/api/admin/cards/{id}/tcgplayer",
            post(routes::admin::link_card).delete(routes::admin::unlink_card),
        )
        .route(
            "/api/admin/cards/{id}/tcgplayer/missing",
            post(routes::admin::mark_missing).delete(routes::admin::unmark_missing),
        )
        .route("/api/admin/tcgplayer/unlinked", get(routes::admin::unlinked_cards))
        .route("/api/admin/tcgplayer/search", get(routes::admin::search))
        .route(
            "/api/admin/tcgplayer/search-by-name",
            get(routes::admin::search_by_name),
        )
        .route("/api/admin/tcgplayer/products/{id}", get(routes::admin::product))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = env_var("COMPANION_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
    log::info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
