use std::sync::Arc;

use axum::extract::{Path, Query, RawQuery, State};
use axum::response::Json;
use optcg_companion::models::{Card, Deck, LinkRequest};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/admin/decks/user/{id}
pub async fn user_decks(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Deck>>, AppError> {
    let decks = state
        .companion
        .run(move |c| c.decks().list_by_user(user_id))
        .await?;
    Ok(Json(decks))
}

/// GET /api/admin/cards/{id}
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i64>,
) -> Result<Json<Card>, AppError> {
    let card = state.companion.run(move |c| c.cards().require(card_id)).await?;
    Ok(Json(card))
}

/// POST /api/admin/cards/{id}/tcgplayer
pub async fn link_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i64>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<Card>, AppError> {
    let card = state
        .companion
        .run(move |c| c.tcgplayer().link(card_id, &body))
        .await?;
    Ok(Json(card))
}

/// DELETE /api/admin/cards/{id}/tcgplayer
pub async fn unlink_card(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i64>,
) -> Result<Json<Card>, AppError> {
    let card = state
        .companion
        .run(move |c| c.tcgplayer().unlink(card_id))
        .await?;
    Ok(Json(card))
}

/// POST /api/admin/cards/{id}/tcgplayer/missing
pub async fn mark_missing(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i64>,
) -> Result<Json<Card>, AppError> {
    let card = state
        .companion
        .run(move |c| c.tcgplayer().mark_missing(card_id))
        .await?;
    Ok(Json(card))
}

/// DELETE /api/admin/cards/{id}/tcgplayer/missing
pub async fn unmark_missing(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<i64>,
) -> Result<Json<Card>, AppError> {
    let card = state
        .companion
        .run(move |c| c.tcgplayer().unmark_missing(card_id))
        .await?;
    Ok(Json(card))
}

/// GET /api/admin/tcgplayer/unlinked
pub async fn unlinked_cards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Card>>, AppError> {
    let cards = state.companion.run(|c| c.tcgplayer().unlinked()).await?;
    Ok(Json(cards))
}

// -- Marketplace passthrough ---------------------------------------------

#[derive(Deserialize)]
pub struct SearchByNameParams {
    pub name: Option<String>,
}

/// GET /api/admin/tcgplayer/search?q=...&...
///
/// The text query and every filter parameter are forwarded as sent.
pub async fn search(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, AppError> {
    let query = query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing search parameters"))?;
    forward(&state.http, state.marketplace_url.as_deref(), "search", Some(&query)).await
}

/// GET /api/admin/tcgplayer/search-by-name?name=...
pub async fn search_by_name(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchByNameParams>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, AppError> {
    if params.name.is_none() {
        return Err(AppError::bad_request("Missing required query parameter: name"));
    }
    forward(
        &state.http,
        state.marketplace_url.as_deref(),
        "search-by-name",
        query.as_deref(),
    )
    .await
}

/// GET /api/admin/tcgplayer/products/{id}
pub async fn product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    forward(
        &state.http,
        state.marketplace_url.as_deref(),
        &format!("products/{product_id}"),
        None,
    )
    .await
}

/// Marketplace URL for `path`, carrying the caller's raw query string.
fn marketplace_url(base: &str, path: &str, query: Option<&str>) -> String {
    let mut url = format!("{}/{}", base.trim_end_matches('/'), path);
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(q);
    }
    url
}

/// Relay a GET to the marketplace service and pass its JSON through.
async fn forward(
    http: &reqwest::Client,
    base: Option<&str>,
    path: &str,
    query: Option<&str>,
) -> Result<Json<Value>, AppError> {
    let base =
        base.ok_or_else(|| AppError::unavailable("Marketplace search is not configured"))?;
    let url = marketplace_url(base, path, query);

    let resp = http
        .get(&url)
        .send()
        .await
        .map_err(|e| AppError::bad_gateway(format!("Marketplace request failed: {e}")))?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(AppError::not_found(format!("Nothing found at {path}")));
    }
    if !resp.status().is_success() {
        return Err(AppError::bad_gateway(format!(
            "Marketplace returned status {}",
            resp.status()
        )));
    }

    let body: Value = resp
        .json()
        .await
        .map_err(|e| AppError::bad_gateway(format!("Invalid JSON from marketplace: {e}")))?;
    Ok(Json(body))
}
