use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Json, Response};
use optcg_companion::models::Deck;
use optcg_companion::pricing::PriceSummary;
use optcg_companion::proxy::{entries_from_deck, ProxySheet};
use optcg_companion::{Companion, CompanionError, DeckState};

use crate::error::AppError;
use crate::routes::proxy::{loader, pdf_response};
use crate::state::{AppState, CurrentUser};

/// GET /api/decks
pub async fn list_decks(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Deck>>, AppError> {
    let decks = state
        .companion
        .run(move |c| c.decks().list_by_user(user_id))
        .await?;
    Ok(Json(decks))
}

/// POST /api/decks
///
/// Creates the deck when `id` is absent, otherwise updates it. The owner is
/// always the caller.
pub async fn save_deck(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(mut deck): Json<Deck>,
) -> Result<Json<Deck>, AppError> {
    deck.user_id = user_id;
    let saved = state.companion.run(move |c| c.decks().save(&deck)).await?;
    Ok(Json(saved))
}

/// GET /api/decks/{id}
pub async fn get_deck(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Deck>, AppError> {
    let deck = state
        .companion
        .run(move |c| owned_deck(c, user_id, id))
        .await?;
    Ok(Json(deck))
}

/// DELETE /api/decks/{id}
pub async fn delete_deck(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .companion
        .run(move |c| c.decks().delete(user_id, id))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Deck {id} not found")))
    }
}

/// GET /api/decks/{id}/price
pub async fn deck_price(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<PriceSummary>, AppError> {
    let summary = state
        .companion
        .run(move |c| {
            let deck = owned_deck(c, user_id, id)?;
            c.price_deck(&DeckState::from_deck(&deck))
        })
        .await?;
    Ok(Json(summary))
}

/// GET /api/decks/{id}/proxy-sheet
///
/// The leader is printed along with the main deck.
pub async fn deck_proxy_sheet(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let deck = state
        .companion
        .run(move |c| owned_deck(c, user_id, id))
        .await?;
    let entries = entries_from_deck(&DeckState::from_deck(&deck), true);
    let doc = ProxySheet::new(&entries)?.render(&loader(&state)).await?;
    Ok(pdf_response(&doc))
}

/// Another user's deck is reported as missing.
fn owned_deck(c: &Companion, user_id: i64, id: i64) -> optcg_companion::Result<Deck> {
    c.decks()
        .get(id)?
        .filter(|d| d.user_id == user_id)
        .ok_or_else(|| CompanionError::NotFound(format!("Deck {} not found", id)))
}
