use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use optcg_companion::models::Card;
use optcg_companion::queries::{CardPage, FullCardsParams};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/cards/full?colors=Red,Green&setCode=OP05&limit=200&includeAlternates=true
///
/// Filtered catalog with marketplace links applied. Any failure is a 500
/// with an `{"error"}` body.
pub async fn full_cards(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FullCardsParams>,
) -> Result<Json<CardPage>, AppError> {
    let page = state
        .companion
        .run(move |c| c.cards().full(&params))
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(Json(page))
}

/// GET /api/cards/leaders
pub async fn leaders(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Card>>, AppError> {
    let leaders = state.companion.run(|c| c.cards().leaders()).await?;
    Ok(Json(leaders))
}
