use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use optcg_companion::models::{NewUserList, UserList};
use optcg_companion::queries::Slot;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::{AppState, CurrentUser};

#[derive(Deserialize)]
pub struct SetQuantityBody {
    pub quantity: i64,
    #[serde(default)]
    pub slot: Option<Slot>,
}

/// GET /api/lists
///
/// The caller's lists. The collection is created on first visit and is
/// always listed first.
pub async fn list_lists(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<UserList>>, AppError> {
    let lists = state
        .companion
        .run(move |c| {
            c.lists().ensure_collection(user_id)?;
            c.lists().list(user_id)
        })
        .await?;
    Ok(Json(lists))
}

/// POST /api/lists
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<NewUserList>,
) -> Result<(StatusCode, Json<UserList>), AppError> {
    let list = state
        .companion
        .run(move |c| c.lists().create(user_id, &body))
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// GET /api/lists/{id}
pub async fn get_list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<UserList>, AppError> {
    let list = state
        .companion
        .run(move |c| c.lists().get(user_id, id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("List {id} not found")))?;
    Ok(Json(list))
}

/// PUT /api/lists/{id}/cards/{card_id}
///
/// Body: `{ "quantity": 2, "slot": { "page": 1, "row": 1, "column": 3 } }`.
/// A quantity of zero removes the card.
pub async fn set_card_quantity(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path((id, card_id)): Path<(i64, i64)>,
    Json(body): Json<SetQuantityBody>,
) -> Result<Json<UserList>, AppError> {
    let list = state
        .companion
        .run(move |c| {
            c.lists()
                .set_card_quantity(user_id, id, card_id, body.quantity, body.slot)
        })
        .await?;
    Ok(Json(list))
}

/// DELETE /api/lists/{id}
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .companion
        .run(move |c| c.lists().delete(user_id, id))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("List {id} not found")))
    }
}
