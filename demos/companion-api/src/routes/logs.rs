use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use optcg_companion::models::{GameLog, LogStats, NewGameLog};

use crate::error::AppError;
use crate::state::{AppState, CurrentUser};

/// GET /api/logs
///
/// The caller's game logs, newest first.
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<GameLog>>, AppError> {
    let logs = state.companion.run(move |c| c.logs().list(user_id)).await?;
    Ok(Json(logs))
}

/// POST /api/logs
pub async fn create_log(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<NewGameLog>,
) -> Result<(StatusCode, Json<GameLog>), AppError> {
    let log = state
        .companion
        .run(move |c| c.logs().create(user_id, &body))
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// DELETE /api/logs/{id}
pub async fn delete_log(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .companion
        .run(move |c| c.logs().delete(user_id, id))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("Game log {id} not found")))
    }
}

/// GET /api/logs/stats
pub async fn log_stats(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<LogStats>, AppError> {
    let stats = state.companion.run(move |c| c.logs().stats(user_id)).await?;
    Ok(Json(stats))
}
