use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use optcg_companion::api_client::USER_HEADER;

use crate::error::AppError;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Dispatches blocking companion operations to a thread pool.
    pub companion: optcg_companion::AsyncCompanion,

    /// Async HTTP client for marketplace forwarding and proxy sheet images.
    pub http: reqwest::Client,

    /// Client for the image passthrough. Never follows redirects, so only
    /// the allowed image hosts are ever contacted.
    pub image_http: reqwest::Client,

    /// Base URL of the marketplace search service, when configured.
    pub marketplace_url: Option<String>,
}

pub fn image_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Caller identity taken from the `x-user-id` header.
pub struct CurrentUser(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| AppError::unauthorized(format!("Missing {USER_HEADER} header")))?;
        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(CurrentUser)
            .ok_or_else(|| AppError::bad_request(format!("Invalid {USER_HEADER} header")))
    }
}
