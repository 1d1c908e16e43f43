use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use optcg_companion::config::PROXIED_IMAGE_HOSTS;
use optcg_companion::proxy::{ImageLoader, PdfDocument, ProxyEntry, ProxySheet};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::{AppState, CurrentUser};

#[derive(Deserialize)]
pub struct ImageParams {
    pub url: Option<String>,
}

/// GET /api/proxy-image?url=...
///
/// Same-origin passthrough for card images on hosts that block
/// cross-origin reads. Only the known image hosts are relayed.
pub async fn proxy_image(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImageParams>,
) -> Result<Response, AppError> {
    let raw = params
        .url
        .ok_or_else(|| AppError::bad_request("Missing required query parameter: url"))?;
    let url = proxied_url(&raw)?;
    let (content_type, bytes) = fetch_image(&state.image_http, url).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Parse `raw` and require one of the proxied image hosts.
fn proxied_url(raw: &str) -> Result<reqwest::Url, AppError> {
    let url = reqwest::Url::parse(raw).map_err(|e| AppError::bad_request(format!("Bad url: {e}")))?;
    let allowed = url
        .host_str()
        .map(|h| PROXIED_IMAGE_HOSTS.contains(&h))
        .unwrap_or(false);
    if !allowed {
        return Err(AppError::bad_request(format!(
            "Host {} is not proxied",
            url.host_str().unwrap_or("")
        )));
    }
    Ok(url)
}

/// Download an image. Any non-2xx answer, redirects included, is a bad
/// gateway.
async fn fetch_image(
    client: &reqwest::Client,
    url: reqwest::Url,
) -> Result<(String, Bytes), AppError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::bad_gateway(format!("Image request failed: {e}")))?;
    if !resp.status().is_success() {
        return Err(AppError::bad_gateway(format!(
            "Image host returned status {}",
            resp.status()
        )));
    }

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| AppError::bad_gateway(format!("Image download failed: {e}")))?;
    Ok((content_type, bytes))
}

/// POST /api/proxy-sheet
///
/// Body: the quantity-keyed entries to print. Responds with the PDF.
pub async fn proxy_sheet(
    State(state): State<Arc<AppState>>,
    Json(entries): Json<Vec<ProxyEntry>>,
) -> Result<Response, AppError> {
    let sheet = ProxySheet::new(&entries)?;
    let doc = sheet.render(&loader(&state)).await?;
    Ok(pdf_response(&doc))
}

/// GET /api/lists/{id}/proxy-sheet
pub async fn list_proxy_sheet(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(list_id): Path<i64>,
) -> Result<Response, AppError> {
    let doc = state
        .companion
        .list_proxy_sheet(user_id, list_id, &loader(&state))
        .await?;
    Ok(pdf_response(&doc))
}

/// Images are fetched server-side, so no same-origin rewriting is needed.
pub(crate) fn loader(state: &AppState) -> ImageLoader {
    ImageLoader::new(state.http.clone(), None)
}

pub(crate) fn pdf_response(doc: &PdfDocument) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"proxies.pdf\""),
        ],
        doc.to_bytes(),
    )
        .into_response()
}
