//! Concurrent card image loading for proxy sheets.

use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use image::imageops::FilterType;
use image::RgbImage;
use url::Url;

use crate::config;
use crate::error::{CompanionError, Result};
use crate::proxy::layout;
use crate::proxy::ProxyCard;

/// Outcome of loading one card image.
#[derive(Debug, Clone)]
pub enum CellImage {
    Loaded(RgbImage),
    Failed(String),
}

/// Rewrite images hosted on [`config::PROXIED_IMAGE_HOSTS`] to go through the
/// same-origin image proxy under `api_base`. Relative paths are resolved
/// against `api_base`; other absolute URLs are returned unchanged.
pub fn resolve_image_url(raw: &str, api_base: &str) -> Result<Url> {
    let base = Url::parse(api_base)
        .map_err(|e| CompanionError::InvalidArgument(format!("Bad API base {api_base}: {e}")))?;

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return base.join(raw).map_err(|e| {
                CompanionError::InvalidArgument(format!("Bad image path {raw}: {e}"))
            });
        }
        Err(e) => {
            return Err(CompanionError::InvalidArgument(format!(
                "Bad image URL {raw}: {e}"
            )))
        }
    };

    let proxied = url
        .host_str()
        .map(|host| config::PROXIED_IMAGE_HOSTS.contains(&host))
        .unwrap_or(false);
    if !proxied {
        return Ok(url);
    }

    let mut proxy = base
        .join(config::IMAGE_PROXY_PATH)
        .map_err(|e| CompanionError::InvalidArgument(e.to_string()))?;
    proxy.query_pairs_mut().append_pair("url", url.as_str());
    Ok(proxy)
}

/// Fetches card images with an async HTTP client.
///
/// With an `api_base`, images on the problematic hosts are routed through the
/// companion API's image proxy; without one they are fetched directly.
pub struct ImageLoader {
    client: reqwest::Client,
    api_base: Option<String>,
}

impl ImageLoader {
    pub fn new(client: reqwest::Client, api_base: Option<String>) -> Self {
        Self { client, api_base }
    }

    /// Load the image of every distinct card, all requests in flight at once.
    ///
    /// Never fails as a whole: each card maps to [`CellImage::Loaded`] or
    /// [`CellImage::Failed`].
    pub async fn load_all(&self, cards: &[ProxyCard]) -> HashMap<i64, CellImage> {
        let mut seen = HashSet::new();
        let unique: Vec<&ProxyCard> = cards.iter().filter(|c| seen.insert(c.id)).collect();

        log::debug!("Loading {} proxy images", unique.len());
        let results = join_all(unique.iter().map(|card| self.load_one(card))).await;

        unique
            .into_iter()
            .map(|c| c.id)
            .zip(results)
            .collect()
    }

    async fn load_one(&self, card: &ProxyCard) -> CellImage {
        match self.fetch(card).await {
            Ok(img) => CellImage::Loaded(img),
            Err(e) => {
                log::warn!("Image for {} ({}) failed: {}", card.name, card.code, e);
                CellImage::Failed(e.to_string())
            }
        }
    }

    async fn fetch(&self, card: &ProxyCard) -> Result<RgbImage> {
        let raw = card
            .image
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CompanionError::NotFound(format!("No image for {}", card.code)))?;

        let url = match self.api_base {
            Some(ref base) => resolve_image_url(raw, base)?,
            None => Url::parse(raw)
                .map_err(|e| CompanionError::InvalidArgument(format!("Bad image URL {raw}: {e}")))?,
        };

        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let decoded = image::load_from_memory(&bytes)?;
        let (width, height) = layout::card_pixels();
        Ok(decoded.resize_exact(width, height, FilterType::Triangle).to_rgb8())
    }
}
