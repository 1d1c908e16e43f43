//! Blocking HTTP client for the companion API.
//!
//! One method per endpoint. Error bodies of the form `{"error": "..."}` are
//! mapped back onto [`CompanionError`] variants by status code.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CompanionError, Result};
use crate::models::{Card, Deck, GameLog, LinkRequest, LogStats, NewGameLog};
use crate::queries::{CardPage, FullCardsParams};

/// Header carrying the id of the calling user.
pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiClient {
    base_url: String,
    user_id: Option<i64>,
    client: Client,
}

impl ApiClient {
    /// Create a client for the API at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: None,
            client,
        })
    }

    /// Identify requests as coming from `user_id`.
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match self.user_id {
            Some(id) => req.header(USER_HEADER, id.to_string()),
            None => req,
        }
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = check(req.send()?)?;
        Ok(resp.json()?)
    }

    fn send_empty(&self, req: RequestBuilder) -> Result<()> {
        check(req.send()?)?;
        Ok(())
    }

    // -- Cards -------------------------------------------------------------

    /// `GET /api/cards/full`.
    pub fn cards_full(&self, params: &FullCardsParams) -> Result<CardPage> {
        self.send(self.request(reqwest::Method::GET, "/api/cards/full").query(params))
    }

    /// `GET /api/cards/leaders`.
    pub fn leaders(&self) -> Result<Vec<Card>> {
        self.send(self.request(reqwest::Method::GET, "/api/cards/leaders"))
    }

    // -- Game logs ---------------------------------------------------------

    pub fn logs(&self) -> Result<Vec<GameLog>> {
        self.send(self.request(reqwest::Method::GET, "/api/logs"))
    }

    pub fn create_log(&self, log: &NewGameLog) -> Result<GameLog> {
        self.send(self.request(reqwest::Method::POST, "/api/logs").json(log))
    }

    pub fn delete_log(&self, id: i64) -> Result<()> {
        self.send_empty(self.request(reqwest::Method::DELETE, &format!("/api/logs/{}", id)))
    }

    pub fn log_stats(&self) -> Result<LogStats> {
        self.send(self.request(reqwest::Method::GET, "/api/logs/stats"))
    }

    // -- Admin -------------------------------------------------------------

    pub fn user_decks(&self, user_id: i64) -> Result<Vec<Deck>> {
        self.send(self.request(
            reqwest::Method::GET,
            &format!("/api/admin/decks/user/{}", user_id),
        ))
    }

    pub fn admin_card(&self, card_id: i64) -> Result<Card> {
        self.send(self.request(reqwest::Method::GET, &format!("/api/admin/cards/{}", card_id)))
    }

    pub fn link_card(&self, card_id: i64, link: &LinkRequest) -> Result<Card> {
        self.send(
            self.request(
                reqwest::Method::POST,
                &format!("/api/admin/cards/{}/tcgplayer", card_id),
            )
            .json(link),
        )
    }

    pub fn unlink_card(&self, card_id: i64) -> Result<Card> {
        self.send(self.request(
            reqwest::Method::DELETE,
            &format!("/api/admin/cards/{}/tcgplayer", card_id),
        ))
    }

    pub fn mark_missing(&self, card_id: i64) -> Result<Card> {
        self.send(self.request(
            reqwest::Method::POST,
            &format!("/api/admin/cards/{}/tcgplayer/missing", card_id),
        ))
    }

    pub fn unmark_missing(&self, card_id: i64) -> Result<Card> {
        self.send(self.request(
            reqwest::Method::DELETE,
            &format!("/api/admin/cards/{}/tcgplayer/missing", card_id),
        ))
    }

    /// Marketplace product search. The payload is passed through untouched.
    pub fn search_products(&self, query: &str) -> Result<Value> {
        self.send(
            self.request(reqwest::Method::GET, "/api/admin/tcgplayer/search")
                .query(&[("q", query)]),
        )
    }

    pub fn search_products_by_name(&self, name: &str) -> Result<Value> {
        self.send(
            self.request(reqwest::Method::GET, "/api/admin/tcgplayer/search-by-name")
                .query(&[("name", name)]),
        )
    }

    pub fn product(&self, product_id: i64) -> Result<Value> {
        self.send(self.request(
            reqwest::Method::GET,
            &format!("/api/admin/tcgplayer/products/{}", product_id),
        ))
    }

    /// Fetch an image through the API's same-origin image proxy.
    pub fn proxy_image(&self, url: &str) -> Result<Vec<u8>> {
        let resp = check(
            self.request(reqwest::Method::GET, crate::config::IMAGE_PROXY_PATH)
                .query(&[("url", url)])
                .send()?,
        )?;
        Ok(resp.bytes()?.to_vec())
    }
}

/// Turn an error response into the matching [`CompanionError`].
fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>() {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(match status {
        StatusCode::NOT_FOUND => CompanionError::NotFound(message),
        StatusCode::FORBIDDEN => CompanionError::Forbidden(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            CompanionError::InvalidArgument(message)
        }
        _ => CompanionError::Remote {
            status: status.as_u16(),
            message,
        },
    })
}

// ---------------------------------------------------------------------------
// GameLogPage
// ---------------------------------------------------------------------------

/// Everything the game-log page shows, loaded part by part.
///
/// Each part is fetched on its own; a failed fetch is logged and leaves that
/// part empty (`None` for the stats) so the remaining parts still render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLogPage {
    pub logs: Vec<GameLog>,
    pub stats: Option<LogStats>,
    pub decks: Vec<Deck>,
    pub leaders: Vec<Card>,
}

impl GameLogPage {
    pub fn load(client: &ApiClient, user_id: i64) -> Self {
        Self {
            logs: or_log(client.logs(), "logs").unwrap_or_default(),
            stats: or_log(client.log_stats(), "stats"),
            decks: or_log(client.user_decks(user_id), "decks").unwrap_or_default(),
            leaders: or_log(client.leaders(), "leaders").unwrap_or_default(),
        }
    }

    /// Leader card for a deck id, when both are loaded.
    pub fn deck_leader(&self, deck_id: i64) -> Option<&Card> {
        let leader_id = self
            .decks
            .iter()
            .find(|d| d.id == Some(deck_id))?
            .leader
            .as_ref()?
            .card_id;
        self.leader(leader_id)
    }

    pub fn leader(&self, card_id: i64) -> Option<&Card> {
        self.leaders.iter().find(|l| l.id == card_id)
    }
}

fn or_log<T>(result: Result<T>, part: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Failed to load {}: {}", part, e);
            None
        }
    }
}
