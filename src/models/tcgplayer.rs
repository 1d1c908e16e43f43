use serde::{Deserialize, Serialize};

use super::card::Card;

// ---------------------------------------------------------------------------
// TcgplayerLink: Association between a catalog card and a marketplace product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcgplayerLink {
    pub card_id: i64,
    pub product_id: Option<i64>,
    pub market_price: Option<f64>,
    pub url: Option<String>,
    /// Set when the card is known to have no marketplace product.
    #[serde(default)]
    pub missing: bool,
}

impl TcgplayerLink {
    /// Copy this link's marketplace fields onto a card.
    pub fn apply_to(&self, card: &mut Card) {
        card.tcgplayer_product_id = self.product_id;
        card.tcgplayer_url = self.url.clone();
        card.market_price = self.market_price;
        card.tcgplayer_missing = self.missing;
    }
}

/// Body of `POST /api/admin/cards/{id}/tcgplayer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub product_id: i64,
    pub market_price: Option<f64>,
    pub url: Option<String>,
}
