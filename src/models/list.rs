use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UserList: A named grouping of cards laid out in pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub is_ordered: bool,
    /// The user's master owned-card collection. Cannot be deleted.
    pub is_collection: bool,
    pub max_rows: i64,
    pub max_columns: i64,
    pub total_pages: i64,
    #[serde(default)]
    pub cards: Vec<ListCard>,
}

impl UserList {
    pub fn slots_per_page(&self) -> i64 {
        self.max_rows * self.max_columns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCard {
    pub card_id: i64,
    pub quantity: i64,
    pub page: Option<i64>,
    pub row: Option<i64>,
    pub column: Option<i64>,
}

/// Parameters for creating a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserList {
    pub name: String,
    #[serde(default)]
    pub is_ordered: bool,
    #[serde(default = "default_rows")]
    pub max_rows: i64,
    #[serde(default = "default_columns")]
    pub max_columns: i64,
    #[serde(default = "default_pages")]
    pub total_pages: i64,
}

fn default_rows() -> i64 {
    3
}

fn default_columns() -> i64 {
    3
}

fn default_pages() -> i64 {
    1
}

impl NewUserList {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_ordered: false,
            max_rows: default_rows(),
            max_columns: default_columns(),
            total_pages: default_pages(),
        }
    }
}
