//! User lists and the per-user card collection.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::error::{CompanionError, Result};
use crate::models::{ListCard, NewUserList, UserList};
use crate::sql_builder::SqlBuilder;

/// Name given to the collection list when it is first created.
pub const COLLECTION_NAME: &str = "Collection";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserListRow {
    id: i64,
    user_id: i64,
    name: String,
    is_ordered: bool,
    is_collection: bool,
    max_rows: i64,
    max_columns: i64,
    total_pages: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCardRow {
    list_id: i64,
    card_id: i64,
    quantity: i64,
    page: Option<i64>,
    row: Option<i64>,
    column: Option<i64>,
}

const LIST_COLUMNS: &[&str] = &[
    "id",
    "user_id AS \"userId\"",
    "name",
    "is_ordered AS \"isOrdered\"",
    "is_collection AS \"isCollection\"",
    "max_rows AS \"maxRows\"",
    "max_columns AS \"maxColumns\"",
    "total_pages AS \"totalPages\"",
];

/// Binder slot of a card in an ordered list, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub page: i64,
    pub row: i64,
    pub column: i64,
}

// ---------------------------------------------------------------------------
// ListQuery
// ---------------------------------------------------------------------------

/// Query interface for a user's lists.
pub struct ListQuery<'a> {
    conn: &'a Connection,
}

impl<'a> ListQuery<'a> {
    /// Create a new `ListQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a regular (non-collection) list.
    pub fn create(&self, user_id: i64, list: &NewUserList) -> Result<UserList> {
        let name = list.name.trim();
        if name.is_empty() {
            return Err(CompanionError::InvalidArgument("List name is required".into()));
        }
        if list.max_rows < 1 || list.max_columns < 1 || list.total_pages < 1 {
            return Err(CompanionError::InvalidArgument(
                "Rows, columns and pages must be at least 1".into(),
            ));
        }
        let id = self.insert(user_id, name, list, false)?;
        log::info!("Created list {} ({}) for user {}", id, name, user_id);
        self.require(user_id, id)
    }

    /// The user's collection, created on first access.
    pub fn ensure_collection(&self, user_id: i64) -> Result<UserList> {
        let (sql, params) = SqlBuilder::new("user_lists")
            .select(LIST_COLUMNS)
            .where_id("user_id", user_id)
            .where_flag("is_collection", true)
            .limit(1)
            .build();
        let rows: Vec<UserListRow> = self.conn.execute_into(&sql, &params)?;
        if let Some(list) = self.assemble(rows)?.pop() {
            return Ok(list);
        }

        let id = self.insert(user_id, COLLECTION_NAME, &NewUserList::named(COLLECTION_NAME), true)?;
        log::info!("Created collection {} for user {}", id, user_id);
        self.require(user_id, id)
    }

    /// All lists of `user_id`, collection first, then by creation.
    pub fn list(&self, user_id: i64) -> Result<Vec<UserList>> {
        let (sql, params) = SqlBuilder::new("user_lists")
            .select(LIST_COLUMNS)
            .where_id("user_id", user_id)
            .order_by(&["is_collection DESC", "id ASC"])
            .build();
        let rows: Vec<UserListRow> = self.conn.execute_into(&sql, &params)?;
        self.assemble(rows)
    }

    pub fn get(&self, user_id: i64, id: i64) -> Result<Option<UserList>> {
        let (sql, params) = SqlBuilder::new("user_lists")
            .select(LIST_COLUMNS)
            .where_id("id", id)
            .where_id("user_id", user_id)
            .build();
        let rows: Vec<UserListRow> = self.conn.execute_into(&sql, &params)?;
        Ok(self.assemble(rows)?.pop())
    }

    fn require(&self, user_id: i64, id: i64) -> Result<UserList> {
        self.get(user_id, id)?
            .ok_or_else(|| CompanionError::NotFound(format!("List {} not found", id)))
    }

    /// Set how many copies of `card_id` the list holds. Zero or less removes
    /// the card. Ordered lists may pin the card to a slot inside their bounds.
    pub fn set_card_quantity(
        &self,
        user_id: i64,
        list_id: i64,
        card_id: i64,
        quantity: i64,
        slot: Option<Slot>,
    ) -> Result<UserList> {
        let list = self.require(user_id, list_id)?;

        if let Some(slot) = slot {
            let in_bounds = (1..=list.total_pages).contains(&slot.page)
                && (1..=list.max_rows).contains(&slot.row)
                && (1..=list.max_columns).contains(&slot.column);
            if !list.is_ordered || !in_bounds {
                return Err(CompanionError::InvalidArgument(format!(
                    "Slot {:?} is not available in list {}",
                    slot, list_id
                )));
            }
            let occupant = list.cards.iter().find(|c| {
                c.card_id != card_id
                    && c.page == Some(slot.page)
                    && c.row == Some(slot.row)
                    && c.column == Some(slot.column)
            });
            if let Some(other) = occupant.filter(|_| quantity > 0) {
                return Err(CompanionError::InvalidArgument(format!(
                    "Slot {:?} of list {} already holds card {}",
                    slot, list_id, other.card_id
                )));
            }
        }

        self.conn.transaction(|conn| {
            conn.execute_update(
                "DELETE FROM list_cards WHERE list_id = CAST(? AS BIGINT) AND card_id = CAST(? AS BIGINT)",
                &[list_id.to_string(), card_id.to_string()],
            )?;
            if quantity > 0 {
                let (page, row, column) = match slot {
                    Some(s) => (s.page.to_string(), s.row.to_string(), s.column.to_string()),
                    None => Default::default(),
                };
                conn.execute_update(
                    "INSERT INTO list_cards (list_id, card_id, quantity, page_no, row_no, col_no) \
                     VALUES (CAST(? AS BIGINT), CAST(? AS BIGINT), CAST(? AS INTEGER), \
                     CAST(NULLIF(?, '') AS INTEGER), CAST(NULLIF(?, '') AS INTEGER), CAST(NULLIF(?, '') AS INTEGER))",
                    &[
                        list_id.to_string(),
                        card_id.to_string(),
                        quantity.to_string(),
                        page,
                        row,
                        column,
                    ],
                )?;
            }
            Ok(())
        })?;

        self.require(user_id, list_id)
    }

    /// Delete a list. The collection cannot be deleted.
    pub fn delete(&self, user_id: i64, id: i64) -> Result<bool> {
        let Some(list) = self.get(user_id, id)? else {
            return Ok(false);
        };
        if list.is_collection {
            return Err(CompanionError::Forbidden(
                "The collection list cannot be deleted".into(),
            ));
        }
        self.conn.transaction(|conn| {
            conn.execute_update(
                "DELETE FROM list_cards WHERE list_id = CAST(? AS BIGINT)",
                &[id.to_string()],
            )?;
            conn.execute_update(
                "DELETE FROM user_lists WHERE id = CAST(? AS BIGINT)",
                &[id.to_string()],
            )?;
            Ok(())
        })?;
        log::info!("Deleted list {}", id);
        Ok(true)
    }

    fn insert(
        &self,
        user_id: i64,
        name: &str,
        list: &NewUserList,
        is_collection: bool,
    ) -> Result<i64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.conn
            .execute_scalar(
                "INSERT INTO user_lists \
                 (user_id, name, is_ordered, is_collection, max_rows, max_columns, total_pages, created_at) \
                 VALUES (CAST(? AS BIGINT), ?, CAST(? AS BOOLEAN), CAST(? AS BOOLEAN), \
                 CAST(? AS INTEGER), CAST(? AS INTEGER), CAST(? AS INTEGER), ?) RETURNING id",
                &[
                    user_id.to_string(),
                    name.to_string(),
                    list.is_ordered.to_string(),
                    is_collection.to_string(),
                    list.max_rows.to_string(),
                    list.max_columns.to_string(),
                    list.total_pages.to_string(),
                    now,
                ],
            )?
            .and_then(|v| v.as_i64())
            .ok_or_else(|| CompanionError::InvalidArgument("List insert returned no id".into()))
    }

    /// Attach cards to list rows, keeping the row order.
    fn assemble(&self, rows: Vec<UserListRow>) -> Result<Vec<UserList>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let (sql, params) = SqlBuilder::new("list_cards")
            .select(&[
                "list_id AS \"listId\"",
                "card_id AS \"cardId\"",
                "quantity",
                "page_no AS page",
                "row_no AS \"row\"",
                "col_no AS \"column\"",
            ])
            .where_in_ids("list_id", &ids)
            .order_by(&[
                "list_id",
                "page_no NULLS LAST",
                "row_no NULLS LAST",
                "col_no NULLS LAST",
                "card_id",
            ])
            .build();
        let card_rows: Vec<ListCardRow> = self.conn.execute_into(&sql, &params)?;

        let mut cards: HashMap<i64, Vec<ListCard>> = HashMap::new();
        for r in card_rows {
            cards.entry(r.list_id).or_default().push(ListCard {
                card_id: r.card_id,
                quantity: r.quantity,
                page: r.page,
                row: r.row,
                column: r.column,
            });
        }

        Ok(rows
            .into_iter()
            .map(|r| UserList {
                cards: cards.remove(&r.id).unwrap_or_default(),
                id: r.id,
                user_id: r.user_id,
                name: r.name,
                is_ordered: r.is_ordered,
                is_collection: r.is_collection,
                max_rows: r.max_rows,
                max_columns: r.max_columns,
                total_pages: r.total_pages,
            })
            .collect())
    }
}
