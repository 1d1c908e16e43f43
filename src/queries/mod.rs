//! Query modules for the companion.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes methods returning
//! `Result<T>` with typed models. Card queries read the cached catalog; the
//! others read and write the user data tables.

pub mod cards;
pub mod decks;
pub mod lists;
pub mod logs;
pub mod tcgplayer;

pub use cards::{CardPage, CardQuery, FullCardsParams};
pub use decks::DeckQuery;
pub use lists::{ListQuery, Slot};
pub use logs::LogQuery;
pub use tcgplayer::TcgplayerQuery;
