pub mod admin;
pub mod cards;
pub mod decks;
pub mod lists;
pub mod logs;
pub mod proxy;
