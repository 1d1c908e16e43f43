pub mod card;
pub mod deck;
pub mod game_log;
pub mod list;
pub mod tcgplayer;

pub use card::*;
pub use deck::*;
pub use game_log::*;
pub use list::*;
pub use tcgplayer::*;
