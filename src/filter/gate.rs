//! Leader-compatibility gate.
//!
//! Without a leader only leaders can be picked; once a leader is chosen the
//! pool narrows to non-leader cards sharing at least one of its colors.

use crate::filter::CardFilter;
use crate::models::Card;

pub fn is_allowed(card: &Card, leader: Option<&Card>) -> bool {
    match leader {
        None => card.is_leader(),
        Some(leader) => !card.is_leader() && card.shares_color_with(leader),
    }
}

/// Narrow an already-filtered pool through the gate, preserving order.
pub fn apply<'a>(cards: Vec<&'a Card>, leader: Option<&Card>) -> Vec<&'a Card> {
    cards
        .into_iter()
        .filter(|c| is_allowed(c, leader))
        .collect()
}

/// Cards shown in the deck builder: filter engine first, then the gate.
pub fn visible_pool<'a>(
    cards: &'a [Card],
    filter: &CardFilter,
    leader: Option<&Card>,
) -> Vec<&'a Card> {
    apply(filter.apply(cards), leader)
}
