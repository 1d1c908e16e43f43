//! Free-text search over a card and its visible alternates.

use crate::models::Card;

/// Case-insensitive free-text match.
///
/// Looks at name, cost, power, attribute, rarity, rules text, families and set
/// titles (base printing and visible alternates), plus the code rules of
/// [`matches_code`]. An empty query matches everything.
pub fn matches_text(card: &Card, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    if matches_code(&card.code, query) {
        return true;
    }

    let needle = query.to_lowercase();
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
    let contains_opt = |haystack: &Option<String>| {
        haystack.as_deref().map(contains).unwrap_or(false)
    };

    contains(card.name.as_str())
        || contains_opt(&card.cost)
        || contains_opt(&card.power)
        || contains_opt(&card.attribute)
        || contains_opt(&card.rarity)
        || card.texts.iter().any(|t| contains(t.as_str()))
        || card.types.iter().any(|t| contains(t.as_str()))
        || card
            .printings()
            .flat_map(|p| p.sets.iter())
            .any(|s| contains(s.title.as_str()))
}

/// Match a query against a hyphen-separated card code such as `"OP01-001"`.
///
/// * All-digit query: compared with the digits of each segment. A leading zero
///   requires the exact digit string (`"001"` only matches `"001"`); otherwise the
///   values are compared numerically (`"1"` matches both `"OP01"` and `"001"`).
/// * A query containing `-` is a substring match on the whole code.
/// * Anything else is a substring match on each segment.
pub fn matches_code(code: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    if query.chars().all(|c| c.is_ascii_digit()) {
        let exact = query.starts_with('0');
        let wanted: Option<u64> = query.parse().ok();
        return code.split('-').any(|segment| {
            let digits: String = segment.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return false;
            }
            if exact {
                digits == query
            } else {
                match (wanted, digits.parse::<u64>().ok()) {
                    (Some(w), Some(d)) => w == d,
                    _ => false,
                }
            }
        });
    }

    let needle = query.to_lowercase();
    if needle.contains('-') {
        return code.to_lowercase().contains(&needle);
    }
    code.split('-')
        .any(|segment| segment.to_lowercase().contains(&needle))
}
