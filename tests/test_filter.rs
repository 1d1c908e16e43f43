//! Filter engine tests: per-dimension predicates, AND/OR composition and the
//! code-aware free-text search.

mod common;

use common::*;
use optcg_companion::config::{NO_COUNTER, NO_TRIGGER};
use optcg_companion::filter::{matches_code, matches_text, CardFilter};
use optcg_companion::models::Category;

fn run(filter: &CardFilter) -> Vec<i64> {
    let catalog = sample_catalog();
    ids(&filter.apply(catalog.cards()))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn empty_filter_is_inactive_and_keeps_everything() {
    let filter = CardFilter::new();
    assert!(!filter.is_active());
    assert_eq!(run(&filter), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn blank_search_does_not_activate_filter() {
    let filter = CardFilter {
        search: Some("   ".into()),
        ..Default::default()
    };
    assert!(!filter.is_active());
    assert_eq!(run(&filter).len(), 9);
}

#[test]
fn values_within_a_dimension_are_ored() {
    let filter = CardFilter {
        colors: strings(&["Blue", "Green"]),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![DOFLAMINGO_LEADER, LAW_LEADER, FISHER_TIGER, LUFFY]);
}

#[test]
fn dimensions_are_anded() {
    let filter = CardFilter {
        colors: strings(&["Red"]),
        categories: vec![Category::Character],
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![NAMI, ZORO]);
}

#[test]
fn applying_twice_gives_the_same_result() {
    let catalog = sample_catalog();
    let filter = CardFilter {
        costs: strings(&["5"]),
        ..Default::default()
    };
    let first = ids(&filter.apply(catalog.cards()));
    let second = ids(&filter.apply(catalog.cards()));
    assert_eq!(first, second);
    assert_eq!(first, vec![FISHER_TIGER, LUFFY]);
}

// ---------------------------------------------------------------------------
// Single dimensions
// ---------------------------------------------------------------------------

#[test]
fn rarity_is_case_insensitive() {
    let filter = CardFilter {
        rarities: strings(&["sr"]),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![ZORO, LUFFY]);
}

#[test]
fn power_filter() {
    let filter = CardFilter {
        powers: strings(&["6000"]),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![FISHER_TIGER, LUFFY]);
}

#[test]
fn dual_attribute_matches_either_half() {
    let strike = CardFilter {
        attributes: strings(&["Strike"]),
        ..Default::default()
    };
    assert_eq!(run(&strike), vec![FISHER_TIGER, LUFFY]);

    let slash = CardFilter {
        attributes: strings(&["Slash"]),
        ..Default::default()
    };
    assert_eq!(run(&slash), vec![ZORO_LEADER, LAW_LEADER, ZORO, LUFFY]);
}

#[test]
fn counter_value_and_no_counter_sentinel() {
    let thousand = CardFilter {
        counters: strings(&["1000"]),
        ..Default::default()
    };
    assert_eq!(run(&thousand), vec![NAMI, FISHER_TIGER]);

    // "-" counts as no counter.
    let none = CardFilter {
        counters: strings(&[NO_COUNTER]),
        ..Default::default()
    };
    let result = run(&none);
    assert!(result.contains(&ZORO));
    assert!(!result.contains(&NAMI));
    assert!(!result.contains(&FISHER_TIGER));
    assert_eq!(result.len(), 7);
}

#[test]
fn trigger_substring_and_no_trigger_sentinel() {
    let play = CardFilter {
        triggers: strings(&["play this"]),
        ..Default::default()
    };
    assert_eq!(run(&play), vec![FISHER_TIGER]);

    let power = CardFilter {
        triggers: strings(&["+1000 power"]),
        ..Default::default()
    };
    assert_eq!(run(&power), vec![RADICAL_BEAM]);

    let none = CardFilter {
        triggers: strings(&[NO_TRIGGER]),
        ..Default::default()
    };
    let result = run(&none);
    assert!(!result.contains(&FISHER_TIGER));
    assert!(!result.contains(&RADICAL_BEAM));
    assert_eq!(result.len(), 7);
}

#[test]
fn set_title_filter() {
    let filter = CardFilter {
        sets: strings(&["Starter Deck 1: Straw Hat Crew"]),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![LUFFY, SUNNY]);
}

#[test]
fn set_code_matches_code_prefix() {
    let op05 = CardFilter {
        set_code: Some("op05".into()),
        ..Default::default()
    };
    assert_eq!(run(&op05), vec![FISHER_TIGER]);

    let st01 = CardFilter {
        set_code: Some("ST01".into()),
        ..Default::default()
    };
    assert_eq!(run(&st01), vec![LUFFY, SUNNY]);
}

#[test]
fn alternate_art_ignores_excluded_reprints() {
    let parallel = CardFilter {
        alternate_arts: strings(&["Parallel"]),
        ..Default::default()
    };
    assert_eq!(run(&parallel), vec![ZORO_LEADER, ZORO]);

    let reprint = CardFilter {
        alternate_arts: strings(&["Reprint"]),
        ..Default::default()
    };
    assert!(run(&reprint).is_empty());
}

#[test]
fn effect_keywords_with_or_without_brackets() {
    let rush = CardFilter {
        effects: strings(&["Rush"]),
        ..Default::default()
    };
    assert_eq!(run(&rush), vec![ZORO, LUFFY]);

    let blocker = CardFilter {
        effects: strings(&["[Blocker]"]),
        ..Default::default()
    };
    assert_eq!(run(&blocker), vec![LUFFY]);

    let on_play = CardFilter {
        effects: strings(&["On Play"]),
        ..Default::default()
    };
    assert_eq!(run(&on_play), vec![NAMI]);
}

#[test]
fn family_filter() {
    let filter = CardFilter {
        families: strings(&["supernovas"]),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![ZORO_LEADER, LAW_LEADER, ZORO, LUFFY]);
}

// ---------------------------------------------------------------------------
// Free-text search
// ---------------------------------------------------------------------------

#[test]
fn search_matches_name() {
    let filter = CardFilter {
        search: Some("zoro".into()),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![ZORO_LEADER, ZORO]);
}

#[test]
fn search_matches_set_title() {
    let filter = CardFilter {
        search: Some("new era".into()),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![FISHER_TIGER]);
}

#[test]
fn search_matches_full_code() {
    let filter = CardFilter {
        search: Some("OP05-070".into()),
        ..Default::default()
    };
    assert_eq!(run(&filter), vec![FISHER_TIGER]);
}

#[test]
fn empty_query_matches_any_card() {
    assert!(matches_text(&card(SUNNY), ""));
}

#[test]
fn numeric_query_compares_segment_values() {
    assert!(matches_code("OP01-016", "1"));
    assert!(matches_code("OP01-016", "16"));
    assert!(!matches_code("OP05-070", "1"));
}

#[test]
fn leading_zero_requires_exact_digits() {
    assert!(matches_code("OP01-016", "016"));
    assert!(matches_code("OP01-001", "001"));
    assert!(!matches_code("OP01-016", "0016"));
    assert!(!matches_code("OP01-016", "06"));
}

#[test]
fn hyphenated_query_matches_whole_code() {
    assert!(matches_code("OP01-016", "01-01"));
    assert!(matches_code("OP01-016", "op01-016"));
    assert!(!matches_code("OP01-016", "op01-02"));
}

#[test]
fn text_query_matches_segment_substring() {
    assert!(matches_code("ST01-012", "st"));
    assert!(!matches_code("ST01-012", "op"));
}
