// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for equation normalization using proptest.
//!
//! These tests verify that:
//! 1. Normalizing an already-normalized equation changes nothing
//! 2. Equations that mention no declared name come back unchanged
//! 3. Every declared name used as a standalone term ends up in identifier form

use proptest::prelude::*;

use crate::datamodel::to_ident;
use crate::equation::normalize_equation;

fn word_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][a-z0-9]{0,5}".prop_map(|s| s.to_string())
}

fn name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(word_strategy(), 1..4).prop_map(|words| words.join(" "))
}

fn names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(name_strategy(), 0..6)
}

fn operator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(" + "),
        Just(" - "),
        Just(" * "),
        Just(" / "),
        Just(" "),
        Just("("),
        Just(")"),
    ]
}

fn term_strategy(names: Vec<String>) -> BoxedStrategy<String> {
    let literal = prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        word_strategy(),
    ];
    if names.is_empty() {
        literal.boxed()
    } else {
        prop_oneof![literal, prop::sample::select(names)].boxed()
    }
}

fn equation_for(names: Vec<String>) -> impl Strategy<Value = String> {
    prop::collection::vec((term_strategy(names), operator_strategy()), 0..8).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(term, op)| format!("{term}{op}"))
            .collect::<String>()
    })
}

fn names_and_equation() -> impl Strategy<Value = (Vec<String>, String)> {
    names_strategy().prop_flat_map(|names| {
        let eqn = equation_for(names.clone());
        (Just(names), eqn)
    })
}

proptest! {
    #[test]
    fn prop_normalization_is_idempotent((names, eqn) in names_and_equation()) {
        let once = normalize_equation(&eqn, names.iter().map(|n| n.as_str()));
        let twice = normalize_equation(&once, names.iter().map(|n| n.as_str()));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_digits_only_equations_unchanged(
        names in names_strategy(),
        eqn in "[0-9 +*/().-]{0,30}",
    ) {
        let result = normalize_equation(&eqn, names.iter().map(|n| n.as_str()));
        prop_assert_eq!(eqn, result);
    }

    #[test]
    fn prop_standalone_name_is_rewritten(name in name_strategy(), factor in 1u32..100) {
        let eqn = format!("{factor} * {name}");
        let result = normalize_equation(&eqn, [name.as_str()]);
        prop_assert_eq!(format!("{factor} * {}", to_ident(&name)), result);
    }
}
