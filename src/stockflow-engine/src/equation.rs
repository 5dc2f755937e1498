// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Rewrites variable references in free-text equations into identifier
//! form, so that `Birth Rate * Population` becomes `Birth_Rate * Population`.
//!
//! Names are matched literally, case-sensitively and only as whole words.
//! Longer names are substituted before shorter ones: once `Birth Rate` has
//! become `Birth_Rate`, the `Rate` inside it no longer sits on a word
//! boundary and is left alone.  The same property makes normalization
//! idempotent.

use regex::{NoExpand, Regex};
use tracing::warn;

use crate::datamodel::to_ident;

struct NamePattern {
    pattern: Regex,
    ident: String,
}

/// Normalizer for one model's set of declared names.  Patterns are
/// compiled once and reused for every equation in the model.
pub struct EquationNormalizer {
    patterns: Vec<NamePattern>,
}

impl EquationNormalizer {
    pub fn new<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<&str> = names.into_iter().filter(|n| !n.is_empty()).collect();
        // longest by character count; stable, so ties keep declaration order
        names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));

        let patterns = names
            .into_iter()
            .filter_map(|name| {
                let source = format!(r"\b{}\b", regex::escape(name));
                match Regex::new(&source) {
                    Ok(pattern) => Some(NamePattern {
                        pattern,
                        ident: to_ident(name),
                    }),
                    Err(err) => {
                        warn!(name, %err, "skipping variable name in equation normalization");
                        None
                    }
                }
            })
            .collect();

        EquationNormalizer { patterns }
    }

    pub fn normalize(&self, equation: &str) -> String {
        let mut eqn = equation.to_owned();
        for NamePattern { pattern, ident } in self.patterns.iter() {
            if pattern.is_match(&eqn) {
                eqn = pattern
                    .replace_all(&eqn, NoExpand(ident.as_str()))
                    .into_owned();
            }
        }
        eqn
    }
}

/// One-off normalization of a single equation against a set of names.
pub fn normalize_equation<'a, I>(equation: &str, names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    EquationNormalizer::new(names).normalize(equation)
}
