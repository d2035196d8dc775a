//! Static metadata for the DSL's built-in surface: known operators,
//! feature-flag names, and directive names, provided as static metadata
//! rather than discovered by analysis.
//!
//! Embedded at compile time and parsed once via `once_cell::sync::Lazy`,
//! the asset is small enough to embed as plain JSON via `include_str!`.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Deserialize;

const BUILTINS_JSON: &str = include_str!("../assets/builtins.json");

#[derive(Debug, Deserialize)]
struct RawBuiltins {
    operators: Vec<String>,
    feature_flags: Vec<String>,
    directive_names: Vec<String>,
}

pub struct Builtins {
    pub operators: HashSet<String>,
    pub feature_flags: HashSet<String>,
    pub directive_names: HashSet<String>,
}

pub static BUILTINS: Lazy<Builtins> = Lazy::new(|| {
    let raw: RawBuiltins = serde_json::from_str(BUILTINS_JSON)
        .expect("assets/builtins.json is embedded at compile time and must be valid");
    Builtins {
        operators: raw.operators.into_iter().collect(),
        feature_flags: raw.feature_flags.into_iter().collect(),
        directive_names: raw.directive_names.into_iter().collect(),
    }
});

impl Builtins {
    pub fn is_directive(&self, name: &str) -> bool {
        self.directive_names.contains(name)
    }

    pub fn is_feature_flag(&self, dotted_name: &str) -> bool {
        self.feature_flags.contains(dotted_name)
    }
}
