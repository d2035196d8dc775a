//! Static tree of known Nextflow-style config scopes and their keys, used
//! by `config_schema_checker` to flag unknown dotted config names.
//!
//! Embedded and parsed once via `once_cell::sync::Lazy`, the same pattern
//! as `crate::builtins`: a lazily-built static index consulted by the
//! resolver rather than recomputed per file.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::Deserialize;

const CONFIG_SCHEMA_JSON: &str = include_str!("../../assets/config_schema.json");

/// Top-level scopes whose contents are intentionally open-ended and never
/// validated: `env.*` and `params.*` are user-defined by construction, and
/// `process.ext.*` is documented by Nextflow itself as a free-form escape
/// hatch for process-local custom variables.
const UNCHECKED_SCOPES: &[&str] = &["env", "params"];

pub struct ConfigSchemaTree {
    scopes: HashMap<String, HashSet<String>>,
}

pub static CONFIG_SCHEMA_TREE: Lazy<ConfigSchemaTree> = Lazy::new(|| {
    let raw: HashMap<String, Vec<String>> = serde_json::from_str(CONFIG_SCHEMA_JSON)
        .expect("assets/config_schema.json is embedded at compile time and must be valid");
    ConfigSchemaTree {
        scopes: raw
            .into_iter()
            .map(|(scope, keys)| (scope, keys.into_iter().collect()))
            .collect(),
    }
});

impl ConfigSchemaTree {
    /// Checks a fully-qualified dotted config name, e.g.
    /// `["process", "cpus"]` or `["docker", "enabled"]`.
    ///
    /// Returns `None` when the name falls in a scope this tree
    /// deliberately doesn't validate (unknown top-level scope, or one of
    /// the always-dynamic escape hatches), `Some(true)`/`Some(false)`
    /// otherwise.
    pub fn check(&self, dotted: &[String]) -> Option<bool> {
        let scope = dotted.first()?;
        if UNCHECKED_SCOPES.contains(&scope.as_str()) {
            return None;
        }
        if scope == "process" && dotted.get(1).map(String::as_str) == Some("ext") {
            return None;
        }
        let keys = self.scopes.get(scope)?;
        let key = dotted.get(1)?;
        Some(keys.contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_passes() {
        assert_eq!(
            CONFIG_SCHEMA_TREE.check(&["process".into(), "cpus".into()]),
            Some(true)
        );
    }

    #[test]
    fn unknown_key_in_known_scope_fails() {
        assert_eq!(
            CONFIG_SCHEMA_TREE.check(&["docker".into(), "bogus".into()]),
            Some(false)
        );
    }

    #[test]
    fn dynamic_scopes_are_unchecked() {
        assert_eq!(CONFIG_SCHEMA_TREE.check(&["params".into(), "anything".into()]), None);
        assert_eq!(CONFIG_SCHEMA_TREE.check(&["env".into(), "PATH".into()]), None);
        assert_eq!(
            CONFIG_SCHEMA_TREE.check(&["process".into(), "ext".into(), "label".into()]),
            None
        );
    }

    #[test]
    fn unknown_top_level_scope_is_unchecked() {
        assert_eq!(CONFIG_SCHEMA_TREE.check(&["profiles".into(), "standard".into()]), None);
    }
}
