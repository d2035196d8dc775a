//! Find-all-references: given a symbol, scans every cached
//! `SourceUnit`'s `name_resolution.references` for bindings pointing back
//! at it -- the only workspace-wide scan among the feature providers, since
//! cross-file usage otherwise only flows one direction (`include_bindings`
//! point at the declaration, not the reverse).

use tower_lsp::lsp_types::{Location, Position};

use crate::ast_cache::AstCache;
use crate::parser::span_to_range;
use crate::resolver::Resolution;
use crate::syntax::GlobalNodeRef;
use crate::uri::DocumentUri;

use super::declaration_at;

pub fn find_references(cache: &AstCache, uri: &DocumentUri, position: Position, include_declaration: bool) -> Vec<Location> {
    let Some(target) = declaration_at(cache, uri, position) else {
        return Vec::new();
    };

    let mut locations = Vec::new();
    if include_declaration {
        if let Some(unit) = cache.get_source_unit(&target.uri) {
            if let Some(node) = unit.tree.get(target.node) {
                locations.push(Location::new(target.uri.clone().into_url(), span_to_range(node.span)));
            }
        }
    }

    for candidate_uri in cache.all_uris() {
        let Some(unit) = cache.get_source_unit(&candidate_uri) else {
            continue;
        };
        for (node_id, resolution) in &unit.name_resolution.references {
            if !points_at(&candidate_uri, resolution, &unit, &target) {
                continue;
            }
            if let Some(node) = unit.tree.get(*node_id) {
                locations.push(Location::new(candidate_uri.clone().into_url(), span_to_range(node.span)));
            }
        }
    }
    locations
}

fn points_at(
    candidate_uri: &DocumentUri,
    resolution: &Resolution,
    unit: &crate::ast_cache::SourceUnit,
    target: &GlobalNodeRef,
) -> bool {
    match resolution {
        Resolution::Local(t) | Resolution::Declaration(t) | Resolution::SchemaField(t) => {
            candidate_uri == &target.uri && t == &target.node
        }
        Resolution::Import { include_node, var_index } => unit
            .include_bindings
            .get(include_node)
            .and_then(|bindings| bindings.get(*var_index))
            .and_then(|slot| slot.as_ref())
            == Some(target),
        Resolution::Builtin => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_cache::FileCache;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(tower_lsp::lsp_types::Url::parse(s).unwrap())
    }

    #[test]
    fn finds_every_call_site_of_a_function() {
        let file_cache = Arc::new(FileCache::new());
        let cache = AstCache::new(Arc::clone(&file_cache));
        let u = uri("file:///main.nf");
        file_cache.did_open(
            u.clone(),
            "def greet() {\n  return 1\n}\nworkflow {\n  greet()\n  greet()\n}\n".to_string(),
        );
        let mut dirty = HashSet::new();
        dirty.insert(u.clone());
        cache.analyze(&dirty);

        let refs = find_references(&cache, &u, Position::new(0, 4), false);
        assert_eq!(refs.len(), 2);
    }
}
