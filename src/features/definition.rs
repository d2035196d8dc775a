//! Go-to-definition: resolves the symbol under the cursor
//! to the `Location` of its declaration, crossing file boundaries through
//! `include_bindings` when the symbol was imported.

use tower_lsp::lsp_types::{Location, Position};

use crate::ast_cache::AstCache;
use crate::parser::span_to_range;
use crate::uri::DocumentUri;

use super::declaration_at;

pub fn goto_definition(cache: &AstCache, uri: &DocumentUri, position: Position) -> Option<Location> {
    let target = declaration_at(cache, uri, position)?;
    let unit = cache.get_source_unit(&target.uri)?;
    let node = unit.tree.get(target.node)?;
    Some(Location::new(target.uri.into_url(), span_to_range(node.span)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_cache::AstCache;
    use crate::file_cache::FileCache;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(tower_lsp::lsp_types::Url::parse(s).unwrap())
    }

    #[test]
    fn jumps_to_a_function_declared_in_the_same_file() {
        let file_cache = Arc::new(FileCache::new());
        let cache = AstCache::new(Arc::clone(&file_cache));
        let u = uri("file:///main.nf");
        file_cache.did_open(u.clone(), "def greet() {\n  return 1\n}\nworkflow {\n  greet()\n}\n".to_string());

        let mut dirty = HashSet::new();
        dirty.insert(u.clone());
        cache.analyze(&dirty);

        let call_site = Position::new(4, 3);
        let location = goto_definition(&cache, &u, call_site);
        assert!(location.is_some());
        assert_eq!(location.unwrap().range.start.line, 0);
    }

    #[test]
    fn nothing_resolves_at_a_position_with_no_symbol() {
        let file_cache = Arc::new(FileCache::new());
        let cache = AstCache::new(Arc::clone(&file_cache));
        let u = uri("file:///main.nf");
        file_cache.did_open(u.clone(), "workflow {\n}\n".to_string());
        let mut dirty = HashSet::new();
        dirty.insert(u.clone());
        cache.analyze(&dirty);

        assert!(goto_definition(&cache, &u, Position::new(0, 0)).is_none());
    }
}
