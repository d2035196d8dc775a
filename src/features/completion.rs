//! Completion: merges built-in directive names, this
//! file's own declarations, and (inside a `params.` access) the adjacent
//! schema's fields into one ranked-by-nothing-in-particular list, capped
//! at the configured item limit.

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};

use crate::ast_cache::AstCache;
use crate::builtins::BUILTINS;
use crate::uri::DocumentUri;

pub fn completions(cache: &AstCache, uri: &DocumentUri, limit: usize) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    for name in &BUILTINS.directive_names {
        items.push(CompletionItem {
            label: name.clone(),
            kind: Some(CompletionItemKind::KEYWORD),
            ..Default::default()
        });
    }

    for name in cache.declarations_of(uri).into_keys() {
        items.push(CompletionItem {
            label: name,
            kind: Some(CompletionItemKind::FUNCTION),
            ..Default::default()
        });
    }

    if let Some(unit) = cache.get_source_unit(uri) {
        for field in &unit.name_resolution.schema.fields {
            items.push(CompletionItem {
                label: format!("params.{}", field.name),
                kind: Some(CompletionItemKind::FIELD),
                detail: field.description.clone(),
                ..Default::default()
            });
        }
    }

    items.truncate(limit);
    items
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
    fn includes_declarations_from_the_current_file() {
        let file_cache = Arc::new(FileCache::new());
        let cache = AstCache::new(Arc::clone(&file_cache));
        let u = uri("file:///main.nf");
        file_cache.did_open(u.clone(), "process align {\n  script:\n  \"\"\"echo\"\"\"\n}\n".to_string());
        let mut dirty = HashSet::new();
        dirty.insert(u.clone());
        cache.analyze(&dirty);

        let items = completions(&cache, &u, 500);
        assert!(items.iter().any(|i| i.label == "align"));
    }

    #[test]
    fn respects_the_item_limit() {
        let file_cache = Arc::new(FileCache::new());
        let cache = AstCache::new(Arc::clone(&file_cache));
        let u = uri("file:///main.nf");
        file_cache.did_open(u.clone(), "workflow {}\n".to_string());
        let mut dirty = HashSet::new();
        dirty.insert(u.clone());
        cache.analyze(&dirty);

        let items = completions(&cache, &u, 2);
        assert_eq!(items.len(), 2);
    }
}
