//! Rename: builds a `WorkspaceEdit` from the same
//! reference set `find_references` computes, so a rename always touches
//! exactly what a "find all references" on the same symbol would show.

use std::collections::HashMap;

use tower_lsp::lsp_types::{Position, TextEdit, Url, WorkspaceEdit};

use crate::ast_cache::AstCache;
use crate::uri::DocumentUri;

use super::references::find_references;

pub fn rename(cache: &AstCache, uri: &DocumentUri, position: Position, new_name: &str) -> Option<WorkspaceEdit> {
    let locations = find_references(cache, uri, position, true);
    if locations.is_empty() {
        return None;
    }

    let mut changes: HashMap<Url, Vec<TextEdit>> = HashMap::new();
    for location in locations {
        changes.entry(location.uri).or_default().push(TextEdit {
            range: location.range,
            new_text: new_name.to_string(),
        });
    }

    Some(WorkspaceEdit {
        changes: Some(changes),
        document_changes: None,
        change_annotations: None,
    })
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
    fn renames_declaration_and_every_call_site() {
        let file_cache = Arc::new(FileCache::new());
        let cache = AstCache::new(Arc::clone(&file_cache));
        let u = uri("file:///main.nf");
        file_cache.did_open(
            u.clone(),
            "def greet() {\n  return 1\n}\nworkflow {\n  greet()\n}\n".to_string(),
        );
        let mut dirty = HashSet::new();
        dirty.insert(u.clone());
        cache.analyze(&dirty);

        let edit = rename(&cache, &u, Position::new(0, 4), "hello").unwrap();
        let edits = &edit.changes.unwrap()[&u.clone().into_url()];
        assert_eq!(edits.len(), 2);
        assert!(edits.iter().all(|e| e.new_text == "hello"));
    }
}
