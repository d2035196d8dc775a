//! Code lens: annotates each process/workflow/function
//! declaration with the number of call sites found anywhere in the
//! workspace, reusing the same resolution-matching logic as
//! `find_references` rather than duplicating it.

use tower_lsp::lsp_types::{CodeLens, Command};

use crate::ast_cache::AstCache;
use crate::parser::span_to_range;
use crate::resolver::Resolution;
use crate::syntax::{GlobalNodeRef, NodeKind};
use crate::uri::DocumentUri;

pub fn code_lenses(cache: &AstCache, uri: &DocumentUri) -> Vec<CodeLens> {
    let Some(unit) = cache.get_source_unit(uri) else {
        return Vec::new();
    };

    let mut lenses = Vec::new();
    for &node_id in unit.parent_index.nodes() {
        let Some(node) = unit.tree.get(node_id) else {
            continue;
        };
        if !is_lensable(&node.kind) {
            continue;
        }
        let target = GlobalNodeRef { uri: uri.clone(), node: node_id };
        let count = count_call_sites(cache, &target);
        lenses.push(CodeLens {
            range: span_to_range(node.span),
            command: Some(Command {
                title: format!("{count} call site{}", if count == 1 { "" } else { "s" }),
                command: String::new(),
                arguments: None,
            }),
            data: None,
        });
    }
    lenses
}

fn is_lensable(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Process { .. } | NodeKind::Workflow { name: Some(_), .. } | NodeKind::Function { .. })
}

fn count_call_sites(cache: &AstCache, target: &GlobalNodeRef) -> usize {
    let mut count = 0;
    for candidate_uri in cache.all_uris() {
        let Some(unit) = cache.get_source_unit(&candidate_uri) else {
            continue;
        };
        for resolution in unit.name_resolution.references.values() {
            let matches = match resolution {
                Resolution::Declaration(t) => &candidate_uri == &target.uri && t == &target.node,
                Resolution::Import { include_node, var_index } => unit
                    .include_bindings
                    .get(include_node)
                    .and_then(|bindings| bindings.get(*var_index))
                    .and_then(|slot| slot.as_ref())
                    == Some(target),
                _ => false,
            };
            if matches {
                count += 1;
            }
        }
    }
    count
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
    fn counts_call_sites_within_the_same_file() {
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

        let lenses = code_lenses(&cache, &u);
        let greet_lens = lenses.iter().find(|l| l.range.start.line == 0).unwrap();
        assert_eq!(greet_lens.command.as_ref().unwrap().title, "2 call sites");
    }
}
