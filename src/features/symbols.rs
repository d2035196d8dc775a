//! Document and workspace symbols.

use tower_lsp::lsp_types::{DocumentSymbol, SymbolInformation, SymbolKind};

use crate::ast_cache::AstCache;
use crate::parser::span_to_range;
use crate::syntax::NodeKind;
use crate::uri::DocumentUri;

#[allow(deprecated)] // `SymbolInformation::deprecated` has no replacement in lsp_types yet.
pub fn document_symbols(cache: &AstCache, uri: &DocumentUri) -> Vec<DocumentSymbol> {
    let Some(unit) = cache.get_source_unit(uri) else {
        return Vec::new();
    };

    let mut symbols = Vec::new();
    for &node_id in unit.parent_index.nodes() {
        let Some(node) = unit.tree.get(node_id) else {
            continue;
        };
        if node.synthetic {
            continue;
        }
        let Some((name, kind)) = symbol_of(&node.kind) else {
            continue;
        };
        let range = span_to_range(node.span);
        #[allow(deprecated)]
        symbols.push(DocumentSymbol {
            name,
            detail: None,
            kind,
            tags: None,
            deprecated: None,
            range,
            selection_range: range,
            children: None,
        });
    }
    symbols
}

pub fn workspace_symbols(cache: &AstCache, query: &str) -> Vec<SymbolInformation> {
    let mut out = Vec::new();
    for uri in cache.all_uris() {
        let Some(unit) = cache.get_source_unit(&uri) else {
            continue;
        };
        for (name, node_id) in cache.declarations_of(&uri) {
            if !query.is_empty() && !name.to_lowercase().contains(&query.to_lowercase()) {
                continue;
            }
            let Some(node) = unit.tree.get(node_id) else {
                continue;
            };
            let Some((_, kind)) = symbol_of(&node.kind) else {
                continue;
            };
            #[allow(deprecated)]
            out.push(SymbolInformation {
                name,
                kind,
                tags: None,
                deprecated: None,
                location: tower_lsp::lsp_types::Location::new(uri.clone().into_url(), span_to_range(node.span)),
                container_name: None,
            });
        }
    }
    out
}

fn symbol_of(kind: &NodeKind) -> Option<(String, SymbolKind)> {
    match kind {
        NodeKind::Process { name, .. } => Some((name.clone(), SymbolKind::FUNCTION)),
        NodeKind::Workflow { name: Some(name), .. } => Some((name.clone(), SymbolKind::NAMESPACE)),
        NodeKind::Workflow { name: None, .. } => Some(("(entry)".to_string(), SymbolKind::NAMESPACE)),
        NodeKind::Function { name, .. } => Some((name.clone(), SymbolKind::METHOD)),
        _ => None,
    }
}
