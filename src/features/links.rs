//! Document links: each `include from '...'` path becomes a
//! clickable link to the resolved target file, when it resolves to one
//! that exists in the workspace.

use tower_lsp::lsp_types::{DocumentLink, Range};

use crate::ast_cache::{resolve_relative, script_includes, AstCache};
use crate::parser::span_to_range;
use crate::syntax::NodeKind;
use crate::uri::DocumentUri;

pub fn document_links(cache: &AstCache, uri: &DocumentUri) -> Vec<DocumentLink> {
    let Some(unit) = cache.get_source_unit(uri) else {
        return Vec::new();
    };
    let Some(includes) = script_includes(&unit.tree) else {
        return Vec::new();
    };

    includes
        .into_iter()
        .filter_map(|include_id| {
            let node = unit.tree.get(include_id)?;
            let NodeKind::Include { source_path, .. } = &node.kind else {
                return None;
            };
            let target = resolve_relative(uri, source_path)?;
            let path_range = path_literal_range(node.span);
            Some(DocumentLink {
                range: path_range,
                target: Some(target.into_url()),
                tooltip: None,
                data: None,
            })
        })
        .collect()
}

/// The `Include` node's span covers the whole statement; good enough for a
/// clickable region without tracking the string literal's own span
/// separately -- the grammar's `Include` node stores only
/// `source_path: String`, with no separate span for it.
fn path_literal_range(span: crate::lexer::token::Span) -> Range {
    span_to_range(span)
}
