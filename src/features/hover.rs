//! Hover: doc comment plus a one-line description of
//! whatever node sits under the cursor.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use crate::ast_cache::AstCache;
use crate::parser::span_to_range;
use crate::syntax::NodeKind;
use crate::uri::DocumentUri;

pub fn hover(cache: &AstCache, uri: &DocumentUri, position: Position) -> Option<Hover> {
    let unit = cache.get_source_unit(uri)?;
    let node_id = cache.get_node_at(uri, position)?;
    let node = unit.tree.get(node_id)?;

    let mut text = describe(&node.kind);
    if let Some(doc) = &node.doc_comment {
        text = format!("{doc}\n\n---\n\n{text}");
    }

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: text,
        }),
        range: Some(span_to_range(node.span)),
    })
}

fn describe(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Process { name, inputs, outputs, .. } => {
            format!("```\nprocess {name}\n```\n{} input(s), {} output(s)", inputs.len(), outputs.len())
        }
        NodeKind::Workflow { name: Some(name), takes, emits, .. } => {
            format!("```\nworkflow {name}\n```\ntakes {}, emits {}", takes.len(), emits.len())
        }
        NodeKind::Workflow { name: None, .. } => "```\nworkflow (entry)\n```".to_string(),
        NodeKind::Function { name, params, .. } => {
            format!("```\ndef {name}({})\n```", params.join(", "))
        }
        NodeKind::Include { source_path, .. } => format!("include from `{source_path}`"),
        NodeKind::Param { .. } => "parameter assignment".to_string(),
        NodeKind::SchemaField { name, ty, description } => {
            let doc = description.clone().unwrap_or_default();
            format!("`params.{name}`: {ty:?}\n\n{doc}")
        }
        NodeKind::Ident { name } => format!("`{name}`"),
        NodeKind::PropertyAccess { name, .. } => format!("`.{name}`"),
        NodeKind::ConfigAssignment { dotted_name, .. } => format!("`{}`", dotted_name.join(".")),
        NodeKind::ConfigBlock { name, .. } => format!("config scope `{name}`"),
        _ => return String::new(),
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
    fn describes_a_process_declaration() {
        let file_cache = Arc::new(FileCache::new());
        let cache = AstCache::new(Arc::clone(&file_cache));
        let u = uri("file:///main.nf");
        file_cache.did_open(u.clone(), "process align {\n  script:\n  \"\"\"echo hi\"\"\"\n}\n".to_string());
        let mut dirty = HashSet::new();
        dirty.insert(u.clone());
        cache.analyze(&dirty);

        let result = hover(&cache, &u, Position::new(0, 9));
        assert!(result.is_some());
    }
}
