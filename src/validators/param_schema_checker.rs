//! Validates `params.<name>` accesses against the parameter schema
//! synthesized from `nextflow_schema.json`. An empty schema (no adjacent
//! file, or the file failed to parse) is treated as "unconstrained" --
//! every `params.*` access is allowed, since there is nothing to check
//! against.

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::parser::span_to_range;
use crate::resolver::schema::ParamSchema;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

pub fn check_param_usages(tree: &SyntaxTree, schema: &ParamSchema) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if schema.fields.is_empty() {
        return diagnostics;
    }

    for (_, node) in tree.iter() {
        if node.synthetic {
            continue;
        }
        let NodeKind::PropertyAccess { target, name } = &node.kind else {
            continue;
        };
        if !is_params_ident(tree, *target) {
            continue;
        }
        if schema.find(name).is_none() {
            diagnostics.push(Diagnostic::error(
                DiagnosticPhase::Schema,
                span_to_range(node.span),
                format!("Unrecognized parameter `{name}`"),
            ));
        }
    }

    diagnostics
}

fn is_params_ident(tree: &SyntaxTree, node: NodeId) -> bool {
    matches!(
        tree.get(node).map(|n| &n.kind),
        Some(NodeKind::Ident { name }) if name == "params"
    )
}
