//! Include Resolver: binds `include { a; b as c } from './x'` variables
//! to the declarations they name in another file.
//!
//! Kept a pure, stateless pass rather than a self-driving fixpoint: a
//! workspace's include graph can cycle or be discovered out of order, so
//! `AstCache` re-invokes `resolve_pass` over the dirty set and feeds each
//! pass's bindings back in as `previous` until a pass reports
//! `changed == false`, then calls `finalize` once to turn whatever is
//! still unbound into diagnostics. A hand-rolled adjacency map, not a
//! graph crate -- per file this is a handful of edges.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::parser::span_to_range;
use crate::syntax::{GlobalNodeRef, NodeId, NodeKind, SyntaxTree};
use crate::uri::DocumentUri;

/// What a script exposes to files that `include` it: its top-level
/// function/process/workflow declarations, by the name they're declared
/// under (not any alias the importer gives them).
#[derive(Debug, Clone, Default)]
pub struct ExportedDeclarations {
    pub by_name: HashMap<String, NodeId>,
}

impl ExportedDeclarations {
    pub fn from_script(tree: &SyntaxTree) -> Self {
        let mut by_name = HashMap::new();
        if let Some(root) = tree.root() {
            if let Some(NodeKind::Script {
                functions,
                processes,
                workflows,
                ..
            }) = tree.get(root).map(|n| &n.kind)
            {
                for &id in functions.iter().chain(processes).chain(workflows) {
                    let name = tree.get(id).and_then(|n| match &n.kind {
                        NodeKind::Function { name, .. } => Some(name.clone()),
                        NodeKind::Process { name, .. } => Some(name.clone()),
                        NodeKind::Workflow { name: Some(n), .. } => Some(n.clone()),
                        _ => None,
                    });
                    if let Some(name) = name {
                        by_name.insert(name, id);
                    }
                }
            }
        }
        Self { by_name }
    }
}

pub type IncludeBindings = HashMap<NodeId, Vec<Option<GlobalNodeRef>>>;

#[derive(Debug, Default)]
pub struct IncludeResolution {
    pub bindings: IncludeBindings,
    pub changed: bool,
}

pub struct IncludeResolver;

impl IncludeResolver {
    /// Attempts to resolve every not-yet-bound variable of every `Include`
    /// node in `includes` against `exports`, carrying forward whatever
    /// `previous` already had bound (bindings are monotonic: once set, a
    /// later pass never unsets one).
    pub fn resolve_pass(
        source_uri: &DocumentUri,
        tree: &SyntaxTree,
        includes: &[NodeId],
        resolve_include_path: impl Fn(&DocumentUri, &str) -> Option<DocumentUri>,
        exports: &HashMap<DocumentUri, ExportedDeclarations>,
        previous: &IncludeBindings,
    ) -> IncludeResolution {
        let mut bindings = previous.clone();
        let mut changed = false;

        for &include in includes {
            let Some(NodeKind::Include { source_path, variables }) = tree.get(include).map(|n| &n.kind) else {
                continue;
            };
            let slot = bindings
                .entry(include)
                .or_insert_with(|| vec![None; variables.len()]);
            if slot.len() != variables.len() {
                slot.resize(variables.len(), None);
            }

            let Some(target_uri) = resolve_include_path(source_uri, source_path) else {
                continue;
            };
            let Some(target) = exports.get(&target_uri) else {
                continue;
            };

            for (i, var) in variables.iter().enumerate() {
                if slot[i].is_some() {
                    continue;
                }
                if let Some(&node) = target.by_name.get(&var.name) {
                    slot[i] = Some(GlobalNodeRef {
                        uri: target_uri.clone(),
                        node,
                    });
                    changed = true;
                }
            }
        }

        IncludeResolution { bindings, changed }
    }

    /// Called once a round of `resolve_pass` calls across the workspace
    /// settles (no pass reported `changed`). Anything still unbound is a
    /// genuine unresolved include.
    pub fn finalize(tree: &SyntaxTree, includes: &[NodeId], bindings: &IncludeBindings) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for &include in includes {
            let Some(NodeKind::Include { variables, source_path }) = tree.get(include).map(|n| &n.kind) else {
                continue;
            };
            let resolved = bindings.get(&include);
            for (i, var) in variables.iter().enumerate() {
                let is_bound = resolved.map(|r| r.get(i).map(|o| o.is_some()).unwrap_or(false)).unwrap_or(false);
                if !is_bound {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticPhase::IncludeResolution,
                        span_to_range(var.span),
                        format!("unresolved include: `{}` not found in `{}`", var.name, source_path),
                    ));
                }
            }
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::token::{SourcePos, Span};
    use crate::syntax::{IncludeVariable, Node, NodeKind};

    fn uri(s: &str) -> DocumentUri {
        DocumentUri::new(tower_lsp::lsp_types::Url::parse(s).unwrap())
    }

    fn dummy_span() -> Span {
        Span::new(SourcePos::new(1, 1), SourcePos::new(1, 1))
    }

    fn script_with_function(name: &str) -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        let func = tree.insert(Node::new(
            dummy_span(),
            NodeKind::Function {
                name: name.to_string(),
                params: vec![],
                body: vec![],
            },
        ));
        let root = tree.insert(Node::new(
            dummy_span(),
            NodeKind::Script {
                feature_flags: vec![],
                includes: vec![],
                params: vec![],
                functions: vec![func],
                processes: vec![],
                workflows: vec![],
                entry_workflow: None,
                output: None,
            },
        ));
        tree.set_root(root);
        tree
    }

    fn script_with_include(var_name: &str, path: &str) -> (SyntaxTree, NodeId) {
        let mut tree = SyntaxTree::new();
        let include = tree.insert(Node::new(
            dummy_span(),
            NodeKind::Include {
                source_path: path.to_string(),
                variables: vec![IncludeVariable {
                    name: var_name.to_string(),
                    alias: None,
                    span: dummy_span(),
                }],
            },
        ));
        let root = tree.insert(Node::new(
            dummy_span(),
            NodeKind::Script {
                feature_flags: vec![],
                includes: vec![include],
                params: vec![],
                functions: vec![],
                processes: vec![],
                workflows: vec![],
                entry_workflow: None,
                output: None,
            },
        ));
        tree.set_root(root);
        (tree, include)
    }

    #[test]
    fn resolves_when_target_exports_are_already_known() {
        let target_uri = uri("file:///lib.nf");
        let target_tree = script_with_function("greet");
        let mut exports = HashMap::new();
        exports.insert(target_uri.clone(), ExportedDeclarations::from_script(&target_tree));

        let source_uri = uri("file:///main.nf");
        let (tree, include_node) = script_with_include("greet", "./lib.nf");

        let resolution = IncludeResolver::resolve_pass(
            &source_uri,
            &tree,
            &[include_node],
            |_, _| Some(target_uri.clone()),
            &exports,
            &IncludeBindings::new(),
        );

        assert!(resolution.changed);
        let bound = &resolution.bindings[&include_node][0];
        assert_eq!(bound.as_ref().unwrap().uri, target_uri);

        let diagnostics = IncludeResolver::finalize(&tree, &[include_node], &resolution.bindings);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn unresolved_after_fixpoint_is_reported() {
        let source_uri = uri("file:///main.nf");
        let (tree, include_node) = script_with_include("missing", "./lib.nf");
        let exports = HashMap::new();

        let resolution = IncludeResolver::resolve_pass(
            &source_uri,
            &tree,
            &[include_node],
            |_, _| None,
            &exports,
            &IncludeBindings::new(),
        );

        assert!(!resolution.changed);
        let diagnostics = IncludeResolver::finalize(&tree, &[include_node], &resolution.bindings);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing"));
    }
}
