//! Validates config assignments against the static config schema tree,
//! normalizing nested `ConfigBlock`s into the dotted name their contents
//! would have on the command line (e.g. `process { cpus = 4 }`
//! normalizes `cpus` to `process.cpus`) before checking.

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::parser::span_to_range;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use crate::validators::config_schema_tree::CONFIG_SCHEMA_TREE;

pub fn check_config_assignments(tree: &SyntaxTree) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let Some(root) = tree.root() else {
        return diagnostics;
    };
    let Some(NodeKind::ConfigFile { items }) = tree.get(root).map(|n| n.kind.clone()) else {
        return diagnostics;
    };
    walk_items(tree, &items, &[], &mut diagnostics);
    diagnostics
}

fn walk_items(tree: &SyntaxTree, items: &[NodeId], prefix: &[String], diagnostics: &mut Vec<Diagnostic>) {
    for &item in items {
        let Some(node) = tree.get(item) else { continue };
        match &node.kind {
            NodeKind::ConfigAssignment { dotted_name, .. } => {
                let full: Vec<String> = prefix.iter().cloned().chain(dotted_name.iter().cloned()).collect();
                if let Some(false) = CONFIG_SCHEMA_TREE.check(&full) {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticPhase::Schema,
                        span_to_range(node.span),
                        format!("unknown config key `{}`", full.join(".")),
                    ));
                }
            }
            NodeKind::ConfigBlock { name, body } => {
                let mut nested_prefix = prefix.to_vec();
                nested_prefix.push(name.clone());
                walk_items(tree, body, &nested_prefix, diagnostics);
            }
            NodeKind::ConfigInclude { .. } => {}
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::token::{SourcePos, Span};
    use crate::syntax::Node;

    fn dummy_span() -> Span {
        Span::new(SourcePos::new(1, 1), SourcePos::new(1, 1))
    }

    fn string_node(tree: &mut SyntaxTree, value: &str) -> NodeId {
        tree.insert(Node::new(dummy_span(), NodeKind::StringLiteral { value: value.to_string() }))
    }

    #[test]
    fn flags_unknown_key_inside_known_block() {
        let mut tree = SyntaxTree::new();
        let value = string_node(&mut tree, "x");
        let assignment = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigAssignment {
                dotted_name: vec!["bogus".to_string()],
                value,
            },
        ));
        let block = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigBlock {
                name: "docker".to_string(),
                body: vec![assignment],
            },
        ));
        let root = tree.insert(Node::new(dummy_span(), NodeKind::ConfigFile { items: vec![block] }));
        tree.set_root(root);

        let diagnostics = check_config_assignments(&tree);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("docker.bogus"));
    }

    #[test]
    fn does_not_flag_process_ext_or_params() {
        let mut tree = SyntaxTree::new();
        let value = string_node(&mut tree, "x");
        let ext_assignment = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigAssignment {
                dotted_name: vec!["anything".to_string()],
                value,
            },
        ));
        let ext_block = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigBlock {
                name: "ext".to_string(),
                body: vec![ext_assignment],
            },
        ));
        let process_block = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigBlock {
                name: "process".to_string(),
                body: vec![ext_block],
            },
        ));
        let root = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigFile {
                items: vec![process_block],
            },
        ));
        tree.set_root(root);

        assert!(check_config_assignments(&tree).is_empty());
    }
}
