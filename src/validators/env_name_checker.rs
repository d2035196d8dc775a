//! Validates assignment names inside `env { }` blocks.
//!
//! `config_schema_checker` deliberately skips `env.*` entirely -- variable
//! names under `env` are user-defined and have no fixed schema -- but an
//! env block still only makes sense holding flat `NAME = value` pairs, not
//! dotted ones. `env { PATH.SUB = 'x' }` parses to a `ConfigAssignment`
//! with `dotted_name: ["PATH", "SUB"]` inside the `env` `ConfigBlock`
//! (`parser/config.rs` gives dotted segments the same shape regardless of
//! enclosing scope), so that shape is exactly what this checker flags.

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::parser::span_to_range;
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

pub fn check_env_names(tree: &SyntaxTree) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let Some(root) = tree.root() else {
        return diagnostics;
    };
    let Some(NodeKind::ConfigFile { items }) = tree.get(root).map(|n| n.kind.clone()) else {
        return diagnostics;
    };
    walk_items(tree, &items, false, &mut diagnostics);
    diagnostics
}

fn walk_items(tree: &SyntaxTree, items: &[NodeId], in_env: bool, diagnostics: &mut Vec<Diagnostic>) {
    for &item in items {
        let Some(node) = tree.get(item) else { continue };
        match &node.kind {
            NodeKind::ConfigAssignment { dotted_name, .. } if in_env && dotted_name.len() > 1 => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticPhase::Schema,
                    span_to_range(node.span),
                    format!("Invalid environment variable name '{}'", dotted_name.join(".")),
                ));
            }
            NodeKind::ConfigAssignment { .. } => {}
            NodeKind::ConfigBlock { name, body } => {
                walk_items(tree, body, in_env || name == "env", diagnostics);
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

    fn env_tree(dotted_name: Vec<&str>) -> SyntaxTree {
        let mut tree = SyntaxTree::new();
        let value = string_node(&mut tree, "x");
        let assignment = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigAssignment {
                dotted_name: dotted_name.into_iter().map(str::to_string).collect(),
                value,
            },
        ));
        let env_block = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigBlock {
                name: "env".to_string(),
                body: vec![assignment],
            },
        ));
        let root = tree.insert(Node::new(dummy_span(), NodeKind::ConfigFile { items: vec![env_block] }));
        tree.set_root(root);
        tree
    }

    #[test]
    fn flat_env_name_is_fine() {
        let tree = env_tree(vec!["PATH"]);
        assert!(check_env_names(&tree).is_empty());
    }

    #[test]
    fn dotted_env_name_is_flagged() {
        let tree = env_tree(vec!["PATH", "SUB"]);
        let diagnostics = check_env_names(&tree);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Invalid environment variable name 'PATH.SUB'"
        );
    }

    #[test]
    fn dotted_name_outside_env_is_ignored() {
        let mut tree = SyntaxTree::new();
        let value = string_node(&mut tree, "x");
        let assignment = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigAssignment {
                dotted_name: vec!["ext".to_string(), "label".to_string()],
                value,
            },
        ));
        let process_block = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigBlock {
                name: "process".to_string(),
                body: vec![assignment],
            },
        ));
        let root = tree.insert(Node::new(
            dummy_span(),
            NodeKind::ConfigFile {
                items: vec![process_block],
            },
        ));
        tree.set_root(root);

        assert!(check_env_names(&tree).is_empty());
    }
}
