//! Process/workflow call checker: argument-count checks against a
//! callee's declared `inputs:`/`take:` list, and `CALL.out` /
//! `CALL.out.NAME` output-name checks against the callee's declared
//! outputs/emits.
//!
//! Walks resolved references and turns shape mismatches into a flat
//! `Vec<Diagnostic>` rather than failing the whole pass.

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::parser::span_to_range;
use crate::resolver::{NameResolution, Resolution};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

pub fn check_calls(tree: &SyntaxTree, resolution: &NameResolution) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (id, node) in tree.iter() {
        if node.synthetic {
            continue;
        }
        match &node.kind {
            NodeKind::Call { callee, args } => {
                check_arity(tree, resolution, *callee, args.len(), node.span, &mut diagnostics);
            }
            NodeKind::PropertyAccess { target, name } => {
                check_output_access(tree, resolution, id, *target, name, &mut diagnostics);
            }
            _ => {}
        }
    }
    diagnostics
}

fn declared_target(tree: &SyntaxTree, resolution: &NameResolution, callee: NodeId) -> Option<NodeId> {
    match resolution.references.get(&callee) {
        Some(Resolution::Declaration(decl)) => Some(*decl),
        _ => None,
    }
    .filter(|decl| tree.get(*decl).is_some())
}

fn check_arity(
    tree: &SyntaxTree,
    resolution: &NameResolution,
    callee: NodeId,
    arg_count: usize,
    call_span: crate::lexer::token::Span,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(decl) = declared_target(tree, resolution, callee) else {
        return;
    };
    let Some(decl_node) = tree.get(decl) else { return };

    let expected = match &decl_node.kind {
        NodeKind::Process { inputs, .. } => inputs.len(),
        NodeKind::Workflow { takes, name: Some(_), .. } => takes.len(),
        _ => return,
    };

    if arg_count != expected {
        diagnostics.push(Diagnostic::error(
            DiagnosticPhase::TypeInference,
            span_to_range(call_span),
            format!("Incorrect number of call arguments, expected {expected} but received {arg_count}"),
        ));
    }
}

/// Resolves the receiver of a `.out`/`.out.NAME` access to the process/
/// workflow declaration it names, whether the receiver is a call
/// (`P().out`) or a bare reference to the callee itself (`P.out`).
fn resolved_declaration(tree: &SyntaxTree, resolution: &NameResolution, node: NodeId) -> Option<NodeId> {
    match tree.get(node).map(|n| n.kind.clone())? {
        NodeKind::Call { callee, .. } => declared_target(tree, resolution, callee),
        NodeKind::Ident { .. } => declared_target(tree, resolution, node),
        _ => None,
    }
}

fn check_output_access(
    tree: &SyntaxTree,
    resolution: &NameResolution,
    node: NodeId,
    target: NodeId,
    name: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if name == "out" {
        if let Some(decl) = resolved_declaration(tree, resolution, target) {
            let output_count = output_names(tree, decl).map(|names| names.len());
            if output_count == Some(0) {
                let span = tree.get(node).unwrap().span;
                diagnostics.push(Diagnostic::error(
                    DiagnosticPhase::TypeInference,
                    span_to_range(span),
                    "call target declares no outputs".to_string(),
                ));
            }
        }
        return;
    }

    // `CALL.out.NAME` / `NAME.out.NAME` -- `target` is itself a
    // `PropertyAccess` whose own target is the call or bare callee
    // reference, and whose own name is `"out"`.
    if let Some(NodeKind::PropertyAccess { target: inner, name: n2 }) = tree.get(target).map(|n| n.kind.clone()) {
        if n2 != "out" {
            return;
        }
        let Some(decl) = resolved_declaration(tree, resolution, inner) else {
            return;
        };
        let Some(names) = output_names(tree, decl) else {
            return;
        };
        if !names.is_empty() && !names.iter().any(|n| n == name) {
            let span = tree.get(node).unwrap().span;
            let decl_name = decl_display_name(tree, decl).unwrap_or_else(|| "?".to_string());
            diagnostics.push(Diagnostic::error(
                DiagnosticPhase::TypeInference,
                span_to_range(span),
                format!("Unrecognized output `{name}` for process `{decl_name}`"),
            ));
        }
    }
}

fn decl_display_name(tree: &SyntaxTree, decl: NodeId) -> Option<String> {
    match tree.get(decl).map(|n| n.kind.clone())? {
        NodeKind::Process { name, .. } => Some(name),
        NodeKind::Workflow { name: Some(name), .. } => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::token::{SourcePos, Span};
    use crate::resolver::Resolution;
    use crate::syntax::{Node, ProcessBody};
    use std::collections::HashMap;

    fn dummy_span() -> Span {
        Span::new(SourcePos::new(1, 1), SourcePos::new(1, 1))
    }

    fn resolution_with(callee: NodeId, decl: NodeId) -> NameResolution {
        let mut references = HashMap::new();
        references.insert(callee, Resolution::Declaration(decl));
        NameResolution { references, ..Default::default() }
    }

    fn process_node(tree: &mut SyntaxTree, name: &str, inputs: Vec<NodeId>, outputs: Vec<NodeId>) -> NodeId {
        tree.insert(Node::new(
            dummy_span(),
            NodeKind::Process {
                name: name.to_string(),
                directives: vec![],
                inputs,
                outputs,
                when_expr: None,
                body_kind: ProcessBody::Script,
                exec: None,
                stub: None,
            },
        ))
    }

    #[test]
    fn flags_arity_mismatch_against_a_process_declaration() {
        let mut tree = SyntaxTree::new();
        let input_a = tree.insert(Node::new(dummy_span(), NodeKind::ProcessInput));
        let input_b = tree.insert(Node::new(dummy_span(), NodeKind::ProcessInput));
        let process = process_node(&mut tree, "P", vec![input_a, input_b], vec![]);

        let callee = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "P".to_string() }));
        let single_arg = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "x".to_string() }));
        let call = tree.insert(Node::new(dummy_span(), NodeKind::Call { callee, args: vec![single_arg] }));
        tree.set_root(call);

        let resolution = resolution_with(callee, process);
        let diagnostics = check_calls(&tree, &resolution);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Incorrect number of call arguments, expected 2 but received 1"
        );
    }

    #[test]
    fn matching_arity_is_not_flagged() {
        let mut tree = SyntaxTree::new();
        let input_a = tree.insert(Node::new(dummy_span(), NodeKind::ProcessInput));
        let process = process_node(&mut tree, "P", vec![input_a], vec![]);

        let callee = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "P".to_string() }));
        let arg = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "x".to_string() }));
        let call = tree.insert(Node::new(dummy_span(), NodeKind::Call { callee, args: vec![arg] }));
        tree.set_root(call);

        let resolution = resolution_with(callee, process);
        assert!(check_calls(&tree, &resolution).is_empty());
    }

    #[test]
    fn flags_unrecognized_out_name() {
        let mut tree = SyntaxTree::new();
        let emit = tree.insert(Node::new(dummy_span(), NodeKind::ProcessOutput { emit_name: Some("bam".to_string()) }));
        let process = process_node(&mut tree, "P", vec![], vec![emit]);

        let callee = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "P".to_string() }));
        let call = tree.insert(Node::new(dummy_span(), NodeKind::Call { callee, args: vec![] }));
        let out = tree.insert(Node::new(dummy_span(), NodeKind::PropertyAccess { target: call, name: "out".to_string() }));
        let bad_name = tree.insert(Node::new(dummy_span(), NodeKind::PropertyAccess { target: out, name: "bar".to_string() }));
        tree.set_root(bad_name);

        let resolution = resolution_with(callee, process);
        let diagnostics = check_calls(&tree, &resolution);
        assert!(
            diagnostics.iter().any(|d| d.message == "Unrecognized output `bar` for process `P`"),
            "diagnostics were: {diagnostics:?}"
        );
    }

    #[test]
    fn matching_out_name_is_not_flagged() {
        let mut tree = SyntaxTree::new();
        let emit = tree.insert(Node::new(dummy_span(), NodeKind::ProcessOutput { emit_name: Some("bam".to_string()) }));
        let process = process_node(&mut tree, "P", vec![], vec![emit]);

        let callee = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "P".to_string() }));
        let call = tree.insert(Node::new(dummy_span(), NodeKind::Call { callee, args: vec![] }));
        let out = tree.insert(Node::new(dummy_span(), NodeKind::PropertyAccess { target: call, name: "out".to_string() }));
        let good_name = tree.insert(Node::new(dummy_span(), NodeKind::PropertyAccess { target: out, name: "bam".to_string() }));
        tree.set_root(good_name);

        let resolution = resolution_with(callee, process);
        assert!(check_calls(&tree, &resolution).is_empty());
    }

    #[test]
    fn flags_unrecognized_out_name_via_bare_identifier_receiver() {
        let mut tree = SyntaxTree::new();
        let emit = tree.insert(Node::new(dummy_span(), NodeKind::ProcessOutput { emit_name: Some("bam".to_string()) }));
        let process = process_node(&mut tree, "P", vec![], vec![emit]);

        let callee = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "P".to_string() }));
        let out = tree.insert(Node::new(dummy_span(), NodeKind::PropertyAccess { target: callee, name: "out".to_string() }));
        let bad_name = tree.insert(Node::new(dummy_span(), NodeKind::PropertyAccess { target: out, name: "bar".to_string() }));
        tree.set_root(bad_name);

        let resolution = resolution_with(callee, process);
        let diagnostics = check_calls(&tree, &resolution);
        assert!(
            diagnostics.iter().any(|d| d.message == "Unrecognized output `bar` for process `P`"),
            "diagnostics were: {diagnostics:?}"
        );
    }

    #[test]
    fn call_with_no_declared_outputs_flags_bare_out_access() {
        let mut tree = SyntaxTree::new();
        let process = process_node(&mut tree, "P", vec![], vec![]);

        let callee = tree.insert(Node::new(dummy_span(), NodeKind::Ident { name: "P".to_string() }));
        let call = tree.insert(Node::new(dummy_span(), NodeKind::Call { callee, args: vec![] }));
        let out = tree.insert(Node::new(dummy_span(), NodeKind::PropertyAccess { target: call, name: "out".to_string() }));
        tree.set_root(out);

        let resolution = resolution_with(callee, process);
        let diagnostics = check_calls(&tree, &resolution);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "call target declares no outputs");
    }
}

/// Named outputs of a process (`emit:` names on `ProcessOutput`) or a
/// workflow (`emit:` names on `WorkflowEmit`). Unnamed outputs don't
/// participate in `.out.NAME` lookups.
fn output_names(tree: &SyntaxTree, decl: NodeId) -> Option<Vec<String>> {
    match tree.get(decl).map(|n| n.kind.clone())? {
        NodeKind::Process { outputs, .. } => Some(
            outputs
                .iter()
                .filter_map(|&o| match tree.get(o).map(|n| n.kind.clone()) {
                    Some(NodeKind::ProcessOutput { emit_name: Some(n) }) => Some(n),
                    _ => None,
                })
                .collect(),
        ),
        NodeKind::Workflow { emits, .. } => Some(
            emits
                .iter()
                .filter_map(|&e| match tree.get(e).map(|n| n.kind.clone()) {
                    Some(NodeKind::WorkflowEmit { name, .. }) => Some(name),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}
