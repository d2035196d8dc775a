//! Parse-tree -> syntax-tree lowering rules.

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::lexer::token::{Span, TokenKind, RESERVED_HOST_KEYWORDS};
use crate::syntax::{IncludeVariable, Node, NodeId, NodeKind, ProcessBody};

use super::{span_to_range, Parser};

/// Top-level dotted assignments outside `params.*` lower to `FeatureFlag`
/// when the first segment is this reserved namespace.
pub const FEATURE_FLAG_NAMESPACE: &str = "nextflow";

pub(super) fn parse_script(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    let mut feature_flags = Vec::new();
    let mut includes = Vec::new();
    let mut params = Vec::new();
    let mut functions = Vec::new();
    let mut processes = Vec::new();
    let mut workflows = Vec::new();
    let mut entry_workflow = None;
    let mut output = None;

    while !p.at_eof() {
        let doc = take_doc_comment(p);
        match p.peek() {
            TokenKind::KwInclude => {
                if let Some(id) = parse_include(p) {
                    p.set_doc(id, doc);
                    includes.push(id);
                } else if p.permissive {
                    p.resync();
                } else {
                    return None;
                }
            }
            TokenKind::KwProcess => {
                if let Some(id) = parse_process(p) {
                    p.set_doc(id, doc);
                    processes.push(id);
                } else if p.permissive {
                    p.resync();
                } else {
                    return None;
                }
            }
            TokenKind::KwWorkflow => {
                if let Some(id) = parse_workflow(p) {
                    p.set_doc(id, doc);
                    let is_entry = p.tree_is_entry(id);
                    if is_entry {
                        entry_workflow = Some(id);
                    }
                    workflows.push(id);
                } else if p.permissive {
                    p.resync();
                } else {
                    return None;
                }
            }
            TokenKind::KwDef => {
                if let Some(id) = parse_function(p) {
                    p.set_doc(id, doc);
                    functions.push(id);
                } else if p.permissive {
                    p.resync();
                } else {
                    return None;
                }
            }
            TokenKind::KwOutput => {
                if let Some(id) = parse_output_block(p) {
                    p.set_doc(id, doc);
                    output = Some(id);
                } else if p.permissive {
                    p.resync();
                } else {
                    return None;
                }
            }
            TokenKind::Ident(_) => {
                if let Some(id) = parse_top_level_assignment(p) {
                    match p.node_kind(id) {
                        NodeKind::FeatureFlag { .. } => feature_flags.push(id),
                        NodeKind::Param { .. } => params.push(id),
                        _ => {}
                    }
                } else if p.permissive {
                    p.resync();
                } else {
                    return None;
                }
            }
            TokenKind::Eof => break,
            _ => {
                if p.permissive {
                    p.diagnostics.push(Diagnostic::error(
                        DiagnosticPhase::Syntax,
                        span_to_range(p.peek_span()),
                        "unexpected token at top level",
                    ));
                    p.bump();
                } else {
                    return None;
                }
            }
        }
    }

    let end = p.peek_span();
    Some(p.insert(Node::new(
        Span::new(start.start, end.start),
        NodeKind::Script {
            feature_flags,
            includes,
            params,
            functions,
            processes,
            workflows,
            entry_workflow,
            output,
        },
    )))
}

fn take_doc_comment(p: &mut Parser) -> Option<String> {
    if let TokenKind::DocComment(text) = p.peek().clone() {
        p.bump();
        Some(text)
    } else {
        None
    }
}

fn parse_include(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    p.bump(); // 'include'
    p.expect(TokenKind::LBrace, "'{' after include")?;

    let mut variables = Vec::new();
    loop {
        if matches!(p.peek(), TokenKind::RBrace) {
            break;
        }
        let var_span = p.peek_span();
        let name = expect_identifier(p, "include variable name")?;
        let alias = if matches!(p.peek(), TokenKind::KwAs) {
            p.bump();
            Some(expect_identifier(p, "alias name after 'as'")?)
        } else {
            None
        };
        variables.push(IncludeVariable {
            name,
            alias,
            span: var_span,
        });
        match p.peek() {
            TokenKind::Semi | TokenKind::Comma => {
                p.bump();
            }
            _ => break,
        }
    }
    p.expect(TokenKind::RBrace, "'}' closing include list")?;
    p.expect(TokenKind::KwFrom, "'from' after include list")?;
    let source_path = expect_string(p, "include source path")?;
    let end = p.peek_span();

    Some(p.insert(Node::new(
        Span::new(start.start, end.start),
        NodeKind::Include {
            source_path,
            variables,
        },
    )))
}

fn parse_process(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    p.bump(); // 'process'
    let name = expect_identifier(p, "process name")?;
    p.expect(TokenKind::LBrace, "'{' opening process body")?;

    let mut directives = Vec::new();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut when_expr = None;
    let mut body_kind = None;
    let mut exec = None;
    let mut stub = None;

    while !matches!(p.peek(), TokenKind::RBrace | TokenKind::Eof) {
        match p.peek() {
            TokenKind::KwInput => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after input")?;
                while is_directive_start(p.peek()) {
                    inputs.push(parse_raw_statement(p, NodeKind::ProcessInput));
                    consume_separator(p);
                }
            }
            TokenKind::KwOutput => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after output")?;
                while is_directive_start(p.peek()) {
                    let emit_name = peek_trailing_emit_name(p);
                    outputs.push(parse_raw_statement(p, NodeKind::ProcessOutput { emit_name }));
                    consume_separator(p);
                }
            }
            TokenKind::KwWhen => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after when")?;
                when_expr = parse_expr(p);
            }
            TokenKind::KwScript | TokenKind::KwShell | TokenKind::KwExec => {
                body_kind = Some(match p.peek() {
                    TokenKind::KwScript => ProcessBody::Script,
                    TokenKind::KwShell => ProcessBody::Shell,
                    _ => ProcessBody::Exec,
                });
                p.bump();
                p.expect(TokenKind::Colon, "':' after script/shell/exec")?;
                exec = parse_raw_block(p);
            }
            TokenKind::KwStub => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after stub")?;
                stub = parse_raw_block(p);
            }
            _ if is_directive_start(p.peek()) => {
                match parse_directive_statement(p) {
                    Some(id) => directives.push(id),
                    None => {
                        p.diagnostics.push(Diagnostic::error(
                            DiagnosticPhase::Syntax,
                            span_to_range(p.peek_span()),
                            "invalid directive",
                        ));
                        if p.permissive {
                            p.resync_within_block();
                        } else {
                            return None;
                        }
                    }
                }
                consume_separator(p);
            }
            _ => {
                if p.permissive {
                    p.diagnostics.push(Diagnostic::error(
                        DiagnosticPhase::Syntax,
                        span_to_range(p.peek_span()),
                        "unexpected token in process body",
                    ));
                    p.bump();
                } else {
                    return None;
                }
            }
        }
    }

    if exec.is_none() {
        p.diagnostics.push(Diagnostic::error(
            DiagnosticPhase::Syntax,
            span_to_range(p.peek_span()),
            format!("process `{name}` is missing a script/shell/exec body"),
        ));
    }

    p.expect(TokenKind::RBrace, "'}' closing process body")?;
    let end = p.peek_span();

    Some(p.insert(Node::new(
        Span::new(start.start, end.start),
        NodeKind::Process {
            name,
            directives,
            inputs,
            outputs,
            when_expr,
            body_kind: body_kind.unwrap_or(ProcessBody::Script),
            exec,
            stub,
        },
    )))
}

fn is_directive_start(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Ident(_) | TokenKind::Minus)
}

fn parse_raw_statement(p: &mut Parser, kind: NodeKind) -> NodeId {
    let start = p.peek_span();
    // Consume tokens for one statement; the exact shape of input/output
    // statements is opaque beyond the trailing `emit:` name -- only counts
    // and emit names are needed, not full typing.
    while !matches!(p.peek(), TokenKind::Semi | TokenKind::Comma | TokenKind::RBrace | TokenKind::Eof)
        && !is_section_keyword(p.peek())
    {
        p.bump();
    }
    let end = p.peek_span();
    p.insert(Node::new(Span::new(start.start, end.start), kind))
}

fn is_section_keyword(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KwInput
            | TokenKind::KwOutput
            | TokenKind::KwWhen
            | TokenKind::KwScript
            | TokenKind::KwShell
            | TokenKind::KwExec
            | TokenKind::KwStub
    )
}

fn peek_trailing_emit_name(p: &Parser) -> Option<String> {
    // Scans ahead (without consuming) for `emit : NAME` within the current
    // statement's token run.
    let mut i = p.pos_for_peek();
    let mut depth = 0i32;
    loop {
        match p.token_at(i) {
            TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBracket => depth -= 1,
            TokenKind::Semi | TokenKind::Comma if depth <= 0 => return None,
            TokenKind::RBrace | TokenKind::Eof => return None,
            TokenKind::Ident(name) if name == "emit" => {
                if matches!(p.token_at(i + 1), TokenKind::Colon) {
                    if let TokenKind::Ident(emit_name) = p.token_at(i + 2) {
                        return Some(emit_name.clone());
                    }
                }
            }
            _ => {}
        }
        i += 1;
        if i > p.pos_for_peek() + 256 {
            return None;
        }
    }
}

fn consume_separator(p: &mut Parser) {
    if matches!(p.peek(), TokenKind::Semi | TokenKind::Comma) {
        p.bump();
    }
}

/// Rewrites a directive/output statement:
/// - a lone variable is rewritten to a no-arg call;
/// - `name - expr` is rewritten to `name(-expr)`;
/// - an already method-call-shaped statement (`name arg1, arg2, ...`)
///   is kept as-is;
/// - anything else is an "invalid directive" diagnostic (reported by the
///   caller when this returns `None`).
fn parse_directive_statement(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    if matches!(p.peek(), TokenKind::Minus) {
        // A directive can never *start* with a bare unary minus.
        return None;
    }
    let name = expect_identifier(p, "directive name")?;
    let name_node = p.insert(Node::new(start, NodeKind::Ident { name: name.clone() }));

    match p.peek() {
        TokenKind::Semi | TokenKind::Comma | TokenKind::RBrace | TokenKind::Eof => {
            // Lone variable -> rewritten to a no-arg call.
            let end = p.peek_span();
            Some(p.insert(Node::new(
                Span::new(start.start, end.start),
                NodeKind::Call {
                    callee: name_node,
                    args: vec![],
                },
            )))
        }
        TokenKind::Minus => {
            // `name - expr` -> `name(-expr)`.
            p.bump();
            let inner = parse_expr(p)?;
            let neg_span = p.peek_span();
            let neg = p.insert(Node::new(Span::new(start.start, neg_span.start), NodeKind::UnaryNeg { expr: inner }));
            Some(p.insert(Node::new(
                Span::new(start.start, neg_span.start),
                NodeKind::Call {
                    callee: name_node,
                    args: vec![neg],
                },
            )))
        }
        _ if is_section_keyword(p.peek()) => {
            let end = p.peek_span();
            Some(p.insert(Node::new(
                Span::new(start.start, end.start),
                NodeKind::Call {
                    callee: name_node,
                    args: vec![],
                },
            )))
        }
        _ => {
            // Command-call-shaped: `name arg, arg, ...` without parens, or
            // a conventional `name(args)` call.
            let mut args = Vec::new();
            if matches!(p.peek(), TokenKind::LParen) {
                p.bump();
                while !matches!(p.peek(), TokenKind::RParen | TokenKind::Eof) {
                    if let Some(arg) = parse_expr(p) {
                        args.push(arg);
                    } else {
                        return None;
                    }
                    if matches!(p.peek(), TokenKind::Comma) {
                        p.bump();
                    }
                }
                p.expect(TokenKind::RParen, "')' closing call arguments")?;
            } else {
                loop {
                    match parse_expr(p) {
                        Some(arg) => args.push(arg),
                        None => return None,
                    }
                    if matches!(p.peek(), TokenKind::Comma) {
                        p.bump();
                    } else {
                        break;
                    }
                }
            }
            let end = p.peek_span();
            Some(p.insert(Node::new(
                Span::new(start.start, end.start),
                NodeKind::Call {
                    callee: name_node,
                    args,
                },
            )))
        }
    }
}

fn parse_raw_block(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    let text = expect_string(p, "script/shell/exec/stub body")?;
    let end = p.peek_span();
    Some(p.insert(Node::new(Span::new(start.start, end.start), NodeKind::RawBlock { text })))
}

fn parse_workflow(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    p.bump(); // 'workflow'
    let name = if let TokenKind::Ident(n) = p.peek().clone() {
        p.bump();
        Some(n)
    } else {
        None
    };
    p.expect(TokenKind::LBrace, "'{' opening workflow body")?;

    let mut takes = Vec::new();
    let mut emits = Vec::new();
    let mut publishers = Vec::new();
    let mut main = Vec::new();

    while !matches!(p.peek(), TokenKind::RBrace | TokenKind::Eof) {
        match p.peek() {
            TokenKind::KwTake => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after take")?;
                while let TokenKind::Ident(n) = p.peek().clone() {
                    let span = p.peek_span();
                    p.bump();
                    takes.push(p.insert(Node::new(span, NodeKind::WorkflowTake { name: n })));
                    consume_separator(p);
                }
            }
            TokenKind::KwMain => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after main")?;
                while is_directive_start(p.peek()) {
                    if let Some(id) = parse_expr(p) {
                        main.push(id);
                    } else {
                        break;
                    }
                    consume_separator(p);
                }
            }
            TokenKind::KwEmit => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after emit")?;
                while let TokenKind::Ident(n) = p.peek().clone() {
                    let span = p.peek_span();
                    p.bump();
                    let value = if matches!(p.peek(), TokenKind::Assign) {
                        p.bump();
                        parse_expr(p)
                    } else {
                        None
                    };
                    emits.push(p.insert(Node::new(span, NodeKind::WorkflowEmit { name: n, value })));
                    consume_separator(p);
                }
            }
            TokenKind::KwPublish => {
                p.bump();
                p.expect(TokenKind::Colon, "':' after publish")?;
                while let TokenKind::Ident(n) = p.peek().clone() {
                    let span = p.peek_span();
                    p.bump();
                    publishers.push(p.insert(Node::new(span, NodeKind::WorkflowPublish { name: n })));
                    consume_separator(p);
                }
            }
            _ if is_directive_start(p.peek()) => {
                // Entry workflows commonly have an un-labeled `main:`-less
                // body; treat bare statements the same as `main:` content.
                if let Some(id) = parse_expr(p) {
                    main.push(id);
                    consume_separator(p);
                } else {
                    p.bump();
                }
            }
            _ => {
                if p.permissive {
                    p.bump();
                } else {
                    return None;
                }
            }
        }
    }
    p.expect(TokenKind::RBrace, "'}' closing workflow body")?;
    let end = p.peek_span();

    if name.is_none() && (!takes.is_empty() || !emits.is_empty()) {
        p.diagnostics.push(Diagnostic::error(
            DiagnosticPhase::Syntax,
            span_to_range(start),
            "entry workflow must not declare `take:` or `emit:`",
        ));
    }

    Some(p.insert(Node::new(
        Span::new(start.start, end.start),
        NodeKind::Workflow {
            name,
            takes,
            emits,
            publishers,
            main,
        },
    )))
}

fn parse_function(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    p.bump(); // 'def'
    let name = expect_identifier(p, "function name")?;
    p.expect(TokenKind::LParen, "'(' opening parameter list")?;
    let mut params = Vec::new();
    while !matches!(p.peek(), TokenKind::RParen | TokenKind::Eof) {
        params.push(expect_identifier(p, "parameter name")?);
        if matches!(p.peek(), TokenKind::Comma) {
            p.bump();
        }
    }
    p.expect(TokenKind::RParen, "')' closing parameter list")?;
    p.expect(TokenKind::LBrace, "'{' opening function body")?;
    let body = parse_raw_body_statements(p);
    p.expect(TokenKind::RBrace, "'}' closing function body")?;
    let end = p.peek_span();

    Some(p.insert(Node::new(
        Span::new(start.start, end.start),
        NodeKind::Function { name, params, body },
    )))
}

fn parse_output_block(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    p.bump(); // 'output'
    p.expect(TokenKind::LBrace, "'{' opening output body")?;
    let mut body = Vec::new();
    while is_directive_start(p.peek()) {
        match parse_directive_statement(p) {
            Some(id) => body.push(id),
            None => {
                p.diagnostics.push(Diagnostic::error(
                    DiagnosticPhase::Syntax,
                    span_to_range(p.peek_span()),
                    "invalid directive",
                ));
                if p.permissive {
                    p.resync_within_block();
                } else {
                    return None;
                }
            }
        }
        consume_separator(p);
    }
    p.expect(TokenKind::RBrace, "'}' closing output body")?;
    let end = p.peek_span();
    Some(p.insert(Node::new(Span::new(start.start, end.start), NodeKind::Output { body })))
}

fn parse_raw_body_statements(p: &mut Parser) -> Vec<NodeId> {
    // Function bodies host the dynamic host language; kept opaque as a
    // sequence of raw-block fragments rather than fully parsed -- full
    // type inference / execution is beyond the lightweight checks done
    // here.
    let start = p.peek_span();
    let mut depth = 0i32;
    while !matches!(p.peek(), TokenKind::Eof) {
        match p.peek() {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace if depth == 0 => break,
            TokenKind::RBrace => depth -= 1,
            _ => {}
        }
        p.bump();
    }
    let end = p.peek_span();
    if end.start == start.start {
        vec![]
    } else {
        vec![p.insert(Node::new(
            Span::new(start.start, end.start),
            NodeKind::RawBlock {
                text: String::new(),
            },
        ))]
    }
}

fn parse_top_level_assignment(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    let mut segments = vec![expect_identifier(p, "identifier")?];
    while matches!(p.peek(), TokenKind::Dot) {
        p.bump();
        segments.push(expect_identifier(p, "property name")?);
    }
    p.expect(TokenKind::Assign, "'=' in top-level assignment")?;
    let value = parse_expr(p)?;
    let end = p.peek_span();
    let span = Span::new(start.start, end.start);

    if segments[0] == FEATURE_FLAG_NAMESPACE {
        Some(p.insert(Node::new(span, NodeKind::FeatureFlag { dotted_name: segments, value })))
    } else if segments[0] == "params" {
        let mut target = p.insert(Node::new(start, NodeKind::Ident { name: segments[0].clone() }));
        for seg in &segments[1..] {
            target = p.insert(Node::new(
                span,
                NodeKind::PropertyAccess {
                    target,
                    name: seg.clone(),
                },
            ));
        }
        Some(p.insert(Node::new(span, NodeKind::Param { target, value })))
    } else {
        p.diagnostics.push(Diagnostic::error(
            DiagnosticPhase::Syntax,
            span_to_range(span),
            format!("top-level assignment `{}` is not allowed here; move into the entry workflow", segments.join(".")),
        ));
        None
    }
}

pub(super) fn parse_expr(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    let mut node = match p.peek().clone() {
        TokenKind::StringLiteral(s) => {
            p.bump();
            p.insert(Node::new(start, NodeKind::StringLiteral { value: s }))
        }
        TokenKind::NumberLiteral(s) => {
            p.bump();
            p.insert(Node::new(start, NodeKind::NumberLiteral { value: s }))
        }
        TokenKind::KwTrue => {
            p.bump();
            p.insert(Node::new(start, NodeKind::BoolLiteral { value: true }))
        }
        TokenKind::KwFalse => {
            p.bump();
            p.insert(Node::new(start, NodeKind::BoolLiteral { value: false }))
        }
        TokenKind::KwNull => {
            p.bump();
            p.insert(Node::new(start, NodeKind::NullLiteral))
        }
        TokenKind::Minus => {
            p.bump();
            let inner = parse_expr(p)?;
            p.insert(Node::new(start, NodeKind::UnaryNeg { expr: inner }))
        }
        TokenKind::Ident(name) => {
            p.bump();
            let mut node = p.insert(Node::new(start, NodeKind::Ident { name }));
            if matches!(p.peek(), TokenKind::LParen) {
                p.bump();
                let mut args = Vec::new();
                while !matches!(p.peek(), TokenKind::RParen | TokenKind::Eof) {
                    args.push(parse_expr(p)?);
                    if matches!(p.peek(), TokenKind::Comma) {
                        p.bump();
                    }
                }
                p.expect(TokenKind::RParen, "')' closing call arguments")?;
                let end = p.peek_span();
                node = p.insert(Node::new(Span::new(start.start, end.start), NodeKind::Call { callee: node, args }));
            }
            node
        }
        _ => return None,
    };

    while matches!(p.peek(), TokenKind::Dot) {
        p.bump();
        let name = expect_identifier(p, "property name")?;
        let end = p.peek_span();
        node = p.insert(Node::new(
            Span::new(start.start, end.start),
            NodeKind::PropertyAccess { target: node, name },
        ));
    }
    Some(node)
}

fn expect_identifier(p: &mut Parser, what: &str) -> Option<String> {
    match p.peek().clone() {
        TokenKind::Ident(name) => {
            if RESERVED_HOST_KEYWORDS.contains(&name.as_str()) {
                p.diagnostics.push(Diagnostic::error(
                    DiagnosticPhase::Syntax,
                    span_to_range(p.peek_span()),
                    format!("`{name}` is a reserved word and cannot be used as an identifier"),
                ));
                if !p.permissive {
                    return None;
                }
            }
            p.bump();
            Some(name)
        }
        _ => {
            p.expect(TokenKind::Ident(String::new()), what);
            None
        }
    }
}

fn expect_string(p: &mut Parser, what: &str) -> Option<String> {
    match p.peek().clone() {
        TokenKind::StringLiteral(s) => {
            p.bump();
            Some(s)
        }
        _ => {
            p.expect(TokenKind::StringLiteral(String::new()), what);
            None
        }
    }
}
