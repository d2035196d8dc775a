//! Config-file lowering: dotted assignments, nested named blocks, and
//! `include 'path'` statements.

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::lexer::token::{Span, TokenKind};
use crate::syntax::{Node, NodeId, NodeKind};

use super::{span_to_range, Parser};

pub(super) fn parse_config_file(p: &mut Parser) -> Option<NodeId> {
    let start = p.peek_span();
    let items = parse_config_items(p, false)?;
    let end = p.peek_span();
    Some(p.insert(Node::new(Span::new(start.start, end.start), NodeKind::ConfigFile { items })))
}

fn parse_config_items(p: &mut Parser, inside_block: bool) -> Option<Vec<NodeId>> {
    let mut items = Vec::new();
    loop {
        match p.peek() {
            TokenKind::Eof => break,
            TokenKind::RBrace if inside_block => break,
            TokenKind::KwInclude => {
                let start = p.peek_span();
                p.bump();
                let path = match p.peek().clone() {
                    TokenKind::StringLiteral(s) => {
                        p.bump();
                        s
                    }
                    _ => {
                        p.expect(TokenKind::StringLiteral(String::new()), "include path");
                        if p.permissive {
                            p.resync_within_block();
                            continue;
                        } else {
                            return None;
                        }
                    }
                };
                let end = p.peek_span();
                items.push(p.insert(Node::new(
                    Span::new(start.start, end.start),
                    NodeKind::ConfigInclude { source_path: path },
                )));
            }
            TokenKind::Ident(_) => {
                let start = p.peek_span();
                let mut segments = vec![ident(p)?];
                while matches!(p.peek(), TokenKind::Dot) {
                    p.bump();
                    segments.push(ident(p)?);
                }
                match p.peek() {
                    TokenKind::LBrace => {
                        p.bump();
                        let body = parse_config_items(p, true)?;
                        p.expect(TokenKind::RBrace, "'}' closing config block")?;
                        let end = p.peek_span();
                        let name = segments.join(".");
                        items.push(p.insert(Node::new(
                            Span::new(start.start, end.start),
                            NodeKind::ConfigBlock { name, body },
                        )));
                    }
                    TokenKind::Assign => {
                        p.bump();
                        let value = super::lowering::parse_expr(p)?;
                        let end = p.peek_span();
                        items.push(p.insert(Node::new(
                            Span::new(start.start, end.start),
                            NodeKind::ConfigAssignment {
                                dotted_name: segments,
                                value,
                            },
                        )));
                    }
                    _ => {
                        p.diagnostics.push(Diagnostic::error(
                            DiagnosticPhase::Syntax,
                            span_to_range(p.peek_span()),
                            "expected '=' or '{' after config name",
                        ));
                        if p.permissive {
                            p.resync_within_block();
                        } else {
                            return None;
                        }
                    }
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
    Some(items)
}

fn ident(p: &mut Parser) -> Option<String> {
    match p.peek().clone() {
        TokenKind::Ident(name) => {
            p.bump();
            Some(name)
        }
        _ => {
            p.expect(TokenKind::Ident(String::new()), "identifier");
            None
        }
    }
}
