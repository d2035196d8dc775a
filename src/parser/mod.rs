//! Lexer-to-syntax-tree pipeline.
//!
//! Parser instances are single-use and owned by the thread running
//! analysis, never shared: `parse_source` constructs a fresh `Parser` per
//! call and drops it at the end.

mod config;
mod lowering;

use crate::diagnostics::{Diagnostic, DiagnosticPhase};
use crate::lexer::token::{Span, Token, TokenKind};
use crate::lexer::Lexer;
use crate::syntax::{Node, NodeId, NodeKind, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Script,
    Config,
}

pub struct ParseOutcome {
    pub tree: SyntaxTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Two-attempt strategy: parse in fast (strict) mode first;
/// on failure, rewind and re-parse in permissive mode, which recovers from
/// errors by skipping to a resync point and recording a diagnostic instead
/// of aborting. If permissive mode still can't produce a root, emit fatal
/// syntax errors and return an empty tree.
pub fn parse_source(text: &str, kind: FileKind) -> ParseOutcome {
    let tokens = Lexer::new(text).tokenize();

    let mut fast = Parser::new(&tokens, false);
    if let Some(root) = fast.parse_root(kind) {
        return ParseOutcome {
            tree: fast.finish(root),
            diagnostics: fast.diagnostics,
        };
    }

    let mut permissive = Parser::new(&tokens, true);
    match permissive.parse_root(kind) {
        Some(root) => ParseOutcome {
            tree: permissive.finish(root),
            diagnostics: permissive.diagnostics,
        },
        None => {
            let mut diagnostics = permissive.diagnostics;
            let last_span = tokens
                .last()
                .map(|t| t.span)
                .unwrap_or_else(|| Span::new(crate::lexer::token::SourcePos::new(1, 1), crate::lexer::token::SourcePos::new(1, 1)));
            diagnostics.push(Diagnostic::error(
                DiagnosticPhase::Syntax,
                span_to_range(last_span),
                "failed to parse file",
            ));
            ParseOutcome {
                tree: SyntaxTree::new(),
                diagnostics,
            }
        }
    }
}

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    permissive: bool,
    pub(crate) diagnostics: Vec<Diagnostic>,
    tree: SyntaxTree,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], permissive: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            permissive,
            diagnostics: Vec::new(),
            tree: SyntaxTree::new(),
        }
    }

    fn finish(mut self, root: NodeId) -> SyntaxTree {
        self.tree.set_root(root);
        self.tree
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos.min(self.tokens.len() - 1)].span
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    /// Consumes an expected token kind. In strict mode a mismatch aborts
    /// the whole parse (triggering the permissive retry); in permissive
    /// mode it records a diagnostic and synthesizes nothing, letting the
    /// caller decide how to recover.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<Token> {
        if self.check(&kind) {
            Some(self.bump())
        } else if self.permissive {
            self.diagnostics.push(Diagnostic::error(
                DiagnosticPhase::Syntax,
                span_to_range(self.peek_span()),
                format!("expected {what}"),
            ));
            None
        } else {
            None
        }
    }

    /// Skips tokens until a resync point (a known section/top-level
    /// keyword, or `}`) so permissive mode can keep making progress after
    /// an error without aborting the rest of the file.
    fn resync(&mut self) {
        loop {
            match self.peek() {
                TokenKind::Eof
                | TokenKind::RBrace
                | TokenKind::KwProcess
                | TokenKind::KwWorkflow
                | TokenKind::KwInclude
                | TokenKind::KwDef => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn parse_root(&mut self, kind: FileKind) -> Option<NodeId> {
        match kind {
            FileKind::Script => lowering::parse_script(self),
            FileKind::Config => config::parse_config_file(self),
        }
    }

    fn insert(&mut self, node: Node) -> NodeId {
        self.tree.insert(node)
    }

    fn set_doc(&mut self, id: NodeId, doc: Option<String>) {
        self.tree.set_doc(id, doc);
    }

    fn node_kind(&self, id: NodeId) -> &NodeKind {
        &self.tree.get(id).expect("node just inserted").kind
    }

    fn tree_is_entry(&self, id: NodeId) -> bool {
        self.tree.get(id).map(|n| n.is_entry_workflow()).unwrap_or(false)
    }

    fn pos_for_peek(&self) -> usize {
        self.pos
    }

    fn token_at(&self, idx: usize) -> &TokenKind {
        &self.tokens[idx.min(self.tokens.len() - 1)].kind
    }

    /// Like `resync`, but also treats a bare `}` (closing the *current*
    /// block) as a valid stopping point without consuming it, used when
    /// recovering inside a process/output body rather than at top level.
    fn resync_within_block(&mut self) {
        loop {
            match self.peek() {
                TokenKind::Eof | TokenKind::RBrace | TokenKind::Semi => return,
                _ => {
                    self.bump();
                }
            }
        }
    }
}

pub(crate) fn span_to_range(span: Span) -> tower_lsp::lsp_types::Range {
    use tower_lsp::lsp_types::{Position, Range};
    // Editor boundary conversion: 1-based parse-time positions become
    // 0-based LSP positions here, at the earliest point a `Range` is
    // constructed.
    Range::new(
        Position::new(span.start.line.saturating_sub(1), span.start.column.saturating_sub(1)),
        Position::new(span.end.line.saturating_sub(1), span.end.column.saturating_sub(1)),
    )
}
