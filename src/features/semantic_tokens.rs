//! Semantic tokens: lexer-driven token classification,
//! upgraded with resolution info where available (a declared function's
//! name reads as a function, not a bare identifier).

use std::collections::HashMap;

use tower_lsp::lsp_types::{SemanticToken, SemanticTokenType, SemanticTokensLegend};

use crate::ast_cache::AstCache;
use crate::file_cache::FileCache;
use crate::lexer::token::TokenKind;
use crate::lexer::Lexer;
use crate::resolver::Resolution;
use crate::syntax::NodeKind;
use crate::uri::DocumentUri;

const KEYWORD: u32 = 0;
const FUNCTION: u32 = 1;
const VARIABLE: u32 = 2;
const STRING: u32 = 3;
const NUMBER: u32 = 4;
const COMMENT: u32 = 5;

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: vec![
            SemanticTokenType::KEYWORD,
            SemanticTokenType::FUNCTION,
            SemanticTokenType::VARIABLE,
            SemanticTokenType::STRING,
            SemanticTokenType::NUMBER,
            SemanticTokenType::COMMENT,
        ],
        token_modifiers: Vec::new(),
    }
}

pub fn semantic_tokens(cache: &AstCache, uri: &DocumentUri, file_cache: &FileCache) -> Vec<SemanticToken> {
    let Ok(text) = file_cache.read_text(uri) else {
        return Vec::new();
    };
    let tokens = Lexer::new(&text).tokenize();
    let overrides = declaration_name_positions(cache, uri);

    let mut out = Vec::new();
    let mut prev_line = 1u32;
    let mut prev_col = 1u32;

    for tok in &tokens {
        let pos = (tok.span.start.line, tok.span.start.column);
        let Some(token_type) = overrides.get(&pos).copied().or_else(|| classify(&tok.kind)) else {
            continue;
        };
        let length = tok.span.end.column.saturating_sub(tok.span.start.column).max(1);
        let delta_line = tok.span.start.line.saturating_sub(prev_line);
        let delta_start = if delta_line == 0 {
            tok.span.start.column.saturating_sub(prev_col)
        } else {
            tok.span.start.column.saturating_sub(1)
        };
        out.push(SemanticToken {
            delta_line,
            delta_start,
            length,
            token_type,
            token_modifiers_bitset: 0,
        });
        prev_line = tok.span.start.line;
        prev_col = tok.span.start.column;
    }
    out
}

/// Positions of identifiers that resolved to a function/process/workflow
/// declaration, so the lexer's generic `Ident` classification can be
/// overridden to `FUNCTION` at those spots.
fn declaration_name_positions(cache: &AstCache, uri: &DocumentUri) -> HashMap<(u32, u32), u32> {
    let Some(unit) = cache.get_source_unit(uri) else {
        return HashMap::new();
    };
    unit.name_resolution
        .references
        .iter()
        .filter_map(|(node_id, resolution)| {
            if !matches!(resolution, Resolution::Declaration(_)) {
                return None;
            }
            let node = unit.tree.get(*node_id)?;
            if !matches!(node.kind, NodeKind::Ident { .. }) {
                return None;
            }
            Some(((node.span.start.line, node.span.start.column), FUNCTION))
        })
        .collect()
}

fn classify(kind: &TokenKind) -> Option<u32> {
    match kind {
        TokenKind::KwProcess
        | TokenKind::KwWorkflow
        | TokenKind::KwInclude
        | TokenKind::KwFrom
        | TokenKind::KwAs
        | TokenKind::KwOutput
        | TokenKind::KwTake
        | TokenKind::KwMain
        | TokenKind::KwEmit
        | TokenKind::KwPublish
        | TokenKind::KwInput
        | TokenKind::KwScript
        | TokenKind::KwShell
        | TokenKind::KwExec
        | TokenKind::KwStub
        | TokenKind::KwWhen
        | TokenKind::KwDef
        | TokenKind::KwIf
        | TokenKind::KwElse
        | TokenKind::KwReturn
        | TokenKind::KwTrue
        | TokenKind::KwFalse
        | TokenKind::KwNull => Some(KEYWORD),
        TokenKind::Ident(_) => Some(VARIABLE),
        TokenKind::StringLiteral(_) => Some(STRING),
        TokenKind::NumberLiteral(_) => Some(NUMBER),
        TokenKind::DocComment(_) | TokenKind::LineComment => Some(COMMENT),
        _ => None,
    }
}
