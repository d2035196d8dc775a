//! Hand-written lexer producing a token stream with 1-based line/column
//! spans. There is no off-the-shelf grammar for this DSL, so the lexer
//! and the recursive-descent parser built on top of it are original to
//! this crate -- see DESIGN.md.

pub mod token;

use token::{SourcePos, Span, Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: u32,
    column: u32,
    doc_comments_enabled: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
            line: 1,
            column: 1,
            doc_comments_enabled: true,
        }
    }

    fn pos(&self) -> SourcePos {
        SourcePos::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let item = self.chars.next();
        if let Some((_, c)) = item {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        item
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos();
            let Some((idx, c)) = self.chars.peek().copied() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                });
                break;
            };

            let kind = if c == '/' && self.src[idx..].starts_with("///") {
                self.lex_doc_comment()
            } else if c == '/' && self.src[idx..].starts_with("//") {
                self.lex_line_comment()
            } else if (c == '"' || c == '\'') && self.src[idx..].starts_with(&format!("{c}{c}{c}")) {
                self.lex_triple_string(c)
            } else if c == '"' || c == '\'' {
                self.lex_string(c)
            } else if c.is_ascii_digit() {
                self.lex_number()
            } else if unicode_ident::is_xid_start(c) || c == '_' {
                self.lex_ident_or_keyword()
            } else {
                self.lex_punct()
            };

            let end = self.pos();
            if let Some(kind) = kind {
                if !matches!(kind, TokenKind::LineComment) {
                    tokens.push(Token {
                        kind,
                        span: Span::new(start, end),
                    });
                }
            }
        }
        tokens
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn lex_doc_comment(&mut self) -> Option<TokenKind> {
        for _ in 0..3 {
            self.bump();
        }
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        if self.doc_comments_enabled {
            Some(TokenKind::DocComment(text.trim().to_string()))
        } else {
            Some(TokenKind::LineComment)
        }
    }

    fn lex_line_comment(&mut self) -> Option<TokenKind> {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        Some(TokenKind::LineComment)
    }

    fn lex_string(&mut self, quote: char) -> Option<TokenKind> {
        self.bump(); // opening quote
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == quote {
                self.bump();
                break;
            }
            if c == '\\' {
                self.bump();
                if let Some(escaped) = self.peek_char() {
                    text.push(escaped);
                    self.bump();
                }
                continue;
            }
            text.push(c);
            self.bump();
        }
        Some(TokenKind::StringLiteral(text))
    }

    /// Triple-quoted raw blocks back `script:`/`shell:`/`exec:`/`stub:`
    /// bodies, which embed the host language verbatim -- executing or
    /// fully parsing that body is out of scope.
    fn lex_triple_string(&mut self, quote: char) -> Option<TokenKind> {
        for _ in 0..3 {
            self.bump();
        }
        let mut text = String::new();
        loop {
            match self.peek_char() {
                None => break,
                Some(c) if c == quote => {
                    let rest_idx = self.chars.peek().map(|(i, _)| *i).unwrap_or(self.src.len());
                    if self.src[rest_idx..].starts_with(&format!("{c}{c}{c}")) {
                        for _ in 0..3 {
                            self.bump();
                        }
                        break;
                    }
                    text.push(c);
                    self.bump();
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
        Some(TokenKind::StringLiteral(text))
    }

    fn lex_number(&mut self) -> Option<TokenKind> {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || c == '.' || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Some(TokenKind::NumberLiteral(text))
    }

    fn lex_ident_or_keyword(&mut self) -> Option<TokenKind> {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if unicode_ident::is_xid_continue(c) || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Some(match text.as_str() {
            "process" => TokenKind::KwProcess,
            "workflow" => TokenKind::KwWorkflow,
            "include" => TokenKind::KwInclude,
            "from" => TokenKind::KwFrom,
            "as" => TokenKind::KwAs,
            "output" => TokenKind::KwOutput,
            "take" => TokenKind::KwTake,
            "main" => TokenKind::KwMain,
            "emit" => TokenKind::KwEmit,
            "publish" => TokenKind::KwPublish,
            "input" => TokenKind::KwInput,
            "script" => TokenKind::KwScript,
            "shell" => TokenKind::KwShell,
            "exec" => TokenKind::KwExec,
            "stub" => TokenKind::KwStub,
            "when" => TokenKind::KwWhen,
            "def" => TokenKind::KwDef,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "return" => TokenKind::KwReturn,
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            "null" => TokenKind::KwNull,
            _ => TokenKind::Ident(text),
        })
    }

    fn lex_punct(&mut self) -> Option<TokenKind> {
        let c = self.peek_char()?;
        self.bump();
        Some(match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '=' => TokenKind::Assign,
            '-' => TokenKind::Minus,
            ';' => TokenKind::Semi,
            other => {
                // Unknown punctuation still produces a token so the parser
                // can surface a precise syntax error rather than looping.
                TokenKind::Ident(other.to_string())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_workflow_skeleton() {
        let tokens = Lexer::new("workflow { foo }").tokenize();
        assert_eq!(
            tokens.iter().map(|t| &t.kind).collect::<Vec<_>>(),
            vec![
                &TokenKind::KwWorkflow,
                &TokenKind::LBrace,
                &TokenKind::Ident("foo".to_string()),
                &TokenKind::RBrace,
                &TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = Lexer::new("workflow").tokenize();
        assert_eq!(tokens[0].span.start, SourcePos::new(1, 1));
    }

    #[test]
    fn doc_comment_precedes_declaration() {
        let tokens = Lexer::new("/// does a thing\nprocess P {}").tokenize();
        assert!(matches!(tokens[0].kind, TokenKind::DocComment(_)));
    }
}
