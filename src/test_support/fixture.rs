//! Marker-based inline test fixtures: source text annotated with `$0`
//! (cursor position), `<def>...</def>` and `<ref>...</ref>` tags is
//! stripped down to plain source plus recorded `SourcePos` markers, so
//! tests read like the scenario they exercise instead of hand-computing
//! line/column numbers.
//!
//! Markers are resolved against this crate's 1-based `SourcePos` rather
//! than byte offsets.

use crate::lexer::token::SourcePos;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    pub text: String,
    pub start: SourcePos,
    pub end: SourcePos,
}

#[derive(Debug, Default)]
pub struct Fixture {
    pub source: String,
    pub cursor: Option<SourcePos>,
    pub defs: Vec<TaggedSpan>,
    pub refs: Vec<TaggedSpan>,
}

/// Strips fixture markup, recording where each marker landed in the
/// resulting plain source. Markers never appear in `source` itself.
pub fn parse_fixture(markup: &str) -> Fixture {
    let mut source = String::with_capacity(markup.len());
    let mut cursor = None;
    let mut defs = Vec::new();
    let mut refs = Vec::new();

    let mut line: u32 = 1;
    let mut column: u32 = 1;
    let mut open_tag: Option<(&'static str, SourcePos, String)> = None;

    let mut idx = 0;
    while idx < markup.len() {
        let rest = &markup[idx..];

        if rest.starts_with("$0") {
            cursor = Some(SourcePos::new(line, column));
            idx += 2;
            continue;
        }
        if rest.starts_with("<def>") {
            open_tag = Some(("def", SourcePos::new(line, column), String::new()));
            idx += "<def>".len();
            continue;
        }
        if rest.starts_with("</def>") {
            if let Some(("def", start, text)) = open_tag.take() {
                defs.push(TaggedSpan {
                    text,
                    start,
                    end: SourcePos::new(line, column),
                });
            }
            idx += "</def>".len();
            continue;
        }
        if rest.starts_with("<ref>") {
            open_tag = Some(("ref", SourcePos::new(line, column), String::new()));
            idx += "<ref>".len();
            continue;
        }
        if rest.starts_with("</ref>") {
            if let Some(("ref", start, text)) = open_tag.take() {
                refs.push(TaggedSpan {
                    text,
                    start,
                    end: SourcePos::new(line, column),
                });
            }
            idx += "</ref>".len();
            continue;
        }

        let c = rest.chars().next().expect("idx < markup.len()");
        if let Some((_, _, text)) = open_tag.as_mut() {
            text.push(c);
        }
        source.push(c);
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
        idx += c.len_utf8();
    }

    Fixture {
        source,
        cursor,
        defs,
        refs,
    }
}
