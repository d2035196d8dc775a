//! Document formatting: no full pretty-printer. This DSL's braces are
//! always explicit, so there's no implicit-closer ambiguity to resolve
//! on-type. What's left, and worth doing, is whitespace hygiene: trim
//! trailing whitespace per line and normalize the file to end in exactly
//! one newline.

use tower_lsp::lsp_types::{Position, Range, TextEdit};

pub fn format_document(text: &str) -> Vec<TextEdit> {
    let formatted = normalize(text);
    if formatted == text {
        return Vec::new();
    }

    let line_count = text.lines().count().max(1);
    let end_line = (line_count - 1) as u32;
    let end_col = text.lines().last().map(|l| l.chars().count()).unwrap_or(0) as u32;

    vec![TextEdit {
        range: Range::new(Position::new(0, 0), Position::new(end_line, end_col)),
        new_text: formatted,
    }]
}

fn normalize(text: &str) -> String {
    let trimmed_lines: Vec<&str> = text.lines().map(|line| line.trim_end()).collect();
    let mut out = trimmed_lines.join("\n");
    out.push('\n');
    out
}
