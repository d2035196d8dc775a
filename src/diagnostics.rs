//! Phase-aware diagnostic values.
//!
//! `DiagnosticPhase` is the closed set of analysis phases whose output can
//! be replaced independently; `AstCache` stores diagnostics in a
//! `BTreeMap<DiagnosticPhase, Vec<Diagnostic>>` per `SourceUnit` so
//! re-running one phase is a single key replace rather than a
//! filter-and-append over a flat list.

use tower_lsp::lsp_types::{Position, Range};

use crate::uri::DocumentUri;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticPhase {
    Syntax,
    NameResolution,
    IncludeResolution,
    TypeInference,
    Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedLocation {
    pub uri: DocumentUri,
    pub range: Range,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: DiagnosticPhase,
    pub severity: Severity,
    pub range: Range,
    pub message: String,
    pub related: Option<RelatedLocation>,
}

impl Diagnostic {
    pub fn error(phase: DiagnosticPhase, range: Range, message: impl Into<String>) -> Self {
        Self {
            phase,
            severity: Severity::Error,
            range,
            message: message.into(),
            related: None,
        }
    }

    pub fn warning(phase: DiagnosticPhase, range: Range, message: impl Into<String>) -> Self {
        Self {
            phase,
            severity: Severity::Warning,
            range,
            message: message.into(),
            related: None,
        }
    }

    pub fn with_related(mut self, related: RelatedLocation) -> Self {
        self.related = Some(related);
        self
    }

    pub fn at_point(phase: DiagnosticPhase, severity: Severity, line: u32, col: u32, message: impl Into<String>) -> Self {
        let pos = Position::new(line, col);
        Self {
            phase,
            severity,
            range: Range::new(pos, pos),
            message: message.into(),
            related: None,
        }
    }
}

/// Converts a `Diagnostic` to the wire type at the LSP boundary. Kept out
/// of the core's hot path: only the `lsp_binding` crate module calls this.
impl From<Diagnostic> for tower_lsp::lsp_types::Diagnostic {
    fn from(d: Diagnostic) -> Self {
        use tower_lsp::lsp_types::{DiagnosticRelatedInformation, DiagnosticSeverity, Location};

        tower_lsp::lsp_types::Diagnostic {
            range: d.range,
            severity: Some(match d.severity {
                Severity::Error => DiagnosticSeverity::ERROR,
                Severity::Warning => DiagnosticSeverity::WARNING,
            }),
            code: None,
            code_description: None,
            source: Some("nf-analyzer".to_string()),
            message: d.message,
            related_information: d.related.map(|r| {
                vec![DiagnosticRelatedInformation {
                    location: Location::new(r.uri.into_url(), r.range),
                    message: r.message,
                }]
            }),
            tags: None,
            data: None,
        }
    }
}
