//! AstCache orchestrator: drives the phase pipeline -- parse -> name
//! resolution -> include resolution (fixpoint) -> semantic validation --
//! over a dirty set of URIs, and answers the query surface the feature
//! providers are built on. Ordered phase methods, `log::info!` bracketing
//! the whole run with an `Instant` duration, and a single concurrent store
//! behind narrow query methods.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use log::{debug, info};
use tower_lsp::lsp_types::Position;

use crate::diagnostics::{Diagnostic, DiagnosticPhase, Severity};
use crate::file_cache::FileCache;
use crate::index::ParentIndex;
use crate::parser::{parse_source, span_to_range, FileKind};
use crate::resolver::include_resolver::{ExportedDeclarations, IncludeBindings, IncludeResolver};
use crate::resolver::{NameResolution, NameResolver};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use crate::uri::DocumentUri;
use crate::validators;

/// Upper bound on include-resolution passes per `analyze` call. A real
/// workspace settles in a handful of passes (bounded by the longest
/// include chain); this just stops a pathological cycle from looping
/// forever instead of converging on "still unresolved".
const MAX_INCLUDE_PASSES: usize = 16;

#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub kind: FileKind,
    pub tree: SyntaxTree,
    pub parent_index: ParentIndex,
    pub name_resolution: NameResolution,
    pub include_bindings: IncludeBindings,
    pub diagnostics: BTreeMap<DiagnosticPhase, Vec<Diagnostic>>,
}

impl SourceUnit {
    fn empty(kind: FileKind) -> Self {
        Self {
            kind,
            tree: SyntaxTree::new(),
            parent_index: ParentIndex::default(),
            name_resolution: NameResolution::default(),
            include_bindings: IncludeBindings::new(),
            diagnostics: BTreeMap::new(),
        }
    }

    fn set_phase(&mut self, phase: DiagnosticPhase, diags: Vec<Diagnostic>) {
        self.diagnostics.insert(phase, diags);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.values().flatten().any(|d| d.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.values().flatten().any(|d| d.severity == Severity::Warning)
    }

    pub fn has_syntax_errors(&self) -> bool {
        self.diagnostics
            .get(&DiagnosticPhase::Syntax)
            .map(|d| !d.is_empty())
            .unwrap_or(false)
    }
}

pub struct AstCache {
    units: DashMap<DocumentUri, SourceUnit>,
    file_cache: Arc<FileCache>,
}

impl AstCache {
    pub fn new(file_cache: Arc<FileCache>) -> Self {
        Self {
            units: DashMap::new(),
            file_cache,
        }
    }

    pub fn has_ast(&self, uri: &DocumentUri) -> bool {
        self.units.contains_key(uri)
    }

    pub fn get_source_unit(&self, uri: &DocumentUri) -> Option<SourceUnit> {
        self.units.get(uri).map(|r| r.clone())
    }

    pub fn remove(&self, uri: &DocumentUri) {
        self.units.remove(uri);
    }

    /// Runs parse -> name resolution -> include resolution (fixpoint) ->
    /// semantic validation over `dirty`, returning every URI whose
    /// analysis result actually changed (the dirty set itself, plus any
    /// file whose include bindings shifted as a side effect of another
    /// file's re-parse).
    pub fn analyze(&self, dirty: &HashSet<DocumentUri>) -> HashSet<DocumentUri> {
        let start = Instant::now();
        let mut changed: HashSet<DocumentUri> = HashSet::new();

        for uri in dirty {
            self.parse_phase(uri);
            changed.insert(uri.clone());
        }
        for uri in dirty {
            self.name_resolution_phase(uri);
        }

        self.include_resolution_fixpoint(&mut changed);

        for uri in dirty {
            self.validation_phase(uri);
        }

        info!(
            "analyzed {} dirty file(s), {} file(s) changed, in {:?}",
            dirty.len(),
            changed.len(),
            start.elapsed()
        );
        changed
    }

    fn file_kind(uri: &DocumentUri) -> FileKind {
        let name = uri
            .to_file_path()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()));
        match name.as_deref() {
            Some(n) if n == "nextflow.config" || n.ends_with(".config") => FileKind::Config,
            _ => FileKind::Script,
        }
    }

    fn parse_phase(&self, uri: &DocumentUri) {
        let Ok(text) = self.file_cache.read_text(uri) else {
            self.units.remove(uri);
            return;
        };
        let kind = Self::file_kind(uri);
        let outcome = parse_source(&text, kind);
        let parent_index = ParentIndex::build(&outcome.tree);

        let mut unit = self.units.entry(uri.clone()).or_insert_with(|| SourceUnit::empty(kind));
        unit.kind = kind;
        unit.tree = outcome.tree;
        unit.parent_index = parent_index;
        unit.set_phase(DiagnosticPhase::Syntax, outcome.diagnostics);
    }

    fn name_resolution_phase(&self, uri: &DocumentUri) {
        let Some(mut unit) = self.units.get_mut(uri) else {
            return;
        };
        if unit.kind != FileKind::Script {
            return;
        }
        let path = uri.to_file_path();
        let resolution = NameResolver::new(&mut unit.tree).resolve(path.as_deref(), &self.file_cache);
        unit.set_phase(DiagnosticPhase::NameResolution, resolution.diagnostics.clone());
        unit.name_resolution = resolution;
    }

    /// Repeatedly runs `IncludeResolver::resolve_pass` over every script
    /// file's includes until a full pass binds nothing new, then finalizes
    /// whatever is left as unresolved-include diagnostics. Operates over
    /// the whole cache rather than just `changed` -- one file's re-parse
    /// can supply the declaration another (already-settled) file's include
    /// was waiting on.
    fn include_resolution_fixpoint(&self, changed: &mut HashSet<DocumentUri>) {
        let script_uris: Vec<DocumentUri> = self
            .units
            .iter()
            .filter(|e| e.kind == FileKind::Script)
            .map(|e| e.key().clone())
            .collect();

        for pass in 0..MAX_INCLUDE_PASSES {
            let exports: HashMap<DocumentUri, ExportedDeclarations> = self
                .units
                .iter()
                .filter(|e| e.kind == FileKind::Script)
                .map(|e| (e.key().clone(), ExportedDeclarations::from_script(&e.tree)))
                .collect();

            let mut any_changed = false;
            for uri in &script_uris {
                let Some(mut unit) = self.units.get_mut(uri) else {
                    continue;
                };
                let Some(includes) = script_includes(&unit.tree) else {
                    continue;
                };
                if includes.is_empty() {
                    continue;
                }
                let resolution = IncludeResolver::resolve_pass(
                    uri,
                    &unit.tree,
                    &includes,
                    resolve_relative,
                    &exports,
                    &unit.include_bindings,
                );
                if resolution.changed {
                    any_changed = true;
                    changed.insert(uri.clone());
                }
                unit.include_bindings = resolution.bindings;
            }

            debug!("include resolution pass {pass}: changed = {any_changed}");
            if !any_changed {
                break;
            }
        }

        for uri in &script_uris {
            let Some(mut unit) = self.units.get_mut(uri) else {
                continue;
            };
            let Some(includes) = script_includes(&unit.tree) else {
                continue;
            };
            let diagnostics = IncludeResolver::finalize(&unit.tree, &includes, &unit.include_bindings);
            unit.set_phase(DiagnosticPhase::IncludeResolution, diagnostics);
        }
    }

    fn validation_phase(&self, uri: &DocumentUri) {
        let Some(mut unit) = self.units.get_mut(uri) else {
            return;
        };
        match unit.kind {
            FileKind::Script => {
                let diagnostics = validators::validate_script(&unit.tree, &unit.name_resolution);
                let (type_inference, mut schema): (Vec<_>, Vec<_>) = diagnostics
                    .into_iter()
                    .partition(|d| d.phase == DiagnosticPhase::TypeInference);
                if let Some(warning) = unit.name_resolution.schema_warning.clone() {
                    schema.push(warning);
                }
                unit.set_phase(DiagnosticPhase::TypeInference, type_inference);
                unit.set_phase(DiagnosticPhase::Schema, schema);
            }
            FileKind::Config => {
                let schema = validators::validate_config(&unit.tree);
                unit.set_phase(DiagnosticPhase::Schema, schema);
            }
        }
    }

    // ---- query surface ----

    pub fn get_parent(&self, uri: &DocumentUri, node: NodeId) -> Option<NodeId> {
        self.units.get(uri)?.parent_index.parent_of(node)
    }

    pub fn get_node_at(&self, uri: &DocumentUri, position: Position) -> Option<NodeId> {
        self.get_nodes_at(uri, position).into_iter().next()
    }

    /// All non-synthetic nodes whose range contains `position`, innermost
    /// (smallest span) first.
    pub fn get_nodes_at(&self, uri: &DocumentUri, position: Position) -> Vec<NodeId> {
        let Some(unit) = self.units.get(uri) else {
            return Vec::new();
        };
        let mut matches: Vec<(NodeId, u64)> = unit
            .parent_index
            .nodes()
            .iter()
            .filter_map(|&id| {
                let node = unit.tree.get(id)?;
                let range = span_to_range(node.span);
                contains(range, position).then(|| (id, span_size(range)))
            })
            .collect();
        matches.sort_by_key(|(_, size)| *size);
        matches.into_iter().map(|(id, _)| id).collect()
    }

    pub fn has_errors(&self, uri: &DocumentUri) -> bool {
        self.units.get(uri).map(|u| u.has_errors()).unwrap_or(false)
    }

    pub fn has_warnings(&self, uri: &DocumentUri) -> bool {
        self.units.get(uri).map(|u| u.has_warnings()).unwrap_or(false)
    }

    pub fn has_syntax_errors(&self, uri: &DocumentUri) -> bool {
        self.units.get(uri).map(|u| u.has_syntax_errors()).unwrap_or(false)
    }

    pub fn diagnostics_for(&self, uri: &DocumentUri) -> Vec<Diagnostic> {
        self.units
            .get(uri)
            .map(|u| u.diagnostics.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Every URI currently tracked, for workspace-wide queries (workspace
    /// symbols, find-all-references, call-site counting).
    pub fn all_uris(&self) -> Vec<DocumentUri> {
        self.units.iter().map(|e| e.key().clone()).collect()
    }

    /// Declarations (functions/processes/workflows) a script exposes,
    /// e.g. for workspace-symbol search or resolving a rename across
    /// includes.
    pub fn declarations_of(&self, uri: &DocumentUri) -> HashMap<String, NodeId> {
        self.units
            .get(uri)
            .map(|u| ExportedDeclarations::from_script(&u.tree).by_name)
            .unwrap_or_default()
    }
}

pub(crate) fn script_includes(tree: &SyntaxTree) -> Option<Vec<NodeId>> {
    let root = tree.root()?;
    match tree.get(root).map(|n| &n.kind) {
        Some(NodeKind::Script { includes, .. }) => Some(includes.clone()),
        _ => None,
    }
}

fn contains(range: tower_lsp::lsp_types::Range, pos: Position) -> bool {
    (range.start.line, range.start.character) <= (pos.line, pos.character)
        && (pos.line, pos.character) <= (range.end.line, range.end.character)
}

fn span_size(range: tower_lsp::lsp_types::Range) -> u64 {
    let lines = range.end.line.saturating_sub(range.start.line) as u64;
    let cols = (range.end.character as i64 - range.start.character as i64).unsigned_abs();
    lines * 100_000 + cols
}

/// Resolves an include's relative source path against the including
/// file's own URI. This DSL's includes are always relative paths, so
/// there's no module search path to consult -- only a single join against
/// the including file's directory, defaulting to a `.nf` extension when
/// the include omits one.
pub(crate) fn resolve_relative(from: &DocumentUri, rel: &str) -> Option<DocumentUri> {
    let base = from.to_file_path()?;
    let dir = base.parent()?;
    let mut candidate = dir.join(rel);
    if candidate.extension().is_none() {
        candidate.set_extension("nf");
    }
    DocumentUri::from_file_path(candidate)
}
