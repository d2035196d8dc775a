//! End-to-end seed scenarios: one test per numbered diagnostic scenario,
//! driving the real phase pipeline through `AstCache::analyze` rather than
//! calling individual validators directly.

use std::collections::HashSet;
use std::sync::Arc;

use nf_analyzer_core::file_cache::FileCache;
use nf_analyzer_core::{AstCache, DocumentUri};
use tower_lsp::lsp_types::{Position, Url};

fn uri(s: &str) -> DocumentUri {
    DocumentUri::new(Url::parse(s).unwrap())
}

fn analyze_one(cache: &AstCache, file_cache: &FileCache, u: &DocumentUri, text: &str) {
    file_cache.did_open(u.clone(), text.to_string());
    let mut dirty = HashSet::new();
    dirty.insert(u.clone());
    cache.analyze(&dirty);
}

#[test]
fn undefined_variable_is_flagged_at_the_right_column() {
    let file_cache = Arc::new(FileCache::new());
    let cache = AstCache::new(Arc::clone(&file_cache));
    let u = uri("file:///ws/main.nf");
    analyze_one(&cache, &file_cache, &u, "workflow { foo }");

    let diagnostics = cache.diagnostics_for(&u);
    let hit = diagnostics
        .iter()
        .find(|d| d.message.contains("undefined variable `foo`"))
        .expect("expected one undefined-variable diagnostic");
    assert_eq!(hit.range.start, Position::new(0, 11));
}

#[test]
fn process_out_check_flags_an_unrecognized_emit_name() {
    let file_cache = Arc::new(FileCache::new());
    let cache = AstCache::new(Arc::clone(&file_cache));
    let u = uri("file:///ws/main.nf");
    let text = "process P {\n  output: path 'x', emit: out\n  script: ''\n}\nworkflow {\n  P()\n  P.out.bar\n}\n";
    analyze_one(&cache, &file_cache, &u, text);

    let diagnostics = cache.diagnostics_for(&u);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.message == "Unrecognized output `bar` for process `P`"),
        "diagnostics were: {diagnostics:?}"
    );
}

#[test]
fn arg_count_mismatch_is_flagged_with_expected_and_received_counts() {
    let file_cache = Arc::new(FileCache::new());
    let cache = AstCache::new(Arc::clone(&file_cache));
    let u = uri("file:///ws/main.nf");
    let text = "workflow W {\n  take:\n  a\n  b\n  main:\n  a\n}\nworkflow {\n  W(1)\n}\n";
    analyze_one(&cache, &file_cache, &u, text);

    let diagnostics = cache.diagnostics_for(&u);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.message == "Incorrect number of call arguments, expected 2 but received 1"),
        "diagnostics were: {diagnostics:?}"
    );
}

#[test]
fn schema_unknown_param_is_flagged_against_the_adjacent_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    let script_path = dir.path().join("main.nf");
    let schema_path = dir.path().join("nextflow_schema.json");
    std::fs::write(
        &schema_path,
        r#"{"definitions": {"input": {"properties": {"reads": {"type": "string"}}}}}"#,
    )
    .unwrap();

    let file_cache = Arc::new(FileCache::new());
    let cache = AstCache::new(Arc::clone(&file_cache));
    let u = DocumentUri::from_file_path(&script_path).unwrap();
    analyze_one(&cache, &file_cache, &u, "workflow { params.sample }");

    let diagnostics = cache.diagnostics_for(&u);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.message == "Unrecognized parameter `sample`"),
        "diagnostics were: {diagnostics:?}"
    );
}

#[test]
fn include_resolution_converges_once_the_included_declaration_appears() {
    let file_cache = Arc::new(FileCache::new());
    let cache = AstCache::new(Arc::clone(&file_cache));
    let a = uri("file:///ws/a.nf");
    let b = uri("file:///ws/b.nf");

    file_cache.did_open(a.clone(), "include { P } from './b'\nworkflow {\n  P()\n}\n".to_string());
    file_cache.did_open(b.clone(), "workflow {}\n".to_string());
    let mut dirty = HashSet::new();
    dirty.insert(a.clone());
    dirty.insert(b.clone());
    cache.analyze(&dirty);

    assert!(
        cache
            .diagnostics_for(&a)
            .iter()
            .any(|d| d.message.contains("unresolved include")),
        "expected an unresolved-include diagnostic before `P` exists in b.nf"
    );

    file_cache.did_change(b.clone(), "process P {\n  script: ''\n}\n".to_string());
    let mut dirty = HashSet::new();
    dirty.insert(b.clone());
    cache.analyze(&dirty);

    assert!(
        !cache
            .diagnostics_for(&a)
            .iter()
            .any(|d| d.message.contains("unresolved include")),
        "unresolved-include diagnostic should have cleared once `P` was declared"
    );
}

#[test]
fn env_block_accepts_flat_names_and_flags_dotted_ones() {
    let file_cache = Arc::new(FileCache::new());
    let cache = AstCache::new(Arc::clone(&file_cache));
    let u = uri("file:///ws/nextflow.config");
    analyze_one(&cache, &file_cache, &u, "env {\n  PATH = 'x'\n}\n");
    assert!(cache.diagnostics_for(&u).is_empty());

    let u2 = uri("file:///ws2/nextflow.config");
    analyze_one(&cache, &file_cache, &u2, "env {\n  PATH.SUB = 'x'\n}\n");
    let diagnostics = cache.diagnostics_for(&u2);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.message == "Invalid environment variable name 'PATH.SUB'"),
        "diagnostics were: {diagnostics:?}"
    );
}
