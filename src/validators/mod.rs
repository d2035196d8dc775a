//! Semantic Validators: run after name and include resolution settle,
//! over the already-resolved tree. Each checker is a free function
//! rather than a visitor object, one function per rule collecting into a
//! flat `Vec<Diagnostic>`.

pub mod call_checker;
pub mod config_schema_checker;
pub mod config_schema_tree;
pub mod env_name_checker;
pub mod param_schema_checker;

use crate::diagnostics::Diagnostic;
use crate::resolver::NameResolution;
use crate::syntax::SyntaxTree;

/// Runs every per-file semantic validator and concatenates their
/// diagnostics. Config-specific checkers are skipped for script files and
/// vice versa, selected by which root `NodeKind` the tree has.
pub fn validate_script(tree: &SyntaxTree, resolution: &NameResolution) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    diagnostics.extend(call_checker::check_calls(tree, resolution));
    diagnostics.extend(param_schema_checker::check_param_usages(tree, &resolution.schema));
    diagnostics
}

pub fn validate_config(tree: &SyntaxTree) -> Vec<Diagnostic> {
    let mut diagnostics = config_schema_checker::check_config_assignments(tree);
    diagnostics.extend(env_name_checker::check_env_names(tree));
    diagnostics
}
