//! Feature Providers: editor-facing queries built exclusively on top of
//! `AstCache`'s query surface and each `SourceUnit`'s
//! `NameResolution`/`include_bindings` -- none of these touch `FileCache`
//! or re-run any analysis phase themselves. One file per LSP capability.

pub mod code_lens;
pub mod completion;
pub mod definition;
pub mod formatting;
pub mod hover;
pub mod links;
pub mod references;
pub mod rename;
pub mod semantic_tokens;
pub mod symbols;

use crate::ast_cache::AstCache;
use crate::resolver::Resolution;
use crate::syntax::GlobalNodeRef;
use crate::uri::DocumentUri;

/// Resolves the symbol under `position` to a stable cross-file reference,
/// the shared first step of definition/references/rename. `None` means
/// either nothing is at that position or what's there resolved to a
/// built-in with no declaration to navigate to.
fn declaration_at(cache: &AstCache, uri: &DocumentUri, position: tower_lsp::lsp_types::Position) -> Option<GlobalNodeRef> {
    let unit = cache.get_source_unit(uri)?;
    let node = cache.get_nodes_at(uri, position).into_iter().find(|id| unit.name_resolution.references.contains_key(id))?;
    match unit.name_resolution.references.get(&node)? {
        Resolution::Local(target) | Resolution::Declaration(target) => Some(GlobalNodeRef {
            uri: uri.clone(),
            node: *target,
        }),
        Resolution::SchemaField(target) => Some(GlobalNodeRef {
            uri: uri.clone(),
            node: *target,
        }),
        Resolution::Import { include_node, var_index } => unit.include_bindings.get(include_node)?.get(*var_index)?.clone(),
        Resolution::Builtin => None,
    }
}
