//! LSP notification handlers: events the client fires that don't expect a
//! response. Each one translates wire params into `LanguageService` calls
//! and, where the result changes what's on screen, publishes diagnostics
//! back to the client.

use log::{debug, info, warn};
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;

use crate::config::AnalyzerConfig;
use crate::diagnostics::Diagnostic as CoreDiagnostic;
use crate::language_service::LanguageService;
use crate::uri::DocumentUri;

pub fn handle_initialize(service: &LanguageService, params: InitializeParams) -> LspResult<InitializeResult> {
    if let Some(init_options) = params.initialization_options {
        match serde_json::from_value::<AnalyzerConfig>(init_options) {
            Ok(config) => {
                debug!("applying client-provided configuration");
                service.set_config(config);
            }
            Err(e) => warn!("failed to parse initializationOptions, using defaults: {e}"),
        }
    }

    let capabilities = ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
        definition_provider: Some(OneOf::Left(true)),
        references_provider: Some(OneOf::Left(true)),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![".".to_string()]),
            ..Default::default()
        }),
        document_symbol_provider: Some(OneOf::Left(true)),
        workspace_symbol_provider: Some(OneOf::Left(true)),
        semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(
            SemanticTokensOptions {
                legend: crate::features::semantic_tokens::legend(),
                full: Some(SemanticTokensFullOptions::Bool(true)),
                ..Default::default()
            },
        )),
        code_lens_provider: Some(CodeLensOptions {
            resolve_provider: Some(false),
            work_done_progress_options: Default::default(),
        }),
        rename_provider: Some(OneOf::Left(true)),
        document_formatting_provider: Some(OneOf::Left(true)),
        document_link_provider: Some(DocumentLinkOptions {
            resolve_provider: Some(false),
            work_done_progress_options: Default::default(),
        }),
        ..ServerCapabilities::default()
    };

    Ok(InitializeResult {
        capabilities,
        server_info: Some(ServerInfo {
            name: "nf-analyzer-lsp".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

pub async fn handle_did_open(client: &Client, service: &LanguageService, params: DidOpenTextDocumentParams) {
    let uri = DocumentUri::new(params.text_document.uri);
    info!("document opened: {uri}");
    service.did_open(uri.clone(), params.text_document.text);
    republish_after_update(client, service, uri).await;
}

pub async fn handle_did_change(client: &Client, service: &LanguageService, mut params: DidChangeTextDocumentParams) {
    let uri = DocumentUri::new(params.text_document.uri);
    // `TextDocumentSyncKind::FULL` is advertised above, so the last change
    // event always carries the whole document.
    let Some(change) = params.content_changes.pop() else {
        return;
    };
    service.did_change(uri.clone(), change.text);
    republish_after_update(client, service, uri).await;
}

pub async fn handle_did_close(client: &Client, service: &LanguageService, params: DidCloseTextDocumentParams) {
    let uri = DocumentUri::new(params.text_document.uri);
    info!("document closed: {uri}");
    service.did_close(&uri);
    // Closing clears that file's published diagnostics even though its
    // `SourceUnit` is retained.
    client.publish_diagnostics(uri.into_url(), Vec::new(), None).await;
}

pub fn handle_did_change_watched_files(service: &LanguageService, params: DidChangeWatchedFilesParams) {
    for change in params.changes {
        let uri = DocumentUri::new(change.uri);
        if change.typ == FileChangeType::DELETED {
            service.ast_cache.remove(&uri);
            service.file_cache.remove(&uri);
        }
    }
    service.update_later();
}

/// Waits (best-effort) for the debounced analysis triggered by the edit
/// above to settle, then republishes diagnostics for the file that changed.
/// A cross-file include fixpoint can also touch other files, but bounding
/// the publish to the one the client just edited keeps this handler cheap;
/// a full workspace diagnostics sweep happens once at startup instead
/// (`server::initialize_workspace`).
async fn republish_after_update(client: &Client, service: &LanguageService, uri: DocumentUri) {
    service.await_update().await;
    publish_diagnostics(client, service, &uri).await;
}

pub async fn publish_diagnostics(client: &Client, service: &LanguageService, uri: &DocumentUri) {
    let diagnostics: Vec<Diagnostic> = service
        .ast_cache
        .diagnostics_for(uri)
        .into_iter()
        .map(|d: CoreDiagnostic| d.into())
        .collect();
    client.publish_diagnostics(uri.clone().into_url(), diagnostics, None).await;
}
