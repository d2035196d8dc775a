//! `LanguageServer` trait implementation. Every method here is a thin
//! adapter: extract the LSP params, delegate to `notification`/`request`,
//! and shape the result back into the wire type. No analysis logic lives
//! in this file.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::config::AnalyzerConfig;
use crate::language_service::LanguageService;
use crate::lsp_binding::{notification, request};

pub struct NfAnalyzerServer {
    client: Client,
    pub service: Arc<LanguageService>,
    root: Mutex<Option<PathBuf>>,
}

impl NfAnalyzerServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            service: Arc::new(LanguageService::new(AnalyzerConfig::default())),
            root: Mutex::new(None),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for NfAnalyzerServer {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        let root = params
            .root_uri
            .clone()
            .and_then(|u| u.to_file_path().ok())
            .or_else(|| {
                params
                    .workspace_folders
                    .as_ref()
                    .and_then(|folders| folders.first())
                    .and_then(|f| f.uri.to_file_path().ok())
            });
        *self.root.lock() = root;
        notification::handle_initialize(&self.service, params)
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client.log_message(MessageType::INFO, "nf-analyzer initialized").await;

        let root = self.root.lock().clone();
        let Some(root) = root else {
            return;
        };
        let service = Arc::clone(&self.service);
        service.initialize(&root);
        for uri in service.ast_cache.all_uris() {
            notification::publish_diagnostics(&self.client, &service, &uri).await;
        }
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        notification::handle_did_open(&self.client, &self.service, params).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        notification::handle_did_change(&self.client, &self.service, params).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        notification::handle_did_close(&self.client, &self.service, params).await;
    }

    async fn did_change_configuration(&self, _: DidChangeConfigurationParams) {}

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        notification::handle_did_change_watched_files(&self.service, params);
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> LspResult<Option<GotoDefinitionResponse>> {
        Ok(request::handle_goto_definition(&self.service, params))
    }

    async fn references(&self, params: ReferenceParams) -> LspResult<Option<Vec<Location>>> {
        Ok(request::handle_references(&self.service, params))
    }

    async fn hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        Ok(request::handle_hover(&self.service, params))
    }

    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        Ok(request::handle_completion(&self.service, params))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> LspResult<Option<DocumentSymbolResponse>> {
        Ok(request::handle_document_symbol(&self.service, params))
    }

    async fn symbol(&self, params: WorkspaceSymbolParams) -> LspResult<Option<Vec<SymbolInformation>>> {
        Ok(request::handle_workspace_symbol(&self.service, params))
    }

    async fn semantic_tokens_full(&self, params: SemanticTokensParams) -> LspResult<Option<SemanticTokensResult>> {
        Ok(request::handle_semantic_tokens_full(&self.service, params))
    }

    async fn code_lens(&self, params: CodeLensParams) -> LspResult<Option<Vec<CodeLens>>> {
        Ok(request::handle_code_lens(&self.service, params))
    }

    async fn rename(&self, params: RenameParams) -> LspResult<Option<WorkspaceEdit>> {
        Ok(request::handle_rename(&self.service, params))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> LspResult<Option<Vec<TextEdit>>> {
        Ok(request::handle_formatting(&self.service, params))
    }

    async fn document_link(&self, params: DocumentLinkParams) -> LspResult<Option<Vec<DocumentLink>>> {
        Ok(request::handle_document_link(&self.service, params))
    }
}
