//! LSP request handlers: each one extracts params and delegates straight
//! into the matching `features::*` provider -- no additional logic lives
//! here.

use tower_lsp::lsp_types::*;

use crate::features;
use crate::language_service::LanguageService;
use crate::uri::DocumentUri;

pub fn handle_goto_definition(service: &LanguageService, params: GotoDefinitionParams) -> Option<GotoDefinitionResponse> {
    let uri = DocumentUri::new(params.text_document_position_params.text_document.uri);
    let position = params.text_document_position_params.position;
    features::definition::goto_definition(&service.ast_cache, &uri, position).map(GotoDefinitionResponse::Scalar)
}

pub fn handle_references(service: &LanguageService, params: ReferenceParams) -> Option<Vec<Location>> {
    let uri = DocumentUri::new(params.text_document_position.text_document.uri);
    let position = params.text_document_position.position;
    let include_declaration = params.context.include_declaration;
    let locations = features::references::find_references(&service.ast_cache, &uri, position, include_declaration);
    (!locations.is_empty()).then_some(locations)
}

pub fn handle_hover(service: &LanguageService, params: HoverParams) -> Option<Hover> {
    let uri = DocumentUri::new(params.text_document_position_params.text_document.uri);
    let position = params.text_document_position_params.position;
    features::hover::hover(&service.ast_cache, &uri, position)
}

pub fn handle_completion(service: &LanguageService, params: CompletionParams) -> Option<CompletionResponse> {
    let uri = DocumentUri::new(params.text_document_position.text_document.uri);
    let limit = service.config().completion_item_limit;
    let items = features::completion::completions(&service.ast_cache, &uri, limit);
    Some(CompletionResponse::Array(items))
}

pub fn handle_document_symbol(service: &LanguageService, params: DocumentSymbolParams) -> Option<DocumentSymbolResponse> {
    let uri = DocumentUri::new(params.text_document.uri);
    let symbols = features::symbols::document_symbols(&service.ast_cache, &uri);
    Some(DocumentSymbolResponse::Nested(symbols))
}

pub fn handle_workspace_symbol(service: &LanguageService, params: WorkspaceSymbolParams) -> Option<Vec<SymbolInformation>> {
    Some(features::symbols::workspace_symbols(&service.ast_cache, &params.query))
}

pub fn handle_semantic_tokens_full(service: &LanguageService, params: SemanticTokensParams) -> Option<SemanticTokensResult> {
    let uri = DocumentUri::new(params.text_document.uri);
    let data = features::semantic_tokens::semantic_tokens(&service.ast_cache, &uri, &service.file_cache);
    Some(SemanticTokensResult::Tokens(SemanticTokens { result_id: None, data }))
}

pub fn handle_code_lens(service: &LanguageService, params: CodeLensParams) -> Option<Vec<CodeLens>> {
    let uri = DocumentUri::new(params.text_document.uri);
    Some(features::code_lens::code_lenses(&service.ast_cache, &uri))
}

pub fn handle_rename(service: &LanguageService, params: RenameParams) -> Option<WorkspaceEdit> {
    let uri = DocumentUri::new(params.text_document_position.text_document.uri);
    let position = params.text_document_position.position;
    features::rename::rename(&service.ast_cache, &uri, position, &params.new_name)
}

pub fn handle_formatting(service: &LanguageService, params: DocumentFormattingParams) -> Option<Vec<TextEdit>> {
    let uri = DocumentUri::new(params.text_document.uri);
    let text = service.file_cache.read_text(&uri).ok()?;
    let edits = features::formatting::format_document(&text);
    (!edits.is_empty()).then_some(edits)
}

pub fn handle_document_link(service: &LanguageService, params: DocumentLinkParams) -> Option<Vec<DocumentLink>> {
    let uri = DocumentUri::new(params.text_document.uri);
    Some(features::links::document_links(&service.ast_cache, &uri))
}
