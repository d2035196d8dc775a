use log::info;
use tower_lsp::{LspService, Server};

use nf_analyzer_core::lsp_binding::NfAnalyzerServer;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("starting nf-analyzer-lsp");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(NfAnalyzerServer::new);

    Server::new(stdin, stdout, socket).serve(service).await;
}
