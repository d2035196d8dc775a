//! The `tower-lsp` transport binding: wires `LanguageService` (the
//! editor-agnostic coordinator) to the `LanguageServer` trait's request and
//! notification callbacks.
//!
//! `server.rs` owns the `LanguageServer` impl and delegates every method
//! body to a `notification`/`request` handler function, which in turn
//! calls into the analysis core. Kept as a binding-only layer: nothing in
//! `notification.rs`/`request.rs` touches `AstCache`/`FileCache` directly,
//! only `LanguageService`'s own public methods.

pub mod notification;
pub mod request;
pub mod server;

pub use server::NfAnalyzerServer;
