//! Structured error types for boundaries where callers need to match on a
//! kind rather than just display a message. Orchestration-level functions
//! use `anyhow::Result`; these leaf errors are what gets wrapped there.

use thiserror::Error;

use crate::uri::DocumentUri;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("file not found: {0}")]
    NotFound(DocumentUri),

    #[error("I/O error reading {uri}: {source}")]
    Io {
        uri: DocumentUri,
        #[source]
        source: std::io::Error,
    },

    #[error("{uri} is not valid UTF-8")]
    NotUtf8 { uri: DocumentUri },
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed schema JSON in {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("schema file {path} could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
