//! Stable file identity used as the key type throughout the cache.

use std::fmt;

use tower_lsp::lsp_types::Url;

/// A stable identity for a source file.
///
/// Wraps `lsp_types::Url` rather than a raw path so that the same value can
/// cross the LSP boundary without re-parsing, while still giving the core a
/// single newtype to key every per-file map off of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentUri(Url);

impl DocumentUri {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn from_file_path(path: impl AsRef<std::path::Path>) -> Option<Self> {
        Url::from_file_path(path).ok().map(Self)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn into_url(self) -> Url {
        self.0
    }

    pub fn to_file_path(&self) -> Option<std::path::PathBuf> {
        self.0.to_file_path().ok()
    }
}

impl fmt::Display for DocumentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Url> for DocumentUri {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl From<DocumentUri> for Url {
    fn from(uri: DocumentUri) -> Self {
        uri.0
    }
}
