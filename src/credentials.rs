//! Lookup of the optional credentials file used for authenticated shutdown.
use std::path::{Path, PathBuf};

/// Snapshot of the credentials file at the moment of a shutdown attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSource {
    /// Whether the file was present when resolved.
    pub exists: bool,
    /// Where the file is (or would be).
    pub path: PathBuf,
}

/// Resolves the credentials file at a fixed path. Never caches: the file may be created or
/// removed between two shutdown attempts.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    path: PathBuf,
}

impl CredentialResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks the filesystem now.
    pub fn resolve(&self) -> CredentialSource {
        CredentialSource {
            exists: self.path.is_file(),
            path: self.path.clone(),
        }
    }
}
