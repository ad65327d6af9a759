//! The capability contract between the repository and its storage

use std::fmt;

use thiserror::Error;

/// Opaque identifier for a compilable template resource.
///
/// A source defines what the inner value means (a normalized file path, a
/// dictionary key, …). The repository never interprets it; it only
/// compares, hashes, and prints it in diagnostics, so sources should pick
/// human-readable values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors a source can report while loading template text
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("resource not found: {id}")]
    NotFound { id: TemplateId },

    #[error("error reading {id}: {source}")]
    Io {
        id: TemplateId,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies template text for the repository.
///
/// Implementations map names to identifiers and identifiers to raw text;
/// the repository drives everything else. Both operations may block on
/// I/O; the repository never calls them while holding its locks.
pub trait TemplateSource: Send + Sync {
    /// Compute the identifier a name denotes, optionally relative to the
    /// identifier of the template the name appears in. Returns None when
    /// the name cannot be mapped; the repository reports this as a
    /// not-found error rather than a source failure.
    fn resolve(&self, name: &str, base: Option<&TemplateId>) -> Option<TemplateId>;

    /// Return the raw template text for a previously resolved identifier.
    fn load(&self, id: &TemplateId) -> Result<String, SourceError>;
}
