//! Stencil - template compilation with cached, cycle-safe partial resolution
//!
//! This library turns named template resources (or ad hoc template
//! strings) into shared compiled templates. A [`Repository`] asks a
//! pluggable [`TemplateSource`] to resolve names into identifiers and
//! load template text, drives compilation (which recursively resolves
//! `{{>partial}}` references), and caches every successful compilation so
//! each resource is loaded and compiled at most once. Circular partial
//! references fail with a descriptive error instead of recursing forever.
//!
//! Rendering compiled templates against data is out of scope; the crate
//! produces node trees for a renderer to walk.
//!
//! # Example
//!
//! ```rust
//! use stencil::Repository;
//!
//! let repository = Repository::from_templates([
//!     ("profile", "{{name}} {{>badge}}"),
//!     ("badge", "[{{rank}}]"),
//! ]);
//!
//! let profile = repository.compile_by_name("profile", None).unwrap();
//! assert_eq!(profile.nodes().len(), 3);
//!
//! // The badge partial is now cached; compiling it by name reuses the
//! // same compiled template.
//! let badge = repository.compile_by_name("badge", None).unwrap();
//! assert!(badge.id().is_some());
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod parser;
pub mod repository;
pub mod template;

use std::sync::Arc;

pub use compiler::PartialResolver;
pub use config::{ConfigError, RepositoryConfig};
pub use error::{Error, ParseError};
pub use repository::{
    DirectorySource, InMemorySource, Repository, SourceError, TemplateId, TemplateSource,
};
pub use template::{CompiledTemplate, Node};

/// Compile a template string that references no partials.
///
/// This is a convenience over a sourceless [`Repository`]; any
/// `{{>partial}}` in the text fails with [`Error::TemplateNotFound`].
///
/// # Example
///
/// ```rust
/// use stencil::compile;
///
/// let template = compile("Hello {{name}}!").unwrap();
/// assert_eq!(template.nodes().len(), 3);
/// ```
pub fn compile(text: &str) -> Result<Arc<CompiledTemplate>, Error> {
    Repository::new().compile_from_string(text, None)
}
