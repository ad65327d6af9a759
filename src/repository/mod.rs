//! The template repository
//!
//! A [`Repository`] turns template names (or ad hoc strings) into shared
//! [`CompiledTemplate`]s. Text comes from a pluggable [`TemplateSource`];
//! each distinct resource is loaded and compiled at most once, and
//! circular partial references fail with a descriptive error instead of
//! recursing.

pub mod directory;
pub mod in_memory;
pub mod source;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::compiler::{self, PartialResolver};
use crate::error::Error;
use crate::template::CompiledTemplate;

pub use directory::DirectorySource;
pub use in_memory::InMemorySource;
pub use source::{SourceError, TemplateId, TemplateSource};

/// Compiles, caches, and shares templates from a single source.
///
/// The repository may be used from multiple threads: already-cached
/// lookups never wait on a compilation in progress, and concurrent
/// requests for the same identifier perform a single load and compile.
///
/// # Example
///
/// ```rust
/// use stencil::Repository;
///
/// let repository = Repository::from_templates([
///     ("greeting", "Hello {{name}}! {{>signature}}"),
///     ("signature", "-- {{author}}"),
/// ]);
///
/// let template = repository.compile_by_name("greeting", None).unwrap();
/// assert!(template.id().is_some());
/// ```
pub struct Repository {
    source: Option<Arc<dyn TemplateSource>>,
    /// Successful compilations, keyed by identifier. Only ever grows.
    cache: Mutex<HashMap<TemplateId, Arc<CompiledTemplate>>>,
    /// Identifiers whose compilation is in progress on some chain.
    in_flight: Mutex<HashSet<TemplateId>>,
    in_flight_done: Condvar,
}

impl Repository {
    /// A repository without a source: names never resolve, and ad hoc
    /// strings compile only while they reference no partials.
    pub fn new() -> Self {
        Self {
            source: None,
            cache: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            in_flight_done: Condvar::new(),
        }
    }

    /// A repository over an arbitrary source implementation
    pub fn with_source(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Some(Arc::new(source)),
            ..Self::new()
        }
    }

    /// A repository over `.mustache` files under a directory
    pub fn from_directory(root: impl Into<PathBuf>) -> Self {
        Self::with_source(DirectorySource::new(root))
    }

    /// A repository over template files of a custom extension
    pub fn from_directory_with_extension(
        root: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self::with_source(DirectorySource::with_extension(root, extension))
    }

    /// A repository over an in-memory name → template-string table
    pub fn from_templates<N, T>(templates: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self::with_source(InMemorySource::from_iter(templates))
    }

    /// Compile the template a name denotes, optionally relative to the
    /// identifier of an enclosing template.
    ///
    /// The first successful compilation of a resource is cached; later
    /// requests for the same identifier return the cached template
    /// without consulting the source.
    pub fn compile_by_name(
        &self,
        name: &str,
        base: Option<&TemplateId>,
    ) -> Result<Arc<CompiledTemplate>, Error> {
        let chain = RefCell::new(Vec::new());
        self.compile_named(name, base, &chain)
    }

    /// Compile an ad hoc template string.
    ///
    /// The string itself has no identifier and is never cached: every
    /// call compiles it afresh. Partials it references resolve relative
    /// to `base` (or the source's root namespace) and are cached exactly
    /// as in [`compile_by_name`](Self::compile_by_name).
    pub fn compile_from_string(
        &self,
        text: &str,
        base: Option<&TemplateId>,
    ) -> Result<Arc<CompiledTemplate>, Error> {
        let chain = RefCell::new(Vec::new());
        let resolver = ChainResolver {
            repository: self,
            chain: &chain,
        };
        let nodes = compiler::compile(text, &resolver, base)?;
        Ok(Arc::new(CompiledTemplate::new(None, nodes)))
    }

    /// Resolve, load, compile, and cache one named template on the given
    /// resolution chain. Re-entered through [`ChainResolver`] for every
    /// partial reference the compiler encounters.
    fn compile_named(
        &self,
        name: &str,
        base: Option<&TemplateId>,
        chain: &RefCell<Vec<TemplateId>>,
    ) -> Result<Arc<CompiledTemplate>, Error> {
        let source = self.source.as_ref().ok_or_else(|| Error::TemplateNotFound {
            name: name.to_string(),
            base: base.cloned(),
            cause: None,
        })?;

        let id = source
            .resolve(name, base)
            .ok_or_else(|| Error::TemplateNotFound {
                name: name.to_string(),
                base: base.cloned(),
                cause: None,
            })?;

        // A cached template can never be mid-cycle, so the cache is
        // consulted before any cycle or in-flight bookkeeping.
        if let Some(hit) = self.cached(&id) {
            trace!(template = %id, "cache hit");
            return Ok(hit);
        }

        // An identifier already on this chain's ancestry means the
        // template transitively references itself.
        if chain.borrow().contains(&id) {
            let chain_text = describe_cycle(&chain.borrow(), &id);
            debug!(template = %id, chain = %chain_text, "cyclic partial reference");
            return Err(Error::CyclicReference {
                id,
                chain: chain_text,
            });
        }

        // Claim the identifier, or wait while an unrelated chain
        // compiles it and then serve that chain's result.
        loop {
            {
                let mut in_flight = self.in_flight.lock();
                if !in_flight.contains(&id) {
                    in_flight.insert(id.clone());
                    break;
                }
                self.in_flight_done.wait(&mut in_flight);
            }
            if let Some(hit) = self.cached(&id) {
                return Ok(hit);
            }
            // The other chain failed; take over the compilation.
        }
        let _claim = FlightClaim {
            repository: self,
            id: id.clone(),
        };

        // Double-check: a concurrent chain may have finished between the
        // first cache probe and our claim.
        if let Some(hit) = self.cached(&id) {
            return Ok(hit);
        }

        debug!(template = %id, "compiling");
        chain.borrow_mut().push(id.clone());
        let result = self.load_and_compile(source.as_ref(), name, base, &id, chain);
        chain.borrow_mut().pop();

        let compiled = Arc::new(CompiledTemplate::new(Some(id.clone()), result?));
        self.cache.lock().insert(id, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Load text and drive the compiler. No repository lock is held
    /// across either step; the in-flight claim alone serializes work on
    /// this identifier.
    fn load_and_compile(
        &self,
        source: &dyn TemplateSource,
        name: &str,
        base: Option<&TemplateId>,
        id: &TemplateId,
        chain: &RefCell<Vec<TemplateId>>,
    ) -> Result<Vec<crate::template::Node>, Error> {
        let text = source.load(id).map_err(|cause| Error::TemplateNotFound {
            name: name.to_string(),
            base: base.cloned(),
            cause: Some(cause),
        })?;

        let resolver = ChainResolver {
            repository: self,
            chain,
        };
        compiler::compile(&text, &resolver, Some(id))
    }

    fn cached(&self, id: &TemplateId) -> Option<Arc<CompiledTemplate>> {
        self.cache.lock().get(id).cloned()
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

/// The resolution capability handed to the compiler: partial requests
/// re-enter the repository on the chain that is already in progress.
struct ChainResolver<'a> {
    repository: &'a Repository,
    chain: &'a RefCell<Vec<TemplateId>>,
}

impl PartialResolver for ChainResolver<'_> {
    fn resolve_partial(
        &self,
        name: &str,
        base: Option<&TemplateId>,
    ) -> Result<Arc<CompiledTemplate>, Error> {
        self.repository.compile_named(name, base, self.chain)
    }
}

/// Releases an in-flight claim on drop, success or failure, and wakes
/// chains waiting on this identifier.
struct FlightClaim<'a> {
    repository: &'a Repository,
    id: TemplateId,
}

impl Drop for FlightClaim<'_> {
    fn drop(&mut self) {
        self.repository.in_flight.lock().remove(&self.id);
        self.repository.in_flight_done.notify_all();
    }
}

/// Format the ancestry from the outermost template to the offending
/// reference, e.g. `a -> b -> a`.
fn describe_cycle(ancestors: &[TemplateId], offender: &TemplateId) -> String {
    let mut parts: Vec<&str> = ancestors.iter().map(TemplateId::as_str).collect();
    parts.push(offender.as_str());
    parts.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sourceless_repository_fails_by_name() {
        let repository = Repository::new();
        let result = repository.compile_by_name("anything", None);
        assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
    }

    #[test]
    fn test_sourceless_repository_compiles_partial_free_string() {
        let repository = Repository::new();
        let template = repository
            .compile_from_string("Hello {{name}}!", None)
            .expect("Should compile");
        assert!(template.id().is_none());
        assert_eq!(template.nodes().len(), 3);
    }

    #[test]
    fn test_sourceless_repository_fails_string_with_partial() {
        let repository = Repository::new();
        let result = repository.compile_from_string("{{>partial}}", None);
        assert!(matches!(result, Err(Error::TemplateNotFound { .. })));
    }

    #[test]
    fn test_compile_by_name_resolves_partials() {
        let repository = Repository::from_templates([
            ("page", "start {{>footer}} end"),
            ("footer", "bye"),
        ]);
        let template = repository.compile_by_name("page", None).expect("Should compile");
        assert_eq!(template.id(), Some(&TemplateId::new("page")));
        assert_eq!(template.nodes().len(), 3);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let repository = Repository::from_templates([("a", "{{>a}}")]);
        match repository.compile_by_name("a", None) {
            Err(Error::CyclicReference { chain, .. }) => assert_eq!(chain, "a -> a"),
            other => panic!("Expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_describe_cycle_lists_ancestry() {
        let ancestors = vec![TemplateId::new("a"), TemplateId::new("b")];
        assert_eq!(describe_cycle(&ancestors, &TemplateId::new("a")), "a -> b -> a");
    }
}
