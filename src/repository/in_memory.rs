//! In-memory template source backed by a name → text table
//!
//! The namespace is flat: the base identifier is ignored, so a partial
//! name means the same thing no matter which template references it.

use std::collections::HashMap;

use super::source::{SourceError, TemplateId, TemplateSource};

/// Template source over an in-memory dictionary
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    templates: HashMap<String, String>,
}

impl InMemorySource {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Add or replace a template under a name
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(name.into(), text.into());
    }
}

impl<N, T> FromIterator<(N, T)> for InMemorySource
where
    N: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(n, t)| (n.into(), t.into()))
                .collect(),
        }
    }
}

impl TemplateSource for InMemorySource {
    fn resolve(&self, name: &str, _base: Option<&TemplateId>) -> Option<TemplateId> {
        self.templates
            .contains_key(name)
            .then(|| TemplateId::new(name))
    }

    fn load(&self, id: &TemplateId) -> Result<String, SourceError> {
        self.templates
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| SourceError::NotFound { id: id.clone() })
    }
}
