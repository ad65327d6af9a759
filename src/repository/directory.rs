//! Directory-backed template source
//!
//! Templates are files of a fixed extension under a root directory,
//! read as UTF-8. A name resolves relative to the directory of the
//! template that references it, or relative to the root for top-level
//! requests; `/` and `..` navigate the hierarchy.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::source::{SourceError, TemplateId, TemplateSource};

/// Default file extension for template files
pub const DEFAULT_EXTENSION: &str = "mustache";

/// Template source rooted at a directory of template files
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Create a source for `.mustache` files under the given root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    /// Create a source with a custom file extension (with or without a
    /// leading dot)
    pub fn with_extension(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl TemplateSource for DirectorySource {
    fn resolve(&self, name: &str, base: Option<&TemplateId>) -> Option<TemplateId> {
        if name.trim().is_empty() {
            return None;
        }

        // Names resolve against the referencing template's directory when
        // there is one, against the root otherwise.
        let anchor = match base {
            Some(base) => Path::new(base.as_str())
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.clone()),
            None => self.root.clone(),
        };

        let path = normalize(&anchor.join(format!("{}.{}", name, self.extension)));
        Some(TemplateId::new(path.to_string_lossy().into_owned()))
    }

    fn load(&self, id: &TemplateId) -> Result<String, SourceError> {
        std::fs::read_to_string(Path::new(id.as_str())).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SourceError::NotFound { id: id.clone() }
            } else {
                SourceError::Io {
                    id: id.clone(),
                    source: e,
                }
            }
        })
    }
}

/// Resolve `.` and `..` components lexically, without touching the disk
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            c => out.push(c.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> TemplateId {
        TemplateId::new(s)
    }

    #[test]
    fn test_resolve_from_root() {
        let source = DirectorySource::new("/templates");
        assert_eq!(
            source.resolve("profile", None),
            Some(id("/templates/profile.mustache"))
        );
    }

    #[test]
    fn test_resolve_relative_to_referencing_template() {
        let source = DirectorySource::new("/templates");
        let base = id("/templates/pages/index.mustache");
        assert_eq!(
            source.resolve("sidebar", Some(&base)),
            Some(id("/templates/pages/sidebar.mustache"))
        );
    }

    #[test]
    fn test_resolve_subdirectory_name() {
        let source = DirectorySource::new("/templates");
        assert_eq!(
            source.resolve("partials/achievements", None),
            Some(id("/templates/partials/achievements.mustache"))
        );
    }

    #[test]
    fn test_resolve_parent_navigation() {
        let source = DirectorySource::new("/templates");
        let base = id("/templates/pages/index.mustache");
        assert_eq!(
            source.resolve("../shared/footer", Some(&base)),
            Some(id("/templates/shared/footer.mustache"))
        );
    }

    #[test]
    fn test_resolve_custom_extension() {
        let source = DirectorySource::with_extension("/templates", ".txt");
        assert_eq!(
            source.resolve("profile", None),
            Some(id("/templates/profile.txt"))
        );
    }

    #[test]
    fn test_resolve_empty_name() {
        let source = DirectorySource::new("/templates");
        assert_eq!(source.resolve("", None), None);
        assert_eq!(source.resolve("   ", None), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let source = DirectorySource::new("/nonexistent");
        let missing = id("/nonexistent/absent.mustache");
        match source.load(&missing) {
            Err(SourceError::NotFound { id }) => assert_eq!(id, missing),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
