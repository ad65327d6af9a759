//! Parse-tree types for the template grammar

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A variable or section key: dotted segments (`user.name`) or the
/// implicit iterator `.` (no segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// Parse a raw tag body into a key. Returns None for an empty or
    /// malformed body (empty dotted segments like `a..b`).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == "." {
            return Some(Self { segments: vec![] });
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// The implicit iterator key `{{.}}` has no segments.
    pub fn is_implicit(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_implicit() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Unresolved template node, as emitted by the grammar.
///
/// Partial references are still plain names at this stage; the compiler
/// resolves them into embedded compiled templates.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    /// Literal text between tags
    Text(String),
    /// `{{key}}` / `{{{key}}}` / `{{&key}}`
    Variable { key: Key, escaped: bool },
    /// `{{#key}}…{{/key}}` or `{{^key}}…{{/key}}`
    Section {
        key: Key,
        inverted: bool,
        children: Vec<Spanned<RawNode>>,
    },
    /// `{{>name}}`
    Partial { name: String },
}
