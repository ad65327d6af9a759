//! Compiled template representation
//!
//! A [`CompiledTemplate`] is the immutable result of a successful
//! compilation. The repository hands templates out as `Arc`s: cache
//! entries and client handles share one allocation, so a template stays
//! valid for as long as anyone holds it, independently of the cache.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::parser::Key;
use crate::repository::source::TemplateId;

/// A node of a compiled template tree
#[derive(Debug, Clone)]
pub enum Node {
    /// Literal text
    Text(String),
    /// Variable substitution; `escaped` records whether the tag requested
    /// output escaping (`{{key}}`) or not (`{{{key}}}`, `{{&key}}`)
    Variable { key: Key, escaped: bool },
    /// Conditional/iterating section and its body
    Section {
        key: Key,
        inverted: bool,
        children: Vec<Node>,
    },
    /// A resolved partial reference: the compiled template it named,
    /// shared with the repository cache and any other referencing
    /// templates
    Partial {
        name: String,
        template: Arc<CompiledTemplate>,
    },
}

/// Immutable result of compiling one template
#[derive(Debug)]
pub struct CompiledTemplate {
    id: Option<TemplateId>,
    nodes: Vec<Node>,
}

impl CompiledTemplate {
    pub(crate) fn new(id: Option<TemplateId>, nodes: Vec<Node>) -> Self {
        Self { id, nodes }
    }

    /// The identifier this template was compiled from, or None for a
    /// template compiled from an ad hoc string
    pub fn id(&self) -> Option<&TemplateId> {
        self.id.as_ref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render the node tree as an indented listing, one node per line.
    /// Partials are expanded in place with their resolved identifier.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node, 0);
        }
        out
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Text(text) => {
            let _ = writeln!(out, "{}text {:?}", indent, text);
        }
        Node::Variable { key, escaped } => {
            let marker = if *escaped { "" } else { "& " };
            let _ = writeln!(out, "{}variable {}{}", indent, marker, key);
        }
        Node::Section {
            key,
            inverted,
            children,
        } => {
            let sigil = if *inverted { "^" } else { "#" };
            let _ = writeln!(out, "{}section {}{}", indent, sigil, key);
            for child in children {
                write_node(out, child, depth + 1);
            }
        }
        Node::Partial { name, template } => {
            let resolved = template
                .id()
                .map(|id| format!(" ({})", id))
                .unwrap_or_default();
            let _ = writeln!(out, "{}partial >{}{}", indent, name, resolved);
            for child in template.nodes() {
                write_node(out, child, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::parse(s).expect("valid key")
    }

    #[test]
    fn test_dump_flat_nodes() {
        let template = CompiledTemplate::new(
            None,
            vec![
                Node::Text("Hello ".to_string()),
                Node::Variable {
                    key: key("name"),
                    escaped: true,
                },
            ],
        );
        assert_eq!(template.dump_tree(), "text \"Hello \"\nvariable name\n");
    }

    #[test]
    fn test_dump_section_indents_children() {
        let template = CompiledTemplate::new(
            None,
            vec![Node::Section {
                key: key("items"),
                inverted: false,
                children: vec![Node::Variable {
                    key: Key::parse(".").unwrap(),
                    escaped: true,
                }],
            }],
        );
        assert_eq!(template.dump_tree(), "section #items\n  variable .\n");
    }

    #[test]
    fn test_dump_partial_shows_resolved_id() {
        let inner = Arc::new(CompiledTemplate::new(
            Some(TemplateId::new("footer")),
            vec![Node::Text("bye".to_string())],
        ));
        let template = CompiledTemplate::new(
            None,
            vec![Node::Partial {
                name: "footer".to_string(),
                template: inner,
            }],
        );
        assert_eq!(
            template.dump_tree(),
            "partial >footer (footer)\n  text \"bye\"\n"
        );
    }

    #[test]
    fn test_unescaped_marker() {
        let template = CompiledTemplate::new(
            None,
            vec![Node::Variable {
                key: key("markup"),
                escaped: false,
            }],
        );
        assert_eq!(template.dump_tree(), "variable & markup\n");
    }
}
