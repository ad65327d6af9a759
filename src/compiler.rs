//! Compilation driver: parse template text and resolve partial references
//!
//! The compiler and the repository call back and forth at runtime, but
//! depend on each other only through two narrow interfaces: the
//! repository consumes [`compile`], and the compiler consumes a
//! [`PartialResolver`].

use std::sync::Arc;

use crate::error::Error;
use crate::parser::{self, RawNode, Spanned};
use crate::repository::source::TemplateId;
use crate::template::{CompiledTemplate, Node};

/// The resolution capability the compiler requires: turn a partial name,
/// relative to the template being compiled, into a compiled template.
pub trait PartialResolver {
    fn resolve_partial(
        &self,
        name: &str,
        base: Option<&TemplateId>,
    ) -> Result<Arc<CompiledTemplate>, Error>;
}

/// Compile template text into a node tree.
///
/// Every partial reference in the text triggers exactly one
/// `resolve_partial` call with `base` as the resolution anchor; the
/// resolved template is embedded into the tree. Any failure, whether a
/// parse error or a nested resolution failure, aborts the whole compilation.
pub(crate) fn compile(
    text: &str,
    resolver: &dyn PartialResolver,
    base: Option<&TemplateId>,
) -> Result<Vec<Node>, Error> {
    let raw = parser::parse(text).map_err(|errors| Error::Compile {
        id: base.cloned(),
        errors,
    })?;
    lower(raw, resolver, base)
}

fn lower(
    raw: Vec<Spanned<RawNode>>,
    resolver: &dyn PartialResolver,
    base: Option<&TemplateId>,
) -> Result<Vec<Node>, Error> {
    raw.into_iter()
        .map(|spanned| match spanned.node {
            RawNode::Text(text) => Ok(Node::Text(text)),
            RawNode::Variable { key, escaped } => Ok(Node::Variable { key, escaped }),
            RawNode::Section {
                key,
                inverted,
                children,
            } => Ok(Node::Section {
                key,
                inverted,
                children: lower(children, resolver, base)?,
            }),
            RawNode::Partial { name } => {
                let template = resolver.resolve_partial(&name, base)?;
                Ok(Node::Partial { name, template })
            }
        })
        .collect()
}
