//! Parser turning the tag token stream into a raw node tree

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::{Key, RawNode, Spanned};
use crate::parser::lexer::Token;

/// Parse template source into a raw node tree
///
/// Partial references stay unresolved; the compiler resolves them against
/// a repository.
pub fn parse(input: &str) -> Result<Vec<Spanned<RawNode>>, Vec<crate::ParseError>> {
    let len = input.len();

    // Create a logos lexer and convert to token stream
    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn template_parser<'a, I>(
) -> impl Parser<'a, I, Vec<Spanned<RawNode>>, extra::Err<Rich<'a, Token>>>
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let node = recursive(|node| {
        // Literal text. Consecutive text and lone-brace tokens collapse
        // into a single node.
        let text = select! {
            Token::Text(t) => t,
            Token::Brace(t) => t,
        }
        .repeated()
        .at_least(1)
        .collect::<Vec<String>>()
        .map_with(|parts, e| Spanned::new(RawNode::Text(parts.concat()), span_range(&e.span())));

        // Variable tags: {{key}} is escaped, {{{key}}} and {{&key}} are not
        let variable = select! {
            Token::Variable(body) => (body, true),
            Token::Triple(body) => (body, false),
            Token::Ampersand(body) => (body, false),
        }
        .try_map(|(body, escaped), span: SimpleSpan| match Key::parse(&body) {
            Some(key) => Ok(RawNode::Variable { key, escaped }),
            None => Err(Rich::custom(span, format!("invalid tag key '{}'", body))),
        })
        .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

        let partial = select! {
            Token::Partial(name) => name,
        }
        .try_map(|name, span: SimpleSpan| {
            if name.is_empty() {
                Err(Rich::custom(span, "partial tag with no name"))
            } else {
                Ok(RawNode::Partial { name })
            }
        })
        .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

        // Section: open tag, nested nodes, close tag naming the same key
        let section_open = select! {
            Token::SectionOpen(body) => (body, false),
            Token::InvertedOpen(body) => (body, true),
        }
        .try_map(|(body, inverted), span: SimpleSpan| match Key::parse(&body) {
            Some(key) => Ok((key, inverted)),
            None => Err(Rich::custom(span, format!("invalid section key '{}'", body))),
        });

        let section_close = select! {
            Token::SectionClose(body) => body,
        };

        let section = section_open
            .then(node.repeated().collect::<Vec<_>>())
            .then(section_close)
            .try_map(|(((key, inverted), children), close), span: SimpleSpan| {
                match Key::parse(&close) {
                    Some(close_key) if close_key == key => Ok(RawNode::Section {
                        key,
                        inverted,
                        children,
                    }),
                    Some(close_key) => Err(Rich::custom(
                        span,
                        format!("section '{}' closed by '{}'", key, close_key),
                    )),
                    None => Err(Rich::custom(
                        span,
                        format!("invalid section close tag '{}'", close),
                    )),
                }
            })
            .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

        // A lexed `{{` with no closing `}}` is always an error
        let unclosed = select! {
            Token::UnclosedTag(raw) => raw,
        }
        .try_map(|raw, span: SimpleSpan| -> Result<RawNode, Rich<'a, Token>> {
            Err(Rich::custom(span, format!("unclosed tag '{}'", raw)))
        })
        .map_with(|n, e| Spanned::new(n, span_range(&e.span())));

        choice((text, variable, partial, section, unclosed))
    });

    // A template is a flat list of nodes
    node.repeated().collect().then_ignore(end())
}
