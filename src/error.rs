//! Error types for parsing and template resolution

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::repository::source::{SourceError, TemplateId};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors surfaced by the repository
#[derive(Debug, Error)]
pub enum Error {
    /// Name resolution returned nothing, or the source failed to load the
    /// resolved resource
    #[error("template not found: {name}{}", fmt_base(.base))]
    TemplateNotFound {
        name: String,
        base: Option<TemplateId>,
        #[source]
        cause: Option<SourceError>,
    },

    /// A partial reference resolved to an identifier already being
    /// compiled on the current resolution chain
    #[error("cyclic partial reference: {chain}")]
    CyclicReference { id: TemplateId, chain: String },

    /// The template text failed to parse; nothing is cached
    #[error("compilation failed{}: {}", fmt_template(.id), fmt_parse_errors(.errors))]
    Compile {
        id: Option<TemplateId>,
        errors: Vec<ParseError>,
    },
}

fn fmt_base(base: &Option<TemplateId>) -> String {
    match base {
        Some(base) => format!(" (relative to {})", base),
        None => String::new(),
    }
}

fn fmt_template(id: &Option<TemplateId>) -> String {
    match id {
        Some(id) => format!(" in {}", id),
        None => String::new(),
    }
}

fn fmt_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                Report::build(ReportKind::Error, filename, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf)
                    .unwrap();
            }
        }
        String::from_utf8(buf).unwrap()
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("'{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::Text(t) => format!("text {:?}", t),
        Token::Brace(_) => "'{'".to_string(),
        Token::Variable(k) => format!("tag '{{{{{}}}}}'", k),
        Token::Triple(k) => format!("tag '{{{{{{{}}}}}}}'", k),
        Token::Ampersand(k) => format!("tag '{{{{&{}}}}}'", k),
        Token::SectionOpen(k) => format!("section opening '{{{{#{}}}}}'", k),
        Token::InvertedOpen(k) => format!("section opening '{{{{^{}}}}}'", k),
        Token::SectionClose(k) => format!("section closing '{{{{/{}}}}}'", k),
        Token::Partial(n) => format!("partial '{{{{>{}}}}}'", n),
        Token::UnclosedTag(raw) => format!("unclosed tag '{}'", raw),
        Token::Comment => "comment".to_string(),
    }
}
