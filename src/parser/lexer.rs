//! Lexer for template text using logos
//!
//! Splits template source into literal text runs and `{{…}}` tags. Tag
//! bodies are carried as raw strings; the grammar turns them into keys.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Strip the tag delimiters and sigil from a matched tag slice
fn tag_body(slice: &str, open: usize, close: usize) -> String {
    slice[open..slice.len() - close].trim().to_string()
}

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// `{{{key}}}`, an unescaped variable
    #[regex(r"\{\{\{[^{}]*\}\}\}", |lex| tag_body(lex.slice(), 3, 3), priority = 6)]
    Triple(String),

    /// `{{&key}}`, an unescaped variable
    #[regex(r"\{\{&[^{}]*\}\}", |lex| tag_body(lex.slice(), 3, 2), priority = 5)]
    Ampersand(String),

    /// `{{#key}}`, a section opening
    #[regex(r"\{\{#[^{}]*\}\}", |lex| tag_body(lex.slice(), 3, 2), priority = 5)]
    SectionOpen(String),

    /// `{{^key}}`, an inverted section opening
    #[regex(r"\{\{\^[^{}]*\}\}", |lex| tag_body(lex.slice(), 3, 2), priority = 5)]
    InvertedOpen(String),

    /// `{{/key}}`, a section closing
    #[regex(r"\{\{/[^{}]*\}\}", |lex| tag_body(lex.slice(), 3, 2), priority = 5)]
    SectionClose(String),

    /// `{{>name}}`, a partial reference
    #[regex(r"\{\{>[^{}]*\}\}", |lex| tag_body(lex.slice(), 3, 2), priority = 5)]
    Partial(String),

    /// `{{!...}}`, a comment (skipped)
    #[regex(r"\{\{![^{}]*\}\}", logos::skip, priority = 5)]
    Comment,

    /// `{{key}}`, an escaped variable
    #[regex(r"\{\{[^{}]*\}\}", |lex| tag_body(lex.slice(), 2, 2), priority = 4)]
    Variable(String),

    /// A `{{` that never closes; the grammar turns it into a parse error
    #[regex(r"\{\{[^{}]*", |lex| lex.slice().to_string(), priority = 2)]
    UnclosedTag(String),

    /// Literal text between tags
    #[regex(r"[^{]+", |lex| lex.slice().to_string())]
    Text(String),

    /// A lone `{` that does not start a tag
    #[token("{", |lex| lex.slice().to_string(), priority = 1)]
    Brace(String),
}

/// Lex template source into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(tokens("hello world"), vec![Token::Text("hello world".into())]);
    }

    #[test]
    fn test_variable_tag() {
        assert_eq!(
            tokens("Hello {{name}}!"),
            vec![
                Token::Text("Hello ".into()),
                Token::Variable("name".into()),
                Token::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_tag_body_whitespace_trimmed() {
        assert_eq!(tokens("{{ name }}"), vec![Token::Variable("name".into())]);
    }

    #[test]
    fn test_triple_tag() {
        assert_eq!(tokens("{{{markup}}}"), vec![Token::Triple("markup".into())]);
    }

    #[test]
    fn test_ampersand_tag() {
        assert_eq!(tokens("{{& markup }}"), vec![Token::Ampersand("markup".into())]);
    }

    #[test]
    fn test_section_tags() {
        assert_eq!(
            tokens("{{#items}}x{{/items}}"),
            vec![
                Token::SectionOpen("items".into()),
                Token::Text("x".into()),
                Token::SectionClose("items".into()),
            ]
        );
    }

    #[test]
    fn test_inverted_section_tag() {
        assert_eq!(
            tokens("{{^empty}}none{{/empty}}"),
            vec![
                Token::InvertedOpen("empty".into()),
                Token::Text("none".into()),
                Token::SectionClose("empty".into()),
            ]
        );
    }

    #[test]
    fn test_partial_tag() {
        assert_eq!(
            tokens("{{> partials/header }}"),
            vec![Token::Partial("partials/header".into())]
        );
    }

    #[test]
    fn test_comment_skipped() {
        assert_eq!(
            tokens("a{{! ignore me }}b"),
            vec![Token::Text("a".into()), Token::Text("b".into())]
        );
    }

    #[test]
    fn test_lone_brace_is_text() {
        assert_eq!(
            tokens("a { b"),
            vec![
                Token::Text("a ".into()),
                Token::Brace("{".into()),
                Token::Text(" b".into()),
            ]
        );
    }

    #[test]
    fn test_unclosed_tag() {
        assert_eq!(
            tokens("before {{oops"),
            vec![
                Token::Text("before ".into()),
                Token::UnclosedTag("{{oops".into()),
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_ranges() {
        let spanned: Vec<_> = lex("ab{{x}}").collect();
        assert_eq!(spanned[0].1, 0..2);
        assert_eq!(spanned[1].1, 2..7);
    }

    #[test]
    fn test_complete_example() {
        let input = "{{#user}}Hello {{name}}, see {{>footer}}{{/user}}";
        assert_eq!(
            tokens(input),
            vec![
                Token::SectionOpen("user".into()),
                Token::Text("Hello ".into()),
                Token::Variable("name".into()),
                Token::Text(", see ".into()),
                Token::Partial("footer".into()),
                Token::SectionClose("user".into()),
            ]
        );
    }
}
