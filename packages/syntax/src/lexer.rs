//! Tokenizers for the two lexical modes of a source file
//!
//! Code mode lexes script text between markup (tracking brackets, strings and
//! comments), tag mode lexes the inside of an opening or closing tag. Markup
//! children are scanned directly by the parser since text there is verbatim.

use logos::Logos;
use std::ops::Range;

/// Script tokens. Whitespace and comments are skipped; the parser slices
/// verbatim code out of the source so nothing is lost.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum CodeToken {
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    StringLit,

    #[regex(r"`([^`\\]|\\.)*`")]
    Template,

    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semi,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token(".")]
    Dot,

    #[regex(r"[-+*/%=!&|^~?:,@#]")]
    Punct,
}

impl CodeToken {
    pub fn opens(self) -> bool {
        matches!(self, CodeToken::LBrace | CodeToken::LParen | CodeToken::LBracket)
    }

    pub fn closes(self) -> bool {
        matches!(self, CodeToken::RBrace | CodeToken::RParen | CodeToken::RBracket)
    }
}

/// Tokens inside `<tag …>` and `</tag>`
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum TagToken {
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$.:\-]*")]
    Name,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    StringLit,

    #[token("{")]
    LBrace,

    #[token("/")]
    Slash,

    #[token(">")]
    Gt,
}

/// A token with its absolute byte span. `None` kind marks a character
/// neither lexer recognizes.
pub type Spanned<T> = (Option<T>, Range<usize>);

/// Lex the first code token at or after `pos`
pub fn next_code_token(source: &str, pos: usize) -> Option<Spanned<CodeToken>> {
    next_token::<CodeToken>(source, pos)
}

/// Lex the first tag token at or after `pos`
pub fn next_tag_token(source: &str, pos: usize) -> Option<Spanned<TagToken>> {
    next_token::<TagToken>(source, pos)
}

fn next_token<'s, T>(source: &'s str, pos: usize) -> Option<Spanned<T>>
where
    T: Logos<'s, Source = str, Extras = ()>,
{
    let rest = source.get(pos..)?;
    let mut lexer = T::lexer(rest);
    let token = lexer.next()?;
    let span = lexer.span();
    Some((token.ok(), pos + span.start..pos + span.end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_tokens(source: &str) -> Vec<CodeToken> {
        let mut pos = 0;
        let mut tokens = Vec::new();
        while let Some((token, span)) = next_code_token(source, pos) {
            tokens.extend(token);
            pos = span.end;
        }
        tokens
    }

    #[test]
    fn test_code_tokens_skip_comments() {
        let tokens = code_tokens("a /* < */ // <div>\n < b");
        assert_eq!(tokens, vec![CodeToken::Ident, CodeToken::Lt, CodeToken::Ident]);
    }

    #[test]
    fn test_strings_hide_brackets() {
        let tokens = code_tokens(r#"f("{", '}', `)`)"#);
        assert_eq!(
            tokens,
            vec![
                CodeToken::Ident,
                CodeToken::LParen,
                CodeToken::StringLit,
                CodeToken::Punct,
                CodeToken::StringLit,
                CodeToken::Punct,
                CodeToken::Template,
                CodeToken::RParen,
            ]
        );
    }

    #[test]
    fn test_absolute_spans() {
        let source = "let x";
        let (token, span) = next_code_token(source, 3).unwrap();
        assert_eq!(token, Some(CodeToken::Ident));
        assert_eq!(span, 4..5);
    }

    #[test]
    fn test_tag_tokens() {
        let source = r#"div className="a b" on:click={x} />"#;
        let mut pos = 0;
        let mut tokens = Vec::new();
        while let Some((token, span)) = next_tag_token(source, pos) {
            tokens.push(token.unwrap());
            pos = span.end;
            if token == Some(TagToken::LBrace) {
                // skip `x}`
                pos += 2;
            }
        }
        assert_eq!(
            tokens,
            vec![
                TagToken::Name,
                TagToken::Name,
                TagToken::Eq,
                TagToken::StringLit,
                TagToken::Name,
                TagToken::Eq,
                TagToken::LBrace,
                TagToken::Slash,
                TagToken::Gt,
            ]
        );
    }
}
