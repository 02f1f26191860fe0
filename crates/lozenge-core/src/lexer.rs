//! Tokenizer with SIMD-accelerated scanning.
//!
//! The tokenizer turns a whole document into a flat [`Token`] sequence.
//! Ordinary characters accumulate into a pending text run; each special
//! character (sigil, scope marker, line break) flushes that run and emits
//! its own token.
//!
//! # Performance
//!
//! - Zero-copy: text runs borrow from the input unless an escape was removed
//! - Candidate positions are found with `memchr` on the lead bytes of the
//!   special characters, then confirmed by decoding the character there

use std::borrow::Cow;

use memchr::{memchr, memchr3};

use crate::ast::Properties;
use crate::error::{MalformedMarkup, Result};
use crate::syntax::Syntax;
use crate::token::Token;

/// Single-use tokenizer over one document.
///
/// [`tokenize`](Tokenizer::tokenize) consumes the tokenizer, so no state
/// survives into the next document.
pub struct Tokenizer<'a> {
    /// The complete input text.
    input: &'a str,
    /// Input as bytes for scanning.
    bytes: &'a [u8],
    syntax: Syntax,
    /// First UTF-8 byte of the sigil and of the scope marker.
    leads: [u8; 2],
    /// Current byte offset.
    pos: usize,
    /// Start of the pending text run.
    text_start: usize,
    /// Text already taken from earlier in the run, when an escape char was dropped.
    pending: Option<String>,
    tokens: Vec<Token<'a>>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer for the given input with the default syntax.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        let syntax = Syntax::default();
        Self {
            input,
            bytes: input.as_bytes(),
            syntax,
            leads: lead_bytes(&syntax),
            pos: 0,
            text_start: 0,
            pending: None,
            tokens: Vec::new(),
        }
    }

    /// Use different special characters.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self.leads = lead_bytes(&syntax);
        self
    }

    /// Scan the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token<'a>>> {
        self.tokens.reserve(self.bytes.len() / 16 + 1);

        while let Some(at) = self.find_next_special() {
            self.pos = at;
            let Some(c) = self.input[at..].chars().next() else {
                break;
            };

            if !self.syntax.is_special(c) {
                // Lead byte shared with some other character.
                self.pos += c.len_utf8();
                continue;
            }

            if self.is_escaped(at) {
                self.drop_escape(at);
                self.pos += c.len_utf8();
                continue;
            }

            if c == self.syntax.sigil {
                self.command()?;
            } else if c == self.syntax.scope_marker {
                self.flush_text(at);
                self.tokens.push(Token::ScopeMarker);
                self.pos += c.len_utf8();
            } else {
                self.flush_text(at);
                self.newline();
            }
            self.text_start = self.pos;
        }

        self.flush_text(self.bytes.len());
        Ok(self.tokens)
    }

    /// Position of the next byte that may start a special character.
    #[inline(always)]
    fn find_next_special(&self) -> Option<usize> {
        let remaining = self.bytes.get(self.pos..)?;

        let common = memchr3(self.leads[0], self.leads[1], b'\n', remaining);
        let rare = memchr(b'\r', remaining);

        match (common, rare) {
            (Some(a), Some(b)) => Some(self.pos + a.min(b)),
            (Some(a), None) => Some(self.pos + a),
            (None, Some(b)) => Some(self.pos + b),
            (None, None) => None,
        }
    }

    /// Whether the character at `at` is preceded by an escape inside the current run.
    #[inline]
    fn is_escaped(&self, at: usize) -> bool {
        let escape_len = self.syntax.escape.len_utf8();
        at >= self.text_start + escape_len && self.input[..at].ends_with(self.syntax.escape)
    }

    /// Remove the escape character before `at` from the pending run.
    fn drop_escape(&mut self, at: usize) {
        let escape_at = at - self.syntax.escape.len_utf8();
        self.pending
            .get_or_insert_with(String::new)
            .push_str(&self.input[self.text_start..escape_at]);
        self.text_start = at;
    }

    /// Emit the pending text run ending at `end`, if any.
    fn flush_text(&mut self, end: usize) {
        let run = &self.input[self.text_start..end];
        let value = match self.pending.take() {
            Some(mut owned) => {
                owned.push_str(run);
                Cow::Owned(owned)
            }
            None => Cow::Borrowed(run),
        };
        if !value.is_empty() {
            self.tokens.push(Token::Text(value));
        }
        self.text_start = end;
    }

    /// Emit one paragraph boundary for the line break at `pos`.
    fn newline(&mut self) {
        let len = match self.bytes.get(self.pos..self.pos + 2) {
            Some(b"\r\n") => 2,
            _ => 1,
        };
        if !self.tokens.last().is_some_and(Token::is_newline) {
            self.tokens.push(Token::Newline);
        }
        self.pos += len;
    }

    /// Sigil, identifier and optional properties.
    fn command(&mut self) -> Result<()> {
        self.flush_text(self.pos);
        self.tokens.push(Token::SigilOpen);
        self.pos += self.syntax.sigil.len_utf8();

        let start = self.pos;
        let syntax = self.syntax;
        let end = self.input[start..]
            .char_indices()
            .find(|&(_, c)| syntax.ends_identifier(c))
            .map_or(self.bytes.len(), |(i, _)| start + i);
        self.tokens.push(Token::Identifier(&self.input[start..end]));
        self.pos = end;

        if self.bytes.get(self.pos) == Some(&b'{') {
            let properties = self.properties()?;
            self.tokens.push(Token::Properties(properties));
        }
        Ok(())
    }

    /// Read a balanced `{...}` literal starting at `pos`.
    fn properties(&mut self) -> Result<Properties> {
        let start = self.pos;
        let end = balanced_end(&self.input[start..])
            .map(|len| start + len)
            .ok_or(MalformedMarkup::UnbalancedProperties { offset: start })?;

        let properties = json5::from_str::<Properties>(&self.input[start..end]).map_err(|e| {
            MalformedMarkup::InvalidProperties {
                offset: start,
                message: e.to_string(),
            }
        })?;
        self.pos = end;
        Ok(properties)
    }
}

fn lead_bytes(syntax: &Syntax) -> [u8; 2] {
    let mut buf = [0u8; 4];
    let sigil = syntax.sigil.encode_utf8(&mut buf).as_bytes()[0];
    let marker = syntax.scope_marker.encode_utf8(&mut buf).as_bytes()[0];
    [sigil, marker]
}

/// Where `balanced_end` is inside a properties literal.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Quoted { quote: char, escaped: bool },
    LineComment,
    BlockComment,
}

/// Length of the brace-balanced prefix of `s`, which starts with `{`.
///
/// Braces inside quoted strings and comments do not count.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut state = Scan::Code;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        state = match state {
            Scan::Quoted { quote, escaped } => match c {
                _ if escaped => Scan::Quoted { quote, escaped: false },
                '\\' => Scan::Quoted { quote, escaped: true },
                _ if c == quote => Scan::Code,
                _ => state,
            },
            Scan::LineComment => match c {
                '\n' | '\r' => Scan::Code,
                _ => state,
            },
            Scan::BlockComment => {
                if c == '*' && chars.next_if(|&(_, n)| n == '/').is_some() {
                    Scan::Code
                } else {
                    state
                }
            }
            Scan::Code => match c {
                '"' | '\'' => Scan::Quoted { quote: c, escaped: false },
                '/' => match chars.next_if(|&(_, n)| n == '/' || n == '*') {
                    Some((_, '/')) => Scan::LineComment,
                    Some(_) => Scan::BlockComment,
                    None => state,
                },
                '{' => {
                    depth += 1;
                    state
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i + 1);
                    }
                    state
                }
                _ => state,
            },
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn lex(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).tokenize().unwrap()
    }

    fn text(value: &str) -> Token<'_> {
        Token::Text(Cow::Borrowed(value))
    }

    fn props(value: serde_json::Value) -> Properties {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_plain_text_is_one_token() {
        assert_eq!(lex("hello world"), vec![text("hello world")]);
        assert!(lex("").is_empty());
    }

    #[test]
    fn test_command_with_properties_and_scope() {
        assert_eq!(
            lex("◊foo{a:1}§hello§"),
            vec![
                Token::SigilOpen,
                Token::Identifier("foo"),
                Token::Properties(props(json!({"a": 1}))),
                Token::ScopeMarker,
                text("hello"),
                Token::ScopeMarker,
            ]
        );
    }

    #[test]
    fn test_identifier_terminators() {
        assert_eq!(
            lex("◊a b"),
            vec![Token::SigilOpen, Token::Identifier("a"), text(" b")]
        );
        assert_eq!(
            lex("◊a\nb"),
            vec![
                Token::SigilOpen,
                Token::Identifier("a"),
                Token::Newline,
                text("b")
            ]
        );
        assert_eq!(
            lex("◊a§"),
            vec![Token::SigilOpen, Token::Identifier("a"), Token::ScopeMarker]
        );
        assert_eq!(lex("◊"), vec![Token::SigilOpen, Token::Identifier("")]);
    }

    #[test]
    fn test_consecutive_line_breaks_collapse() {
        assert_eq!(lex("a\n\n\nb"), vec![text("a"), Token::Newline, text("b")]);
        assert_eq!(lex("a\r\n\r\nb"), vec![text("a"), Token::Newline, text("b")]);
        assert_eq!(lex("a\r\rb"), vec![text("a"), Token::Newline, text("b")]);
    }

    #[test]
    fn test_whitespace_between_breaks_does_not_collapse() {
        assert_eq!(
            lex("a\n \nb"),
            vec![text("a"), Token::Newline, text(" "), Token::Newline, text("b")]
        );
    }

    #[test]
    fn test_escaped_sigil_and_marker_are_text() {
        let tokens = lex("cost \\◊5 and \\§ here");
        assert_eq!(tokens, vec![text("cost ◊5 and § here")]);
        assert!(matches!(&tokens[0], Token::Text(Cow::Owned(_))));
    }

    #[test]
    fn test_escape_before_ordinary_char_is_literal() {
        assert_eq!(lex("a\\b"), vec![text("a\\b")]);
    }

    #[test]
    fn test_escaped_line_break() {
        assert_eq!(lex("a\\\nb"), vec![text("a\nb")]);
        // Only the carriage return is escaped; the line feed is live.
        assert_eq!(
            lex("a\\\r\nb"),
            vec![text("a\r"), Token::Newline, text("b")]
        );
    }

    #[test]
    fn test_escape_inside_identifier_is_not_lookbehind() {
        assert_eq!(
            lex("◊foo\\§x§"),
            vec![
                Token::SigilOpen,
                Token::Identifier("foo\\"),
                Token::ScopeMarker,
                text("x"),
                Token::ScopeMarker,
            ]
        );
    }

    #[test]
    fn test_lead_byte_false_positive() {
        // U+2014 shares its lead byte with the default sigil.
        assert_eq!(lex("a — b"), vec![text("a — b")]);
    }

    #[test]
    fn test_properties_relaxed_dialect() {
        let tokens = lex("◊img{src: 'a.png', size: [1, 2,], nested: {deep: true},}");
        assert_eq!(
            tokens[2],
            Token::Properties(props(json!({
                "src": "a.png",
                "size": [1, 2],
                "nested": {"deep": true},
            })))
        );
    }

    #[test]
    fn test_braces_inside_strings_do_not_count() {
        let tokens = lex("◊x{label: \"}\", other: '{'}tail");
        assert_eq!(
            tokens[2],
            Token::Properties(props(json!({"label": "}", "other": "{"})))
        );
        assert_eq!(tokens[3], text("tail"));
    }

    #[test]
    fn test_unbalanced_properties() {
        let err = Tokenizer::new("◊foo{a:1").tokenize().unwrap_err();
        assert_eq!(err, MalformedMarkup::UnbalancedProperties { offset: 6 });
    }

    #[test]
    fn test_invalid_properties() {
        let err = Tokenizer::new("◊foo{a:}").tokenize().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidProperties);
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = Syntax::new('@', '|');
        let tokens = Tokenizer::new("@b|x| \\@y")
            .with_syntax(syntax)
            .tokenize()
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::SigilOpen,
                Token::Identifier("b"),
                Token::ScopeMarker,
                text("x"),
                Token::ScopeMarker,
                text(" @y"),
            ]
        );
    }

    #[test]
    fn test_balanced_end() {
        assert_eq!(balanced_end("{}"), Some(2));
        assert_eq!(balanced_end("{a:{b:1}}rest"), Some(9));
        assert_eq!(balanced_end("{a:\"\\\"}\"}"), Some(9));
        assert_eq!(balanced_end("{a:{b:1}"), None);
        assert_eq!(balanced_end("{a:1, // don't }\n}x"), Some(18));
        assert_eq!(balanced_end("{/* } ' */a:1}"), Some(14));
        assert_eq!(balanced_end("{a:'//'}"), Some(8));
    }

    #[test]
    fn test_comments_in_properties() {
        let tokens = lex("◊x{a: 1, // don't\n b: 2 /* it's } */}§y§");
        assert_eq!(tokens[2], Token::Properties(props(json!({"a": 1, "b": 2}))));
        assert_eq!(tokens[3], Token::ScopeMarker);
    }
}
