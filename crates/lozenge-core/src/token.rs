//! Lexical units produced by the tokenizer.

use std::fmt;

use crate::ast::{CowStr, Properties};

/// A single token. Tokens are emitted in source order and carry no position.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// The sigil that starts a command.
    SigilOpen,
    /// A scope marker, opening or closing a block scope.
    ScopeMarker,
    /// One paragraph boundary (consecutive line breaks collapse into one).
    Newline,
    /// The command name following a sigil.
    Identifier(&'a str),
    /// A run of literal text, escapes already removed.
    Text(CowStr<'a>),
    /// The structured-data literal attached to a command.
    Properties(Properties),
}

impl<'a> Token<'a> {
    /// Short name of the token variant, used in dumps and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Token::SigilOpen => "sigil",
            Token::ScopeMarker => "scope",
            Token::Newline => "newline",
            Token::Identifier(_) => "identifier",
            Token::Text(_) => "text",
            Token::Properties(_) => "properties",
        }
    }

    #[inline]
    pub fn is_newline(&self) -> bool {
        matches!(self, Token::Newline)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(value) => write!(f, "identifier({})", value),
            Token::Text(value) => write!(f, "text({:?})", value),
            Token::Properties(map) => write!(f, "properties({})", map.len()),
            other => f.write_str(other.name()),
        }
    }
}
