//! The configurable characters of the notation.
//!
//! A document is written with three special characters: the sigil that
//! opens a command, the scope marker that opens and closes a command's
//! block of children, and the escape character that turns either of them
//! (or a line break) back into literal text.

/// Default command sigil.
pub const DEFAULT_SIGIL: char = '◊';
/// Default scope marker.
pub const DEFAULT_SCOPE_MARKER: char = '§';
/// Default escape character.
pub const DEFAULT_ESCAPE: char = '\\';

/// Special characters recognized by the tokenizer and emitted by the printer.
///
/// # Example
///
/// ```rust
/// use lozenge_core::Syntax;
///
/// let syntax = Syntax::new('@', '|');
/// assert_eq!(syntax.sigil, '@');
/// assert_eq!(syntax.escape, '\\');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syntax {
    /// Opens a command.
    pub sigil: char,
    /// Opens and closes a command's block scope.
    pub scope_marker: char,
    /// Makes the following special character literal.
    pub escape: char,
}

impl Syntax {
    /// Create a syntax with the given sigil and scope marker and the default escape.
    pub const fn new(sigil: char, scope_marker: char) -> Self {
        Self {
            sigil,
            scope_marker,
            escape: DEFAULT_ESCAPE,
        }
    }

    /// Replace the escape character.
    pub const fn with_escape(mut self, escape: char) -> Self {
        self.escape = escape;
        self
    }

    /// Whether `c` is special in text position and must be escaped to stay literal.
    #[inline]
    pub fn is_special(&self, c: char) -> bool {
        c == self.sigil || c == self.scope_marker || c == '\n' || c == '\r'
    }

    /// Whether `c` ends an identifier.
    #[inline]
    pub fn ends_identifier(&self, c: char) -> bool {
        matches!(c, '{' | ' ' | '\n' | '\r') || c == self.scope_marker
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::new(DEFAULT_SIGIL, DEFAULT_SCOPE_MARKER)
    }
}
