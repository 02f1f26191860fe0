use thiserror::Error;

/// Error categories, for callers that only care about the class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A `{` was never matched before end of input
    UnbalancedProperties,
    /// A balanced properties literal could not be read as structured data
    InvalidProperties,
    /// A scope was left open, or closed without being opened
    UnbalancedScope,
    /// Scopes nested deeper than the parser allows
    DepthLimitExceeded,
}

/// The document is not well-formed markup.
///
/// Every variant is fatal: the parse that produced it returns no tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMarkup {
    /// A properties literal opened at byte `offset` is never closed.
    #[error("unbalanced properties: `{{` at byte {offset} is never closed")]
    UnbalancedProperties { offset: usize },

    /// The properties literal at byte `offset` is balanced but not valid structured data.
    #[error("invalid properties at byte {offset}: {message}")]
    InvalidProperties { offset: usize, message: String },

    /// `open` scopes were still open at end of input. Zero means a closing
    /// marker appeared with no scope open.
    #[error("{}", describe_unbalanced_scope(.open))]
    UnbalancedScope { open: usize },

    /// Command scopes nested more than `max` deep.
    #[error("scope nesting exceeds the maximum depth of {max}")]
    DepthLimitExceeded { max: usize },
}

fn describe_unbalanced_scope(open: &usize) -> String {
    match *open {
        0 => "unbalanced scope: closing marker without an open scope".to_string(),
        1 => "unbalanced scope: 1 scope is never closed".to_string(),
        n => format!("unbalanced scope: {} scopes are never closed", n),
    }
}

impl MalformedMarkup {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MalformedMarkup::UnbalancedProperties { .. } => ErrorKind::UnbalancedProperties,
            MalformedMarkup::InvalidProperties { .. } => ErrorKind::InvalidProperties,
            MalformedMarkup::UnbalancedScope { .. } => ErrorKind::UnbalancedScope,
            MalformedMarkup::DepthLimitExceeded { .. } => ErrorKind::DepthLimitExceeded,
        }
    }

    /// Byte offset in the source, when the tokenizer could attribute one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            MalformedMarkup::UnbalancedProperties { offset }
            | MalformedMarkup::InvalidProperties { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MalformedMarkup>;
