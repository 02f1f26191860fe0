//! Canonical re-serialization of a document tree.
//!
//! The output re-parses to a structurally equal tree. Whitespace inside
//! properties literals and key quoting are normalized, so the text itself
//! may differ from what was originally written.

use std::fmt;

use serde_json::Value;

use crate::ast::{Command, Document, Node, Properties};
use crate::syntax::Syntax;

/// Properties with more keys than this are printed over several lines.
pub const DEFAULT_PRETTY_THRESHOLD: usize = 3;

/// Serializer configuration.
#[derive(Debug, Clone)]
pub struct Printer {
    syntax: Syntax,
    pretty_threshold: usize,
}

impl Printer {
    #[inline]
    pub fn new() -> Self {
        Self {
            syntax: Syntax::default(),
            pretty_threshold: DEFAULT_PRETTY_THRESHOLD,
        }
    }

    /// Emit different special characters. Use the same syntax the document
    /// will be parsed with.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Property count above which the multi-line form is used.
    pub fn with_pretty_threshold(mut self, threshold: usize) -> Self {
        self.pretty_threshold = threshold;
        self
    }

    /// Render the whole document.
    ///
    /// Text ending in the escape character that is printed right before a
    /// sigil, scope marker or line break reads back as an escape, since the
    /// notation cannot escape the escape character itself. Parsed documents
    /// never contain such text.
    pub fn print(&self, doc: &Document<'_>) -> String {
        let mut out = String::new();
        self.nodes(&doc.children, Next::End, &mut out);
        out
    }

    /// Print a run of siblings; `tail` is whatever is printed after the last one.
    fn nodes<'n, 'a>(&self, nodes: &'n [Node<'a>], tail: Next<'n, 'a>, out: &mut String) {
        for (i, node) in nodes.iter().enumerate() {
            let next = nodes.get(i + 1).map_or(tail, Next::Node);
            match node {
                Node::Command(command) => self.command(command, next, out),
                Node::Paragraph(p) => {
                    out.push('\n');
                    self.nodes(&p.children, next, out);
                }
                Node::Text(t) => self.text(&t.value, out),
                Node::Newline => out.push('\n'),
            }
        }
    }

    fn command(&self, command: &Command<'_>, next: Next<'_, '_>, out: &mut String) {
        out.push(self.syntax.sigil);
        out.push_str(&command.identifier);

        if !command.properties.is_empty() {
            self.properties(&command.properties, out);
        }

        if command.is_block() {
            out.push(self.syntax.scope_marker);
            self.nodes(&command.children, Next::ScopeEnd, out);
            out.push(self.syntax.scope_marker);
        } else if needs_empty_scope(command, next) {
            // An empty scope ends the command without adding children.
            out.push(self.syntax.scope_marker);
            out.push(self.syntax.scope_marker);
        }
    }

    fn properties(&self, properties: &Properties, out: &mut String) {
        let literal = Value::Object(properties.clone());
        if properties.len() > self.pretty_threshold {
            out.push_str(&format!("{:#}", literal));
        } else {
            out.push_str(&literal.to_string());
        }
    }

    fn text(&self, value: &str, out: &mut String) {
        out.reserve(value.len());
        for c in value.chars() {
            if self.syntax.is_special(c) {
                out.push(self.syntax.escape);
            }
            out.push(c);
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

/// What the output continues with after a node.
#[derive(Clone, Copy)]
enum Next<'n, 'a> {
    Node(&'n Node<'a>),
    /// The closing marker of the enclosing command.
    ScopeEnd,
    /// End of the document.
    End,
}

/// Whether a command without children must print an empty scope so that
/// what follows is not read as part of it. A closing marker would open a
/// scope; anything but a paragraph or text starting with a space would
/// extend a bare identifier.
fn needs_empty_scope(command: &Command<'_>, next: Next<'_, '_>) -> bool {
    match next {
        Next::ScopeEnd => true,
        Next::End | Next::Node(Node::Paragraph(_)) | Next::Node(Node::Newline) => false,
        Next::Node(Node::Text(t)) => command.properties.is_empty() && !t.value.starts_with(' '),
        Next::Node(Node::Command(_)) => command.properties.is_empty(),
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer::new().print(self))
    }
}
