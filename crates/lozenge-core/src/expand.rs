//! Expansion of commands through host-supplied components.
//!
//! The host registers one [`Component`] per command identifier. Expansion
//! walks the tree, renders each command's children first, and hands the
//! result to the component registered for that identifier. Paragraphs
//! become `<p>` elements and text is HTML-escaped.
//!
//! Identifiers are not validated: a command with no registered component
//! falls back to [`Components::with_fallback`], or else to its rendered
//! children.
//!
//! ```rust
//! use lozenge_core::{expand, parse, Command, Components};
//!
//! let mut components = Components::new();
//! components.register("em", |_: &Command<'_>, children: &str| format!("<em>{children}</em>"));
//!
//! let doc = parse("so ◊em§very§ nice").unwrap();
//! assert_eq!(expand(&doc, &components), "so <em>very</em> nice");
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::ast::{Command, Document, Node};

/// Renders one command, given its already expanded children.
pub trait Component {
    fn render(&self, command: &Command<'_>, children: &str) -> String;
}

impl<F> Component for F
where
    F: Fn(&Command<'_>, &str) -> String,
{
    fn render(&self, command: &Command<'_>, children: &str) -> String {
        self(command, children)
    }
}

/// Identifier-to-component lookup.
#[derive(Default)]
pub struct Components {
    by_identifier: HashMap<String, Box<dyn Component>>,
    fallback: Option<Box<dyn Component>>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `component` for `identifier`, replacing any earlier one.
    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        component: impl Component + 'static,
    ) -> &mut Self {
        self.by_identifier
            .insert(identifier.into(), Box::new(component));
        self
    }

    /// Render commands with no registered component through `component`.
    pub fn with_fallback(mut self, component: impl Component + 'static) -> Self {
        self.fallback = Some(Box::new(component));
        self
    }

    pub fn get(&self, identifier: &str) -> Option<&dyn Component> {
        self.by_identifier.get(identifier).map(|c| c.as_ref())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }

    fn resolve(&self, identifier: &str) -> Option<&dyn Component> {
        self.get(identifier).or(self.fallback.as_deref())
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.by_identifier.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Components")
            .field("identifiers", &names)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Expand a document into output text.
pub fn expand(doc: &Document<'_>, components: &Components) -> String {
    let mut out = String::new();
    expand_nodes(&doc.children, components, &mut out);
    out
}

fn expand_nodes(nodes: &[Node<'_>], components: &Components, out: &mut String) {
    for node in nodes {
        match node {
            Node::Command(command) => {
                let mut children = String::new();
                expand_nodes(&command.children, components, &mut children);
                match components.resolve(&command.identifier) {
                    Some(component) => out.push_str(&component.render(command, &children)),
                    None => out.push_str(&children),
                }
            }
            Node::Paragraph(p) => {
                out.push_str("<p>");
                expand_nodes(&p.children, components, out);
                out.push_str("</p>");
            }
            Node::Text(t) => escape_html(&t.value, out),
            Node::Newline => out.push('\n'),
        }
    }
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
