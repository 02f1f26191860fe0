//! Document tree types produced by the parser.
//!
//! The tree is:
//!
//! - **Borrowing**: text and identifiers use `Cow<'a, str>`, borrowing from the
//!   input unless an escape forced a copy
//! - **Position-free**: nodes carry no source spans; equality is structural
//! - **Owned**: every node owns its children, so trees can be edited and re-printed

use std::borrow::Cow;

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = Cow<'a, str>;

/// Structured configuration attached to a command.
///
/// A properties literal always opens with `{`, so it is always a mapping.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// The root of a parsed document. Exactly one per parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document<'a> {
    /// Top-level nodes in source order.
    pub children: Vec<Node<'a>>,
}

/// A node below the root.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    /// A `◊identifier{...}§...§` occurrence.
    Command(Command<'a>),
    /// Implicit grouping between blank-line boundaries.
    Paragraph(Paragraph<'a>),
    /// A run of literal characters.
    Text(Text<'a>),
    /// A boundary at the very start of the document, before anything to group.
    Newline,
}

/// A command, inline or block-scoped.
#[derive(Debug, Clone, PartialEq)]
pub struct Command<'a> {
    /// The name written after the sigil.
    pub identifier: CowStr<'a>,
    /// Properties literal; empty when none was written.
    pub properties: Properties,
    /// Scoped children; empty unless the command opened a scope.
    pub children: Vec<Node<'a>>,
}

/// An implicit paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph<'a> {
    pub children: Vec<Node<'a>>,
}

/// Literal text.
#[derive(Debug, Clone, PartialEq)]
pub struct Text<'a> {
    pub value: CowStr<'a>,
}

impl<'a> Document<'a> {
    pub fn new(children: Vec<Node<'a>>) -> Self {
        Self { children }
    }

    /// Detach the tree from the input it borrows from.
    pub fn into_owned(self) -> Document<'static> {
        Document {
            children: self.children.into_iter().map(Node::into_owned).collect(),
        }
    }

    /// Depth-first, pre-order iteration over every node below the root.
    pub fn descendants(&self) -> Descendants<'_, 'a> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// All commands in the document, in source order, at any depth.
    pub fn commands(&self) -> impl Iterator<Item = &Command<'a>> {
        self.descendants().filter_map(Node::as_command)
    }
}

impl<'a> Node<'a> {
    /// Build a text leaf.
    pub fn text(value: impl Into<CowStr<'a>>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    /// Build a paragraph.
    pub fn paragraph(children: Vec<Node<'a>>) -> Self {
        Node::Paragraph(Paragraph { children })
    }

    /// Build a command.
    pub fn command(
        identifier: impl Into<CowStr<'a>>,
        properties: Properties,
        children: Vec<Node<'a>>,
    ) -> Self {
        Node::Command(Command {
            identifier: identifier.into(),
            properties,
            children,
        })
    }

    /// Child nodes; leaves have none.
    pub fn children(&self) -> &[Node<'a>] {
        match self {
            Node::Command(c) => &c.children,
            Node::Paragraph(p) => &p.children,
            Node::Text(_) | Node::Newline => &[],
        }
    }

    pub fn as_command(&self) -> Option<&Command<'a>> {
        match self {
            Node::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) => Some(&t.value),
            _ => None,
        }
    }

    pub fn into_owned(self) -> Node<'static> {
        match self {
            Node::Command(c) => Node::Command(Command {
                identifier: Cow::Owned(c.identifier.into_owned()),
                properties: c.properties,
                children: c.children.into_iter().map(Node::into_owned).collect(),
            }),
            Node::Paragraph(p) => Node::Paragraph(Paragraph {
                children: p.children.into_iter().map(Node::into_owned).collect(),
            }),
            Node::Text(t) => Node::Text(Text {
                value: Cow::Owned(t.value.into_owned()),
            }),
            Node::Newline => Node::Newline,
        }
    }
}

impl<'a> Command<'a> {
    /// Whether the command opened a scope with content.
    #[inline]
    pub fn is_block(&self) -> bool {
        !self.children.is_empty()
    }

    /// Look up one property.
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.get(key)
    }
}

/// Iterator returned by [`Document::descendants`].
pub struct Descendants<'n, 'a> {
    stack: Vec<&'n Node<'a>>,
}

impl<'n, 'a> Iterator for Descendants<'n, 'a> {
    type Item = &'n Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
