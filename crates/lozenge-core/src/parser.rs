//! Token-stream parser for lozenge documents
//!
//! Builds the tree in an arena, tracking open scopes as an explicit stack of
//! node handles instead of recursing, then materializes the owned tree
//! bottom-up once the token stream is exhausted.

use std::borrow::Cow;
use std::iter::Peekable;

use crate::ast::{Command, CowStr, Document, Node, Paragraph, Properties, Text};
use crate::error::{MalformedMarkup, Result};
use crate::lexer::Tokenizer;
use crate::syntax::Syntax;
use crate::token::Token;

/// Default limit on nested command scopes.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser configuration. Each parse builds fresh state, so one `Parser`
/// can be reused across unrelated documents.
#[derive(Debug, Clone)]
pub struct Parser {
    syntax: Syntax,
    max_depth: usize,
}

impl Parser {
    /// Create a parser with the default syntax and depth limit.
    #[inline]
    pub fn new() -> Self {
        Self {
            syntax: Syntax::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Use different special characters.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Limit how deeply command scopes may nest.
    ///
    /// Exceeding the limit fails the parse with
    /// [`MalformedMarkup::DepthLimitExceeded`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Tokenize and parse a whole document.
    pub fn parse<'a>(&self, input: &'a str) -> Result<Document<'a>> {
        let tokens = Tokenizer::new(input).with_syntax(self.syntax).tokenize()?;
        self.parse_tokens(tokens)
    }

    /// Parse an already tokenized document.
    pub fn parse_tokens<'a>(&self, tokens: Vec<Token<'a>>) -> Result<Document<'a>> {
        TreeBuilder::new(self, tokens.len()).run(tokens)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

type TokenStream<'a> = Peekable<std::vec::IntoIter<Token<'a>>>;

enum Slot<'a> {
    Root,
    Command {
        identifier: CowStr<'a>,
        properties: Properties,
    },
    Paragraph,
    Text(CowStr<'a>),
    Newline,
}

struct ArenaNode<'a> {
    slot: Slot<'a>,
    children: Vec<NodeId>,
}

/// Per-parse state: the arena and the stack of open nodes.
struct TreeBuilder<'p, 'a> {
    config: &'p Parser,
    nodes: Vec<ArenaNode<'a>>,
    /// Open nodes; the root is always at the bottom.
    stack: Vec<NodeId>,
    /// Open command scopes.
    depth: usize,
}

impl<'p, 'a> TreeBuilder<'p, 'a> {
    fn new(config: &'p Parser, token_count: usize) -> Self {
        let mut nodes = Vec::with_capacity(token_count + 1);
        nodes.push(ArenaNode {
            slot: Slot::Root,
            children: Vec::new(),
        });
        Self {
            config,
            nodes,
            stack: vec![ROOT],
            depth: 0,
        }
    }

    fn run(mut self, tokens: Vec<Token<'a>>) -> Result<Document<'a>> {
        let mut tokens = tokens.into_iter().peekable();

        while let Some(token) = tokens.next() {
            match token {
                Token::ScopeMarker => self.close_scope()?,
                Token::SigilOpen => match tokens.next_if(|t| matches!(t, Token::Identifier(_))) {
                    Some(Token::Identifier(identifier)) => self.command(identifier, &mut tokens)?,
                    // No identifier follows: the sigil is just a character.
                    _ => self.append_text(Cow::Owned(self.config.syntax.sigil.to_string())),
                },
                Token::Newline => self.paragraph_boundary(),
                Token::Text(value) => self.append_text(value),
                Token::Identifier(value) => self.append_text(Cow::Borrowed(value)),
                Token::Properties(properties) => {
                    let literal = serde_json::Value::Object(properties).to_string();
                    self.append_text(Cow::Owned(literal));
                }
            }
        }

        if self.depth > 0 {
            return Err(MalformedMarkup::UnbalancedScope { open: self.depth });
        }
        Ok(self.into_document())
    }

    /// A command whose sigil and identifier were just consumed.
    fn command(&mut self, identifier: &'a str, tokens: &mut TokenStream<'a>) -> Result<()> {
        let properties = match tokens.next_if(|t| matches!(t, Token::Properties(_))) {
            Some(Token::Properties(properties)) => properties,
            _ => Properties::new(),
        };
        let id = self.append(Slot::Command {
            identifier: Cow::Borrowed(identifier),
            properties,
        });

        if tokens.next_if_eq(&Token::ScopeMarker).is_some() {
            self.open_scope(id)?;
            if tokens.next_if_eq(&Token::Newline).is_some() {
                self.open_paragraph();
            }
        }
        Ok(())
    }

    #[inline]
    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    #[inline]
    fn slot(&self, id: NodeId) -> &Slot<'a> {
        &self.nodes[id.0].slot
    }

    /// Append a new node to the current top of the stack.
    fn append(&mut self, slot: Slot<'a>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ArenaNode {
            slot,
            children: Vec::new(),
        });
        let parent = self.top();
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append text, merging with a text sibling immediately before it.
    fn append_text(&mut self, value: CowStr<'a>) {
        let parent = self.top();
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let Slot::Text(existing) = &mut self.nodes[last.0].slot {
                existing.to_mut().push_str(&value);
                return;
            }
        }
        self.append(Slot::Text(value));
    }

    fn open_scope(&mut self, command: NodeId) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(MalformedMarkup::DepthLimitExceeded {
                max: self.config.max_depth,
            });
        }
        self.depth += 1;
        self.stack.push(command);
        Ok(())
    }

    /// Close the open paragraph, if any, then the innermost command scope.
    fn close_scope(&mut self) -> Result<()> {
        self.close_paragraph();
        if !matches!(self.slot(self.top()), Slot::Command { .. }) {
            return Err(MalformedMarkup::UnbalancedScope { open: 0 });
        }
        self.stack.pop();
        self.depth -= 1;
        Ok(())
    }

    fn close_paragraph(&mut self) {
        if matches!(self.slot(self.top()), Slot::Paragraph) {
            self.stack.pop();
        }
    }

    fn open_paragraph(&mut self) {
        let id = self.append(Slot::Paragraph);
        self.stack.push(id);
    }

    fn paragraph_boundary(&mut self) {
        self.close_paragraph();
        let top = self.top();
        if top == ROOT && self.nodes[ROOT.0].children.is_empty() {
            self.append(Slot::Newline);
        } else {
            self.open_paragraph();
        }
    }

    /// Build the owned tree. Children always have larger ids than their
    /// parent, so walking the arena backwards finishes every child first.
    fn into_document(self) -> Document<'a> {
        let mut built: Vec<Option<Node<'a>>> = Vec::with_capacity(self.nodes.len());
        built.resize_with(self.nodes.len(), || None);
        let mut root_children = Vec::new();

        for (index, node) in self.nodes.into_iter().enumerate().rev() {
            let children: Vec<Node<'a>> = node
                .children
                .iter()
                .filter_map(|child| built[child.0].take())
                .collect();

            let node = match node.slot {
                Slot::Root => {
                    root_children = children;
                    continue;
                }
                Slot::Command {
                    identifier,
                    properties,
                } => Node::Command(Command {
                    identifier,
                    properties,
                    children,
                }),
                Slot::Paragraph => Node::Paragraph(Paragraph { children }),
                Slot::Text(value) => Node::Text(Text { value }),
                Slot::Newline => Node::Newline,
            };
            built[index] = Some(node);
        }

        Document::new(root_children)
    }
}
