//! # Lozenge Core
//!
//! A tokenizer, parser and printer for the lozenge command notation: plain
//! prose with embedded commands, inline or block-scoped, carrying optional
//! structured properties.
//!
//! ```text
//! Intro text.
//!
//! ◊note{kind: "warning"}§
//! Commands can hold ◊em§nested§ commands and paragraphs.§
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use lozenge_core::{Node, Parser};
//!
//! let doc = Parser::new().parse("◊foo{a: 1}§hello§").unwrap();
//!
//! let Node::Command(command) = &doc.children[0] else { panic!() };
//! assert_eq!(command.identifier, "foo");
//! assert_eq!(command.children, vec![Node::text("hello")]);
//! ```
//!
//! ## Round Trip
//!
//! Printing a parsed tree and parsing the output yields an equal tree:
//!
//! ```rust
//! use lozenge_core::{parse, render};
//!
//! let doc = parse("a\n\n\nb ◊x{k: [1, 2,]} \\◊ literal").unwrap();
//! assert_eq!(parse(&render(&doc)).unwrap(), doc);
//! ```
//!
//! ## Pipeline
//!
//! - [`lexer::Tokenizer`] scans text into [`Token`]s
//! - [`Parser`] builds a [`Document`] from tokens
//! - [`Printer`] renders a [`Document`] back to notation text
//! - [`expand()`] renders a [`Document`] through host [`Components`]

pub mod ast;
pub mod error;
pub mod expand;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod syntax;
pub mod token;

pub use ast::{Command, Document, Node, Paragraph, Properties, Text};
pub use error::{ErrorKind, MalformedMarkup, Result};
pub use expand::{expand, Component, Components};
pub use lexer::Tokenizer;
pub use parser::Parser;
pub use printer::Printer;
pub use syntax::Syntax;
pub use token::Token;

/// Tokenize a document with the default syntax.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>> {
    Tokenizer::new(input).tokenize()
}

/// Parse a document with the default syntax and depth limit.
pub fn parse(input: &str) -> Result<Document<'_>> {
    Parser::new().parse(input)
}

/// Print a document with the default syntax.
pub fn render(doc: &Document<'_>) -> String {
    Printer::new().print(doc)
}
