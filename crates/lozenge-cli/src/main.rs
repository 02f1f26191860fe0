//! lzc - Parse, check, and reformat lozenge documents
//!
//! Usage:
//!   lzc [OPTIONS] [COMMAND] <FILE>
//!
//! Commands:
//!   parse     Parse and display the document tree (default)
//!   tokens    Display the token stream
//!   fmt       Print the canonical form of the document
//!   check     Verify that the document survives a print/parse round trip
//!   stats     Show document statistics

use std::env;
use std::fs;
use std::process;
use std::time::Instant;

use log::{debug, warn};
use lozenge_core::{Document, Node, Parser, Printer, Properties, Token, Tokenizer};
use serde::Serialize;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;

    let input = fs::read_to_string(&config.file)
        .map_err(|e| format!("failed to read '{}': {}", config.file, e))?;
    debug!("read {} bytes from {}", input.len(), config.file);

    let parser = Parser::new().with_max_depth(config.max_depth);

    match config.command {
        Command::Parse => cmd_parse(&parser, &input, &config),
        Command::Tokens => cmd_tokens(&parser, &input, &config),
        Command::Fmt => cmd_fmt(&parser, &input),
        Command::Check => cmd_check(&parser, &input, &config),
        Command::Stats => cmd_stats(&parser, &input),
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
    max_depth: usize,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Parse,
    Tokens,
    Fmt,
    Check,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Parse;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut max_depth = lozenge_core::parser::DEFAULT_MAX_DEPTH;
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("lzc {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "-d" | "--max-depth" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a value", arg))?;
                max_depth = value
                    .parse()
                    .map_err(|_| format!("invalid depth: {}", value))?;
            }
            "parse" => command = Command::Parse,
            "tokens" => command = Command::Tokens,
            "fmt" => command = Command::Fmt,
            "check" => command = Command::Check,
            "stats" => command = Command::Stats,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        verbose,
        max_depth,
    })
}

fn print_help() {
    eprintln!(
        r#"lzc - lozenge document parser and formatter

USAGE:
    lzc [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    parse       Parse and display the document tree (default)
    tokens      Display the token stream
    fmt         Print the canonical form of the document
    check       Verify that the document survives a print/parse round trip
    stats       Show document statistics

OPTIONS:
    -v, --verbose          Show the full tree
    -j, --json             Output in JSON format
    -d, --max-depth <N>    Maximum scope nesting (default {})
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT:
    RUST_LOG               Log filter, e.g. RUST_LOG=debug

EXAMPLES:
    lzc post.pjs             Summarize a document
    lzc -v post.pjs          Print the whole tree
    lzc -j post.pjs          Output the tree as JSON
    lzc fmt post.pjs         Reformat a document
    lzc check post.pjs       Check the round trip
"#,
        lozenge_core::parser::DEFAULT_MAX_DEPTH
    );
}

fn parse_timed<'a>(parser: &Parser, input: &'a str) -> Result<Document<'a>, String> {
    let started = Instant::now();
    let doc = parser.parse(input).map_err(|e| e.to_string())?;
    debug!(
        "parsed {} top-level nodes in {:?}",
        doc.children.len(),
        started.elapsed()
    );
    Ok(doc)
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(parser: &Parser, input: &str, config: &Config) -> Result<(), String> {
    let doc = parse_timed(parser, input)?;

    match config.format {
        OutputFormat::Json => print_json(&convert_document(&doc))?,
        OutputFormat::Text => {
            if config.verbose {
                print_tree(&doc.children, 0);
            } else {
                print_document_summary(&doc);
            }
        }
    }

    Ok(())
}

fn print_document_summary(doc: &Document) {
    println!("Nodes: {}", doc.children.len());
    for (i, node) in doc.children.iter().enumerate() {
        println!("  [{}] {}", i + 1, describe_node(node));
    }
}

fn print_tree(nodes: &[Node], indent: usize) {
    let prefix = "  ".repeat(indent);
    for node in nodes {
        println!("{}{}", prefix, describe_node(node));
        print_tree(node.children(), indent + 1);
    }
}

fn describe_node(node: &Node) -> String {
    match node {
        Node::Command(c) if c.properties.is_empty() => {
            format!("Command {} ({} children)", c.identifier, c.children.len())
        }
        Node::Command(c) => format!(
            "Command {} {} ({} children)",
            c.identifier,
            serde_json::Value::Object(c.properties.clone()),
            c.children.len()
        ),
        Node::Paragraph(p) => format!("Paragraph ({} children)", p.children.len()),
        Node::Text(t) => format!("Text {:?}", preview(&t.value, 60)),
        Node::Newline => "Newline".to_string(),
    }
}

fn preview(text: &str, limit: usize) -> String {
    let mut preview: String = text.chars().take(limit).collect();
    if text.chars().count() > limit {
        preview.push_str("...");
    }
    preview
}

// =============================================================================
// Tokens Command
// =============================================================================

fn cmd_tokens(parser: &Parser, input: &str, config: &Config) -> Result<(), String> {
    let tokens = Tokenizer::new(input)
        .with_syntax(parser.syntax())
        .tokenize()
        .map_err(|e| e.to_string())?;
    debug!("{} tokens", tokens.len());

    match config.format {
        OutputFormat::Json => {
            let tokens: Vec<JsonToken> = tokens.iter().map(convert_token).collect();
            print_json(&tokens)?;
        }
        OutputFormat::Text => {
            for (i, token) in tokens.iter().enumerate() {
                println!("{:>5}  {}", i, token);
            }
        }
    }
    Ok(())
}

// =============================================================================
// Fmt Command
// =============================================================================

fn cmd_fmt(parser: &Parser, input: &str) -> Result<(), String> {
    let doc = parse_timed(parser, input)?;
    let printed = Printer::new().with_syntax(parser.syntax()).print(&doc);
    print!("{}", printed);
    Ok(())
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(parser: &Parser, input: &str, config: &Config) -> Result<(), String> {
    let doc = parse_timed(parser, input)?;
    let report = CheckReport::new(parser, &doc);

    if let Some(error) = &report.reparse_error {
        warn!("canonical form of {} does not parse: {}", config.file, error);
    } else if !report.round_trip {
        warn!("round trip changed the tree of {}", config.file);
    }

    if matches!(config.format, OutputFormat::Json) {
        print_json(&report)?;
    } else if report.round_trip {
        println!("Valid: round trip preserves the tree");
    } else {
        eprintln!("Invalid: round trip changed the tree");
    }

    if report.round_trip {
        Ok(())
    } else {
        Err("round trip mismatch".to_string())
    }
}

/// Outcome of printing a parsed document and parsing it again.
#[derive(Debug, Serialize)]
struct CheckReport {
    round_trip: bool,
    canonical_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    reparse_error: Option<String>,
}

impl CheckReport {
    fn new(parser: &Parser, doc: &Document) -> Self {
        let printed = Printer::new().with_syntax(parser.syntax()).print(doc);
        let (round_trip, reparse_error) = match parser.parse(&printed) {
            Ok(reparsed) => (reparsed == *doc, None),
            Err(e) => (false, Some(e.to_string())),
        };
        Self {
            round_trip,
            canonical_bytes: printed.len(),
            reparse_error,
        }
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(parser: &Parser, input: &str) -> Result<(), String> {
    let doc = parse_timed(parser, input)?;
    let stats = DocumentStats::from_document(&doc, input);

    println!("Document Statistics");
    println!("-------------------");
    println!("Content:");
    println!("  Commands:       {}", stats.commands);
    println!("  Block commands: {}", stats.block_commands);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Text runs:      {}", stats.texts);
    println!("  Max depth:      {}", stats.max_depth);
    println!();
    println!("Identifiers:");
    for (identifier, count) in &stats.identifiers {
        println!("  {:<14}  {}", identifier, count);
    }
    println!();
    println!("Size:");
    println!("  Bytes:          {}", stats.bytes);
    println!("  Words (est.):   {}", stats.words);
    println!("  Lines:          {}", stats.lines);

    Ok(())
}

struct DocumentStats {
    commands: usize,
    block_commands: usize,
    paragraphs: usize,
    texts: usize,
    max_depth: usize,
    identifiers: Vec<(String, usize)>,
    bytes: usize,
    words: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_document(doc: &Document, input: &str) -> Self {
        let mut stats = Self {
            commands: 0,
            block_commands: 0,
            paragraphs: 0,
            texts: 0,
            max_depth: 0,
            identifiers: Vec::new(),
            bytes: input.len(),
            words: input.split_whitespace().count(),
            lines: input.lines().count(),
        };

        stats.count_nodes(&doc.children, 0);
        stats.identifiers.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        stats
    }

    fn count_nodes(&mut self, nodes: &[Node], depth: usize) {
        for node in nodes {
            match node {
                Node::Command(c) => {
                    self.commands += 1;
                    match self.identifiers.iter_mut().find(|(id, _)| *id == c.identifier) {
                        Some((_, count)) => *count += 1,
                        None => self.identifiers.push((c.identifier.to_string(), 1)),
                    }
                    if c.is_block() {
                        self.block_commands += 1;
                        self.max_depth = self.max_depth.max(depth + 1);
                        self.count_nodes(&c.children, depth + 1);
                    }
                }
                Node::Paragraph(p) => {
                    self.paragraphs += 1;
                    self.count_nodes(&p.children, depth);
                }
                Node::Text(_) => self.texts += 1,
                Node::Newline => {}
            }
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonNode<'a> {
    Command {
        identifier: &'a str,
        #[serde(skip_serializing_if = "Properties::is_empty")]
        properties: &'a Properties,
        children: Vec<JsonNode<'a>>,
    },
    Paragraph {
        children: Vec<JsonNode<'a>>,
    },
    Text {
        value: &'a str,
    },
    Newline,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    children: Vec<JsonNode<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonToken<'a> {
    Sigil,
    Scope,
    Newline,
    Identifier { value: &'a str },
    Text { value: &'a str },
    Properties { value: &'a Properties },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn convert_document<'a>(doc: &'a Document) -> JsonDocument<'a> {
    JsonDocument {
        children: doc.children.iter().map(convert_node).collect(),
    }
}

fn convert_node<'a>(node: &'a Node) -> JsonNode<'a> {
    match node {
        Node::Command(c) => JsonNode::Command {
            identifier: &c.identifier,
            properties: &c.properties,
            children: c.children.iter().map(convert_node).collect(),
        },
        Node::Paragraph(p) => JsonNode::Paragraph {
            children: p.children.iter().map(convert_node).collect(),
        },
        Node::Text(t) => JsonNode::Text { value: &t.value },
        Node::Newline => JsonNode::Newline,
    }
}

fn convert_token<'a>(token: &'a Token) -> JsonToken<'a> {
    match token {
        Token::SigilOpen => JsonToken::Sigil,
        Token::ScopeMarker => JsonToken::Scope,
        Token::Newline => JsonToken::Newline,
        Token::Identifier(value) => JsonToken::Identifier { value },
        Token::Text(value) => JsonToken::Text { value },
        Token::Properties(value) => JsonToken::Properties { value },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("lzc")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let config = parse_args(&args(&["post.pjs"])).unwrap();
        assert!(matches!(config.command, Command::Parse));
        assert!(matches!(config.format, OutputFormat::Text));
        assert_eq!(config.max_depth, lozenge_core::parser::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_parse_args_options() {
        let config = parse_args(&args(&["-j", "check", "--max-depth", "8", "post.pjs"])).unwrap();
        assert!(matches!(config.command, Command::Check));
        assert!(matches!(config.format, OutputFormat::Json));
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.file, "post.pjs");
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a", "b"])).is_err());
        assert!(parse_args(&args(&["--bogus", "a"])).is_err());
        assert!(parse_args(&args(&["-d", "many", "a"])).is_err());
    }

    #[test]
    fn test_stats_counts_nesting() {
        let input = "◊a§\nx ◊b§◊c§y§§§\n◊a";
        let doc = Parser::new().parse(input).unwrap();
        let stats = DocumentStats::from_document(&doc, input);
        assert_eq!(stats.commands, 4);
        assert_eq!(stats.block_commands, 3);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.identifiers[0], ("a".to_string(), 2));
    }

    #[test]
    fn test_check_report() {
        let parser = Parser::new();
        let doc = parser.parse("◊a§x\n◊b§§§").unwrap();
        let report = CheckReport::new(&parser, &doc);
        assert!(report.round_trip);
        assert_eq!(report.canonical_bytes, "◊a§x\n◊b§§§".len());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"round_trip": true, "canonical_bytes": report.canonical_bytes})
        );
    }

    #[test]
    fn test_json_tree_shape() {
        let doc = Parser::new().parse("◊x{k: 1}§t§").unwrap();
        let json = serde_json::to_value(convert_document(&doc)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "children": [{
                    "type": "command",
                    "identifier": "x",
                    "properties": {"k": 1},
                    "children": [{"type": "text", "value": "t"}],
                }]
            })
        );
    }
}
