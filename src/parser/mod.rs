pub mod token;
mod control;
mod cursor;
mod inheritance;
mod mixins;
mod tags;
mod text;
mod tree_builder;

pub use token::{Token, TokenKind, tokens_from_json};
use tree_builder::TreeBuilder;

use crate::ast::{Block, block_node};
use crate::error::{ParseError, Warning};
use serde::Serialize;

/// Parser trait - converts a token stream to an AST
pub trait Parser {
    fn parse(&self, tokens: Vec<Token>) -> Result<Parsed, ParseError>;
}

/// Root block of a successful parse plus the warnings raised along the way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parsed {
    #[serde(rename = "ast", serialize_with = "block_node::serialize")]
    pub root: Block,
    pub warnings: Vec<Warning>,
}

/// Jade token-stream parser
pub struct JadeParser {
    // Configuration only, no state
    filename: Option<String>,
}

impl JadeParser {
    pub fn new() -> Self {
        Self { filename: None }
    }

    /// Stamp every node with `filename`
    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }
}

impl Default for JadeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for JadeParser {
    fn parse(&self, tokens: Vec<Token>) -> Result<Parsed, ParseError> {
        tracing::debug!(tokens = tokens.len(), filename = ?self.filename, "parsing token stream");

        let mut builder = TreeBuilder::new(tokens, self.filename.clone());
        let root = builder.build()?;

        Ok(Parsed {
            root,
            warnings: builder.into_warnings(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn test_parser_is_reusable() {
        let parser = JadeParser::new().with_filename(Some("index.jade".to_string()));
        let first = parser.parse(vec![Token::tag("p", 1)]).unwrap();
        let second = parser.parse(vec![Token::tag("p", 1)]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.root.filename.as_deref(), Some("index.jade"));
        assert!(matches!(&first.root.nodes[0], Node::Tag(tag) if tag.filename.as_deref() == Some("index.jade")));
    }

    #[test]
    fn test_parsed_serializes_root_as_block() {
        let parsed = JadeParser::new().parse(Vec::new()).unwrap();
        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["ast"]["type"], "Block");
        assert_eq!(value["warnings"], serde_json::json!([]));
    }
}
