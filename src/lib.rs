//! Parser for the Jade templating language.
//!
//! Turns the flat token stream produced by a Jade lexer into a tree of
//! [`ast::Node`]s. Reading template source, resolving `extends`/`include`
//! and generating output are left to the surrounding compiler.

pub mod analysis;
pub mod ast;
pub mod error;
mod html;
pub mod parser;

pub use analysis::Summary;
pub use ast::{Block, Node};
pub use error::{CompileError, ErrorKind, ParseError, Warning, WarningKind};
pub use parser::{JadeParser, Parsed, Parser, Token, TokenKind};

/// Configuration for parsing.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Recorded on every node and in diagnostics; never opened
    pub filename: Option<String>,
}

impl Options {
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
        }
    }
}

/// Parse a token stream into a normalized tree
pub fn parse(tokens: Vec<Token>, options: &Options) -> Result<Parsed, CompileError> {
    let parsed = JadeParser::new()
        .with_filename(options.filename.clone())
        .parse(tokens)?;
    let root = ast::normalize(parsed.root)?;

    Ok(Parsed {
        root,
        warnings: parsed.warnings,
    })
}

/// Parse a token stream given as a JSON array
pub fn parse_json(json: &str, options: &Options) -> Result<Parsed, CompileError> {
    let tokens = parser::tokens_from_json(json)?;
    parse(tokens, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_minimal() {
        let parsed = parse_json(
            r#"[{"type": "tag", "line": 1, "val": "p"}, {"type": "eos", "line": 1}]"#,
            &Options::with_filename("a.jade"),
        )
        .unwrap();
        assert_eq!(parsed.root.nodes.len(), 1);
        assert_eq!(parsed.root.nodes[0].filename(), Some("a.jade"));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_decode_error() {
        let err = parse_json(r#"[{"type": "no-such-token", "line": 1}]"#, &Options::default()).unwrap_err();
        assert!(matches!(err, CompileError::Decode(_)));
        assert!(err.render().starts_with("error: Invalid token stream"));
    }

    #[test]
    fn test_parse_error_passes_through() {
        let err = parse_json(r#"[{"type": "outdent", "line": 2}]"#, &Options::default()).unwrap_err();
        assert_eq!(err.as_parse().map(|e| e.kind), Some(ErrorKind::UnexpectedToken));
    }
}
