use super::cursor::TokenCursor;
use super::token::{Token, TokenKind};
use crate::ast::*;
use crate::error::{ErrorKind, ParseError, Warning, WarningKind};

/// Builds an AST from a token stream.
///
/// One builder handles one stream; the grammar routines live in sibling
/// modules as further `impl TreeBuilder` blocks.
pub struct TreeBuilder {
    pub(super) cursor: TokenCursor,
    pub(super) filename: Option<String>,
    /// Depth of mixin definitions currently being parsed
    pub(super) mixin_depth: usize,
    /// Stream position of the `else` token linked to the last `if`
    pub(super) else_link: Option<usize>,
    pub(super) warnings: Vec<Warning>,
}

impl TreeBuilder {
    pub fn new(tokens: Vec<Token>, filename: Option<String>) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            filename,
            mixin_depth: 0,
            else_link: None,
            warnings: Vec::new(),
        }
    }

    /// Parse the whole stream into the root block
    pub fn build(&mut self) -> Result<Block, ParseError> {
        let mut root = Block::new(0, self.filename.clone());

        loop {
            match self.cursor.peek().kind() {
                TokenKind::Eos => break,
                TokenKind::Newline => {
                    self.cursor.advance();
                }
                TokenKind::TextHtml => {
                    let nodes = self.parse_text_html()?;
                    root.nodes.extend(nodes);
                }
                _ => {
                    let node = self.parse_expr()?;
                    root.push(node);
                }
            }
        }

        Ok(root)
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    /// Indented block: `indent expr* outdent`
    pub(super) fn block(&mut self) -> Result<Block, ParseError> {
        let indent = self.expect(TokenKind::Indent)?;
        let mut block = Block::new(indent.line(), self.filename.clone());

        loop {
            match self.cursor.peek().kind() {
                TokenKind::Outdent | TokenKind::Eos => break,
                TokenKind::Newline => {
                    self.cursor.advance();
                }
                TokenKind::TextHtml => {
                    let nodes = self.parse_text_html()?;
                    block.nodes.extend(nodes);
                }
                _ => {
                    let node = self.parse_expr()?;
                    block.push(node);
                }
            }
        }

        self.expect(TokenKind::Outdent)?;
        Ok(block)
    }

    /// `: expr` on the same line, or an indented block
    pub(super) fn parse_block_expansion(&mut self) -> Result<Block, ParseError> {
        if self.accept(TokenKind::Colon).is_some() {
            let line = self.cursor.line();
            let expr = self.parse_expr()?;
            Ok(Block::with_nodes(line, self.filename.clone(), vec![expr]))
        } else {
            self.block()
        }
    }

    /// Dispatch on the next token to exactly one grammar routine
    pub(super) fn parse_expr(&mut self) -> Result<Node, ParseError> {
        match self.cursor.peek().kind() {
            TokenKind::Tag | TokenKind::Interpolation => self.parse_tag(),
            TokenKind::Mixin => self.parse_mixin(),
            TokenKind::Call => self.parse_call(),
            TokenKind::MixinBlock => self.parse_mixin_block(),
            TokenKind::Block => self.parse_named_block(),
            TokenKind::Case => self.parse_case(),
            TokenKind::Each => self.parse_each(),
            TokenKind::Code => self.parse_code().map(Node::Code),
            TokenKind::Extends => self.parse_extends(),
            TokenKind::Include => self.parse_include(),
            TokenKind::Doctype => self.parse_doctype(),
            TokenKind::Filter => self.parse_filter(),
            TokenKind::Comment => self.parse_comment(),
            TokenKind::Dot => self.parse_dot(),
            TokenKind::Text | TokenKind::StartJadeInterpolation => {
                let line = self.cursor.peek().line();
                let nodes = self.parse_text(true)?;
                Ok(self.collapse(line, nodes))
            }
            TokenKind::TextHtml => {
                let line = self.cursor.peek().line();
                let nodes = self.parse_text_html()?;
                Ok(Node::Block(Block::with_nodes(line, self.filename.clone(), nodes)))
            }
            TokenKind::Yield => {
                self.cursor.advance();
                let mut block = Block::new(self.cursor.line(), self.filename.clone());
                block.is_yield = true;
                Ok(Node::Block(block))
            }
            TokenKind::Id | TokenKind::Class => {
                // `.item` / `#main` alone is an implicit div
                let line = self.cursor.peek().line();
                self.cursor.defer(Token::tag("div", line));
                self.parse_tag()
            }
            _ => {
                let token = self.cursor.peek();
                Err(self
                    .error(
                        ErrorKind::UnexpectedToken,
                        format!("unexpected token \"{}\"", token.kind()),
                        token.line(),
                    )
                    .with_found(token.kind()))
            }
        }
    }

    /// A single node stays as is; several are wrapped in a block
    pub(super) fn collapse(&self, line: usize, mut nodes: Vec<Node>) -> Node {
        if nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return node;
            }
        }
        Node::Block(Block::with_nodes(line, self.filename.clone(), nodes))
    }

    /// Consume the next token, failing unless it has the given kind
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let found = self.cursor.peek();
        if found.kind() == kind {
            Ok(self.cursor.advance())
        } else {
            Err(self
                .error(
                    ErrorKind::UnexpectedToken,
                    format!("expected \"{}\", but got \"{}\"", kind, found.kind()),
                    found.line(),
                )
                .with_expected(kind)
                .with_found(found.kind()))
        }
    }

    /// Consume the next token only if it has the given kind
    pub(super) fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.cursor.peek().kind() == kind {
            Some(self.cursor.advance())
        } else {
            None
        }
    }

    /// Error for a token that `expect` already vetted but whose payload did not match
    pub(super) fn mismatched(&self, expected: TokenKind, found: &Token) -> ParseError {
        self.error(
            ErrorKind::UnexpectedToken,
            format!("expected \"{}\", but got \"{}\"", expected, found.kind()),
            found.line(),
        )
        .with_expected(expected)
        .with_found(found.kind())
    }

    pub(super) fn error(&self, kind: ErrorKind, message: impl Into<String>, line: usize) -> ParseError {
        ParseError::new(kind, message, line).with_filename(self.filename.as_deref())
    }

    pub(super) fn warn(&mut self, kind: WarningKind, message: String, line: usize) {
        tracing::warn!(filename = ?self.filename, line, "{}", message);
        self.warnings.push(Warning {
            kind,
            message,
            line,
            filename: self.filename.clone(),
        });
    }

    pub(super) fn text_node(&self, line: usize, val: impl Into<String>, is_html: bool) -> Node {
        Node::Text(Text {
            line,
            filename: self.filename.clone(),
            val: val.into(),
            is_html,
        })
    }
}
