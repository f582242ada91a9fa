use super::token::{Token, TokenKind};
use super::tree_builder::TreeBuilder;
use crate::ast::*;
use crate::error::ParseError;

impl TreeBuilder {
    pub(super) fn parse_extends(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::Extends)?;
        Ok(Node::Extends(Extends {
            line: token.line(),
            filename: self.filename.clone(),
            path: token.into_val().trim().to_string(),
        }))
    }

    /// `include[:filter] path`, optionally with a body for the included file's `yield`
    pub(super) fn parse_include(&mut self) -> Result<Node, ParseError> {
        let (line, path, filter, attrs) = match self.expect(TokenKind::Include)? {
            Token::Include { line, val, filter, attrs } => (line, val, filter, attrs),
            other => return Err(self.mismatched(TokenKind::Include, &other)),
        };

        let block = if self.cursor.peek().kind() == TokenKind::Indent {
            self.block()?
        } else {
            Block::new(line, self.filename.clone())
        };

        Ok(Node::Include(Include {
            line,
            filename: self.filename.clone(),
            path: path.trim().to_string(),
            filter,
            attrs,
            block,
        }))
    }

    /// `block name`, `append name` or `prepend name`
    pub(super) fn parse_named_block(&mut self) -> Result<Node, ParseError> {
        let (line, name, mode) = match self.expect(TokenKind::Block)? {
            Token::Block { line, val, mode } => (line, val, mode),
            other => return Err(self.mismatched(TokenKind::Block, &other)),
        };

        let nodes = if self.cursor.peek().kind() == TokenKind::Indent {
            self.block()?.nodes
        } else {
            Vec::new()
        };

        Ok(Node::NamedBlock(NamedBlock {
            line,
            filename: self.filename.clone(),
            name: name.trim().to_string(),
            mode,
            nodes,
        }))
    }
}
