use super::token::{Token, TokenKind};
use super::tree_builder::TreeBuilder;
use crate::ast::*;
use crate::error::{ErrorKind, ParseError, WarningKind};

impl TreeBuilder {
    /// `mixin name(args)`: a definition when a body follows, otherwise an
    /// old-style call
    pub(super) fn parse_mixin(&mut self) -> Result<Node, ParseError> {
        let (line, name, args) = match self.expect(TokenKind::Mixin)? {
            Token::Mixin { line, val, args } => (line, val, args),
            other => return Err(self.mismatched(TokenKind::Mixin, &other)),
        };

        if self.cursor.peek().kind() == TokenKind::Indent {
            self.mixin_depth += 1;
            let block = self.block();
            self.mixin_depth -= 1;

            return Ok(Node::Mixin(Mixin {
                line,
                filename: self.filename.clone(),
                name,
                args,
                block: Some(block?),
                call: false,
                attrs: Vec::new(),
                attribute_blocks: Vec::new(),
            }));
        }

        self.warn(
            WarningKind::DeprecatedMixinCall,
            format!("Deprecated method of calling mixins, use `+{}` instead", name),
            line,
        );
        Ok(Node::Mixin(Mixin {
            line,
            filename: self.filename.clone(),
            name,
            args,
            block: None,
            call: true,
            attrs: Vec::new(),
            attribute_blocks: Vec::new(),
        }))
    }

    /// `+name(args)` with the same attributes and body a tag accepts
    pub(super) fn parse_call(&mut self) -> Result<Node, ParseError> {
        let (line, name, args) = match self.expect(TokenKind::Call)? {
            Token::Call { line, val, args } => (line, val, args),
            other => return Err(self.mismatched(TokenKind::Call, &other)),
        };

        let mut parts = self.parse_tag_parts(line, false)?;
        if let Some(code) = parts.code.take() {
            parts.block.push(Node::Code(code));
        }
        let block = if parts.block.is_empty() { None } else { Some(parts.block) };

        Ok(Node::Mixin(Mixin {
            line,
            filename: self.filename.clone(),
            name,
            args,
            block,
            call: true,
            attrs: parts.attrs,
            attribute_blocks: parts.attribute_blocks,
        }))
    }

    /// Bare `block` inside a mixin body, where the caller's content goes
    pub(super) fn parse_mixin_block(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::MixinBlock)?;
        if self.mixin_depth == 0 {
            return Err(self
                .error(
                    ErrorKind::AnonymousBlockOutsideMixin,
                    "Anonymous blocks are not allowed unless they are part of a mixin.",
                    token.line(),
                )
                .with_help("Name the block (`block content`) or move it into a `mixin` body"));
        }
        Ok(Node::MixinBlock(MixinBlock {
            line: token.line(),
            filename: self.filename.clone(),
        }))
    }
}
