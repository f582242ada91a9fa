use super::token::{Token, TokenKind};
use super::tree_builder::TreeBuilder;
use crate::ast::*;
use crate::error::{ErrorKind, ParseError, WarningKind};
use crate::html;

/// Everything that can follow a tag name, shared by tags and mixin calls
pub(super) struct TagParts {
    pub attrs: Vec<Attribute>,
    pub attribute_blocks: Vec<String>,
    pub self_closing: bool,
    pub text_only: bool,
    pub block: Block,
    /// Inline code (`p= expr`); callers decide where it ends up
    pub code: Option<Code>,
}

impl TreeBuilder {
    /// `tag` or `interpolation` token and everything attached to it
    pub(super) fn parse_tag(&mut self) -> Result<Node, ParseError> {
        let (line, name, self_closing, buffer) = match self.cursor.advance() {
            Token::Tag { line, val, self_closing } => (line, val, self_closing, false),
            Token::Interpolation { line, val } => (line, val, false, true),
            other => return Err(self.mismatched(TokenKind::Tag, &other)),
        };

        let parts = self.parse_tag_parts(line, self_closing)?;
        let is_inline = html::is_inline_element(&name);

        Ok(Node::Tag(Tag {
            line,
            filename: self.filename.clone(),
            name,
            self_closing: parts.self_closing,
            attrs: parts.attrs,
            attribute_blocks: parts.attribute_blocks,
            block: parts.block,
            code: parts.code.map(|code| Box::new(Node::Code(code))),
            is_inline,
            buffer,
            text_only: parts.text_only,
        }))
    }

    /// `(id | class | attrs | &attributes)* dot? (text | code | ':' expr)? newline* block?`
    pub(super) fn parse_tag_parts(&mut self, line: usize, self_closing: bool) -> Result<TagParts, ParseError> {
        let mut parts = TagParts {
            attrs: Vec::new(),
            attribute_blocks: Vec::new(),
            self_closing,
            text_only: false,
            block: Block::new(line, self.filename.clone()),
            code: None,
        };
        let mut seen_attrs = false;

        loop {
            match self.cursor.peek().kind() {
                TokenKind::Id | TokenKind::Class | TokenKind::Attrs | TokenKind::AndAttributes => {}
                _ => break,
            }
            match self.cursor.advance() {
                Token::Id { line, val } => {
                    let attr = shorthand_attribute("id", &val);
                    self.add_attribute(&mut parts.attrs, attr, line)?;
                }
                Token::Class { line, val } => {
                    let attr = shorthand_attribute("class", &val);
                    self.add_attribute(&mut parts.attrs, attr, line)?;
                }
                Token::Attrs { line, attrs, self_closing } => {
                    if seen_attrs {
                        self.warn(
                            WarningKind::MultipleAttributeGroups,
                            "You should not have jade tags with multiple attributes.".to_string(),
                            line,
                        );
                    }
                    seen_attrs = true;
                    if self_closing {
                        parts.self_closing = true;
                    }
                    for attr in attrs {
                        self.add_attribute(&mut parts.attrs, attr, line)?;
                    }
                }
                Token::AndAttributes { val, .. } => parts.attribute_blocks.push(val),
                other => return Err(self.mismatched(TokenKind::Attrs, &other)),
            }
        }

        if self.accept(TokenKind::Dot).is_some() {
            parts.text_only = true;
        }

        match self.cursor.peek().kind() {
            TokenKind::Text | TokenKind::StartJadeInterpolation => {
                let text_line = self.cursor.peek().line();
                let nodes = self.parse_text(false)?;
                let node = self.collapse(text_line, nodes);
                parts.block.push(node);
            }
            TokenKind::Code => {
                parts.code = Some(self.parse_code()?);
            }
            TokenKind::Colon => {
                parts.block = self.parse_block_expansion()?;
            }
            TokenKind::Newline
            | TokenKind::Indent
            | TokenKind::Outdent
            | TokenKind::Eos
            | TokenKind::StartPipelessText
            | TokenKind::EndJadeInterpolation => {}
            other => {
                let found_line = self.cursor.peek().line();
                return Err(self
                    .error(
                        ErrorKind::UnexpectedToken,
                        format!(
                            "Unexpected token \"{}\" expected \"text\", \"code\", \":\", \"newline\" or \"eos\"",
                            other
                        ),
                        found_line,
                    )
                    .with_found(other));
            }
        }

        while self.accept(TokenKind::Newline).is_some() {}

        if parts.text_only {
            parts.block = match self.parse_text_block()? {
                Some(block) => block,
                None => Block::new(line, self.filename.clone()),
            };
        } else if self.cursor.peek().kind() == TokenKind::Indent {
            let block = self.block()?;
            parts.block.nodes.extend(block.nodes);
        }

        Ok(parts)
    }

    /// Append an attribute; names are unique except `class`
    fn add_attribute(&self, attrs: &mut Vec<Attribute>, attr: Attribute, line: usize) -> Result<(), ParseError> {
        if attr.name != "class" && attrs.iter().any(|existing| existing.name == attr.name) {
            let mut err = self.error(
                ErrorKind::DuplicateAttribute,
                format!("Duplicate attribute \"{}\" is not allowed.", attr.name),
                line,
            );
            if attr.name == "id" {
                err = err.with_help("An element can only have one id; drop either the `#id` shorthand or the id attribute");
            }
            return Err(err);
        }
        attrs.push(attr);
        Ok(())
    }
}

/// `#main` / `.item` as a quoted attribute expression
fn shorthand_attribute(name: &str, val: &str) -> Attribute {
    Attribute {
        name: name.to_string(),
        val: AttrValue::Expr(format!("'{}'", val)),
        escaped: false,
    }
}
