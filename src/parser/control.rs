use super::token::{Token, TokenKind};
use super::tree_builder::TreeBuilder;
use crate::ast::*;
use crate::error::{ErrorKind, ParseError};

impl TreeBuilder {
    /// `case expr` with an indented body of `when` / `default` branches
    pub(super) fn parse_case(&mut self) -> Result<Node, ParseError> {
        let case = self.expect(TokenKind::Case)?;
        let line = case.line();
        let indent = self.expect(TokenKind::Indent)?;
        let mut block = Block::new(indent.line(), self.filename.clone());

        loop {
            match self.cursor.peek().kind() {
                TokenKind::Outdent => break,
                TokenKind::Newline => {
                    self.cursor.advance();
                }
                TokenKind::When => {
                    let node = self.parse_when()?;
                    block.push(node);
                }
                TokenKind::Default => {
                    let node = self.parse_default()?;
                    block.push(node);
                }
                other => {
                    let found_line = self.cursor.peek().line();
                    return Err(self
                        .error(
                            ErrorKind::UnexpectedCaseToken,
                            format!(
                                "Unexpected token \"{}\", expected \"when\", \"default\" or \"newline\"",
                                other
                            ),
                            found_line,
                        )
                        .with_found(other));
                }
            }
        }
        self.expect(TokenKind::Outdent)?;

        Ok(Node::Case(Case {
            line,
            filename: self.filename.clone(),
            expr: case.into_val(),
            block,
        }))
    }

    /// `when expr` with an optional `: expr` or indented body
    fn parse_when(&mut self) -> Result<Node, ParseError> {
        let when = self.expect(TokenKind::When)?;
        let line = when.line();
        let block = self.parse_branch_body()?;
        Ok(Node::When(When {
            line,
            filename: self.filename.clone(),
            expr: when.into_val(),
            block,
        }))
    }

    /// `default`, a `when` matching anything
    fn parse_default(&mut self) -> Result<Node, ParseError> {
        let default = self.expect(TokenKind::Default)?;
        let block = self.parse_branch_body()?;
        Ok(Node::When(When {
            line: default.line(),
            filename: self.filename.clone(),
            expr: "default".to_string(),
            block,
        }))
    }

    /// A branch without a body falls through to the next one
    fn parse_branch_body(&mut self) -> Result<Option<Block>, ParseError> {
        match self.cursor.peek().kind() {
            TokenKind::Colon | TokenKind::Indent => self.parse_block_expansion().map(Some),
            _ => Ok(None),
        }
    }

    /// `each val, key in obj` with its body and an optional `else` body
    pub(super) fn parse_each(&mut self) -> Result<Node, ParseError> {
        let (line, val, key, obj) = match self.expect(TokenKind::Each)? {
            Token::Each { line, val, key, code } => (line, val, key, code),
            other => return Err(self.mismatched(TokenKind::Each, &other)),
        };
        let block = self.block()?;

        let has_else = matches!(self.cursor.peek(), Token::Code { val, .. } if val == "else");
        let alternative = if has_else {
            self.cursor.advance();
            Some(self.block()?)
        } else {
            None
        };

        Ok(Node::Each(Each {
            line,
            filename: self.filename.clone(),
            obj,
            val,
            key,
            block,
            alternative,
        }))
    }

    /// Code line, including `if` / `else if` / `else` branches.
    ///
    /// After an `if` branch, an `else` that is next in the stream (at most
    /// one newline away) is linked by position; any other `else` is an error.
    pub(super) fn parse_code(&mut self) -> Result<Code, ParseError> {
        let position = self.cursor.position(1);
        let (line, val, buffer, escape, is_else, is_if, has_if, requires_block) =
            match self.expect(TokenKind::Code)? {
                Token::Code {
                    line,
                    val,
                    buffer,
                    escape,
                    is_else,
                    is_if,
                    has_if,
                    requires_block,
                } => (line, val, buffer, escape, is_else, is_if, has_if, requires_block),
                other => return Err(self.mismatched(TokenKind::Code, &other)),
            };

        let linked = has_if || (position.is_some() && position == self.else_link);
        if is_else && !linked {
            return Err(self
                .error(ErrorKind::ElseWithoutIf, "Unexpected else without if", line)
                .with_help("`else` must directly follow the body of an `if` or `else if`"));
        }

        let block = if self.cursor.peek().kind() == TokenKind::Indent {
            Some(self.block()?)
        } else if requires_block {
            Some(Block::new(line, self.filename.clone()))
        } else {
            None
        };

        if is_if {
            if self.cursor.peek().is_else() {
                self.else_link = self.cursor.position(1);
            } else if self.cursor.peek().kind() == TokenKind::Newline && self.cursor.lookahead(2).is_else() {
                self.else_link = self.cursor.position(2);
            }
        }

        // An `else` never gets its own debug line, it would land between branches
        let debug = val.trim_start_matches(' ').starts_with("else").then_some(false);

        Ok(Code {
            line,
            filename: self.filename.clone(),
            val,
            buffer,
            escape,
            block,
            debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(tokens: Vec<Token>) -> Result<Block, ParseError> {
        TreeBuilder::new(tokens, None).build()
    }

    fn conditional(val: &str, line: usize, is_if: bool, is_else: bool) -> Token {
        Token::Code {
            line,
            val: val.to_string(),
            buffer: false,
            escape: false,
            is_else,
            is_if,
            has_if: false,
            requires_block: true,
        }
    }

    fn code(node: &Node) -> &Code {
        match node {
            Node::Code(code) => code,
            other => panic!("expected code, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let root = build(vec![
            conditional("if x", 1, true, false),
            Token::Indent { line: 2, val: 2 },
            Token::code("y", 2),
            Token::Outdent { line: 3 },
            conditional("else", 3, false, true),
        ])
        .unwrap();
        assert_eq!(root.nodes.len(), 2);
        assert!(code(&root.nodes[0]).block.is_some());
        let otherwise = code(&root.nodes[1]);
        assert_eq!(otherwise.val, "else");
        assert_eq!(otherwise.debug, Some(false));
        assert!(otherwise.block.as_ref().is_some_and(Block::is_empty));
    }

    #[test]
    fn test_plain_else_without_block() {
        let mut otherwise = Token::code("else", 2);
        if let Token::Code { is_else, .. } = &mut otherwise {
            *is_else = true;
        }
        let root = build(vec![conditional("if x", 1, true, false), otherwise]).unwrap();
        assert!(code(&root.nodes[1]).block.is_none());
    }

    #[test]
    fn test_else_without_if() {
        let err = build(vec![conditional("else", 1, false, true)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ElseWithoutIf);
        assert_eq!(err.message, "Unexpected else without if");
    }

    #[test]
    fn test_else_across_blank_line() {
        let root = build(vec![
            conditional("if a", 1, true, false),
            Token::Indent { line: 2, val: 2 },
            Token::text("a", 2),
            Token::Outdent { line: 3 },
            Token::Newline { line: 3 },
            conditional("else if b", 4, true, true),
            Token::Indent { line: 5, val: 2 },
            Token::text("b", 5),
            Token::Outdent { line: 6 },
            conditional("else", 6, false, true),
        ])
        .unwrap();
        assert_eq!(root.nodes.len(), 3);
        assert_eq!(code(&root.nodes[1]).debug, Some(false));
    }

    #[test]
    fn test_else_too_far_from_if() {
        let err = build(vec![
            conditional("if a", 1, true, false),
            Token::Newline { line: 1 },
            Token::Newline { line: 2 },
            conditional("else", 3, false, true),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ElseWithoutIf);
    }

    #[test]
    fn test_else_after_unrelated_code() {
        let err = build(vec![
            conditional("if a", 1, true, false),
            Token::Newline { line: 1 },
            Token::code("var x = 1", 2),
            Token::Newline { line: 2 },
            conditional("else", 3, false, true),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ElseWithoutIf);
    }

    #[test]
    fn test_lexer_supplied_link() {
        let mut otherwise = conditional("else", 1, false, true);
        if let Token::Code { has_if, .. } = &mut otherwise {
            *has_if = true;
        }
        assert!(build(vec![otherwise]).is_ok());
    }

    #[test]
    fn test_each_with_alternative() {
        let root = build(vec![
            Token::Each { line: 1, val: "item".to_string(), key: Some("i".to_string()), code: "items".to_string() },
            Token::Indent { line: 2, val: 2 },
            Token::tag("li", 2),
            Token::Outdent { line: 3 },
            conditional("else", 3, false, true),
            Token::Indent { line: 4, val: 2 },
            Token::tag("p", 4),
            Token::Outdent { line: 5 },
        ])
        .unwrap();
        assert_eq!(root.nodes.len(), 1);
        match &root.nodes[0] {
            Node::Each(each) => {
                assert_eq!(each.obj, "items");
                assert_eq!(each.val, "item");
                assert_eq!(each.key.as_deref(), Some("i"));
                assert_eq!(each.block.nodes.len(), 1);
                assert_eq!(each.alternative.as_ref().map(|b| b.nodes.len()), Some(1));
            }
            other => panic!("expected each, got {:?}", other),
        }
    }

    #[test]
    fn test_case_branches() {
        let root = build(vec![
            Token::Case { line: 1, val: "friends".to_string() },
            Token::Indent { line: 2, val: 2 },
            Token::When { line: 2, val: "0".to_string() },
            Token::Newline { line: 2 },
            Token::When { line: 3, val: "1".to_string() },
            Token::Colon { line: 3 },
            Token::tag("p", 3),
            Token::text("one friend", 3),
            Token::Newline { line: 3 },
            Token::Default { line: 4 },
            Token::Indent { line: 5, val: 4 },
            Token::tag("p", 5),
            Token::Outdent { line: 6 },
            Token::Outdent { line: 6 },
        ])
        .unwrap();
        let Node::Case(case) = &root.nodes[0] else { panic!("expected case") };
        assert_eq!(case.expr, "friends");
        let branches: Vec<_> = case
            .block
            .nodes
            .iter()
            .map(|node| match node {
                Node::When(when) => (when.expr.as_str(), when.block.as_ref().map(|b| b.nodes.len())),
                other => panic!("expected when, got {:?}", other),
            })
            .collect();
        assert_eq!(branches, [("0", None), ("1", Some(1)), ("default", Some(1))]);
    }

    #[test]
    fn test_case_rejects_other_tokens() {
        let err = build(vec![
            Token::Case { line: 1, val: "x".to_string() },
            Token::Indent { line: 2, val: 2 },
            Token::tag("p", 2),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedCaseToken);
        assert_eq!(err.found, Some(TokenKind::Tag));
    }

    #[test]
    fn test_requires_block_without_body() {
        let root = build(vec![conditional("unless done", 1, false, false)]).unwrap();
        let node = code(&root.nodes[0]);
        assert!(node.block.as_ref().is_some_and(Block::is_empty));
        assert_eq!(node.debug, None);
    }
}
