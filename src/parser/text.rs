use super::token::{Token, TokenKind};
use super::tree_builder::TreeBuilder;
use crate::ast::*;
use crate::error::{ErrorKind, ParseError};

impl TreeBuilder {
    /// Run of `text` tokens and `#[...]` interpolations.
    ///
    /// With `block_level`, newlines between text lines are swallowed and each
    /// one that precedes more text contributes a literal `"\n"` node.
    pub(super) fn parse_text(&mut self, block_level: bool) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();

        loop {
            match self.cursor.peek().kind() {
                TokenKind::Text => {
                    let token = self.cursor.advance();
                    let line = token.line();
                    nodes.push(self.text_node(line, token.into_val(), false));
                }
                TokenKind::StartJadeInterpolation => {
                    self.cursor.advance();
                    nodes.push(self.parse_expr()?);
                    self.expect(TokenKind::EndJadeInterpolation)?;
                }
                TokenKind::Newline if block_level => {
                    let newline = self.cursor.advance();
                    if self.cursor.peek().kind() == TokenKind::Text {
                        nodes.push(self.text_node(newline.line(), "\n", false));
                    }
                }
                _ => break,
            }
        }

        Ok(nodes)
    }

    /// `start-pipeless-text ... end-pipeless-text`, or `None` when absent
    pub(super) fn parse_text_block(&mut self) -> Result<Option<Block>, ParseError> {
        let Some(start) = self.accept(TokenKind::StartPipelessText) else {
            return Ok(None);
        };
        let mut block = Block::new(start.line(), self.filename.clone());

        loop {
            match self.cursor.advance() {
                Token::EndPipelessText { .. } => break,
                Token::Text { line, val } => block.push(self.text_node(line, val, false)),
                Token::Newline { line } => block.push(self.text_node(line, "\n", false)),
                Token::StartJadeInterpolation { .. } => {
                    let expr = self.parse_expr()?;
                    block.push(expr);
                    self.expect(TokenKind::EndJadeInterpolation)?;
                }
                other => {
                    return Err(self
                        .error(
                            ErrorKind::UnexpectedToken,
                            format!("Unexpected token \"{}\" in pipeless text", other.kind()),
                            other.line(),
                        )
                        .with_expected(TokenKind::EndPipelessText)
                        .with_found(other.kind()));
                }
            }
        }

        Ok(Some(block))
    }

    /// Consecutive raw-HTML lines, merged into as few text nodes as possible.
    ///
    /// An indented block under an HTML line is parsed normally; its HTML text
    /// joins the running node while any other node ends the run.
    pub(super) fn parse_text_html(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        let mut current = None;

        while self.cursor.peek().kind() == TokenKind::TextHtml {
            let token = self.cursor.advance();
            let text = Text {
                line: token.line(),
                filename: self.filename.clone(),
                val: token.into_val(),
                is_html: true,
            };
            merge_html_text(&mut nodes, &mut current, text);

            match self.cursor.peek().kind() {
                TokenKind::Indent => {
                    let block = self.block()?;
                    for node in block.nodes {
                        match node {
                            Node::Text(text) if text.is_html => merge_html_text(&mut nodes, &mut current, text),
                            other => {
                                current = None;
                                nodes.push(other);
                            }
                        }
                    }
                }
                TokenKind::Newline => {
                    self.cursor.advance();
                }
                _ => {}
            }
        }

        Ok(nodes)
    }

    /// `doctype html`
    pub(super) fn parse_doctype(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::Doctype)?;
        Ok(Node::Doctype(Doctype {
            line: token.line(),
            filename: self.filename.clone(),
            val: token.into_val(),
        }))
    }

    /// `:name(attrs)` followed by pipeless text
    pub(super) fn parse_filter(&mut self) -> Result<Node, ParseError> {
        let token = self.expect(TokenKind::Filter)?;
        let line = token.line();
        let attrs = match self.accept(TokenKind::Attrs) {
            Some(Token::Attrs { attrs, .. }) => attrs,
            _ => Vec::new(),
        };
        let block = match self.parse_text_block()? {
            Some(block) => block,
            None => Block::new(line, self.filename.clone()),
        };

        Ok(Node::Filter(Filter {
            line,
            filename: self.filename.clone(),
            name: token.into_val(),
            attrs,
            block,
        }))
    }

    /// `//` comment; a pipeless body makes it a block comment
    pub(super) fn parse_comment(&mut self) -> Result<Node, ParseError> {
        let (line, val, buffer) = match self.expect(TokenKind::Comment)? {
            Token::Comment { line, val, buffer } => (line, val, buffer),
            other => return Err(self.mismatched(TokenKind::Comment, &other)),
        };
        let filename = self.filename.clone();

        Ok(match self.parse_text_block()? {
            Some(block) => Node::BlockComment(BlockComment { line, filename, val, buffer, block }),
            None => Node::Comment(Comment { line, filename, val, buffer }),
        })
    }

    /// A lone `.` starting a raw text block
    pub(super) fn parse_dot(&mut self) -> Result<Node, ParseError> {
        let dot = self.expect(TokenKind::Dot)?;
        let block = match self.parse_text_block()? {
            Some(block) => block,
            None => Block::new(dot.line(), self.filename.clone()),
        };
        Ok(Node::Block(block))
    }
}

/// Join `text` onto the running HTML node, or start a new run with it
fn merge_html_text(nodes: &mut Vec<Node>, current: &mut Option<usize>, text: Text) {
    if let Some(running) = current
        .and_then(|index| nodes.get_mut(index))
        .and_then(Node::as_html_text_mut)
    {
        running.val.push('\n');
        running.val.push_str(&text.val);
        return;
    }
    nodes.push(Node::Text(text));
    *current = Some(nodes.len() - 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(tokens: Vec<Token>) -> Result<Block, ParseError> {
        TreeBuilder::new(tokens, Some("text.jade".to_string())).build()
    }

    fn html(val: &str, line: usize) -> Token {
        Token::TextHtml { line, val: val.to_string() }
    }

    fn text_val(node: &Node) -> &str {
        match node {
            Node::Text(text) => &text.val,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_html_lines_merge() {
        let root = build(vec![html("a", 1), html("b", 2), Token::Newline { line: 2 }]).unwrap();
        assert_eq!(root.nodes.len(), 1);
        match &root.nodes[0] {
            Node::Text(text) => {
                assert_eq!(text.val, "a\nb");
                assert!(text.is_html);
                assert_eq!(text.line, 1);
                assert_eq!(text.filename.as_deref(), Some("text.jade"));
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_html_merges_across_indentation() {
        let root = build(vec![
            html("<ul>", 1),
            Token::Indent { line: 2, val: 2 },
            html("<li>", 2),
            Token::tag("span", 3),
            Token::text("x", 3),
            Token::Newline { line: 3 },
            html("</li>", 4),
            Token::Outdent { line: 5 },
            html("</ul>", 5),
        ])
        .unwrap();
        assert_eq!(root.nodes.len(), 3);
        assert_eq!(text_val(&root.nodes[0]), "<ul>\n<li>");
        assert!(matches!(&root.nodes[1], Node::Tag(tag) if tag.name == "span"));
        assert_eq!(text_val(&root.nodes[2]), "</li>\n</ul>");
    }

    #[test]
    fn test_block_level_text_run() {
        let root = build(vec![
            Token::text("one", 1),
            Token::Newline { line: 1 },
            Token::text("two", 2),
            Token::Newline { line: 2 },
            Token::tag("br", 3),
        ])
        .unwrap();
        assert_eq!(root.nodes.len(), 2);
        match &root.nodes[0] {
            Node::Block(block) => {
                let vals: Vec<_> = block.nodes.iter().map(text_val).collect();
                assert_eq!(vals, ["one", "\n", "two"]);
            }
            other => panic!("expected wrapped text run, got {:?}", other),
        }
    }

    #[test]
    fn test_single_text_is_unwrapped() {
        let root = build(vec![Token::text("only", 1)]).unwrap();
        assert_eq!(text_val(&root.nodes[0]), "only");
    }

    #[test]
    fn test_interpolation_in_text() {
        let root = build(vec![
            Token::tag("p", 1),
            Token::text("see ", 1),
            Token::StartJadeInterpolation { line: 1 },
            Token::tag("strong", 1),
            Token::text("this", 1),
            Token::EndJadeInterpolation { line: 1 },
            Token::text(" now", 1),
        ])
        .unwrap();
        let Node::Tag(p) = &root.nodes[0] else { panic!("expected tag") };
        let Node::Block(run) = &p.block.nodes[0] else { panic!("expected text run") };
        assert_eq!(run.nodes.len(), 3);
        assert!(matches!(&run.nodes[1], Node::Tag(tag) if tag.name == "strong"));
    }

    #[test]
    fn test_filter_body() {
        let root = build(vec![
            Token::Filter { line: 1, val: "markdown".to_string() },
            Token::StartPipelessText { line: 1 },
            Token::text("hi", 2),
            Token::Newline { line: 2 },
            Token::EndPipelessText { line: 3 },
        ])
        .unwrap();
        match &root.nodes[0] {
            Node::Filter(filter) => {
                assert_eq!(filter.name, "markdown");
                let vals: Vec<_> = filter.block.nodes.iter().map(text_val).collect();
                assert_eq!(vals, ["hi", "\n"]);
            }
            other => panic!("expected filter, got {:?}", other),
        }
    }

    #[test]
    fn test_pipeless_text_rejects_tags() {
        let err = build(vec![
            Token::Filter { line: 1, val: "coffee".to_string() },
            Token::StartPipelessText { line: 1 },
            Token::tag("div", 2),
        ])
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert_eq!(err.found, Some(TokenKind::Tag));
    }

    #[test]
    fn test_pipeless_text_needs_end() {
        let err = build(vec![
            Token::Comment { line: 1, val: " note".to_string(), buffer: true },
            Token::StartPipelessText { line: 1 },
            Token::text("dangling", 2),
        ])
        .unwrap_err();
        assert_eq!(err.found, Some(TokenKind::Eos));
    }

    #[test]
    fn test_comment_kinds() {
        let root = build(vec![
            Token::Comment { line: 1, val: " plain".to_string(), buffer: false },
            Token::Newline { line: 1 },
            Token::Comment { line: 2, val: "".to_string(), buffer: true },
            Token::StartPipelessText { line: 2 },
            Token::text("body", 3),
            Token::EndPipelessText { line: 3 },
        ])
        .unwrap();
        assert!(matches!(&root.nodes[0], Node::Comment(c) if c.val == " plain" && !c.buffer));
        assert!(matches!(&root.nodes[1], Node::BlockComment(c) if c.buffer && c.block.nodes.len() == 1));
    }

    #[test]
    fn test_dot_block() {
        let root = build(vec![
            Token::Dot { line: 1 },
            Token::StartPipelessText { line: 1 },
            Token::text("raw", 2),
            Token::EndPipelessText { line: 2 },
        ])
        .unwrap();
        let Node::Block(block) = &root.nodes[0] else { panic!("expected block") };
        assert_eq!(text_val(&block.nodes[0]), "raw");
    }
}
