//! Token cursor with lookahead and pushback.
//!
//! Every grammar routine reads tokens through this type. Reading past the end
//! of the stream yields an `eos` token forever, so loops only need to stop on
//! `eos` rather than on an exhausted iterator.

use super::token::Token;
use std::collections::VecDeque;

pub struct TokenCursor {
    tokens: VecDeque<Token>,
    /// Synthetic tokens pushed back in front of the stream
    deferred: VecDeque<Token>,
    /// Number of lexer tokens consumed so far
    consumed: usize,
    /// Line of the most recently consumed token
    line: usize,
    eos: Token,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        let last_line = tokens.last().map(Token::line).unwrap_or(0);
        Self {
            tokens: tokens.into(),
            deferred: VecDeque::new(),
            consumed: 0,
            line: 0,
            eos: Token::Eos { line: last_line },
        }
    }

    /// Consume and return the next token
    pub fn advance(&mut self) -> Token {
        let token = match self.deferred.pop_front() {
            Some(token) => token,
            None => match self.tokens.pop_front() {
                Some(token) => {
                    self.consumed += 1;
                    token
                }
                None => self.eos.clone(),
            },
        };
        self.line = token.line();
        token
    }

    /// Next token, not consumed
    pub fn peek(&self) -> &Token {
        self.lookahead(1)
    }

    /// Token `n` positions ahead; `lookahead(1)` is `peek()`
    pub fn lookahead(&self, n: usize) -> &Token {
        let index = n.max(1) - 1;
        if let Some(token) = self.deferred.get(index) {
            return token;
        }
        self.tokens
            .get(index - self.deferred.len())
            .unwrap_or(&self.eos)
    }

    /// Stream position of the lexer token `n` positions ahead.
    ///
    /// `None` for deferred tokens and for the implicit `eos`; positions of
    /// lexer tokens never change, whatever gets deferred in front of them.
    pub fn position(&self, n: usize) -> Option<usize> {
        let index = n.max(1) - 1;
        let real = index.checked_sub(self.deferred.len())?;
        if real < self.tokens.len() {
            Some(self.consumed + real)
        } else {
            None
        }
    }

    /// Push a synthetic token so the next `advance()`/`peek()` returns it
    pub fn defer(&mut self, token: Token) {
        self.deferred.push_front(token);
    }

    /// Line of the most recently consumed token
    pub fn line(&self) -> usize {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::token::TokenKind;

    fn stream() -> TokenCursor {
        TokenCursor::new(vec![
            Token::tag("p", 1),
            Token::text("hello", 1),
            Token::Newline { line: 1 },
        ])
    }

    #[test]
    fn test_advance_and_peek() {
        let mut cursor = stream();
        assert_eq!(cursor.peek().kind(), TokenKind::Tag);
        assert_eq!(cursor.lookahead(2).kind(), TokenKind::Text);
        assert_eq!(cursor.advance().kind(), TokenKind::Tag);
        assert_eq!(cursor.line(), 1);
        assert_eq!(cursor.peek().kind(), TokenKind::Text);
    }

    #[test]
    fn test_eos_past_end() {
        let mut cursor = stream();
        for _ in 0..3 {
            cursor.advance();
        }
        assert_eq!(cursor.peek().kind(), TokenKind::Eos);
        assert_eq!(cursor.advance().kind(), TokenKind::Eos);
        assert_eq!(cursor.advance().kind(), TokenKind::Eos);
        assert_eq!(cursor.lookahead(5).kind(), TokenKind::Eos);
        assert_eq!(cursor.peek().line(), 1);
    }

    #[test]
    fn test_empty_stream() {
        let mut cursor = TokenCursor::new(Vec::new());
        assert_eq!(cursor.advance(), Token::Eos { line: 0 });
        assert_eq!(cursor.position(1), None);
    }

    #[test]
    fn test_defer_goes_first() {
        let mut cursor = TokenCursor::new(vec![Token::Class { line: 3, val: "item".to_string() }]);
        cursor.defer(Token::tag("div", 3));
        assert_eq!(cursor.peek().kind(), TokenKind::Tag);
        assert_eq!(cursor.lookahead(2).kind(), TokenKind::Class);
        assert_eq!(cursor.advance(), Token::tag("div", 3));
        assert_eq!(cursor.advance().kind(), TokenKind::Class);
    }

    #[test]
    fn test_positions_ignore_deferred_tokens() {
        let mut cursor = stream();
        assert_eq!(cursor.position(1), Some(0));
        assert_eq!(cursor.position(3), Some(2));
        assert_eq!(cursor.position(4), None);

        cursor.defer(Token::tag("div", 1));
        assert_eq!(cursor.position(1), None);
        assert_eq!(cursor.position(2), Some(0));

        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.position(1), Some(1));
    }
}
