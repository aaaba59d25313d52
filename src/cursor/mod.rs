//! Token cursor shared by the statement dispatcher and the expression evaluator
//!
//! The cursor is the only position state of a run. It moves forward one token at a
//! time and can push back a single token for lookahead.

use crate::error::{BasicError, Result};
use crate::tokenizer::Token;

/// Forward-moving position in a token stream
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    /// Consume the next token
    pub fn next(&mut self) -> Result<&Token> {
        let token = self.tokens.get(self.index).ok_or(BasicError::UnexpectedEnd)?;
        self.index += 1;
        Ok(token)
    }

    /// Push back the last consumed token
    pub fn back(&mut self) -> &mut Self {
        self.index = self.index.saturating_sub(1);
        self
    }

    /// Look at the next token without consuming it
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Consume the next token if it equals `token`
    pub fn at(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Consume `token` or fail with a syntax error naming what was found
    pub fn expect(&mut self, token: &Token) -> Result<()> {
        if self.at(token) {
            return Ok(());
        }
        Err(BasicError::Syntax {
            expected: token.to_string(),
            found: self.describe_next(),
        })
    }

    /// Consume a statement terminator (end of line or `:`) if one is next
    pub fn at_end_of_statement(&mut self) -> bool {
        match self.peek() {
            Some(token) if token.ends_statement() => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }

    /// Consume a statement terminator or fail
    pub fn expect_end_of_statement(&mut self) -> Result<()> {
        if self.at_end_of_statement() {
            return Ok(());
        }
        Err(BasicError::Syntax {
            expected: Token::EndOfLine.to_string(),
            found: self.describe_next(),
        })
    }

    /// Consume a variable name
    pub fn name(&mut self) -> Result<String> {
        let token = self.next()?;
        match token {
            Token::Identifier(name) if token.is_name() => Ok(name.clone()),
            _ => Err(BasicError::Name {
                found: token.to_string(),
            }),
        }
    }

    /// True once every token has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn describe_next(&self) -> String {
        self.peek()
            .map(Token::to_string)
            .unwrap_or_else(|| "end of program".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn cursor(lines: &[&str]) -> TokenCursor {
        TokenCursor::new(tokenize(lines).unwrap().tokens)
    }

    #[test]
    fn test_next_and_back() {
        let mut c = cursor(&["A B"]);
        assert_eq!(c.next().unwrap(), &Token::Identifier("A".to_string()));
        assert_eq!(c.position(), 1);
        c.back();
        assert_eq!(c.position(), 0);
        assert_eq!(c.next().unwrap(), &Token::Identifier("A".to_string()));
    }

    #[test]
    fn test_next_past_end() {
        let mut c = cursor(&[""]);
        assert_eq!(c.next().unwrap(), &Token::EndOfLine);
        assert!(c.is_exhausted());
        assert_eq!(c.next(), Err(BasicError::UnexpectedEnd));
    }

    #[test]
    fn test_at_only_consumes_on_match() {
        let mut c = cursor(&["= 1"]);
        assert!(!c.at(&Token::Operator("(")));
        assert_eq!(c.position(), 0);
        assert!(c.at(&Token::Operator("=")));
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn test_expect_reports_found_token() {
        let mut c = cursor(&["X 5"]);
        assert_eq!(
            c.expect(&Token::Operator("=")),
            Err(BasicError::Syntax {
                expected: "=".to_string(),
                found: "X".to_string(),
            })
        );
    }

    #[test]
    fn test_colon_and_end_of_line_end_statements() {
        let mut c = cursor(&[": 1"]);
        assert!(c.at_end_of_statement());
        assert!(!c.at_end_of_statement());
        assert!(c.expect_end_of_statement().is_err());
        c.next().unwrap();
        assert!(c.expect_end_of_statement().is_ok());
        assert!(c.is_exhausted());
    }

    #[test]
    fn test_name_requires_leading_letter() {
        let mut c = cursor(&["A1 _B = "]);
        assert_eq!(c.name().unwrap(), "A1");
        assert_eq!(
            c.name(),
            Err(BasicError::Name {
                found: "_B".to_string()
            })
        );
        assert_eq!(
            c.name(),
            Err(BasicError::Name {
                found: "=".to_string()
            })
        );
    }
}
