//! Expression evaluator
//!
//! Recursive-descent evaluation straight off the token cursor, with no intermediate
//! syntax tree:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := '-' factor | '(' expression ')' | number | string
//!             | builtin factor | name '(' expression ')' | name
//! ```

use crate::cursor::TokenCursor;
use crate::error::{BasicError, Result};
use crate::tokenizer::Token;
use crate::variables::{Value, VariableStore};
use rand::{Rng, RngCore};

/// What `CHR$(12)` evaluates to; printing it clears the screen
pub const CLEAR_SCREEN: &str = "Console.clear";

const PLUS: Token = Token::Operator("+");
const MINUS: Token = Token::Operator("-");
const TIMES: Token = Token::Operator("*");
const DIVIDE: Token = Token::Operator("/");
const OPEN: Token = Token::Operator("(");
const CLOSE: Token = Token::Operator(")");

/// Deepest factor nesting accepted before evaluation gives up
pub const MAX_DEPTH: usize = 256;

/// Built-in functions, recognised by exact name
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Builtin {
    /// `CHR$(n)` character with code `n`
    Chr,
    /// `INT(x)` floor
    Int,
    /// `RND(x)` uniform in [0, 1), argument ignored
    Rnd,
    /// `TAB(x)` a tab character, argument ignored
    Tab,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "CHR$" => Some(Builtin::Chr),
            "INT" => Some(Builtin::Int),
            "RND" => Some(Builtin::Rnd),
            "TAB" => Some(Builtin::Tab),
            _ => None,
        }
    }
}

/// Evaluates expressions at the cursor against the current variables
pub struct Evaluator<'a> {
    cursor: &'a mut TokenCursor,
    variables: &'a VariableStore,
    rng: &'a mut dyn RngCore,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        cursor: &'a mut TokenCursor,
        variables: &'a VariableStore,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            cursor,
            variables,
            rng,
            depth: 0,
        }
    }

    /// Evaluate one full expression
    pub fn evaluate(&mut self) -> Result<Value> {
        let mut left = self.term()?;
        loop {
            if self.cursor.at(&PLUS) {
                left = left + self.term()?;
            } else if self.cursor.at(&MINUS) {
                left = left - self.term()?;
            } else {
                return Ok(left);
            }
        }
    }

    fn term(&mut self) -> Result<Value> {
        let mut left = self.factor()?;
        loop {
            if self.cursor.at(&TIMES) {
                left = left * self.factor()?;
            } else if self.cursor.at(&DIVIDE) {
                left = left / self.factor()?;
            } else {
                return Ok(left);
            }
        }
    }

    /// Every nested `-`, `(` and builtin argument passes through here, so the depth
    /// bound covers all recursion
    fn factor(&mut self) -> Result<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(BasicError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let value = self.primary();
        self.depth -= 1;
        value
    }

    fn primary(&mut self) -> Result<Value> {
        if self.cursor.at(&MINUS) {
            return Ok(-self.factor()?);
        }
        if self.cursor.at(&OPEN) {
            let value = self.evaluate()?;
            self.cursor.expect(&CLOSE)?;
            return Ok(value);
        }

        match self.cursor.next()?.clone() {
            Token::Str(text) => Ok(Value::Str(text)),
            Token::Number { value, .. } => Ok(Value::Number(value)),
            Token::Identifier(name) if name.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                self.named(&name)
            }
            other => Err(BasicError::Evaluation {
                token: other.to_string(),
            }),
        }
    }

    /// A builtin call, an array element or a scalar
    fn named(&mut self, name: &str) -> Result<Value> {
        if let Some(builtin) = Builtin::lookup(name) {
            return self.call(builtin);
        }
        if self.cursor.at(&OPEN) {
            let index = self.evaluate()?;
            self.cursor.expect(&CLOSE)?;
            return self.variables.read_array(name, index.to_number());
        }
        Ok(self.variables.read(name))
    }

    fn call(&mut self, builtin: Builtin) -> Result<Value> {
        let argument = self.factor()?;
        let value = match builtin {
            Builtin::Chr => {
                if argument == Value::Number(12.0) {
                    Value::from(CLEAR_SCREEN)
                } else {
                    Value::Str(char_from_code(argument.to_number()).to_string())
                }
            }
            Builtin::Int => Value::Number(argument.to_number().floor()),
            Builtin::Rnd => Value::Number(self.rng.gen::<f64>()),
            Builtin::Tab => Value::from("\t"),
        };
        Ok(value)
    }
}

/// Character for a 16-bit code unit; codes wrap modulo 65536
fn char_from_code(code: f64) -> char {
    let unit = if code.is_finite() {
        code.trunc().rem_euclid(65536.0) as u32
    } else {
        0
    };
    char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
}
