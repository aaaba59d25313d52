//! Line BASIC Interpreter
//!
//! A small interpreter for a line-numbered BASIC dialect. Source arrives as an ordered
//! sequence of lines, is tokenized into a flat token stream, and is executed directly
//! over that stream by a statement dispatcher and a recursive-descent expression
//! evaluator. Output goes to a host-supplied [`Screen`].

pub mod cursor;
pub mod evaluator;
pub mod executor;
pub mod program;
pub mod screen;
pub mod tokenizer;
pub mod variables;

// Re-export core types for convenience
pub use crate::error::{BasicError, Result};
pub use executor::{Interpreter, Keyword, Options, RunOutcome, RunState};
pub use program::LineLabels;
pub use screen::{BufferScreen, Screen};
pub use tokenizer::{Token, Tokenized};
pub use variables::{Value, VariableStore};

/// Split an editor snapshot into source lines.
///
/// Whitespace is trimmed from the whole snapshot only; individual lines are kept as
/// written.
pub fn split_source(text: &str) -> Vec<&str> {
    text.trim().split('\n').collect()
}

/// Run a complete editor snapshot against `screen`.
pub fn run_source(text: &str, screen: &mut dyn Screen) -> RunOutcome {
    Interpreter::new(&split_source(text)).run(screen)
}

/// Core error handling types for the interpreter
pub mod error {
    use std::fmt;

    /// Result type for interpreter operations
    pub type Result<T> = std::result::Result<T, BasicError>;

    /// Every failure the interpreter can raise
    #[derive(Debug, Clone, PartialEq)]
    pub enum BasicError {
        /// Input could not be tokenized; the run never starts
        Tokenize { line: usize, message: String },

        // Statement errors
        Name { found: String },
        Syntax { expected: String, found: String },
        UnknownStatement(String),
        UnexpectedEnd,

        // Evaluation errors
        Evaluation { token: String },
        TooDeep { limit: usize },

        // Array errors
        ArrayNotDimensioned(String),
        SubscriptOutOfRange { name: String, index: f64 },
        InvalidArraySize(String),
    }

    impl BasicError {
        /// Short category name, as shown in diagnostics
        pub fn kind(&self) -> &'static str {
            match self {
                BasicError::Tokenize { .. } => "TokenizeError",
                BasicError::Name { .. } => "NameError",
                BasicError::Syntax { .. }
                | BasicError::UnknownStatement(_)
                | BasicError::UnexpectedEnd => "SyntaxError",
                BasicError::Evaluation { .. }
                | BasicError::TooDeep { .. }
                | BasicError::ArrayNotDimensioned(_)
                | BasicError::SubscriptOutOfRange { .. }
                | BasicError::InvalidArraySize(_) => "EvaluationError",
            }
        }
    }

    impl fmt::Display for BasicError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                BasicError::Tokenize { line, message } => {
                    write!(f, "cannot tokenize line {}: {}", line + 1, message)
                }
                BasicError::Name { found } => write!(f, "expected name but found {}", found),
                BasicError::Syntax { expected, found } => {
                    write!(f, "expected {} but found {}", expected, found)
                }
                BasicError::UnknownStatement(token) => write!(f, "unknown statement {}", token),
                BasicError::UnexpectedEnd => write!(f, "unexpected end of program"),
                BasicError::Evaluation { token } => write!(f, "cannot evaluate {}", token),
                BasicError::TooDeep { limit } => {
                    write!(f, "expression nested deeper than {} levels", limit)
                }
                BasicError::ArrayNotDimensioned(name) => {
                    write!(f, "array not dimensioned: {}", name)
                }
                BasicError::SubscriptOutOfRange { name, index } => {
                    write!(f, "subscript out of range: {}({})", name, index)
                }
                BasicError::InvalidArraySize(size) => write!(f, "invalid array size {}", size),
            }
        }
    }

    impl std::error::Error for BasicError {}
}
