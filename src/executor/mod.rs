//! Statement dispatcher
//!
//! Runs a tokenized program directly over the token stream. Each iteration reads the
//! next token as a statement keyword and calls its handler; handlers pull their operands
//! off the same cursor and call into the expression evaluator. The first error ends the
//! run and is reported on the screen.

use crate::cursor::TokenCursor;
use crate::error::{BasicError, Result};
use crate::evaluator::{Evaluator, CLEAR_SCREEN};
use crate::program::LineLabels;
use crate::screen::Screen;
use crate::tokenizer::{tokenize, Token};
use crate::variables::{format_number, Value, VariableStore};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

const OPEN: Token = Token::Operator("(");
const CLOSE: Token = Token::Operator(")");
const EQUALS: Token = Token::Operator("=");
const SEMICOLON: Token = Token::Separator(';');

/// Interpreter configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    /// Seed for `RND`; unseeded runs draw from system entropy
    pub seed: Option<u64>,
}

/// Statement keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Let,
    Rem,
    Dim,
    Clear,
    Print,
}

// Keyword text to statement mapping. REM arrives as its own token.
const KEYWORDS: &[(&str, Keyword)] = &[
    ("LET", Keyword::Let),
    ("DIM", Keyword::Dim),
    ("CLEAR", Keyword::Clear),
    ("PRINT", Keyword::Print),
];

impl Keyword {
    /// Keyword named by a token, if any
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Rem => Some(Keyword::Rem),
            Token::Identifier(name) => KEYWORDS
                .iter()
                .find(|(text, _)| *text == name.as_str())
                .map(|(_, keyword)| *keyword),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Let => "LET",
            Keyword::Rem => "REM",
            Keyword::Dim => "DIM",
            Keyword::Clear => "CLEAR",
            Keyword::Print => "PRINT",
        }
    }
}

/// What a statement's leading token asks for
#[derive(Debug, Clone, Copy, PartialEq)]
enum StatementKind {
    Command(Keyword),
    /// `X = 1` without `LET`
    Assignment,
    /// A bare terminator
    Empty,
}

impl StatementKind {
    fn of(token: &Token) -> Result<Self> {
        if let Some(keyword) = Keyword::from_token(token) {
            return Ok(StatementKind::Command(keyword));
        }
        if token.is_name() {
            return Ok(StatementKind::Assignment);
        }
        if token.ends_statement() {
            return Ok(StatementKind::Empty);
        }
        Err(BasicError::UnknownStatement(token.to_string()))
    }

    /// Keyword named in error reports
    fn keyword_name(&self, token: &Token) -> String {
        match self {
            StatementKind::Command(keyword) => keyword.name().to_string(),
            StatementKind::Assignment => Keyword::Let.name().to_string(),
            StatementKind::Empty => token.to_string(),
        }
    }
}

/// Lifecycle of an interpreter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Finished,
    Errored,
}

/// Result of a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every statement ran
    Finished,
    /// A statement failed; nothing after it ran
    Errored { keyword: String, error: BasicError },
    /// Tokenization failed, so nothing was executed
    NotRunnable,
}

impl RunOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunOutcome::Finished)
    }
}

/// Line BASIC interpreter for one source snapshot
#[derive(Debug)]
pub struct Interpreter {
    cursor: TokenCursor,
    labels: LineLabels,
    variables: VariableStore,
    rng: StdRng,
    runnable: bool,
    state: RunState,
    outcome: Option<RunOutcome>,
}

impl Interpreter {
    /// Tokenize `lines` with default options
    pub fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        Self::with_options(lines, Options::default())
    }

    /// Tokenize `lines`; a tokenization failure leaves the interpreter non-runnable
    pub fn with_options<S: AsRef<str>>(lines: &[S], options: Options) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (tokenized, runnable) = match tokenize(lines) {
            Ok(tokenized) => (tokenized, true),
            Err(e) => {
                debug!("program not runnable: {}", e);
                (Default::default(), false)
            }
        };

        Self {
            cursor: TokenCursor::new(tokenized.tokens),
            labels: tokenized.labels,
            variables: VariableStore::new(),
            rng,
            runnable,
            state: RunState::Ready,
            outcome: None,
        }
    }

    /// Run the program to completion or to its first error
    ///
    /// A finished or failed interpreter does not run again; later calls return the
    /// same outcome without touching the screen.
    pub fn run(&mut self, screen: &mut dyn Screen) -> RunOutcome {
        if !self.runnable {
            return RunOutcome::NotRunnable;
        }
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        while let Ok(token) = self.cursor.next().cloned() {
            trace!("statement {} at token {}", token, self.cursor.position() - 1);

            let kind = StatementKind::of(&token);
            let keyword = match &kind {
                Ok(kind) => kind.keyword_name(&token),
                Err(_) => token.to_string(),
            };

            if let Err(error) = kind.and_then(|kind| self.execute(kind, screen)) {
                return self.fail(keyword, error, screen);
            }
        }

        debug!("finished after {} tokens", self.cursor.position());
        self.state = RunState::Finished;
        self.outcome = Some(RunOutcome::Finished);
        RunOutcome::Finished
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_runnable(&self) -> bool {
        self.runnable
    }

    pub fn tokens(&self) -> &[Token] {
        self.cursor.tokens()
    }

    pub fn labels(&self) -> &LineLabels {
        &self.labels
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    fn fail(&mut self, keyword: String, error: BasicError, screen: &mut dyn Screen) -> RunOutcome {
        screen.show_error(&format!("Error: {} function {}", error, keyword));

        debug!("{} in {}: {}", error.kind(), keyword, error);
        debug!("tokens: {:?}", self.cursor.tokens());
        debug!("labels: {:?}", self.labels);
        debug!("variables: {:?}", self.variables);

        let outcome = RunOutcome::Errored { keyword, error };
        self.state = RunState::Errored;
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Dispatch one statement whose leading token has been consumed
    fn execute(&mut self, kind: StatementKind, screen: &mut dyn Screen) -> Result<()> {
        match kind {
            StatementKind::Command(Keyword::Let) => self.execute_assignment(),
            StatementKind::Command(Keyword::Rem) => self.cursor.expect_end_of_statement(),
            StatementKind::Command(Keyword::Dim) => self.execute_dim(),
            StatementKind::Command(Keyword::Clear) => self.execute_clear(screen),
            StatementKind::Command(Keyword::Print) => self.execute_print(screen),
            StatementKind::Assignment => {
                self.cursor.back();
                self.execute_assignment()
            }
            StatementKind::Empty => Ok(()),
        }
    }

    /// `name [(index)] = expression`
    fn execute_assignment(&mut self) -> Result<()> {
        let name = self.cursor.name()?;
        let index = if self.cursor.at(&OPEN) {
            let index = self.evaluate()?;
            self.cursor.expect(&CLOSE)?;
            Some(index.to_number())
        } else {
            None
        };

        self.cursor.expect(&EQUALS)?;
        let value = self.evaluate()?;
        match index {
            Some(index) => self.variables.write_array(&name, index, value)?,
            None => self.variables.write(&name, value),
        }
        self.cursor.expect_end_of_statement()
    }

    /// `DIM name size`
    fn execute_dim(&mut self) -> Result<()> {
        let name = self.cursor.name()?;
        let size = self.evaluate()?;
        self.cursor.expect_end_of_statement()?;
        self.variables.declare_array(&name, size.to_number())
    }

    fn execute_clear(&mut self, screen: &mut dyn Screen) -> Result<()> {
        self.cursor.expect_end_of_statement()?;
        screen.clear();
        Ok(())
    }

    /// `PRINT [expression (; expression)* [;]]`
    fn execute_print(&mut self, screen: &mut dyn Screen) -> Result<()> {
        if !self.cursor.at_end_of_statement() {
            let value = self.evaluate()?;
            print_value(screen, value);

            while self.cursor.at(&SEMICOLON) {
                // A trailing `;` keeps the output on the current line
                if self.cursor.at_end_of_statement() {
                    return Ok(());
                }
                let value = self.evaluate()?;
                print_value(screen, value);
            }
            self.cursor.expect_end_of_statement()?;
        }
        screen.line_break();
        Ok(())
    }

    fn evaluate(&mut self) -> Result<Value> {
        Evaluator::new(&mut self.cursor, &self.variables, &mut self.rng).evaluate()
    }
}

/// Strings print verbatim, numbers after a space
fn print_value(screen: &mut dyn Screen, value: Value) {
    match value {
        Value::Str(text) if text == CLEAR_SCREEN => screen.clear(),
        Value::Str(text) => screen.write_text(&text),
        Value::Number(n) => screen.write_text(&format!(" {}", format_number(n))),
    }
}
