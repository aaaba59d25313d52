//! Tokenizer for line BASIC source code
//!
//! Converts an ordered sequence of source lines into one flat token stream, with an
//! end-of-line marker closing every line, and records where each labelled line starts.

use crate::error::{BasicError, Result};
use crate::program::LineLabels;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Represents a single token in the stream
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal (`12`, `3.5`, `.25`, `7.`), kept with its source text
    Number { value: f64, text: String },
    /// String literal, content between the quotes taken verbatim
    Str(String),
    /// Keyword or variable name, optionally ending in `$`
    Identifier(String),
    /// Arithmetic, grouping, assignment and comparison symbols
    Operator(&'static str),
    /// Separators (`:` and `;`)
    Separator(char),
    /// A `REM` comment; the comment text is discarded
    Rem,
    /// End of line marker
    EndOfLine,
}

impl Token {
    /// True for identifiers that can name a variable (leading letter)
    pub fn is_name(&self) -> bool {
        matches!(self, Token::Identifier(name) if name.starts_with(|c: char| c.is_ascii_alphabetic()))
    }

    /// True for tokens that close a statement
    pub fn ends_statement(&self) -> bool {
        matches!(self, Token::EndOfLine | Token::Separator(':'))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number { text, .. } => write!(f, "{}", text),
            Token::Str(text) => write!(f, "\"{}\"", text),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Operator(symbol) => write!(f, "{}", symbol),
            Token::Separator(c) => write!(f, "{}", c),
            Token::Rem => write!(f, "REM"),
            Token::EndOfLine => write!(f, ":EOL"),
        }
    }
}

/// Result of tokenizing a whole source snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    pub labels: LineLabels,
}

// Symbols recognised by the scanner, longest first where they share a prefix
const OPERATORS: &[&str] = &[
    "<=", "<>", ">=", "<", ">", "=", "+", "-", "*", "/", "(", ")",
];

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*[0-9]+").expect("label pattern is valid"))
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"[0-9]+(?:\.[0-9]*)?|\.[0-9]+",
            r"|REM.*$",
            r"|[A-Za-z0-9_]+\$?",
            r#"|"[^"]*""#,
            r"|[-+*/():;=]|<[=>]?|>=?",
        ))
        .expect("token pattern is valid")
    })
}

/// Tokenize an ordered sequence of source lines
pub fn tokenize<S: AsRef<str>>(lines: &[S]) -> Result<Tokenized> {
    let mut tokenized = Tokenized::default();

    for (index, line) in lines.iter().enumerate() {
        let mut source = line.as_ref();
        if source.contains('\n') {
            return Err(BasicError::Tokenize {
                line: index,
                message: "embedded line break".to_string(),
            });
        }

        if let Some(label) = label_pattern().find(source) {
            tokenized
                .labels
                .insert(label.as_str().trim(), tokenized.tokens.len());
            source = source[label.end()..].trim();
        }

        for found in token_pattern().find_iter(source) {
            tokenized.tokens.push(classify(found.as_str(), index)?);
        }

        tokenized.tokens.push(Token::EndOfLine);
    }

    Ok(tokenized)
}

/// Turn one matched lexeme into a token
fn classify(lexeme: &str, line: usize) -> Result<Token> {
    let first = lexeme.chars().next().unwrap_or_default();

    if lexeme.starts_with("REM") {
        return Ok(Token::Rem);
    }
    if first.is_ascii_digit() || first == '.' {
        return lexeme
            .parse::<f64>()
            .map(|value| Token::Number {
                value,
                text: lexeme.to_string(),
            })
            .map_err(|e| BasicError::Tokenize {
                line,
                message: format!("bad number {}: {}", lexeme, e),
            });
    }
    if first == '"' {
        return Ok(Token::Str(lexeme[1..lexeme.len() - 1].to_string()));
    }
    if first == ':' || first == ';' {
        return Ok(Token::Separator(first));
    }
    if let Some(symbol) = OPERATORS.iter().find(|symbol| **symbol == lexeme) {
        return Ok(Token::Operator(*symbol));
    }
    Ok(Token::Identifier(lexeme.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_string())
    }

    fn num(text: &str) -> Token {
        Token::Number {
            value: text.parse().unwrap(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_tokenize_let_statement() {
        let result = tokenize(&["10 LET X = 5"]).unwrap();
        assert_eq!(
            result.tokens,
            vec![
                ident("LET"),
                ident("X"),
                Token::Operator("="),
                num("5"),
                Token::EndOfLine,
            ]
        );
        assert_eq!(result.labels.position("10"), Some(0));
    }

    #[test]
    fn test_labels_point_at_first_token_of_line() {
        let result = tokenize(&["10 PRINT 1", "20 PRINT 2", "PRINT 3", "040 REM"]).unwrap();
        assert_eq!(result.labels.position("10"), Some(0));
        assert_eq!(result.labels.position("20"), Some(3));
        assert_eq!(result.labels.position("040"), Some(9));
        assert_eq!(result.labels.position("40"), None);
        assert_eq!(result.labels.len(), 3);
    }

    #[test]
    fn test_numbers() {
        let result = tokenize(&["1 2.5 .25 7."]).unwrap();
        assert_eq!(
            result.tokens,
            vec![
                num("2.5"),
                num(".25"),
                num("7."),
                Token::EndOfLine,
            ]
        );
        assert_eq!(result.labels.position("1"), Some(0));
    }

    #[test]
    fn test_rem_collapses_rest_of_line() {
        let result = tokenize(&["10 REM this is \"ignored\" + 1", "REMARKABLE"]).unwrap();
        assert_eq!(
            result.tokens,
            vec![Token::Rem, Token::EndOfLine, Token::Rem, Token::EndOfLine]
        );
    }

    #[test]
    fn test_strings_are_verbatim() {
        let result = tokenize(&[r#"PRINT "A; B = 1""#]).unwrap();
        assert_eq!(result.tokens[1], Token::Str("A; B = 1".to_string()));
    }

    #[test]
    fn test_string_names_and_symbols() {
        let result = tokenize(&["A$=CHR$(65);B<=C>=D<>E:F<G>H"]).unwrap();
        assert_eq!(
            result.tokens,
            vec![
                ident("A$"),
                Token::Operator("="),
                ident("CHR$"),
                Token::Operator("("),
                num("65"),
                Token::Operator(")"),
                Token::Separator(';'),
                ident("B"),
                Token::Operator("<="),
                ident("C"),
                Token::Operator(">="),
                ident("D"),
                Token::Operator("<>"),
                ident("E"),
                Token::Separator(':'),
                ident("F"),
                Token::Operator("<"),
                ident("G"),
                Token::Operator(">"),
                ident("H"),
                Token::EndOfLine,
            ]
        );
    }

    #[test]
    fn test_unrecognised_characters_are_skipped() {
        let result = tokenize(&["PRINT 1, 2 & 3 # \"open"]).unwrap();
        assert_eq!(
            result.tokens,
            vec![
                ident("PRINT"),
                num("1"),
                num("2"),
                num("3"),
                ident("open"),
                Token::EndOfLine,
            ]
        );
    }

    #[test]
    fn test_digits_split_from_following_letters() {
        let result = tokenize(&["PRINT 3X"]).unwrap();
        assert_eq!(result.tokens[1], num("3"));
        assert_eq!(result.tokens[2], ident("X"));
    }

    #[test]
    fn test_embedded_line_break_fails() {
        let result = tokenize(&["PRINT 1", "PRINT 2\nPRINT 3"]);
        assert!(matches!(result, Err(BasicError::Tokenize { line: 1, .. })));
    }

    #[test]
    fn test_no_lines_no_tokens() {
        let lines: [&str; 0] = [];
        let result = tokenize(&lines).unwrap();
        assert!(result.tokens.is_empty());
        assert!(result.labels.is_empty());
    }

    #[test]
    fn test_display_matches_source_text() {
        assert_eq!(Token::EndOfLine.to_string(), ":EOL");
        assert_eq!(Token::Operator("<=").to_string(), "<=");
        assert_eq!(num("2.5").to_string(), "2.5");
        assert_eq!(num("007").to_string(), "007");
        assert_eq!(num("7.").to_string(), "7.");
        assert_eq!(Token::Str("HI".to_string()).to_string(), "\"HI\"");
    }

    #[test]
    fn test_is_name() {
        assert!(ident("X1").is_name());
        assert!(ident("A$").is_name());
        assert!(!ident("_X").is_name());
        assert!(!num("1").is_name());
    }

    // Property-Based Tests

    /// Blank lines contribute exactly one end-of-line marker each
    #[quickcheck]
    fn prop_blank_lines_only_produce_end_markers(count: u8, padding: u8) -> bool {
        let line = " ".repeat(padding as usize % 8);
        let lines = vec![line; count as usize];
        let result = tokenize(&lines).unwrap();
        result.tokens.len() == count as usize
            && result.tokens.iter().all(|t| *t == Token::EndOfLine)
    }

    /// Every line contributes exactly one end-of-line marker
    #[quickcheck]
    fn prop_one_end_marker_per_line(lines: Vec<String>) -> bool {
        let lines: Vec<String> = lines.into_iter().map(|l| l.replace('\n', " ")).collect();
        match tokenize(&lines) {
            Ok(result) => {
                result
                    .tokens
                    .iter()
                    .filter(|t| **t == Token::EndOfLine)
                    .count()
                    == lines.len()
            }
            Err(_) => false,
        }
    }

    /// Tokenizing the same source twice gives identical results
    #[test]
    fn prop_tokenize_is_idempotent() {
        fn property(lines: Vec<String>) -> bool {
            let lines: Vec<String> = lines.into_iter().map(|l| l.replace('\n', "")).collect();
            tokenize(&lines).ok() == tokenize(&lines).ok()
        }

        let mut qc = quickcheck::QuickCheck::new().tests(50);
        qc.quickcheck(property as fn(Vec<String>) -> bool);
    }
}
