//! Markup lexer
//!
//! Splits raw text into single characters and the three two-character
//! control sequences: `![` opens an invocation, `][` separates arguments
//! and `]!` closes an invocation. Every other `!` or `]` is literal.

use crate::util::Cursor;
use std::fmt;
use thiserror::Error;

/// Markup token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A single literal character
    Char(char),
    /// `![`
    BeginComponent,
    /// `][`
    NextArg,
    /// `]!`
    EndComponent,
}

impl Token {
    /// Append the source text this token was lexed from
    pub fn push_literal(&self, out: &mut String) {
        match self {
            Token::Char(c) => out.push(*c),
            Token::BeginComponent => out.push_str("!["),
            Token::NextArg => out.push_str("]["),
            Token::EndComponent => out.push_str("]!"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut literal = String::with_capacity(2);
        self.push_literal(&mut literal);
        write!(f, "{}", literal)
    }
}

/// Lexing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("lexing failed: looped more than {limit} times")]
    TooManyIterations { limit: usize },
}

/// Result type for lexing
pub type LexResult<T> = Result<T, LexError>;

/// Markup lexer
#[derive(Debug, Clone)]
pub struct Lexer {
    max_iterations: usize,
}

impl Lexer {
    /// Default iteration ceiling
    pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

    pub fn new() -> Self {
        Lexer {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Override the iteration ceiling
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Lex `text` into a flat token sequence
    pub fn tokenize(&self, text: &str) -> LexResult<Vec<Token>> {
        let chars: Vec<char> = text.chars().collect();
        let mut cursor = Cursor::new(&chars);
        let mut tokens = Vec::with_capacity(chars.len());

        let mut iterations = 0usize;
        while let Some(&c) = cursor.advance() {
            tokens.push(Self::lex_once(c, &mut cursor));
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(LexError::TooManyIterations {
                    limit: self.max_iterations,
                });
            }
        }

        Ok(tokens)
    }

    /// Classify `c`, consuming its partner from `cursor` if it starts a
    /// control sequence
    fn lex_once(c: char, cursor: &mut Cursor<'_, char>) -> Token {
        match (c, cursor.peek_one()) {
            ('!', Some('[')) => {
                cursor.advance();
                Token::BeginComponent
            }
            (']', Some('[')) => {
                cursor.advance();
                Token::NextArg
            }
            (']', Some('!')) => {
                cursor.advance();
                Token::EndComponent
            }
            _ => Token::Char(c),
        }
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lex `text` with the default iteration ceiling
pub fn lex(text: &str) -> LexResult<Vec<Token>> {
    Lexer::new().tokenize(text)
}
