//! Markup front end
//!
//! Lexing and parsing of component markup into a statement tree.

pub mod ast;
pub mod grammar;
pub mod lexer;

// Re-exports
pub use ast::{Argument, Invocation, Statement};
pub use grammar::{ParseError, ParseResult, Parser, parse};
pub use lexer::{LexError, LexResult, Lexer, Token, lex};
