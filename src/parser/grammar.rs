//! Markup parser
//!
//! Recursive descent over the token sequence with a single production:
//!
//! ```text
//! statements(expect_end) := ( invocation | text )*
//! invocation             := "![" name ( "][" statements(true) )* "]!"
//! ```
//!
//! Inside an argument (`expect_end`), a `][` or `]!` ends the statement
//! list and is pushed back for the enclosing invocation to consume. At the
//! top level the same tokens are plain text.

use super::ast::{Argument, Invocation, Statement};
use super::lexer::Token;
use crate::registry::ComponentRegistry;
use crate::util::{Cursor, CursorError};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Component names are ASCII word characters
static COMPONENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?-u:\w)+$").expect("component name pattern is valid"));

/// Parse error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Parse Error: Component name must be made of word characters: '{0}'")]
    InvalidName(String),
    #[error("Parse Error: Unknown component '{0}'")]
    UnknownComponent(String),
    #[error("Parse Error: Expected '][' or ']!' after component '{component}', found '{found}'")]
    UnexpectedToken { component: String, found: Token },
    #[error("Parse Error: Expected more text after component '{component}'")]
    UnexpectedEnd {
        component: String,
        #[source]
        source: CursorError,
    },
    #[error("Parse Error: Components nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Result type for parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Parser state
pub struct Parser<'t, 'r> {
    tokens: Cursor<'t, Token>,
    registry: &'r ComponentRegistry,
    depth: usize,
    max_depth: usize,
}

impl<'t, 'r> Parser<'t, 'r> {
    /// Default limit on invocation nesting
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Create a parser over `tokens`, validating names against `registry`
    pub fn new(tokens: &'t [Token], registry: &'r ComponentRegistry) -> Self {
        Parser {
            tokens: Cursor::new(tokens),
            registry,
            depth: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply invocations may nest inside arguments
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the full token sequence
    pub fn parse(mut self) -> ParseResult<Vec<Statement>> {
        self.statements(false)
    }

    fn statements(&mut self, expect_end: bool) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        while let Some(token) = self.tokens.advance() {
            match token {
                Token::BeginComponent => statements.push(self.invocation()?),
                Token::NextArg | Token::EndComponent if expect_end => {
                    self.tokens.unread();
                    return Ok(statements);
                }
                // Stray separators at the top level are literal text
                Token::NextArg | Token::EndComponent | Token::Char(_) => {
                    let mut text = String::new();
                    token.push_literal(&mut text);
                    self.text_run(&mut text);
                    statements.push(Statement::Text(text));
                }
            }
        }

        Ok(statements)
    }

    /// Append the run of `Char` tokens at the cursor to `out`
    fn text_run(&mut self, out: &mut String) {
        while let Some(Token::Char(c)) = self.tokens.peek_one() {
            out.push(*c);
            self.tokens.advance();
        }
    }

    /// Parse an invocation; the opening `![` is already consumed
    fn invocation(&mut self) -> ParseResult<Statement> {
        let mut raw_name = String::new();
        self.text_run(&mut raw_name);
        let name = raw_name.to_lowercase();

        if !COMPONENT_NAME.is_match(&name) {
            return Err(ParseError::InvalidName(name));
        }
        if !self.registry.contains(&name) {
            return Err(ParseError::UnknownComponent(name));
        }

        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        let mut args: Vec<Argument> = Vec::new();
        let mut next = self.take_token(&name)?;
        while next != Token::EndComponent {
            if next != Token::NextArg {
                return Err(ParseError::UnexpectedToken {
                    component: name,
                    found: next,
                });
            }
            args.push(self.statements(true)?);
            next = self.take_token(&name)?;
        }

        self.depth -= 1;
        Ok(Statement::Invocation(Invocation { name, args }))
    }

    fn take_token(&mut self, component: &str) -> ParseResult<Token> {
        self.tokens
            .take_one()
            .copied()
            .map_err(|source| ParseError::UnexpectedEnd {
                component: component.to_string(),
                source,
            })
    }
}

/// Parse `tokens` with the default nesting limit
pub fn parse(tokens: &[Token], registry: &ComponentRegistry) -> ParseResult<Vec<Statement>> {
    Parser::new(tokens, registry).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::lex;
    use crate::registry::ComponentDefinition;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::builder()
            .component(ComponentDefinition::new("greet", ["who"], "Hello ${who}!"))
            .component(ComponentDefinition::new("pair", ["a", "b"], "${a}/${b}"))
            .component(ComponentDefinition::new("hr", Vec::<String>::new(), "<hr>"))
            .build()
    }

    fn parse_str(text: &str) -> ParseResult<Vec<Statement>> {
        let tokens = lex(text).unwrap();
        parse(&tokens, &registry())
    }

    #[test]
    fn test_plain_text_is_one_statement() {
        assert_eq!(
            parse_str("just some text").unwrap(),
            vec![Statement::text("just some text")]
        );
        assert!(parse_str("").unwrap().is_empty());
    }

    #[test]
    fn test_invocation() {
        assert_eq!(
            parse_str("a ![greet][World]! b").unwrap(),
            vec![
                Statement::text("a "),
                Statement::invocation("greet", vec![vec![Statement::text("World")]]),
                Statement::text(" b"),
            ]
        );
    }

    #[test]
    fn test_name_is_lower_cased() {
        assert_eq!(
            parse_str("![GREET][x]!").unwrap(),
            vec![Statement::invocation("greet", vec![vec![Statement::text("x")]])]
        );
    }

    #[test]
    fn test_zero_arguments() {
        assert_eq!(
            parse_str("![hr]!").unwrap(),
            vec![Statement::invocation("hr", vec![])]
        );
    }

    #[test]
    fn test_empty_argument() {
        assert_eq!(
            parse_str("![pair][][b]!").unwrap(),
            vec![Statement::invocation(
                "pair",
                vec![vec![], vec![Statement::text("b")]]
            )]
        );
    }

    #[test]
    fn test_nested_invocation() {
        assert_eq!(
            parse_str("![greet][x ![greet][y]! z]!").unwrap(),
            vec![Statement::invocation(
                "greet",
                vec![vec![
                    Statement::text("x "),
                    Statement::invocation("greet", vec![vec![Statement::text("y")]]),
                    Statement::text(" z"),
                ]]
            )]
        );
    }

    #[test]
    fn test_argument_count_follows_separators() {
        let statements = parse_str("![pair][a][b][c]!").unwrap();
        let [Statement::Invocation(invocation)] = statements.as_slice() else {
            panic!("expected a single invocation");
        };
        assert_eq!(invocation.args.len(), 3);
    }

    #[test]
    fn test_stray_separators_at_top_level_are_text() {
        assert_eq!(
            parse_str("a ]! b ][ c").unwrap(),
            vec![
                Statement::text("a "),
                Statement::text("]! b "),
                Statement::text("][ c"),
            ]
        );
        assert_eq!(
            parse_str("5 ] things").unwrap(),
            vec![Statement::text("5 ] things")]
        );
    }

    #[test]
    fn test_unknown_component() {
        assert_eq!(
            parse_str("![nope][x]!"),
            Err(ParseError::UnknownComponent("nope".to_string()))
        );
    }

    #[test]
    fn test_invalid_name() {
        assert_eq!(
            parse_str("![gr eet][x]!"),
            Err(ParseError::InvalidName("gr eet".to_string()))
        );
        assert_eq!(
            parse_str("![][x]!"),
            Err(ParseError::InvalidName(String::new()))
        );
        assert_eq!(
            parse_str("![grüß][x]!"),
            Err(ParseError::InvalidName("grüß".to_string()))
        );
    }

    #[test]
    fn test_unexpected_token_after_name() {
        assert_eq!(
            parse_str("![greet![hr]!]!"),
            Err(ParseError::UnexpectedToken {
                component: "greet".to_string(),
                found: Token::BeginComponent,
            })
        );
    }

    #[test]
    fn test_unterminated_invocation() {
        assert!(matches!(
            parse_str("![greet][World"),
            Err(ParseError::UnexpectedEnd { ref component, .. }) if component == "greet"
        ));
        assert!(matches!(
            parse_str("![greet"),
            Err(ParseError::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn test_error_message_names_token() {
        let err = parse_str("![greet![hr]!]!").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse Error: Expected '][' or ']!' after component 'greet', found '!['"
        );
    }

    #[test]
    fn test_nesting_limit() {
        let text = format!("{}x{}", "![greet][".repeat(10), "]!".repeat(10));
        let tokens = lex(&text).unwrap();
        let registry = registry();

        assert!(Parser::new(&tokens, &registry).parse().is_ok());
        assert_eq!(
            Parser::new(&tokens, &registry).with_max_depth(5).parse(),
            Err(ParseError::NestingTooDeep { limit: 5 })
        );
    }
}
