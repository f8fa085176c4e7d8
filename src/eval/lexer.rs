//! Expression lexer/tokenizer
//!
//! Converts `${eval:...}` code into a stream of tokens.

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    String(String),
    Ident(String),

    // Operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    Eq,       // =
    EqEq,     // ==
    EqEqEq,   // ===
    Bang,     // !
    BangEq,   // !=
    BangEqEq, // !==

    Lt,   // <
    LtEq, // <=
    Gt,   // >
    GtEq, // >=

    AmpAmp,   // &&
    PipePipe, // ||

    Question,  // ?
    Colon,     // :
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .

    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]

    // Keywords
    False,
    Null,
    True,
    TypeOf,
    Undefined,
    Var,
    Let,
    Const,

    // Special
    Eof,
    Error(String),
}

/// Lexer for expression source code
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
}

impl Lexer {
    /// Create a new lexer for the given source
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
        }
    }

    /// Current offset, in characters
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Skip whitespace and comments
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.peek_next() == Some('*') => {
                    self.advance(); // /
                    self.advance(); // *
                    while let Some(c) = self.advance() {
                        if c == '*' && self.peek() == Some('/') {
                            self.advance();
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Read the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Token::Eof;
        };

        if c.is_alphabetic() || c == '_' || c == '$' {
            return self.read_identifier();
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit())) {
            return self.read_number();
        }

        if c == '"' || c == '\'' {
            return self.read_string(c);
        }

        self.advance();
        match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '=' => match self.peek() {
                Some('=') => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        Token::EqEqEq
                    } else {
                        Token::EqEq
                    }
                }
                _ => Token::Eq,
            },
            '!' => match self.peek() {
                Some('=') => {
                    self.advance();
                    if self.peek() == Some('=') {
                        self.advance();
                        Token::BangEqEq
                    } else {
                        Token::BangEq
                    }
                }
                _ => Token::Bang,
            },
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    Token::LtEq
                }
                _ => Token::Lt,
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    Token::GtEq
                }
                _ => Token::Gt,
            },
            '&' if self.peek() == Some('&') => {
                self.advance();
                Token::AmpAmp
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                Token::PipePipe
            }
            '?' => Token::Question,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            ',' => Token::Comma,
            '.' => Token::Dot,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            _ => Token::Error(format!("Unexpected character: {}", c)),
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                self.advance();
            } else {
                break;
            }
        }

        let ident: String = self.source[start..self.pos].iter().collect();

        match ident.as_str() {
            "const" => Token::Const,
            "false" => Token::False,
            "let" => Token::Let,
            "null" => Token::Null,
            "true" => Token::True,
            "typeof" => Token::TypeOf,
            "undefined" => Token::Undefined,
            "var" => Token::Var,
            _ => Token::Ident(ident),
        }
    }

    /// Read a number literal
    fn read_number(&mut self) -> Token {
        let start = self.pos;

        if self.peek() == Some('0') && matches!(self.peek_next(), Some('x' | 'X')) {
            self.advance();
            self.advance();
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits: String = self.source[digits_start..self.pos].iter().collect();
            return match u64::from_str_radix(&digits, 16) {
                Ok(n) => Token::Number(n as f64),
                Err(_) => Token::Error(format!("Invalid number: 0x{}", digits)),
            };
        }

        // Integer part
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // .
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str: String = self.source[start..self.pos].iter().collect();
        match num_str.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Error(format!("Invalid number: {}", num_str)),
        }
    }

    /// Read a string literal
    fn read_string(&mut self, quote: char) -> Token {
        self.advance();
        let mut s = String::new();

        loop {
            match self.peek() {
                None => return Token::Error("Unterminated string".to_string()),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => s.push('\n'),
                        Some('r') => s.push('\r'),
                        Some('t') => s.push('\t'),
                        Some('0') => s.push('\0'),
                        Some('u') => match self.read_unicode_escape() {
                            Some(c) => s.push(c),
                            None => return Token::Error("Invalid unicode escape".to_string()),
                        },
                        Some(c) => s.push(c),
                        None => return Token::Error("Unterminated string".to_string()),
                    }
                }
                Some(c) => {
                    self.advance();
                    s.push(c);
                }
            }
        }

        Token::String(s)
    }

    /// Read the four hex digits of a `\uXXXX` escape
    fn read_unicode_escape(&mut self) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self.advance()?.to_digit(16)?;
            code = code * 16 + digit;
        }
        char::from_u32(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("42 3.14 1e10 0x1f .5");

        assert!(matches!(lexer.next_token(), Token::Number(n) if n == 42.0));
        assert!(matches!(lexer.next_token(), Token::Number(n) if (n - 3.14).abs() < 0.001));
        assert!(matches!(lexer.next_token(), Token::Number(n) if n == 1e10));
        assert!(matches!(lexer.next_token(), Token::Number(n) if n == 31.0));
        assert!(matches!(lexer.next_token(), Token::Number(n) if n == 0.5));
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            tokens(r#""hello" 'wörld' "a\"b" 'A'"#),
            vec![
                Token::String("hello".to_string()),
                Token::String("wörld".to_string()),
                Token::String("a\"b".to_string()),
                Token::String("A".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(tokens("'abc").as_slice(), [Token::Error(_)]));
    }

    #[test]
    fn test_identifiers_and_keywords() {
        assert_eq!(
            tokens("who const typeof undefined $x"),
            vec![
                Token::Ident("who".to_string()),
                Token::Const,
                Token::TypeOf,
                Token::Undefined,
                Token::Ident("$x".to_string()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("+ === !== && || <= ! ?"),
            vec![
                Token::Plus,
                Token::EqEqEq,
                Token::BangEqEq,
                Token::AmpAmp,
                Token::PipePipe,
                Token::LtEq,
                Token::Bang,
                Token::Question,
            ]
        );
    }

    #[test]
    fn test_single_ampersand_is_error() {
        assert!(matches!(tokens("a & b").as_slice(), [_, Token::Error(_), ..]));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("1 // comment\n2 /* block */ 3");

        assert!(matches!(lexer.next_token(), Token::Number(n) if n == 1.0));
        assert!(matches!(lexer.next_token(), Token::Number(n) if n == 2.0));
        assert!(matches!(lexer.next_token(), Token::Number(n) if n == 3.0));
        assert_eq!(lexer.next_token(), Token::Eof);
    }
}
