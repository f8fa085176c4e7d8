//! Expression parser
//!
//! Single-pass recursive-descent parser producing a small expression tree.
//! Precedence follows JavaScript for the supported operators.

use super::lexer::{Lexer, Token};
use super::{EvalError, EvalResult};

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
}

/// Binary (non short-circuiting) operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Short-circuiting operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Undefined,
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `var`/`let`/`const` binding
    Declare { name: String, init: Option<Expr> },
    /// Expression whose value becomes the completion value
    Expr(Expr),
}

/// Parser state
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    /// Default nesting limit
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Create a new parser for the given source
    pub fn new(source: &str) -> EvalResult<Self> {
        let mut parser = Parser {
            lexer: Lexer::new(source),
            current_token: Token::Eof,
            depth: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        };
        parser.advance()?;
        Ok(parser)
    }

    /// Limit how deeply expressions may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole source as a sequence of statements
    pub fn parse_program(mut self) -> EvalResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while self.current_token != Token::Eof {
            if self.current_token == Token::Semicolon {
                self.advance()?;
                continue;
            }

            statements.push(self.statement()?);

            match self.current_token {
                Token::Semicolon => self.advance()?,
                Token::Eof => {}
                _ => return Err(self.unexpected("';'")),
            }
        }

        Ok(statements)
    }

    /// Advance to the next token
    fn advance(&mut self) -> EvalResult<()> {
        self.current_token = self.lexer.next_token();
        if let Token::Error(msg) = &self.current_token {
            return Err(EvalError::Syntax(format!(
                "{} (at offset {})",
                msg,
                self.lexer.position()
            )));
        }
        Ok(())
    }

    /// Check if current token matches expected
    fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(&self.current_token) == std::mem::discriminant(expected)
    }

    /// Expect a specific token, advance if matched
    fn expect(&mut self, expected: Token) -> EvalResult<()> {
        if self.check(&expected) {
            self.advance()
        } else {
            Err(self.unexpected(&format!("{:?}", expected)))
        }
    }

    fn unexpected(&self, expected: &str) -> EvalError {
        EvalError::Syntax(format!(
            "expected {}, found {:?}",
            expected, self.current_token
        ))
    }

    /// Count one more level of nesting, failing past the limit
    fn deepen(&mut self) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(EvalError::TooDeep(self.max_depth));
        }
        Ok(())
    }

    /// Run `f` one nesting level deeper
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        self.deepen()?;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn statement(&mut self) -> EvalResult<Stmt> {
        if matches!(self.current_token, Token::Var | Token::Let | Token::Const) {
            self.advance()?;
            let Token::Ident(name) = self.current_token.clone() else {
                return Err(self.unexpected("identifier"));
            };
            self.advance()?;

            let init = if self.current_token == Token::Eq {
                self.advance()?;
                Some(self.expression()?)
            } else {
                None
            };
            return Ok(Stmt::Declare { name, init });
        }

        Ok(Stmt::Expr(self.expression()?))
    }

    /// expression := logical_or ('?' expression ':' expression)?
    fn expression(&mut self) -> EvalResult<Expr> {
        self.nested(|p| {
            let test = p.logical_or()?;
            if p.current_token != Token::Question {
                return Ok(test);
            }
            p.advance()?;
            let consequent = p.expression()?;
            p.expect(Token::Colon)?;
            let alternate = p.expression()?;
            Ok(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            })
        })
    }

    // The binary and postfix loops build left-nested trees, one level per
    // operator, so each iteration counts against the depth limit. The
    // counter is restored once the chain is complete.

    fn logical_or(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.logical_and()?;
        while self.current_token == Token::PipePipe {
            self.deepen()?;
            self.advance()?;
            let right = self.logical_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = base;
        Ok(left)
    }

    fn logical_and(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.equality()?;
        while self.current_token == Token::AmpAmp {
            self.deepen()?;
            self.advance()?;
            let right = self.equality()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = base;
        Ok(left)
    }

    fn equality(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.relational()?;
        loop {
            let op = match self.current_token {
                Token::EqEq => BinaryOp::Eq,
                Token::BangEq => BinaryOp::NotEq,
                Token::EqEqEq => BinaryOp::StrictEq,
                Token::BangEqEq => BinaryOp::StrictNotEq,
                _ => break,
            };
            self.deepen()?;
            self.advance()?;
            let right = self.relational()?;
            left = binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn relational(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.additive()?;
        loop {
            let op = match self.current_token {
                Token::Lt => BinaryOp::Lt,
                Token::LtEq => BinaryOp::LtEq,
                Token::Gt => BinaryOp::Gt,
                Token::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.deepen()?;
            self.advance()?;
            let right = self.additive()?;
            left = binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn additive(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.deepen()?;
            self.advance()?;
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn multiplicative(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut left = self.unary()?;
        loop {
            let op = match self.current_token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.deepen()?;
            self.advance()?;
            let right = self.unary()?;
            left = binary(op, left, right);
        }
        self.depth = base;
        Ok(left)
    }

    fn unary(&mut self) -> EvalResult<Expr> {
        let op = match self.current_token {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Neg,
            Token::Plus => UnaryOp::Plus,
            Token::TypeOf => UnaryOp::TypeOf,
            _ => return self.postfix(),
        };
        self.advance()?;
        let operand = self.nested(|p| p.unary())?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> EvalResult<Expr> {
        let base = self.depth;
        let mut expr = self.primary()?;
        loop {
            match self.current_token {
                Token::Dot => {
                    self.deepen()?;
                    self.advance()?;
                    let Token::Ident(property) = self.current_token.clone() else {
                        return Err(self.unexpected("property name"));
                    };
                    self.advance()?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                    };
                }
                Token::LBracket => {
                    self.deepen()?;
                    self.advance()?;
                    let index = self.expression()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                Token::LParen => {
                    self.deepen()?;
                    self.advance()?;
                    let args = self.arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                _ => break,
            }
        }
        self.depth = base;
        Ok(expr)
    }

    /// Comma separated arguments; the opening paren is already consumed
    fn arguments(&mut self) -> EvalResult<Vec<Expr>> {
        let mut args = Vec::new();
        while self.current_token != Token::RParen {
            args.push(self.expression()?);
            if self.current_token == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    fn primary(&mut self) -> EvalResult<Expr> {
        if self.current_token == Token::LParen {
            self.advance()?;
            let inner = self.expression()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }

        let expr = match &self.current_token {
            Token::Number(n) => Expr::Number(*n),
            Token::String(s) => Expr::Str(s.clone()),
            Token::Ident(name) => Expr::Ident(name.clone()),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Null => Expr::Null,
            Token::Undefined => Expr::Undefined,
            _ => return Err(self.unexpected("expression")),
        };
        self.advance()?;
        Ok(expr)
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
