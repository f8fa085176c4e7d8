//! Expression evaluation for `${eval:...}` placeholders
//!
//! Component templates may splice the result of a small expression into
//! their HTML. Evaluation goes through the [`ExpressionEvaluator`] trait so
//! the code-execution boundary is a single seam: the transpiler hands over
//! the expression text plus the component's parameter bindings and gets a
//! string back.
//!
//! [`ScriptEvaluator`] is the built-in implementation, a side-effect-free
//! JavaScript subset. Hosts that embed a real script engine can plug it in
//! instead, using [`Scope::prelude`] to declare the bindings.

pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod value;

pub use interpreter::Interpreter;
pub use parser::Parser;
pub use scope::Scope;
pub use value::Value;

use thiserror::Error;

/// Error from expression evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("SyntaxError: {0}")]
    Syntax(String),
    #[error("ReferenceError: {0} is not defined")]
    Reference(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("RangeError: {0}")]
    Range(String),
    #[error("InternalError: expression nested deeper than {0} levels")]
    TooDeep(usize),
    /// Failure reported by an external evaluator
    #[error("{0}")]
    Host(String),
}

/// Result type for evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Executes placeholder code against a set of bindings
pub trait ExpressionEvaluator {
    /// Evaluate `code` with `scope` in view and stringify the result
    fn evaluate(&self, code: &str, scope: &Scope) -> EvalResult<String>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &Scope) -> EvalResult<String>,
{
    fn evaluate(&self, code: &str, scope: &Scope) -> EvalResult<String> {
        self(code, scope)
    }
}

/// Built-in evaluator for a pure JavaScript expression subset
#[derive(Debug, Clone)]
pub struct ScriptEvaluator {
    max_depth: usize,
}

impl ScriptEvaluator {
    pub fn new() -> Self {
        ScriptEvaluator {
            max_depth: Parser::DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply expressions may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate `code` and return the completion value unconverted
    pub fn eval_value(&self, code: &str, scope: &Scope) -> EvalResult<Value> {
        let program = Parser::new(code)?
            .with_max_depth(self.max_depth)
            .parse_program()?;
        Interpreter::new(scope).run(&program)
    }
}

impl Default for ScriptEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEvaluator for ScriptEvaluator {
    fn evaluate(&self, code: &str, scope: &Scope) -> EvalResult<String> {
        Ok(self.eval_value(code, scope)?.to_js_string())
    }
}
