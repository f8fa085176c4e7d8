//! Compile entry point
//!
//! Runs the three stages over one input: lex, parse against the registry,
//! then transpile while collecting component styles. Any stage failure
//! aborts the whole compile with no partial output.

use crate::css::CssManager;
use crate::eval::{ExpressionEvaluator, ScriptEvaluator};
use crate::parser::{LexError, Lexer, ParseError, Parser};
use crate::registry::ComponentRegistry;
use crate::transpiler::{TranspileError, Transpiler};
use serde::Serialize;
use thiserror::Error;

/// Limits applied to a single compile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Lexer iteration ceiling
    pub max_lex_iterations: usize,
    /// Deepest allowed invocation nesting
    pub max_nesting_depth: usize,
}

impl CompileOptions {
    pub fn with_max_lex_iterations(mut self, max_lex_iterations: usize) -> Self {
        self.max_lex_iterations = max_lex_iterations;
        self
    }

    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            max_lex_iterations: Lexer::DEFAULT_MAX_ITERATIONS,
            max_nesting_depth: Parser::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Compiled output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub html: String,
    /// Styles of every component used, each once, in first-use order
    pub css: String,
}

impl Document {
    /// HTML fragment prefixed by a single style block
    pub fn render(&self) -> String {
        format!("<style>{}</style>{}", self.css, self.html)
    }
}

/// Compile error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Transpile(#[from] TranspileError),
}

/// Compiles markup against a fixed registry and evaluator
pub struct Compiler<'r, E = ScriptEvaluator> {
    registry: &'r ComponentRegistry,
    evaluator: E,
    options: CompileOptions,
}

impl<'r> Compiler<'r> {
    /// Compiler with the built-in evaluator and default limits
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Compiler {
            registry,
            evaluator: ScriptEvaluator::new(),
            options: CompileOptions::default(),
        }
    }
}

impl<'r, E: ExpressionEvaluator> Compiler<'r, E> {
    /// Replace the evaluator used for `${eval:...}` placeholders
    pub fn with_evaluator<F: ExpressionEvaluator>(self, evaluator: F) -> Compiler<'r, F> {
        Compiler {
            registry: self.registry,
            evaluator,
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &'r ComponentRegistry {
        self.registry
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile `text` into HTML and its stylesheet
    pub fn compile(&self, text: &str) -> Result<Document, CompileError> {
        log::info!("compiling {} byte(s) of markup", text.len());

        let tokens = Lexer::new()
            .with_max_iterations(self.options.max_lex_iterations)
            .tokenize(text)?;
        let statements = Parser::new(&tokens, self.registry)
            .with_max_depth(self.options.max_nesting_depth)
            .parse()?;
        log::debug!("parsed statements: {:?}", statements);

        let mut css = CssManager::new(self.registry);
        let html = Transpiler::new(self.registry, &self.evaluator).transpile(&statements, &mut css)?;
        let document = Document {
            html,
            css: css.into_css(),
        };

        log::info!(
            "compiled to {} byte(s) of html and {} byte(s) of css",
            document.html.len(),
            document.css.len()
        );
        Ok(document)
    }

    /// Compile `text` and render the result as a single fragment
    pub fn compile_document(&self, text: &str) -> Result<String, CompileError> {
        Ok(self.compile(text)?.render())
    }
}

/// Compile `text` with the built-in evaluator and default limits
pub fn compile(text: &str, registry: &ComponentRegistry) -> Result<Document, CompileError> {
    Compiler::new(registry).compile(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{EvalResult, Scope};
    use crate::registry::ComponentDefinition;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::builder()
            .component(
                ComponentDefinition::new("greet", ["who"], "Hello ${who}!")
                    .with_usage("![greet][World]!")
                    .with_style("b{}"),
            )
            .component(ComponentDefinition::new("calc", ["x"], "${eval:x * 2}"))
            .build()
    }

    #[test]
    fn test_compile() {
        let registry = registry();
        let document = compile("Say ![greet][you]!", &registry).unwrap();
        assert_eq!(
            document,
            Document {
                html: "Say Hello you!".to_string(),
                css: "b{}".to_string(),
            }
        );
    }

    #[test]
    fn test_render() {
        let registry = registry();
        assert_eq!(
            Compiler::new(&registry).compile_document("![greet][x]!").unwrap(),
            "<style>b{}</style>Hello x!"
        );
        assert_eq!(Document::default().render(), "<style></style>");
    }

    #[test]
    fn test_stage_errors_convert() {
        let registry = registry();
        assert!(matches!(
            compile("![nope]!", &registry),
            Err(CompileError::Parse(ParseError::UnknownComponent(_)))
        ));
        assert!(matches!(
            compile("![greet]!", &registry),
            Err(CompileError::Transpile(TranspileError::ArityMismatch { .. }))
        ));

        let compiler =
            Compiler::new(&registry).with_options(CompileOptions::default().with_max_lex_iterations(3));
        assert_eq!(
            compiler.compile("long text"),
            Err(CompileError::Lex(LexError::TooManyIterations { limit: 3 }))
        );
    }

    #[test]
    fn test_error_display_is_stage_message() {
        let registry = registry();
        let err = compile("![nope]!", &registry).unwrap_err();
        assert_eq!(err.to_string(), "Parse Error: Unknown component 'nope'");
    }

    #[test]
    fn test_nesting_option() {
        let registry = registry();
        let text = "![greet][![greet][![greet][x]!]!]!";
        let compiler = Compiler::new(&registry)
            .with_options(CompileOptions::default().with_max_nesting_depth(2));
        assert_eq!(
            compiler.compile(text),
            Err(CompileError::Parse(ParseError::NestingTooDeep { limit: 2 }))
        );
        assert_eq!(
            compile(text, &registry).unwrap().html,
            "Hello Hello Hello x!!!"
        );
    }

    #[test]
    fn test_custom_evaluator() {
        let registry = registry();
        let compiler = Compiler::new(&registry)
            .with_evaluator(|code: &str, _: &Scope| -> EvalResult<String> { Ok(code.len().to_string()) });
        assert_eq!(compiler.compile("![calc][4]!").unwrap().html, "5");
        assert_eq!(compile("![calc][4]!", &registry).unwrap().html, "8");
    }

    #[test]
    fn test_long_expression_in_argument_is_an_error() {
        let registry = ComponentRegistry::builder()
            .component(ComponentDefinition::new("echo", ["x"], "${x}"))
            .build();
        let text = format!("![echo][${{eval:1{}}}]!", "+1".repeat(5_000));

        let err = compile(&text, &registry).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Transpile(TranspileError::Eval {
                source: crate::eval::EvalError::TooDeep(_),
                ..
            })
        ));
    }

    #[test]
    fn test_defaults() {
        let options = CompileOptions::default();
        assert_eq!(options.max_lex_iterations, 100_000);
        assert_eq!(options.max_nesting_depth, 256);
    }
}
