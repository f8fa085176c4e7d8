//! Statement tree to HTML
//!
//! Resolution is depth-first and left to right. Arguments are resolved to
//! plain text before they are spliced into the parent template, and the
//! parent template is never re-parsed, so argument text cannot introduce
//! new invocations.
//!
//! Parameter substitution is textual: every `${param}` in the template is
//! replaced in declaration order, so a resolved argument containing the
//! literal text `${later_param}` is substituted again when `later_param`
//! is processed.

use crate::css::CssManager;
use crate::eval::{EvalError, ExpressionEvaluator, Scope};
use crate::parser::{Invocation, Statement};
use crate::registry::ComponentRegistry;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// `${eval:code}`; the code runs up to the first closing brace
///
/// Code handed to an [`ExpressionEvaluator`] therefore never contains `}`,
/// even inside a string literal: `${eval:'}' + who}` passes `'` as the
/// code and leaves `' + who}` as template text.
static EVAL_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{eval:(.+?)\}").expect("eval placeholder pattern is valid")
});

/// Transpile error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranspileError {
    #[error(
        "Expected {expected} arguments but only found {found} in the '{name}' component.\n\nExample usage: {usage}"
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        usage: String,
    },
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),
    #[error("Error evaluating expression in the '{component}' component: {source}")]
    Eval {
        component: String,
        #[source]
        source: EvalError,
    },
}

/// Resolves statements against a registry and an expression evaluator
pub struct Transpiler<'a, E: ExpressionEvaluator + ?Sized> {
    registry: &'a ComponentRegistry,
    evaluator: &'a E,
}

impl<'a, E: ExpressionEvaluator + ?Sized> Transpiler<'a, E> {
    pub fn new(registry: &'a ComponentRegistry, evaluator: &'a E) -> Self {
        Transpiler {
            registry,
            evaluator,
        }
    }

    /// Resolve `statements` to text, recording component styles in `css`
    pub fn transpile(
        &self,
        statements: &[Statement],
        css: &mut CssManager<'_>,
    ) -> Result<String, TranspileError> {
        let mut result = String::new();
        for statement in statements {
            match statement {
                Statement::Text(text) => result.push_str(text),
                Statement::Invocation(invocation) => {
                    result.push_str(&self.expand(invocation, css)?)
                }
            }
        }
        Ok(result)
    }

    fn expand(
        &self,
        invocation: &Invocation,
        css: &mut CssManager<'_>,
    ) -> Result<String, TranspileError> {
        let name = invocation.name.as_str();
        css.include_css(name)?;

        let definition = self
            .registry
            .lookup(name)
            .ok_or_else(|| TranspileError::UnknownComponent(name.to_string()))?;

        if invocation.args.len() != definition.arity() {
            return Err(TranspileError::ArityMismatch {
                name: name.to_string(),
                expected: definition.arity(),
                found: invocation.args.len(),
                usage: definition.usage.clone(),
            });
        }

        let mut html = definition.html.clone();
        let mut scope = Scope::new();
        for (param, arg) in definition.parameters.iter().zip(&invocation.args) {
            let value = self.transpile(arg, css)?;
            html = html.replace(&format!("${{{}}}", param), &value);
            scope.bind(param.as_str(), value);
        }

        self.expand_eval(name, &html, &scope)
    }

    /// Replace each `${eval:code}` with the evaluated result of `code`
    fn expand_eval(
        &self,
        component: &str,
        html: &str,
        scope: &Scope,
    ) -> Result<String, TranspileError> {
        if !html.contains("${eval:") {
            return Ok(html.to_string());
        }

        let mut out = String::with_capacity(html.len());
        let mut last = 0;
        for caps in EVAL_PLACEHOLDER.captures_iter(html) {
            let whole = caps.get_match();
            let Some(code) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            log::debug!(
                "evaluating in '{}':\n{}{}",
                component,
                scope.prelude(),
                code
            );

            let value = self
                .evaluator
                .evaluate(code, scope)
                .map_err(|source| TranspileError::Eval {
                    component: component.to_string(),
                    source,
                })?;

            out.push_str(&html[last..whole.start()]);
            out.push_str(&value);
            last = whole.end();
        }
        out.push_str(&html[last..]);
        Ok(out)
    }
}
