//! Canvas Components - an inline component markup compiler
//!
//! Free text may embed component invocations that expand to HTML:
//!
//! ```text
//! Dear class, ![callout][Quiz on ![b][Friday]!]!
//! ```
//!
//! `![` opens an invocation, `][` separates arguments and `]!` closes it.
//! Every other `!` or `]` is ordinary text. Component definitions come
//! from a [`ComponentRegistry`] built before compiling; each one supplies
//! an HTML template with `${param}` and `${eval:code}` placeholders and a
//! CSS fragment. A compile produces the HTML plus the styles of every
//! component used, each exactly once.
//!
//! # Example
//! ```
//! use canvas_components::{compile, ComponentDefinition, ComponentRegistry};
//!
//! let registry = ComponentRegistry::builder()
//!     .component(ComponentDefinition::new("greet", ["who"], "Hello ${who}!"))
//!     .build();
//!
//! let document = compile("![greet][World]!", &registry).unwrap();
//! assert_eq!(document.html, "Hello World!");
//! assert_eq!(document.render(), "<style></style>Hello World!");
//! ```

// Markup front end
pub mod parser;

// Component definitions
pub mod registry;

// Code generation
pub mod css;
pub mod transpiler;

// `${eval:...}` expressions
pub mod eval;

// Entry points
pub mod compiler;
pub mod payload;

// Utilities
pub mod util;

// Re-export main types
pub use compiler::{CompileError, CompileOptions, Compiler, Document, compile};
pub use css::CssManager;
pub use eval::{EvalError, ExpressionEvaluator, Scope, ScriptEvaluator};
pub use parser::{LexError, ParseError, Statement};
pub use payload::PayloadError;
pub use registry::{ComponentDefinition, ComponentRegistry, RegistryError};
pub use transpiler::TranspileError;
pub use util::CursorError;
