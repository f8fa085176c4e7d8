//! Statement tree produced by the markup parser

/// One argument of an invocation: a full statement sequence
pub type Argument = Vec<Statement>;

/// A parsed component call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Lower-cased component name, present in the registry
    pub name: String,
    pub args: Vec<Argument>,
}

/// Markup statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Literal output text
    Text(String),
    /// Component invocation
    Invocation(Invocation),
}

impl Statement {
    pub fn text(s: impl Into<String>) -> Self {
        Statement::Text(s.into())
    }

    pub fn invocation(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Statement::Invocation(Invocation {
            name: name.into(),
            args,
        })
    }
}
