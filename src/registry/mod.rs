//! Component registry
//!
//! The registry maps component names to their definitions: declared
//! parameters, HTML template, CSS and a usage example for error messages.
//! It is built once, before any compile, and only ever read afterwards.
//! Parser, transpiler and CSS manager all borrow the same instance.

pub mod json;

use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// A reusable component template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    pub name: String,
    /// Example invocation shown when the component is misused
    pub usage: String,
    /// Parameter names in declaration order; the length is the arity
    pub parameters: Vec<String>,
    /// Template with `${param}` and `${eval:code}` placeholders
    pub html: String,
    pub style: String,
    /// Client-side script shipped alongside the component; unused by the compiler
    pub script: Option<String>,
}

impl ComponentDefinition {
    pub fn new<P, S>(name: impl Into<String>, parameters: P, html: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ComponentDefinition {
            name: name.into(),
            usage: String::new(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            html: html.into(),
            style: String::new(),
            script: None,
        }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Number of arguments an invocation must supply
    #[inline]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// Error while loading a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("component '{component}' argument {index} has no parameter name")]
    MissingParameterName { component: String, index: usize },
}

/// Immutable name → definition map
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, ComponentDefinition>,
}

impl ComponentRegistry {
    /// An empty registry: every invocation is an unknown component
    pub fn empty() -> Self {
        ComponentRegistry::default()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Find a component by its lower-cased name
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<&ComponentDefinition> {
        self.components.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.components.values()
    }
}

impl FromIterator<ComponentDefinition> for ComponentRegistry {
    fn from_iter<I: IntoIterator<Item = ComponentDefinition>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RegistryBuilder::default(), RegistryBuilder::component)
            .build()
    }
}

/// Collects definitions before freezing them into a [`ComponentRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    components: BTreeMap<String, ComponentDefinition>,
}

impl RegistryBuilder {
    /// Add a definition, keyed by its lower-cased name
    ///
    /// A later definition with the same name replaces the earlier one.
    pub fn component(mut self, definition: ComponentDefinition) -> Self {
        let key = definition.name.to_lowercase();
        self.components.insert(key, definition);
        self
    }

    pub fn build(self) -> ComponentRegistry {
        ComponentRegistry {
            components: self.components,
        }
    }
}
