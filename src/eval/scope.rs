//! Variable bindings visible to `${eval:...}` code

use serde_json::Value as Json;

/// Ordered parameter bindings for one component expansion
///
/// Each component parameter is bound to the fully resolved text of its
/// argument. Order matches the component's parameter declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    bindings: Vec<(String, String)>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Bind `name` to `value`; a later binding shadows an earlier one
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.push((name.into(), value.into()));
    }

    /// Look up the most recent binding for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Render the bindings as script declarations, one per line
    ///
    /// Values are JSON-serialized, so the output can be prepended to code
    /// handed to a JavaScript engine: `const who = "world";`.
    pub fn prelude(&self) -> String {
        self.bindings
            .iter()
            .map(|(name, value)| format!("const {} = {};\n", name, Json::String(value.clone())))
            .collect()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.bind(name, value);
        }
        scope
    }
}
