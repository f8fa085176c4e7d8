//! Loading a registry from the serialized build output
//!
//! The component build step emits one JSON object keyed by component name:
//!
//! ```json
//! {
//!   "greet": {
//!     "name": "greet",
//!     "usage": "![greet][World]!",
//!     "arguments": [["who", "text"]],
//!     "html": "Hello ${who}!",
//!     "style": ".greet{color:red}",
//!     "script": ""
//!   }
//! }
//! ```
//!
//! Each `arguments` entry starts with the parameter name; anything after it
//! is an annotation for humans and is ignored here.

use super::{ComponentDefinition, ComponentRegistry, RegistryError};
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawComponent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    usage: String,
    #[serde(default)]
    arguments: Vec<Vec<Json>>,
    html: String,
    #[serde(default)]
    style: String,
    #[serde(default)]
    script: Option<String>,
}

impl RawComponent {
    fn into_definition(self, key: &str) -> Result<ComponentDefinition, RegistryError> {
        let name = key.to_lowercase();

        let parameters = self
            .arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| match argument.first() {
                Some(Json::String(param)) if !param.is_empty() => Ok(param.clone()),
                _ => Err(RegistryError::MissingParameterName {
                    component: name.clone(),
                    index,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(declared) = &self.name {
            if declared.to_lowercase() != name {
                log::warn!(
                    "component registered as '{}' declares name '{}'; using '{}'",
                    key,
                    declared,
                    name
                );
            }
        }

        let mut definition = ComponentDefinition::new(name, parameters, self.html)
            .with_usage(self.usage)
            .with_style(self.style);
        definition.script = self.script;
        Ok(definition)
    }
}

impl ComponentRegistry {
    /// Parse a registry from the build step's JSON output
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: BTreeMap<String, RawComponent> = serde_json::from_str(json)?;

        let mut builder = ComponentRegistry::builder();
        for (key, component) in raw {
            builder = builder.component(component.into_definition(&key)?);
        }
        let registry = builder.build();

        log::debug!("loaded {} component(s) into registry", registry.len());
        Ok(registry)
    }

    /// Read and parse a registry file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"{
        "greet": {
            "name": "greet",
            "usage": "![greet][World]!",
            "arguments": [["who", "text"]],
            "html": "Hello ${who}!",
            "style": ".greet{color:red}",
            "script": ""
        },
        "Divider": {
            "name": "Divider",
            "html": "<hr>"
        }
    }"#;

    #[test]
    fn test_from_json() {
        let registry = ComponentRegistry::from_json(REGISTRY).unwrap();
        assert_eq!(registry.len(), 2);

        let greet = registry.lookup("greet").unwrap();
        assert_eq!(greet.parameters, ["who"]);
        assert_eq!(greet.usage, "![greet][World]!");
        assert_eq!(greet.style, ".greet{color:red}");
        assert_eq!(greet.script.as_deref(), Some(""));

        let divider = registry.lookup("divider").unwrap();
        assert_eq!(divider.arity(), 0);
        assert_eq!(divider.usage, "");
        assert_eq!(divider.style, "");
        assert_eq!(divider.name, "divider");
    }

    #[test]
    fn test_missing_parameter_name() {
        let json = r#"{ "bad": { "arguments": [["ok"], []], "html": "" } }"#;
        let err = ComponentRegistry::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingParameterName { ref component, index: 1 } if component == "bad"
        ));
    }

    #[test]
    fn test_non_string_parameter_name() {
        let json = r#"{ "bad": { "arguments": [[3]], "html": "" } }"#;
        assert!(matches!(
            ComponentRegistry::from_json(json),
            Err(RegistryError::MissingParameterName { index: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            ComponentRegistry::from_json("[1, 2]"),
            Err(RegistryError::Json(_))
        ));
        assert!(matches!(
            ComponentRegistry::from_json(r#"{ "x": { "usage": "no html" } }"#),
            Err(RegistryError::Json(_))
        ));
    }

    #[test]
    fn test_from_missing_path() {
        let err = ComponentRegistry::from_path("/nonexistent/registry.json").unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/registry.json"));
    }
}
