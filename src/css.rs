//! Per-compile stylesheet accumulation

use crate::registry::ComponentRegistry;
use crate::transpiler::TranspileError;
use indexmap::IndexSet;

/// Collects the style of every component used in one compile
///
/// Each component contributes its style once, at the point of its first
/// inclusion. Distinct components with identical CSS text are both kept.
#[derive(Debug)]
pub struct CssManager<'r> {
    registry: &'r ComponentRegistry,
    included: IndexSet<String>,
    css: String,
}

impl<'r> CssManager<'r> {
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        CssManager {
            registry,
            included: IndexSet::new(),
            css: String::new(),
        }
    }

    /// Append the style of `name` unless it was already included
    ///
    /// Returns `true` when the style was appended by this call.
    pub fn include_css(&mut self, name: &str) -> Result<bool, TranspileError> {
        if self.included.contains(name) {
            return Ok(false);
        }
        let definition = self
            .registry
            .lookup(name)
            .ok_or_else(|| TranspileError::UnknownComponent(name.to_string()))?;

        self.css.push_str(&definition.style);
        self.included.insert(name.to_string());
        Ok(true)
    }

    /// The stylesheet accumulated so far
    #[inline]
    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn into_css(self) -> String {
        self.css
    }

    /// Included component names in first-inclusion order
    pub fn included(&self) -> impl Iterator<Item = &str> {
        self.included.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentDefinition;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::builder()
            .component(ComponentDefinition::new("a", ["x"], "").with_style(".a{}"))
            .component(ComponentDefinition::new("b", ["x"], "").with_style(".b{}"))
            .component(ComponentDefinition::new("c", ["x"], "").with_style(".a{}"))
            .component(ComponentDefinition::new("plain", ["x"], ""))
            .build()
    }

    #[test]
    fn test_first_inclusion_order() {
        let registry = registry();
        let mut css = CssManager::new(&registry);

        assert!(css.include_css("b").unwrap());
        assert!(css.include_css("a").unwrap());
        assert_eq!(css.css(), ".b{}.a{}");
        assert_eq!(css.included().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn test_include_is_idempotent() {
        let registry = registry();
        let mut css = CssManager::new(&registry);

        css.include_css("a").unwrap();
        assert!(!css.include_css("a").unwrap());
        css.include_css("b").unwrap();
        assert!(!css.include_css("a").unwrap());
        assert_eq!(css.into_css(), ".a{}.b{}");
    }

    #[test]
    fn test_identical_css_from_distinct_components_is_kept() {
        let registry = registry();
        let mut css = CssManager::new(&registry);

        css.include_css("a").unwrap();
        css.include_css("c").unwrap();
        assert_eq!(css.css(), ".a{}.a{}");
    }

    #[test]
    fn test_empty_style_is_still_recorded() {
        let registry = registry();
        let mut css = CssManager::new(&registry);

        assert!(css.include_css("plain").unwrap());
        assert!(!css.include_css("plain").unwrap());
        assert_eq!(css.css(), "");
    }

    #[test]
    fn test_unknown_component() {
        let registry = registry();
        let mut css = CssManager::new(&registry);

        assert_eq!(
            css.include_css("nope"),
            Err(TranspileError::UnknownComponent("nope".to_string()))
        );
        assert_eq!(css.included().count(), 0);
    }
}
