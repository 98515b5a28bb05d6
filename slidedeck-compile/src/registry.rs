//! Custom element rules.
//!
//! Elements whose `type` is not built in are rendered by an [`ElementRenderer`]
//! registered under that tag. An unregistered tag renders as nothing.

use std::collections::HashMap;
use std::fmt;

use serde_yaml::Value;

/// Renders one custom element.
///
/// Implemented for every `Fn(&Value) -> String + Send + Sync`, so plain
/// closures can be registered directly.
pub trait ElementRenderer: Send + Sync {
    /// Render the element's full value (including its `type` field).
    /// The returned markup is inserted verbatim.
    fn render(&self, element: &Value) -> String;
}

impl<F> ElementRenderer for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn render(&self, element: &Value) -> String {
        self(element)
    }
}

/// Mapping from custom type tag to its renderer.
#[derive(Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Box<dyn ElementRenderer>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer` for `tag`, replacing any previous rule for it.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        renderer: impl ElementRenderer + 'static,
    ) -> &mut Self {
        self.rules.insert(tag.into(), Box::new(renderer));
        self
    }

    pub fn lookup(&self, tag: &str) -> Option<&dyn ElementRenderer> {
        self.rules.get(tag).map(|renderer| &**renderer)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixed(&'static str);

    impl ElementRenderer for Fixed {
        fn render(&self, _element: &Value) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn lookup_missing_tag() {
        let registry = RuleRegistry::new();
        assert!(registry.lookup("quote").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_closure() {
        let mut registry = RuleRegistry::new();
        registry.register("quote", |element: &Value| {
            format!("<q>{}</q>", element["text"].as_str().unwrap_or_default())
        });
        let value: Value = serde_yaml::from_str("{ type: quote, text: hi }").unwrap();
        let rendered = registry.lookup("quote").unwrap().render(&value);
        assert_eq!(rendered, "<q>hi</q>");
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = RuleRegistry::new();
        registry.register("x", Fixed("first")).register("x", Fixed("second"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("x").unwrap().render(&Value::Null), "second");
    }

    #[test]
    fn tags_are_sorted() {
        let mut registry = RuleRegistry::new();
        registry.register("b", Fixed("")).register("a", Fixed(""));
        assert_eq!(registry.tags(), vec!["a", "b"]);
        assert!(registry.contains("a"));
    }
}
