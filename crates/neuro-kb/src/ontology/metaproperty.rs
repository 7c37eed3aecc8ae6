//! Metaproperty registry: named type checks applied to property values

use chrono::DateTime;
use std::collections::HashMap;
use std::fmt;

use crate::data::{errors::OntologyError, types::Value};

type Check = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Open map from metaproperty kind (the `type` of an `OntologyProperty`) to the
/// function deciding whether a value conforms to it.
pub struct MetapropertyRegistry {
    checks: HashMap<String, Check>,
}

impl MetapropertyRegistry {
    /// An empty registry. Every kind is unsupported until registered.
    pub fn new() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Registry with the built-in kinds: `DateTime`, `String`, `Integer`,
    /// `Float`, `Boolean` and `Url`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("DateTime", is_datetime);
        registry.register("String", |v| matches!(v, Value::String(_)));
        registry.register("Integer", |v| match v {
            Value::Integer(_) => true,
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        });
        registry.register("Float", |v| match v {
            Value::Float(_) | Value::Integer(_) => true,
            Value::String(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        });
        registry.register("Boolean", |v| match v {
            Value::Bool(_) => true,
            Value::String(s) => matches!(s.as_str(), "true" | "false"),
            _ => false,
        });
        registry.register("Url", is_url);
        registry
    }

    /// Adds or replaces the check for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, check: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.checks.insert(kind.into(), Box::new(check));
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.checks.contains_key(kind)
    }

    /// Checks `value` of `property` against `kind`.
    ///
    /// `Ok(false)` means the value is wrong for a known kind; an unknown kind
    /// is an `UnsupportedType` error.
    pub fn check(&self, kind: &str, property: &str, value: &Value) -> Result<bool, OntologyError> {
        let check = self
            .checks
            .get(kind)
            .ok_or_else(|| OntologyError::UnsupportedType {
                kind: kind.to_string(),
                property: property.to_string(),
            })?;
        Ok(check(value))
    }
}

impl Default for MetapropertyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for MetapropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("MetapropertyRegistry").field("kinds", &kinds).finish()
    }
}

fn is_datetime(value: &Value) -> bool {
    match value {
        Value::DateTime(_) => true,
        Value::String(s) => DateTime::parse_from_rfc3339(s).is_ok(),
        _ => false,
    }
}

fn is_url(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    let Some((scheme, rest)) = s.split_once("://") else {
        return false;
    };
    let scheme_ok = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok && !rest.is_empty() && !rest.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_builtin_kinds() {
        let registry = MetapropertyRegistry::with_defaults();

        assert!(registry.check("DateTime", "created", &Value::DateTime(Utc::now())).unwrap());
        assert!(registry
            .check("DateTime", "created", &Value::from("2023-01-01T10:00:00.000Z"))
            .unwrap());
        assert!(!registry.check("DateTime", "created", &Value::from("yesterday")).unwrap());

        assert!(registry.check("Integer", "n", &Value::Integer(3)).unwrap());
        assert!(registry.check("Integer", "n", &Value::from("42")).unwrap());
        assert!(!registry.check("Integer", "n", &Value::from("4.2")).unwrap());
        assert!(registry.check("Float", "x", &Value::from("4.2")).unwrap());
        assert!(registry.check("Boolean", "b", &Value::from("true")).unwrap());
        assert!(!registry.check("String", "s", &Value::Integer(1)).unwrap());
    }

    #[test]
    fn test_url() {
        let registry = MetapropertyRegistry::with_defaults();
        assert!(registry.check("Url", "link", &Value::from("https://example.org/x")).unwrap());
        assert!(!registry.check("Url", "link", &Value::from("example.org")).unwrap());
        assert!(!registry.check("Url", "link", &Value::from("http://a b")).unwrap());
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let registry = MetapropertyRegistry::with_defaults();
        let err = registry.check("Colour", "hue", &Value::from("red")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported property type: Colour for hue");
    }

    #[test]
    fn test_register_custom_kind() {
        let mut registry = MetapropertyRegistry::new();
        assert!(!registry.supports("Rank"));
        registry.register("Rank", |v| {
            matches!(v.as_str(), Some("species" | "genus" | "family"))
        });
        assert!(registry.check("Rank", "rank", &Value::from("genus")).unwrap());
        assert!(!registry.check("Rank", "rank", &Value::from("kingdom")).unwrap());
    }
}
