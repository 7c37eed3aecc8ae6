//! Validation of property maps against effective class rules

use serde::Serialize;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use tracing::error;

use crate::data::{errors::OntologyError, types::PropertyMap};
use crate::ontology::metaproperty::MetapropertyRegistry;
use crate::ontology::schema::{PropertyRule, PropertyRules};

/// Why a present property failed its type check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InvalidReason {
    /// The value does not conform to the declared kind.
    WrongType,
    /// The declared kind is not registered.
    UnsupportedType(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::WrongType => f.write_str("wrong type"),
            InvalidReason::UnsupportedType(kind) => write!(f, "unsupported type {}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidProperty {
    pub property: String,
    pub rule: PropertyRule,
    pub reason: InvalidReason,
}

/// Violation report. `missing` holds `(label, owner)`, `undefined` holds
/// `(key, class)`, `broken_classes` holds `(label, reason)` for labels naming
/// a class whose lineage cannot be walked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub missing: Vec<(String, String)>,
    pub undefined: Vec<(String, String)>,
    pub invalid: Vec<InvalidProperty>,
    pub undefined_labels: Vec<String>,
    pub broken_classes: Vec<(String, String)>,
    /// Whether `undefined` and `undefined_labels` count as violations.
    pub strict: bool,
}

impl ValidationResult {
    pub fn new(strict: bool) -> Self {
        Self {
            missing: Vec::new(),
            undefined: Vec::new(),
            invalid: Vec::new(),
            undefined_labels: Vec::new(),
            broken_classes: Vec::new(),
            strict,
        }
    }

    pub fn is_violation(&self) -> bool {
        let hard = !self.missing.is_empty()
            || !self.invalid.is_empty()
            || !self.broken_classes.is_empty();
        let soft = !self.undefined.is_empty() || !self.undefined_labels.is_empty();
        hard || (self.strict && soft)
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
            && self.undefined.is_empty()
            && self.invalid.is_empty()
            && self.undefined_labels.is_empty()
            && self.broken_classes.is_empty()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new(true)
    }
}

// Combined results are strict if either side is.
impl AddAssign for ValidationResult {
    fn add_assign(&mut self, other: Self) {
        self.missing.extend(other.missing);
        self.undefined.extend(other.undefined);
        self.invalid.extend(other.invalid);
        self.undefined_labels.extend(other.undefined_labels);
        self.broken_classes.extend(other.broken_classes);
        self.strict |= other.strict;
    }
}

impl Add for ValidationResult {
    type Output = ValidationResult;

    fn add(mut self, other: Self) -> Self::Output {
        self += other;
        self
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("valid");
        }
        let mut lines = Vec::new();
        for (label, owner) in &self.missing {
            lines.push(format!("missing required property {} (required by {})", label, owner));
        }
        for (key, class) in &self.undefined {
            lines.push(format!("undefined property {} on {}", key, class));
        }
        for invalid in &self.invalid {
            lines.push(format!(
                "invalid property {} ({}): {}",
                invalid.property, invalid.rule, invalid.reason
            ));
        }
        for label in &self.undefined_labels {
            lines.push(format!("undefined label {}", label));
        }
        for (label, reason) in &self.broken_classes {
            lines.push(format!("broken class {}: {}", label, reason));
        }
        f.write_str(&lines.join("\n"))
    }
}

/// Applies effective property rules to a candidate property map.
#[derive(Debug, Clone)]
pub struct PropertyValidator {
    registry: Arc<MetapropertyRegistry>,
    strict: bool,
}

impl PropertyValidator {
    pub fn new(registry: Arc<MetapropertyRegistry>, strict: bool) -> Self {
        Self { registry, strict }
    }

    pub fn registry(&self) -> &MetapropertyRegistry {
        &self.registry
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn validate(
        &self,
        properties: &PropertyMap,
        rules: &PropertyRules,
        class_label: &str,
    ) -> ValidationResult {
        let mut result = ValidationResult::new(self.strict);

        for (label, rule) in rules {
            if rule.is_required() && !properties.contains_key(label) {
                result.missing.push((label.clone(), rule.owner.clone()));
            }
        }

        for (key, value) in properties.iter() {
            let Some(rule) = rules.get(key) else {
                result.undefined.push((key.to_string(), class_label.to_string()));
                continue;
            };
            let Some(kind) = &rule.datatype else {
                continue;
            };
            let reason = match self.registry.check(kind, key, value) {
                Ok(true) => continue,
                Ok(false) => InvalidReason::WrongType,
                Err(e @ OntologyError::UnsupportedType { .. }) => {
                    error!("{}", e);
                    InvalidReason::UnsupportedType(kind.clone())
                }
                Err(e) => {
                    error!("Metaproperty check failed for {}: {}", key, e);
                    InvalidReason::UnsupportedType(kind.clone())
                }
            };
            result.invalid.push(InvalidProperty {
                property: key.to_string(),
                rule: rule.clone(),
                reason,
            });
        }

        result
    }
}

impl Default for PropertyValidator {
    fn default() -> Self {
        Self::new(Arc::new(MetapropertyRegistry::with_defaults()), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::Value;
    use pretty_assertions::assert_eq;

    fn species_rules() -> PropertyRules {
        let mut rules = PropertyRules::new();
        rules.insert("name".into(), PropertyRule::required("Species"));
        rules.insert("rank".into(), PropertyRule::required("Species"));
        rules
    }

    #[test]
    fn test_missing_required() {
        let properties: PropertyMap = [("name", "Homo sapiens")].into_iter().collect();
        let result = PropertyValidator::default().validate(&properties, &species_rules(), "Species");

        assert_eq!(result.missing, vec![("rank".to_string(), "Species".to_string())]);
        assert!(result.undefined.is_empty());
        assert!(result.is_violation());
    }

    #[test]
    fn test_undefined_respects_strictness() {
        let properties: PropertyMap = [("name", "x"), ("rank", "species"), ("colour", "red")]
            .into_iter()
            .collect();

        let strict = PropertyValidator::default().validate(&properties, &species_rules(), "Species");
        assert_eq!(strict.undefined, vec![("colour".to_string(), "Species".to_string())]);
        assert!(strict.is_violation());

        let lenient = PropertyValidator::new(Arc::new(MetapropertyRegistry::with_defaults()), false)
            .validate(&properties, &species_rules(), "Species");
        assert_eq!(lenient.undefined.len(), 1);
        assert!(!lenient.is_violation());
    }

    #[test]
    fn test_datatype_checks() {
        let mut rules = PropertyRules::new();
        rules.insert("created".into(), PropertyRule::defined("Node").with_datatype("DateTime"));
        rules.insert("hue".into(), PropertyRule::defined("Node").with_datatype("Colour"));
        let properties: PropertyMap = [("created", "last tuesday"), ("hue", "red")]
            .into_iter()
            .collect();

        let result = PropertyValidator::default().validate(&properties, &rules, "Node");

        assert_eq!(result.invalid.len(), 2);
        assert_eq!(result.invalid[0].property, "created");
        assert_eq!(result.invalid[0].reason, InvalidReason::WrongType);
        assert_eq!(
            result.invalid[1].reason,
            InvalidReason::UnsupportedType("Colour".to_string())
        );
    }

    #[test]
    fn test_valid_datetime_passes() {
        let mut rules = PropertyRules::new();
        rules.insert("created".into(), PropertyRule::required("Node").with_datatype("DateTime"));
        let mut properties = PropertyMap::new();
        properties.insert("created", Value::from("2024-03-01T12:00:00.000Z"));

        let result = PropertyValidator::default().validate(&properties, &rules, "Node");
        assert!(result.is_empty());
        assert!(!result.is_violation());
        assert_eq!(result.to_string(), "valid");
    }

    #[test]
    fn test_add_merges_lists() {
        let mut a = ValidationResult::new(false);
        a.missing.push(("rank".into(), "Species".into()));
        let mut b = ValidationResult::new(true);
        b.undefined_labels.push("Ghost".into());
        b.broken_classes.push(("Loop".into(), "cycle".into()));

        let combined = a.clone() + b.clone();
        assert_eq!(combined.missing.len(), 1);
        assert_eq!(combined.undefined_labels, vec!["Ghost".to_string()]);
        assert_eq!(combined.broken_classes.len(), 1);
        assert!(combined.strict);

        a += b;
        assert_eq!(a, combined);
    }

    #[test]
    fn test_broken_class_is_violation_even_when_lenient() {
        let mut result = ValidationResult::new(false);
        result.undefined_labels.push("Ghost".into());
        assert!(!result.is_violation());

        result.broken_classes.push(("Loop".into(), "cycle at Loop".into()));
        assert!(result.is_violation());
        assert_eq!(
            result.to_string(),
            "undefined label Ghost\nbroken class Loop: cycle at Loop"
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn missing_and_undefined_are_set_differences(
                declared in proptest::collection::btree_map("[a-e]", any::<bool>(), 0..5),
                keys in proptest::collection::btree_set("[a-g]", 0..7),
            ) {
                let rules: PropertyRules = declared
                    .iter()
                    .map(|(label, &required)| {
                        let rule = if required {
                            PropertyRule::required("Thing")
                        } else {
                            PropertyRule::defined("Thing")
                        };
                        (label.clone(), rule)
                    })
                    .collect();
                let properties: PropertyMap =
                    keys.iter().map(|key| (key.as_str(), "x")).collect();

                let result = PropertyValidator::default().validate(&properties, &rules, "Thing");

                let expected_missing: Vec<(String, String)> = declared
                    .iter()
                    .filter(|(label, required)| **required && !keys.contains(label.as_str()))
                    .map(|(label, _)| (label.clone(), "Thing".to_string()))
                    .collect();
                let expected_undefined: Vec<(String, String)> = keys
                    .iter()
                    .filter(|key| !declared.contains_key(key.as_str()))
                    .map(|key| (key.clone(), "Thing".to_string()))
                    .collect();

                prop_assert_eq!(&result.missing, &expected_missing);
                prop_assert_eq!(&result.undefined, &expected_undefined);
                prop_assert!(result.invalid.is_empty());
                prop_assert_eq!(
                    result.is_violation(),
                    !expected_missing.is_empty() || !expected_undefined.is_empty()
                );
            }
        }    }
}
