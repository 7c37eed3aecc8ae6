//! Generator: the inverse of parsing.
//!
//! Serializes property maps, and any parse tree, into canonical NQL text. The
//! output quoting (backticked keys with doubled backticks, double-quoted values
//! with backslash escapes) is also valid Cypher, so generated fragments can be
//! spliced into match and merge templates.

use neuro_kb::PropertyMap;
use std::fmt::Display;

use crate::ast::{Identifier, PropertyBlock};

/// `{key: "value", other: "value"}`, or `{}` for an empty map. Keys that are
/// not CNAMEs are backtick-quoted; every value is coerced to its string form.
pub fn properties_string(properties: &PropertyMap) -> String {
    PropertyBlock::from(properties).to_string()
}

/// Canonical text of any parse-tree node.
pub fn reconstruct<T: Display + ?Sized>(tree: &T) -> String {
    tree.to_string()
}

/// `label {properties}` with the label quoted as needed; the block is omitted
/// when `properties` is empty.
pub fn node_pattern_string(label: &str, properties: &PropertyMap) -> String {
    let label = Identifier::new(label);
    if properties.is_empty() {
        label.to_string()
    } else {
        format!("{} {}", label, properties_string(properties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_statement;
    use neuro_kb::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quotes_non_cname_keys() {
        let properties: PropertyMap = [("a.b", "1"), ("plain", "2")].into_iter().collect();
        assert_eq!(properties_string(&properties), "{`a.b`: \"1\", plain: \"2\"}");
    }

    #[test]
    fn test_empty_map() {
        assert_eq!(properties_string(&PropertyMap::new()), "{}");
    }

    #[test]
    fn test_values_are_coerced_and_escaped() {
        let mut properties = PropertyMap::new();
        properties.insert("count", Value::Integer(3));
        properties.insert("flag", Value::Bool(false));
        properties.insert("quote", Value::from("say \"hi\"\\"));
        properties.insert("dash-key", Value::from("line\nbreak"));

        assert_eq!(
            properties_string(&properties),
            r#"{count: "3", flag: "false", quote: "say \"hi\"\\", `dash-key`: "line\nbreak"}"#
        );
    }

    #[test]
    fn test_node_pattern_string() {
        let properties: PropertyMap = [("rank", "species")].into_iter().collect();
        assert_eq!(node_pattern_string("Species", &PropertyMap::new()), "Species");
        assert_eq!(
            node_pattern_string("Homo sapiens", &properties),
            "`Homo sapiens` {rank: \"species\"}"
        );
    }

    #[test]
    fn test_reconstruct_statement() {
        let statement = parse_statement("require_property   Species{ rank :\"x\" ,}  rank").unwrap();
        assert_eq!(
            reconstruct(&statement),
            "require_property Species {rank: \"x\"} rank"
        );
    }
}
