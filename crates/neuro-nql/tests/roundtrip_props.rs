//! Generated property blocks parse back to the map they were generated from,
//! with non-string values coerced to their string form.

use chrono::{TimeZone, Utc};
use neuro_kb::{PropertyMap, Value};
use neuro_nql::{parse_statement, properties_string};
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_][A-Za-z0-9_]{0,8}",
        "[a-z]{1,4}\\.[a-z]{1,4}",
        ".{1,8}",
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<String>().prop_map(Value::String),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        // 2000-01-01 to 2100-01-01
        (946_684_800i64..4_102_444_800).prop_map(|secs| {
            Value::DateTime(Utc.timestamp_opt(secs, 0).single().unwrap())
        }),
    ]
}

/// Maps built in arbitrary insertion order, not sorted by key.
fn arb_properties() -> impl Strategy<Value = PropertyMap> {
    prop::collection::vec((arb_key(), arb_value()), 0..6)
        .prop_shuffle()
        .prop_map(|entries| entries.into_iter().collect())
}

fn parsed_block(source: &str) -> Result<PropertyMap, TestCaseError> {
    let statement = parse_statement(source)
        .map_err(|e| TestCaseError::fail(format!("{}: {}", source, e)))?;
    Ok(statement.nodes[0]
        .properties
        .as_ref()
        .map(|block| block.to_property_map())
        .unwrap_or_default())
}

proptest! {
    #[test]
    fn generated_block_parses_back_stringified(properties in arb_properties()) {
        let source = format!("node Thing {}", properties_string(&properties));
        let parsed = parsed_block(&source)?;
        prop_assert_eq!(parsed, properties.stringified());
    }

    #[test]
    fn string_maps_survive_unchanged(
        entries in prop::collection::vec((arb_key(), any::<String>()), 0..6)
    ) {
        let properties: PropertyMap = entries
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        let source = format!("node Thing {}", properties_string(&properties));
        prop_assert_eq!(parsed_block(&source)?, properties);
    }

    #[test]
    fn generated_statement_reparses_to_itself(properties in arb_properties()) {
        let source = format!("node Thing {}", properties_string(&properties));
        let first = parse_statement(&source)
            .map_err(|e| TestCaseError::fail(format!("{}: {}", source, e)))?;
        let second = parse_statement(&first.to_string())
            .map_err(|e| TestCaseError::fail(format!("{}: {}", first, e)))?;
        prop_assert_eq!(first, second);
    }
}
