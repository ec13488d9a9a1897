//! Conversion of YAML literals from schema overrides into values.

use fixture_core::{CollectionKind, CollectionValue, MapKind, MapValue, Value};
use serde_yaml::Value as YamlValue;

/// Convert a YAML value to a `Value`.
///
/// Numbers become `Int64` or `Float64`; the assignment step narrows them to
/// the declared type of the position they are written to.
pub fn yaml_to_value(yaml: &YamlValue) -> Value {
    match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float64(f)
            } else {
                Value::String(n.to_string())
            }
        }
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(items) => Value::Collection(CollectionValue::from_elements(
            CollectionKind::List,
            items.iter().map(yaml_to_value).collect(),
        )),
        YamlValue::Mapping(map) => {
            let mut result = MapValue::new(MapKind::Hash);
            result.entries = map
                .iter()
                .map(|(k, v)| (yaml_to_value(k), yaml_to_value(v)))
                .collect();
            Value::Map(result)
        }
        YamlValue::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}
