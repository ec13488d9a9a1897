//! Conformance of generated values to the declared type of their position.
//!
//! Generators are free to return any `Value`. Before assignment the driver
//! converts it to the representation the position expects (an `Int64` into
//! an `int` field, a string into a `Uuid` field, an array into a list) or
//! rejects it with `PopulateError::Assignment`.

use crate::error::{PopulateError, Result};
use crate::node::{Node, NodeId, NodeKind, NodeTree};
use chrono::{DateTime, NaiveDate, Utc};
use fixture_core::{BuiltinType, ClassKind, CollectionValue, Value};
use uuid::Uuid;

/// Convert `value` for assignment to the position of node `id`.
///
/// Null passes through unchanged; callers decide what null means for the
/// position.
pub fn conform(tree: &NodeTree, id: NodeId, value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(value);
    }
    let node = tree.node(id);

    let converted = match (&node.kind, value) {
        (NodeKind::Collection { kind, .. }, Value::Collection(mut collection)) => {
            collection.kind = *kind;
            Ok(Value::Collection(collection))
        }
        (NodeKind::Collection { kind, .. }, Value::Array(items)) => {
            Ok(Value::Collection(CollectionValue::from_elements(*kind, items)))
        }
        (NodeKind::Map { kind, .. }, Value::Map(mut map)) => {
            map.kind = *kind;
            Ok(Value::Map(map))
        }
        (NodeKind::Array { .. }, Value::Array(items)) => Ok(Value::Array(items)),
        (NodeKind::Array { .. }, Value::Collection(collection)) => {
            Ok(Value::Array(collection.elements))
        }
        (NodeKind::Plain, value) => conform_plain(tree, node, value),
        (_, value) => Err(value),
    };

    converted.map_err(|rejected| PopulateError::Assignment {
        path: tree.path(id),
        declared: node.declared_type.to_string(),
        actual: rejected.type_label(),
    })
}

/// Returns the rejected value on mismatch.
fn conform_plain(tree: &NodeTree, node: &Node, value: Value) -> std::result::Result<Value, Value> {
    match node.declared_type.builtin() {
        Some(BuiltinType::Primitive(kind) | BuiltinType::Boxed(kind)) => {
            let value = value.coerce_primitive(kind);
            if value.is_primitive_kind(kind) {
                Ok(value)
            } else {
                Err(value)
            }
        }
        Some(BuiltinType::String) => match value {
            Value::String(_) => Ok(value),
            Value::Char(c) => Ok(Value::String(c.to_string())),
            other => Err(other),
        },
        Some(BuiltinType::Uuid) => match value {
            Value::Uuid(_) => Ok(value),
            Value::String(s) => s.parse::<Uuid>().map(Value::Uuid).map_err(|_| Value::String(s)),
            other => Err(other),
        },
        Some(BuiltinType::Date) => match value {
            Value::Date(_) => Ok(value),
            Value::DateTime(dt) => Ok(Value::Date(dt.date_naive())),
            Value::String(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| Value::String(s)),
            other => Err(other),
        },
        Some(BuiltinType::DateTime) => match value {
            Value::DateTime(_) => Ok(value),
            Value::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
                .map_err(|_| Value::String(s)),
            other => Err(other),
        },
        Some(BuiltinType::Decimal) => match value {
            Value::Decimal(_) => Ok(value),
            Value::Float32(_) | Value::Float64(_) => match value.as_f64() {
                Some(f) => Ok(Value::Decimal(format!("{f:.2}"))),
                None => Err(value),
            },
            Value::String(s) if s.trim().parse::<f64>().is_ok() => Ok(Value::Decimal(s)),
            other => match other.as_i64() {
                Some(i) => Ok(Value::Decimal(i.to_string())),
                None => Err(other),
            },
        },
        Some(BuiltinType::Collection(_) | BuiltinType::Map(_)) => Err(value),
        None => conform_class(tree, node, value),
    }
}

fn conform_class(tree: &NodeTree, node: &Node, value: Value) -> std::result::Result<Value, Value> {
    let schema = tree.schema();
    let Some(class) = node.target_type.name().and_then(|name| schema.get_class(name)) else {
        return Err(value);
    };

    match (class.kind, value) {
        (ClassKind::Enum, Value::Enum { type_name, variant }) if type_name == class.name => {
            Ok(Value::Enum { type_name, variant })
        }
        (ClassKind::Enum, Value::String(variant)) if class.values.contains(&variant) => {
            Ok(Value::Enum {
                type_name: class.name.clone(),
                variant,
            })
        }
        (ClassKind::Class | ClassKind::Interface, Value::Object(object)) => {
            let declared = node.declared_type.name().unwrap_or_default();
            let accepted = object.ty.name().is_some_and(|actual| {
                actual == class.name
                    || actual == declared
                    || schema.class_implements(actual, declared)
                    || schema.class_implements(actual, &class.name)
            });
            if accepted {
                Ok(Value::Object(object))
            } else {
                Err(Value::Object(object))
            }
        }
        (_, value) => Err(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ImplementationRegistry;
    use fixture_core::{CollectionKind, ObjectValue, TypeRef, TypeSchema};
    use std::sync::Arc;

    fn tree() -> NodeTree {
        let schema = Arc::new(
            TypeSchema::from_yaml(
                r#"
types:
  - name: Shape
    kind: interface
  - name: Circle
    implements: [Shape]
    fields:
      - { name: radius, type: double }
  - name: Square
    fields:
      - { name: side, type: double }
  - name: Color
    kind: enum
    values: [RED, GREEN]
  - name: Canvas
    fields:
      - { name: id, type: Uuid }
      - { name: width, type: int }
      - { name: price, type: Decimal }
      - { name: color, type: Color }
      - { name: shape, type: Shape }
      - { name: tags, type: "Set<String>" }
      - { name: created, type: Date }
"#,
            )
            .unwrap(),
        );
        let resolver = ImplementationRegistry::new(Arc::clone(&schema));
        NodeTree::build(schema, &TypeRef::named("Canvas"), &resolver, 8).unwrap()
    }

    fn field(tree: &NodeTree, name: &str) -> NodeId {
        tree.root()
            .children
            .iter()
            .copied()
            .find(|id| tree.node(*id).field.as_ref().is_some_and(|f| f.name == name))
            .unwrap()
    }

    #[test]
    fn test_leaf_conversions() {
        let tree = tree();

        assert_eq!(
            conform(&tree, field(&tree, "width"), Value::Int64(12)).unwrap(),
            Value::Int32(12)
        );
        assert!(matches!(
            conform(&tree, field(&tree, "id"), Value::from("6f0c1a8e-8a0b-4f37-9d6e-1f0b8a8e2c11"))
                .unwrap(),
            Value::Uuid(_)
        ));
        assert_eq!(
            conform(&tree, field(&tree, "price"), Value::Float64(3.14159)).unwrap(),
            Value::Decimal("3.14".to_string())
        );
        assert_eq!(
            conform(&tree, field(&tree, "color"), Value::from("GREEN")).unwrap(),
            Value::Enum {
                type_name: "Color".to_string(),
                variant: "GREEN".to_string()
            }
        );
        assert!(matches!(
            conform(&tree, field(&tree, "created"), Value::from("2024-02-29")).unwrap(),
            Value::Date(_)
        ));
        assert_eq!(
            conform(&tree, field(&tree, "width"), Value::Null).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_container_kind_follows_position() {
        let tree = tree();
        let value = conform(
            &tree,
            field(&tree, "tags"),
            Value::Array(vec![Value::from("a"), Value::from("b")]),
        )
        .unwrap();
        let collection = value.as_collection().unwrap();
        assert_eq!(collection.kind, CollectionKind::Set);
        assert_eq!(collection.elements.len(), 2);
    }

    #[test]
    fn test_objects_must_match_target_or_implement_interface() {
        let tree = tree();
        let shape = field(&tree, "shape");

        let circle = Value::Object(ObjectValue::new(TypeRef::named("Circle")));
        assert!(conform(&tree, shape, circle).is_ok());

        let square = Value::Object(ObjectValue::new(TypeRef::named("Square")));
        let err = conform(&tree, shape, square).unwrap_err();
        match err {
            PopulateError::Assignment {
                path,
                declared,
                actual,
            } => {
                assert_eq!(path, "Canvas.shape");
                assert_eq!(declared, "Shape");
                assert_eq!(actual, "Square");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mismatched_leaf_is_rejected() {
        let tree = tree();
        let err = conform(&tree, field(&tree, "width"), Value::from("wide")).unwrap_err();
        assert!(matches!(err, PopulateError::Assignment { .. }));
        let err = conform(&tree, field(&tree, "color"), Value::from("BLUE")).unwrap_err();
        assert!(matches!(err, PopulateError::Assignment { .. }));
    }
}
