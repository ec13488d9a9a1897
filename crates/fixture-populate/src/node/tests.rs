use super::*;
use crate::registry::ImplementationRegistry;

const SCHEMA: &str = r#"
types:
  - name: Pair
    type_params: [L, R]
    fields:
      - { name: left, type: L }
      - { name: right, type: R }

  - name: Container
    type_params: [T]
    fields:
      - { name: items, type: "List<T>" }
      - { name: lookup, type: "Map<String, T>" }
      - { name: slots, type: "T[]" }

  - name: Node
    fields:
      - { name: child, type: Node }
      - { name: label, type: String }

  - name: Deep
    fields:
      - { name: next, type: Deeper }
  - name: Deeper
    fields:
      - { name: next, type: Deepest }
  - name: Deepest
    fields:
      - { name: value, type: int }

  - name: Counter
    fields:
      - { name: count, type: int }
      - { name: INSTANCES, type: int, static: true }
      - { name: this_0, type: Node, synthetic: true }

  - name: Shape
    kind: interface
  - name: Circle
    implements: [Shape]
    fields:
      - { name: radius, type: double }
  - name: Drawing
    fields:
      - { name: shape, type: Shape }

  - name: Wild
    fields:
      - { name: anything, type: "List<?>" }
  - name: Bounded
    fields:
      - { name: shapes, type: "List<? extends Shape>" }
  - name: Raw
    fields:
      - { name: things, type: List }
"#;

fn schema() -> Arc<TypeSchema> {
    Arc::new(TypeSchema::from_yaml(SCHEMA).unwrap())
}

fn build(target: &str, max_depth: usize) -> crate::error::Result<NodeTree> {
    let schema = schema();
    let resolver = ImplementationRegistry::new(Arc::clone(&schema));
    NodeTree::build(schema, &TypeRef::parse(target).unwrap(), &resolver, max_depth)
}

fn child<'t>(tree: &'t NodeTree, parent: NodeId, name: &str) -> &'t Node {
    tree.node(parent)
        .children
        .iter()
        .map(|id| tree.node(*id))
        .find(|node| node.field.as_ref().is_some_and(|f| f.name == name))
        .unwrap_or_else(|| panic!("no field {name}"))
}

fn element_of(node: &Node) -> NodeId {
    match node.kind {
        NodeKind::Collection { element, .. } | NodeKind::Array { element } => element,
        _ => panic!("{} has no element node", node.declared_type),
    }
}

#[test]
fn test_type_arguments_are_substituted() {
    let tree = build("Pair<String, Integer>", 8).unwrap();
    let root = tree.root();
    assert_eq!(root.role, NodeRole::Root);
    assert_eq!(root.children.len(), 2);

    let left = child(&tree, root.id, "left");
    assert_eq!(left.declared_type, TypeRef::named("String"));
    assert_eq!(left.field, Some(FieldRef::new("Pair", "left")));

    let right = child(&tree, root.id, "right");
    assert_eq!(right.declared_type, TypeRef::named("Integer"));
    assert_eq!(right.depth, 1);
}

#[test]
fn test_containers_carry_element_nodes() {
    let tree = build("Container<String>", 8).unwrap();
    let root = tree.root_id();

    let items = child(&tree, root, "items");
    let NodeKind::Collection { kind, element } = items.kind else {
        panic!("items should be a collection: {:?}", items.kind);
    };
    assert_eq!(kind, CollectionKind::List);
    assert_eq!(tree.node(element).declared_type, TypeRef::named("String"));
    assert_eq!(tree.node(element).role, NodeRole::Element);
    assert!(tree.node(element).field.is_none());

    let lookup = child(&tree, root, "lookup");
    let NodeKind::Map { kind, key, value } = lookup.kind else {
        panic!("lookup should be a map");
    };
    assert_eq!(kind, MapKind::Hash);
    assert_eq!(tree.node(key).role, NodeRole::MapKey);
    assert_eq!(tree.node(value).declared_type, TypeRef::named("String"));

    let slots = child(&tree, root, "slots");
    assert!(matches!(slots.kind, NodeKind::Array { .. }));
    assert_eq!(
        tree.node(element_of(slots)).declared_type,
        TypeRef::named("String")
    );
}

#[test]
fn test_unbound_type_parameter_fails() {
    let err = build("Container", 8).unwrap_err();
    match err {
        PopulateError::TypeResolution { detail, path } => {
            assert!(detail.contains("'T' is not bound"), "{detail}");
            assert_eq!(path, "Container.items");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_wildcards() {
    let err = build("Wild", 8).unwrap_err();
    assert!(matches!(err, PopulateError::TypeResolution { .. }));

    let tree = build("Bounded", 8).unwrap();
    let shapes = child(&tree, tree.root_id(), "shapes");
    let element = tree.node(element_of(shapes));
    assert_eq!(element.declared_type, TypeRef::named("Shape"));
    assert_eq!(element.target_type, TypeRef::named("Circle"));
}

#[test]
fn test_raw_container_fails() {
    let err = build("Raw", 8).unwrap_err();
    match err {
        PopulateError::TypeResolution { path, .. } => assert_eq!(path, "Raw.things"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_target_fails() {
    let err = build("Missing", 8).unwrap_err();
    assert!(matches!(err, PopulateError::UnknownType { name, .. } if name == "Missing"));
}

#[test]
fn test_self_reference_becomes_cyclic_leaf() {
    let tree = build("Node", 8).unwrap();
    let child_node = child(&tree, tree.root_id(), "child");
    assert!(child_node.cyclic);
    assert!(child_node.children.is_empty());
    assert!(!child(&tree, tree.root_id(), "label").cyclic);
    assert_eq!(tree.len(), 3);
}

#[test]
fn test_depth_limit_truncates() {
    let tree = build("Deep", 2).unwrap();
    let deeper = child(&tree, tree.root_id(), "next");
    assert!(!deeper.truncated);
    let deepest = child(&tree, deeper.id, "next");
    assert!(deepest.truncated);
    assert!(deepest.children.is_empty());

    // Leaves below the limit are kept
    let tree = build("Deep", 3).unwrap();
    let deeper = child(&tree, tree.root_id(), "next");
    let deepest = child(&tree, deeper.id, "next");
    assert!(!deepest.truncated);
    let value = child(&tree, deepest.id, "value");
    assert_eq!(value.depth, 3);
    assert!(!value.truncated);
}

#[test]
fn test_static_and_synthetic_fields_are_skipped() {
    let tree = build("Counter", 8).unwrap();
    let names: Vec<_> = tree
        .root()
        .children
        .iter()
        .filter_map(|id| tree.node(*id).field.as_ref())
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["count"]);
}

#[test]
fn test_interface_field_resolves_implementation() {
    let tree = build("Drawing", 8).unwrap();
    let shape = child(&tree, tree.root_id(), "shape");
    assert_eq!(shape.declared_type, TypeRef::named("Shape"));
    assert_eq!(shape.target_type, TypeRef::named("Circle"));
    assert_eq!(tree.class_of(shape.id).unwrap().name, "Circle");
    assert_eq!(
        child(&tree, shape.id, "radius").field,
        Some(FieldRef::new("Circle", "radius"))
    );
}

#[test]
fn test_paths() {
    let tree = build("Container<Pair<String, Integer>>", 8).unwrap();
    let items = child(&tree, tree.root_id(), "items");
    let element = element_of(items);
    let left = child(&tree, element, "left");
    assert_eq!(tree.path(left.id), "Container<Pair<String, Integer>>.items[].left");

    let lookup = child(&tree, tree.root_id(), "lookup");
    let NodeKind::Map { key, .. } = lookup.kind else {
        panic!("lookup should be a map");
    };
    assert!(tree.path(key).ends_with(".lookup.{key}"));
    assert_eq!(tree.ancestors(left.id).count(), 3);
}

#[test]
fn test_field_ref_parsing() {
    let field: FieldRef = "Order.items".parse().unwrap();
    assert_eq!(field, FieldRef::new("Order", "items"));
    assert_eq!(field.to_string(), "Order.items");

    assert!("items".parse::<FieldRef>().is_err());
    assert!("Order.".parse::<FieldRef>().is_err());
}
