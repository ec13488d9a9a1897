//! Generator resolution: overrides, defaults and interface implementations.
//!
//! Precedence, highest first:
//!
//! 1. field override (exact `Owner.field` match)
//! 2. class override (declared type, then target type; exact type, then raw
//!    name, so an override for `List` matches every `List<..>`)
//! 3. user-registered default for the type, then the built-in generator for
//!    leaf types
//! 4. interfaces without a generator are resolved to an implementation while
//!    the node tree is built
//!
//! The registry never mutates node state.

use crate::error::{PopulateError, Result};
use crate::generator::{GeneratorExt, SharedGenerator};
use crate::generators::{self, BuiltinGenerators};
use crate::hints::Hints;
use crate::node::{FieldRef, Node};
use fixture_core::{OverrideDefinition, Settings, SettingsError, TypeRef, TypeSchema};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

// ============================================================================
// Implementation resolution
// ============================================================================

/// Picks a concrete type for an interface type.
pub trait ImplementationResolver: Send + Sync {
    fn resolve(&self, interface: &TypeRef) -> Option<TypeRef>;
}

/// Explicit registrations first, then the first schema class declaring the
/// interface in its `implements` list.
#[derive(Debug, Clone)]
pub struct ImplementationRegistry {
    schema: Arc<TypeSchema>,
    explicit: HashMap<String, TypeRef>,
}

impl ImplementationRegistry {
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self {
            schema,
            explicit: HashMap::new(),
        }
    }

    /// Use `implementation` wherever `interface` (by raw name) is declared.
    pub fn register(&mut self, interface: impl Into<String>, implementation: TypeRef) {
        self.explicit.insert(interface.into(), implementation);
    }

    /// Carry the interface's type arguments over to a raw implementation
    /// with the same number of type parameters.
    fn pass_through(&self, implementation: TypeRef, interface: &TypeRef) -> TypeRef {
        if !implementation.args().is_empty() || interface.args().is_empty() {
            return implementation;
        }
        let arity = implementation
            .name()
            .and_then(|name| self.schema.get_class(name))
            .map(|class| class.type_params.len());
        match (arity, implementation.name()) {
            (Some(n), Some(name)) if n == interface.args().len() => {
                TypeRef::generic(name, interface.args().to_vec())
            }
            _ => implementation,
        }
    }
}

impl ImplementationResolver for ImplementationRegistry {
    fn resolve(&self, interface: &TypeRef) -> Option<TypeRef> {
        let name = interface.name()?;
        let implementation = match self.explicit.get(name) {
            Some(explicit) => explicit.clone(),
            None => TypeRef::named(self.schema.implementors(name).first()?.name.clone()),
        };
        Some(self.pass_through(implementation, interface))
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Resolved override maps consumed by the facade and the driver.
#[derive(Clone, Default)]
pub struct Overrides {
    field_generators: HashMap<FieldRef, SharedGenerator>,
    class_generators: HashMap<TypeRef, SharedGenerator>,
    ignored_fields: HashSet<FieldRef>,
    ignored_classes: HashSet<TypeRef>,
    nullable_fields: HashSet<FieldRef>,
    nullable_classes: HashSet<TypeRef>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build overrides from a schema's `overrides:` section.
    pub fn from_definitions(definitions: &[OverrideDefinition]) -> Result<Self> {
        let mut overrides = Self::new();
        for definition in definitions {
            overrides.apply_definition(definition)?;
        }
        Ok(overrides)
    }

    fn apply_definition(&mut self, definition: &OverrideDefinition) -> Result<()> {
        let generator = definition.generator.as_ref().map(|config| {
            let generator = generators::from_config(config);
            match definition.after_generate {
                Some(action) => {
                    let hints = generator.hints().unwrap_or_default().after_generate(action);
                    generator.with_hints(hints).shared()
                }
                None => generator,
            }
        });

        if generator.is_none() && !definition.ignore && !definition.nullable {
            return Err(PopulateError::InvalidOverride(format!(
                "override {definition:?} sets no generator, ignore or nullable"
            )));
        }

        match (&definition.field, &definition.class) {
            (Some(field), None) => {
                let field: FieldRef = field.parse()?;
                if let Some(generator) = generator {
                    self.field_generators.insert(field.clone(), generator);
                }
                if definition.ignore {
                    self.ignored_fields.insert(field.clone());
                }
                if definition.nullable {
                    self.nullable_fields.insert(field);
                }
            }
            (None, Some(class)) => {
                if let Some(generator) = generator {
                    self.class_generators.insert(class.clone(), generator);
                }
                if definition.ignore {
                    self.ignored_classes.insert(class.clone());
                }
                if definition.nullable {
                    self.nullable_classes.insert(class.clone());
                }
            }
            _ => {
                return Err(PopulateError::InvalidOverride(
                    "an override selects exactly one of `field` or `class`".to_string(),
                ))
            }
        }
        Ok(())
    }

    pub fn generate_field(&mut self, field: FieldRef, generator: SharedGenerator) {
        self.field_generators.insert(field, generator);
    }

    pub fn generate_class(&mut self, class: TypeRef, generator: SharedGenerator) {
        self.class_generators.insert(class, generator);
    }

    pub fn ignore_field(&mut self, field: FieldRef) {
        self.ignored_fields.insert(field);
    }

    pub fn ignore_class(&mut self, class: TypeRef) {
        self.ignored_classes.insert(class);
    }

    pub fn nullable_field(&mut self, field: FieldRef) {
        self.nullable_fields.insert(field);
    }

    pub fn nullable_class(&mut self, class: TypeRef) {
        self.nullable_classes.insert(class);
    }

    /// Combine two override sets; entries from `other` win.
    pub fn merge(mut self, other: Overrides) -> Self {
        self.field_generators.extend(other.field_generators);
        self.class_generators.extend(other.class_generators);
        self.ignored_fields.extend(other.ignored_fields);
        self.ignored_classes.extend(other.ignored_classes);
        self.nullable_fields.extend(other.nullable_fields);
        self.nullable_classes.extend(other.nullable_classes);
        self
    }

    pub fn field_generator(&self, node: &Node) -> Option<&SharedGenerator> {
        node.field
            .as_ref()
            .and_then(|field| self.field_generators.get(field))
    }

    pub fn class_generator(&self, node: &Node) -> Option<&SharedGenerator> {
        lookup_by_type(&self.class_generators, node)
    }

    /// Field or class explicitly excluded from population.
    pub fn is_ignored(&self, node: &Node) -> bool {
        node.field
            .as_ref()
            .is_some_and(|field| self.ignored_fields.contains(field))
            || contains_type(&self.ignored_classes, node)
    }

    /// Field or class allowed to be left null.
    pub fn is_nullable(&self, node: &Node) -> bool {
        node.field
            .as_ref()
            .is_some_and(|field| self.nullable_fields.contains(field))
            || contains_type(&self.nullable_classes, node)
    }

    /// Field or class targeted by any override.
    pub fn is_selected(&self, node: &Node) -> bool {
        self.field_generator(node).is_some()
            || self.class_generator(node).is_some()
            || self.is_nullable(node)
    }

    pub fn is_empty(&self) -> bool {
        self.field_generators.is_empty()
            && self.class_generators.is_empty()
            && self.ignored_fields.is_empty()
            && self.ignored_classes.is_empty()
            && self.nullable_fields.is_empty()
            && self.nullable_classes.is_empty()
    }
}

/// Types a node answers to: declared type, then target type; exact type
/// before raw name.
fn type_candidates(node: &Node) -> [TypeRef; 4] {
    [
        node.declared_type.clone(),
        node.declared_type.raw(),
        node.target_type.clone(),
        node.target_type.raw(),
    ]
}

fn lookup_by_type<'a, V>(table: &'a HashMap<TypeRef, V>, node: &Node) -> Option<&'a V> {
    type_candidates(node).iter().find_map(|ty| table.get(ty))
}

fn contains_type(set: &HashSet<TypeRef>, node: &Node) -> bool {
    type_candidates(node).iter().any(|ty| set.contains(ty))
}

// ============================================================================
// Generator registry
// ============================================================================

/// Where a resolved generator came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorSource {
    FieldOverride,
    ClassOverride,
    UserDefault,
    Builtin,
}

/// A generator chosen for a node.
#[derive(Clone)]
pub struct Resolved {
    pub generator: SharedGenerator,
    pub source: GeneratorSource,
}

impl Resolved {
    fn new(generator: &SharedGenerator, source: GeneratorSource) -> Self {
        Self {
            generator: Arc::clone(generator),
            source,
        }
    }

    /// Hints the generator declares.
    pub fn hints(&self) -> Hints {
        self.generator.hints().unwrap_or_default()
    }
}

/// Default generators by type.
#[derive(Clone)]
pub struct GeneratorRegistry {
    builtins: BuiltinGenerators,
    defaults: HashMap<TypeRef, SharedGenerator>,
}

impl GeneratorRegistry {
    /// Registry with the built-in generators configured from `settings`.
    pub fn new(settings: &Settings) -> std::result::Result<Self, SettingsError> {
        Ok(Self {
            builtins: BuiltinGenerators::new(settings)?,
            defaults: HashMap::new(),
        })
    }

    /// Register a default generator for a type. Raw names match every
    /// parameterization of the type.
    pub fn register_default(&mut self, ty: TypeRef, generator: SharedGenerator) {
        self.defaults.insert(ty, generator);
    }

    /// Full resolution for a node, overrides first.
    pub fn resolve(&self, node: &Node, overrides: &Overrides) -> Option<Resolved> {
        self.resolve_override(node, overrides)
            .or_else(|| self.resolve_default(node))
    }

    /// Field override, then class override.
    pub fn resolve_override(&self, node: &Node, overrides: &Overrides) -> Option<Resolved> {
        if let Some(generator) = overrides.field_generator(node) {
            return Some(Resolved::new(generator, GeneratorSource::FieldOverride));
        }
        overrides
            .class_generator(node)
            .map(|generator| Resolved::new(generator, GeneratorSource::ClassOverride))
    }

    /// User default for the type, then the built-in leaf generator.
    pub fn resolve_default(&self, node: &Node) -> Option<Resolved> {
        if let Some(generator) = lookup_by_type(&self.defaults, node) {
            return Some(Resolved::new(generator, GeneratorSource::UserDefault));
        }
        node.builtin()
            .and_then(|builtin| self.builtins.get(builtin))
            .map(|generator| Resolved::new(generator, GeneratorSource::Builtin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::supply;
    use crate::node::NodeTree;
    use crate::random::Random;
    use fixture_core::{GeneratorConfig, Value};

    const SCHEMA: &str = r#"
types:
  - name: Shape
    kind: interface
  - name: Circle
    implements: [Shape]
    fields:
      - { name: radius, type: double }
  - name: Container
    kind: interface
    type_params: [T]
  - name: Bag
    type_params: [T]
    implements: ["Container<T>"]
    fields:
      - { name: items, type: "List<T>" }
  - name: Person
    fields:
      - { name: name, type: String }
      - { name: nickname, type: String }
      - { name: tags, type: "List<String>" }
"#;

    fn schema() -> Arc<TypeSchema> {
        Arc::new(TypeSchema::from_yaml(SCHEMA).unwrap())
    }

    fn person_tree() -> NodeTree {
        let schema = schema();
        let resolver = ImplementationRegistry::new(Arc::clone(&schema));
        NodeTree::build(schema, &TypeRef::named("Person"), &resolver, 8).unwrap()
    }

    fn child<'a>(tree: &'a NodeTree, name: &str) -> &'a Node {
        tree.root()
            .children
            .iter()
            .map(|id| tree.node(*id))
            .find(|node| node.field.as_ref().is_some_and(|f| f.name == name))
            .unwrap()
    }

    fn generated(resolved: &Resolved) -> Value {
        resolved.generator.generate(&mut Random::new(1)).unwrap()
    }

    #[test]
    fn test_implementation_resolution() {
        let schema = schema();
        let mut registry = ImplementationRegistry::new(Arc::clone(&schema));

        assert_eq!(
            registry.resolve(&TypeRef::named("Shape")),
            Some(TypeRef::named("Circle"))
        );
        assert_eq!(
            registry.resolve(&TypeRef::parse("Container<String>").unwrap()),
            Some(TypeRef::parse("Bag<String>").unwrap())
        );
        assert_eq!(registry.resolve(&TypeRef::named("Person")), None);

        registry.register("Shape", TypeRef::named("Bag"));
        assert_eq!(
            registry.resolve(&TypeRef::named("Shape")),
            Some(TypeRef::named("Bag"))
        );
    }

    #[test]
    fn test_field_override_beats_class_override() {
        let tree = person_tree();
        let name = child(&tree, "name");

        let mut overrides = Overrides::new();
        overrides.generate_class(TypeRef::named("String"), supply(Value::from("class")).shared());
        overrides.generate_field(
            FieldRef::new("Person", "name"),
            supply(Value::from("field")).shared(),
        );

        let registry = GeneratorRegistry::new(&Settings::default()).unwrap();
        let resolved = registry.resolve(name, &overrides).unwrap();
        assert_eq!(resolved.source, GeneratorSource::FieldOverride);
        assert_eq!(generated(&resolved), Value::from("field"));

        let nickname = child(&tree, "nickname");
        let resolved = registry.resolve(nickname, &overrides).unwrap();
        assert_eq!(resolved.source, GeneratorSource::ClassOverride);
        assert_eq!(generated(&resolved), Value::from("class"));
    }

    #[test]
    fn test_raw_class_override_matches_parameterized_type() {
        let tree = person_tree();
        let tags = child(&tree, "tags");

        let mut overrides = Overrides::new();
        overrides.generate_class(
            TypeRef::named("List"),
            generators::from_config(&GeneratorConfig::Collection {
                size: 3,
                nullable_elements: false,
            }),
        );

        let registry = GeneratorRegistry::new(&Settings::default()).unwrap();
        let resolved = registry.resolve(tags, &overrides).unwrap();
        assert_eq!(resolved.source, GeneratorSource::ClassOverride);
        assert_eq!(resolved.hints().data_structure_size, Some(3));
    }

    #[test]
    fn test_defaults() {
        let tree = person_tree();
        let mut registry = GeneratorRegistry::new(&Settings::default()).unwrap();

        let resolved = registry.resolve(child(&tree, "name"), &Overrides::new()).unwrap();
        assert_eq!(resolved.source, GeneratorSource::Builtin);

        assert!(registry.resolve(tree.root(), &Overrides::new()).is_none());
        assert!(registry.resolve(child(&tree, "tags"), &Overrides::new()).is_none());

        registry.register_default(TypeRef::named("String"), supply(Value::from("x")).shared());
        let resolved = registry.resolve(child(&tree, "name"), &Overrides::new()).unwrap();
        assert_eq!(resolved.source, GeneratorSource::UserDefault);
    }

    #[test]
    fn test_from_definitions() {
        let schema = TypeSchema::from_yaml(
            r#"
types:
  - name: Person
    fields:
      - { name: name, type: String }
      - { name: password, type: String }
overrides:
  - field: Person.name
    generator: { type: pattern, pattern: "user-{index}" }
    after_generate: do_not_modify
  - field: Person.password
    ignore: true
  - class: String
    nullable: true
"#,
        )
        .unwrap();

        let overrides = Overrides::from_definitions(&schema.overrides).unwrap();
        let schema = Arc::new(schema);
        let resolver = ImplementationRegistry::new(Arc::clone(&schema));
        let tree = NodeTree::build(schema, &TypeRef::named("Person"), &resolver, 8).unwrap();

        let name = child(&tree, "name");
        let generator = overrides.field_generator(name).unwrap();
        assert_eq!(
            generator.hints().unwrap().after_generate,
            Some(fixture_core::AfterGenerate::DoNotModify)
        );
        assert!(overrides.is_selected(name));
        assert!(overrides.is_nullable(name));

        let password = child(&tree, "password");
        assert!(overrides.is_ignored(password));
        assert!(!overrides.is_ignored(name));
    }

    #[test]
    fn test_invalid_definitions() {
        let both = OverrideDefinition {
            field: Some("Person.name".to_string()),
            class: Some(TypeRef::named("String")),
            generator: None,
            after_generate: None,
            ignore: true,
            nullable: false,
        };
        assert!(matches!(
            Overrides::from_definitions(&[both]),
            Err(PopulateError::InvalidOverride(_))
        ));

        let empty = OverrideDefinition {
            field: Some("Person.name".to_string()),
            class: None,
            generator: None,
            after_generate: None,
            ignore: false,
            nullable: false,
        };
        assert!(Overrides::from_definitions(&[empty]).is_err());

        let malformed = OverrideDefinition {
            field: Some("name".to_string()),
            class: None,
            generator: None,
            after_generate: None,
            ignore: true,
            nullable: false,
        };
        assert!(Overrides::from_definitions(&[malformed]).is_err());
    }
}
