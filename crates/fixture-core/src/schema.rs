//! Type schema for fixture generation.
//!
//! A schema describes the classes, interfaces and enums the engine can
//! populate, plus optional generator overrides. It is loaded from YAML:
//!
//! ```yaml
//! version: 1
//! types:
//!   - name: Pair
//!     type_params: [L, R]
//!     fields:
//!       - { name: left, type: L }
//!       - { name: right, type: R }
//!   - name: Color
//!     kind: enum
//!     values: [RED, GREEN, BLUE]
//! overrides:
//!   - field: Order.items
//!     generator: { type: collection, size: 5 }
//! ```
//!
//! Loading validates type references so that a broken schema is rejected
//! before any node tree is built.

use crate::settings::AfterGenerate;
use crate::types::{BuiltinType, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Two types share a name
    #[error("Duplicate type definition: {0}")]
    DuplicateType(String),

    /// A type expression names a type that is neither built in nor defined
    #[error("Unknown type '{name}' referenced by {referenced_by}")]
    UnknownType { referenced_by: String, name: String },

    /// Type not found in schema
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// Field not found in class definition
    #[error("Field '{field}' not found in type '{class}'")]
    FieldNotFound { class: String, field: String },

    /// Enum without variants
    #[error("Enum '{0}' declares no values")]
    InvalidEnum(String),
}

// ============================================================================
// Type Definitions
// ============================================================================

/// Kind of a schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// Field of a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,

    /// Declared field type, possibly using the class's type parameters
    #[serde(rename = "type")]
    pub field_type: TypeRef,

    /// Class-level field, never populated
    #[serde(default, rename = "static")]
    pub is_static: bool,

    /// Compiler-generated field, never populated
    #[serde(default)]
    pub synthetic: bool,
}

impl FieldDefinition {
    /// Create a new instance field.
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_static: false,
            synthetic: false,
        }
    }

    /// Static and synthetic fields are skipped during population.
    pub fn is_populated(&self) -> bool {
        !self.is_static && !self.synthetic
    }
}

/// Class, interface or enum definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Type name
    pub name: String,

    /// Class, interface or enum
    #[serde(default)]
    pub kind: ClassKind,

    /// Type parameter names, bound positionally at use sites
    #[serde(default)]
    pub type_params: Vec<String>,

    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,

    /// Interfaces this type implements or extends
    #[serde(default)]
    pub implements: Vec<TypeRef>,

    /// Enum variants
    #[serde(default)]
    pub values: Vec<String>,
}

impl ClassDefinition {
    /// Create a plain class with the given fields.
    pub fn class(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            type_params: Vec::new(),
            fields,
            implements: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create an interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            ..Self::class(name, Vec::new())
        }
    }

    /// Create an enum with the given variants.
    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            kind: ClassKind::Enum,
            values,
            ..Self::class(name, Vec::new())
        }
    }

    /// Builder-style type parameter declaration.
    pub fn with_type_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Builder-style interface declaration.
    pub fn implementing(mut self, interface: TypeRef) -> Self {
        self.implements.push(interface);
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields that take part in population.
    pub fn populated_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.is_populated())
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }
}

// ============================================================================
// Generator Configuration
// ============================================================================

/// Declarative generator configuration used by schema overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Generate UUIDs (v4)
    UuidV4,

    /// Generate sequential integers
    Sequential {
        /// Starting value
        #[serde(default)]
        start: i64,
    },

    /// Generate strings using a pattern with placeholders
    Pattern {
        /// Pattern string (supports {index}, {uuid} and {rand:N})
        pattern: String,
    },

    /// Generate random integers in a range
    IntRange {
        /// Minimum value (inclusive)
        min: i64,
        /// Maximum value (inclusive)
        max: i64,
    },

    /// Generate random floats in a range
    FloatRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate random decimals in a range
    DecimalRange {
        /// Minimum value (inclusive)
        min: f64,
        /// Maximum value (inclusive)
        max: f64,
    },

    /// Generate timestamps in a range
    TimestampRange {
        /// Start timestamp (ISO 8601)
        start: String,
        /// End timestamp (ISO 8601)
        end: String,
    },

    /// Generate dates in a range
    DateRange {
        /// Start date (YYYY-MM-DD)
        start: String,
        /// End date (YYYY-MM-DD)
        end: String,
    },

    /// Generate weighted boolean values
    WeightedBool {
        /// Weight for true value (0.0 to 1.0)
        true_weight: f64,
    },

    /// Generate random selection from a pool of values
    OneOf {
        /// Pool of values to select from
        values: Vec<serde_yaml::Value>,
    },

    /// Generate a static value
    Static {
        /// The static value to use
        value: serde_yaml::Value,
    },

    /// Generate null values
    Null,

    /// Generate upper-case alphabetic strings
    Alphabetic {
        /// Minimum length (inclusive)
        min_length: usize,
        /// Maximum length (inclusive)
        max_length: usize,
    },

    /// Empty collection populated afterwards with a fixed size
    Collection {
        /// Number of elements
        size: usize,
        /// Allow null elements
        #[serde(default)]
        nullable_elements: bool,
    },

    /// Empty map populated afterwards with a fixed size
    Map {
        /// Number of entries
        size: usize,
        /// Allow a null key
        #[serde(default)]
        nullable_keys: bool,
        /// Allow null values
        #[serde(default)]
        nullable_values: bool,
    },

    /// Array of a fixed length populated afterwards
    Array {
        /// Number of slots
        length: usize,
        /// Allow null slots
        #[serde(default)]
        nullable_elements: bool,
    },
}

/// A generator override, keyed by `Class.field` or by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideDefinition {
    /// Field selector written as `Owner.field`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Type selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<TypeRef>,

    /// Generator to use for the selected positions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,

    /// Action applied to the generated value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_generate: Option<AfterGenerate>,

    /// Leave the selected positions untouched
    #[serde(default)]
    pub ignore: bool,

    /// Allow the selected positions to be null
    #[serde(default)]
    pub nullable: bool,
}

// ============================================================================
// Schema
// ============================================================================

fn default_version() -> u32 {
    1
}

/// Full type schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSchema {
    /// Schema version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Type definitions
    #[serde(default)]
    pub types: Vec<ClassDefinition>,

    /// Generator overrides
    #[serde(default)]
    pub overrides: Vec<OverrideDefinition>,

    /// Cached type lookup (not serialized)
    #[serde(skip)]
    type_map: HashMap<String, usize>,
}

impl TypeSchema {
    /// Create a schema from type definitions without validating it.
    pub fn new(types: Vec<ClassDefinition>) -> Self {
        let mut schema = Self {
            version: default_version(),
            types,
            overrides: Vec::new(),
            type_map: HashMap::new(),
        };
        schema.build_type_map();
        schema
    }

    /// Load schema from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse schema from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let mut schema: TypeSchema = serde_yaml::from_str(yaml)?;
        schema.build_type_map();
        schema.validate()?;
        Ok(schema)
    }

    /// Build the internal type lookup map.
    fn build_type_map(&mut self) {
        self.type_map = self
            .types
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.name.clone(), idx))
            .collect();
    }

    /// Get a type definition by name.
    pub fn get_class(&self, name: &str) -> Option<&ClassDefinition> {
        self.type_map
            .get(name)
            .and_then(|&idx| self.types.get(idx))
    }

    /// Get a type definition by name, failing if it is missing.
    pub fn class(&self, name: &str) -> Result<&ClassDefinition, SchemaError> {
        self.get_class(name)
            .ok_or_else(|| SchemaError::TypeNotFound(name.to_string()))
    }

    /// Get the declared type of a field of a class.
    pub fn field_type(&self, class: &str, field: &str) -> Result<&TypeRef, SchemaError> {
        self.class(class)?
            .get_field(field)
            .map(|f| &f.field_type)
            .ok_or_else(|| SchemaError::FieldNotFound {
                class: class.to_string(),
                field: field.to_string(),
            })
    }

    /// Add a type definition, replacing any definition with the same name.
    pub fn add_class(&mut self, class: ClassDefinition) {
        match self.type_map.get(&class.name) {
            Some(&idx) => self.types[idx] = class,
            None => {
                self.type_map.insert(class.name.clone(), self.types.len());
                self.types.push(class);
            }
        }
    }

    /// Check if `name` is built in or defined by this schema.
    pub fn is_known(&self, name: &str) -> bool {
        BuiltinType::lookup(name).is_some() || self.type_map.contains_key(name)
    }

    /// Check if `class` implements `interface`, directly or through
    /// interfaces it extends.
    pub fn class_implements(&self, class: &str, interface: &str) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![class];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(definition) = self.get_class(current) else {
                continue;
            };
            for parent in &definition.implements {
                let Some(name) = parent.name() else {
                    continue;
                };
                if name == interface {
                    return true;
                }
                pending.push(name);
            }
        }
        false
    }

    /// Concrete classes implementing `interface`, in declaration order.
    pub fn implementors(&self, interface: &str) -> Vec<&ClassDefinition> {
        self.types
            .iter()
            .filter(|class| class.kind == ClassKind::Class)
            .filter(|class| self.class_implements(&class.name, interface))
            .collect()
    }

    /// All type names in the schema.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    /// Validate names and references.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        for class in &self.types {
            if !names.insert(class.name.as_str()) {
                return Err(SchemaError::DuplicateType(class.name.clone()));
            }
        }

        for class in &self.types {
            if class.is_enum() && class.values.is_empty() {
                return Err(SchemaError::InvalidEnum(class.name.clone()));
            }

            let params: HashSet<&str> = class.type_params.iter().map(String::as_str).collect();
            for field in &class.fields {
                let referenced_by = format!("{}.{}", class.name, field.name);
                self.check_references(&field.field_type, &params, &referenced_by)?;
            }
            for interface in &class.implements {
                self.check_references(interface, &params, &class.name)?;
            }
        }

        for definition in &self.overrides {
            if let Some(selector) = &definition.field {
                if let Some((owner, field)) = selector.rsplit_once('.') {
                    self.field_type(owner, field)?;
                }
            }
            if let Some(class) = &definition.class {
                self.check_references(class, &HashSet::new(), "overrides")?;
            }
        }

        Ok(())
    }

    fn check_references(
        &self,
        ty: &TypeRef,
        params: &HashSet<&str>,
        referenced_by: &str,
    ) -> Result<(), SchemaError> {
        match ty {
            TypeRef::Named { name, args } => {
                if !params.contains(name.as_str()) && !self.is_known(name) {
                    return Err(SchemaError::UnknownType {
                        referenced_by: referenced_by.to_string(),
                        name: name.clone(),
                    });
                }
                for arg in args {
                    self.check_references(arg, params, referenced_by)?;
                }
                Ok(())
            }
            TypeRef::Array(component) => self.check_references(component, params, referenced_by),
            TypeRef::Wildcard(Some(bound)) => self.check_references(bound, params, referenced_by),
            TypeRef::Wildcard(None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_SCHEMA: &str = r#"
version: 1

types:
  - name: Pair
    type_params: [L, R]
    fields:
      - { name: left, type: L }
      - { name: right, type: R }

  - name: Shape
    kind: interface

  - name: Polygon
    kind: interface
    implements: [Shape]

  - name: Circle
    implements: [Shape]
    fields:
      - { name: radius, type: double }
      - { name: COUNT, type: int, static: true }

  - name: Square
    implements: [Polygon]
    fields:
      - { name: side, type: double }

  - name: Color
    kind: enum
    values: [RED, GREEN, BLUE]

  - name: Order
    fields:
      - { name: id, type: Uuid }
      - { name: items, type: "List<Pair<String, Integer>>" }
      - { name: color, type: Color }

overrides:
  - field: Order.items
    generator: { type: collection, size: 5 }
  - class: String
    generator: { type: pattern, pattern: "item-{index}" }
  - field: Circle.radius
    nullable: true
"#;

    #[test]
    fn test_parse_schema() {
        let schema = TypeSchema::from_yaml(SAMPLE_SCHEMA).unwrap();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.types.len(), 7);
        assert_eq!(schema.overrides.len(), 3);

        let pair = schema.get_class("Pair").expect("Pair should exist");
        assert_eq!(pair.type_params, vec!["L", "R"]);
        assert_eq!(pair.kind, ClassKind::Class);

        let circle = schema.get_class("Circle").unwrap();
        assert_eq!(circle.populated_fields().count(), 1);
        assert!(circle.get_field("COUNT").unwrap().is_static);

        let color = schema.get_class("Color").unwrap();
        assert!(color.is_enum());
        assert_eq!(color.values, vec!["RED", "GREEN", "BLUE"]);

        assert_eq!(
            schema.field_type("Order", "items").unwrap().to_string(),
            "List<Pair<String, Integer>>"
        );
    }

    #[test]
    fn test_override_definitions() {
        let schema = TypeSchema::from_yaml(SAMPLE_SCHEMA).unwrap();

        let items = &schema.overrides[0];
        assert_eq!(items.field.as_deref(), Some("Order.items"));
        assert_eq!(
            items.generator,
            Some(GeneratorConfig::Collection {
                size: 5,
                nullable_elements: false
            })
        );

        let strings = &schema.overrides[1];
        assert_eq!(strings.class, Some(TypeRef::named("String")));
        assert!(matches!(
            strings.generator,
            Some(GeneratorConfig::Pattern { .. })
        ));

        assert!(schema.overrides[2].nullable);
        assert!(!schema.overrides[2].ignore);
    }

    #[test]
    fn test_transitive_implements() {
        let schema = TypeSchema::from_yaml(SAMPLE_SCHEMA).unwrap();

        assert!(schema.class_implements("Circle", "Shape"));
        assert!(schema.class_implements("Square", "Polygon"));
        assert!(schema.class_implements("Square", "Shape"));
        assert!(!schema.class_implements("Circle", "Polygon"));

        let names: Vec<&str> = schema
            .implementors("Shape")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Circle", "Square"]);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let yaml = r#"
types:
  - name: A
  - name: A
"#;
        assert!(matches!(
            TypeSchema::from_yaml(yaml),
            Err(SchemaError::DuplicateType(name)) if name == "A"
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let yaml = r#"
types:
  - name: Holder
    fields:
      - { name: value, type: "List<Missing>" }
"#;
        match TypeSchema::from_yaml(yaml) {
            Err(SchemaError::UnknownType {
                referenced_by,
                name,
            }) => {
                assert_eq!(referenced_by, "Holder.value");
                assert_eq!(name, "Missing");
            }
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn test_type_params_are_known_only_in_their_class() {
        let yaml = r#"
types:
  - name: Box
    type_params: [T]
    fields:
      - { name: value, type: T }
  - name: Other
    fields:
      - { name: value, type: T }
"#;
        assert!(matches!(
            TypeSchema::from_yaml(yaml),
            Err(SchemaError::UnknownType { name, .. }) if name == "T"
        ));
    }

    #[test]
    fn test_enum_without_values_rejected() {
        let yaml = r#"
types:
  - name: Empty
    kind: enum
"#;
        assert!(matches!(
            TypeSchema::from_yaml(yaml),
            Err(SchemaError::InvalidEnum(_))
        ));
    }

    #[test]
    fn test_override_for_missing_field_rejected() {
        let yaml = r#"
types:
  - name: Person
    fields:
      - { name: name, type: String }
overrides:
  - field: Person.age
    ignore: true
"#;
        assert!(matches!(
            TypeSchema::from_yaml(yaml),
            Err(SchemaError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_add_class_and_lookup() {
        let mut schema = TypeSchema::new(vec![]);
        schema.add_class(ClassDefinition::class(
            "Person",
            vec![FieldDefinition::new("name", TypeRef::named("String"))],
        ));
        schema.add_class(ClassDefinition::interface("Named"));

        assert!(schema.get_class("Person").is_some());
        assert!(schema.get_class("Named").unwrap().is_interface());
        assert!(matches!(
            schema.class("Nope"),
            Err(SchemaError::TypeNotFound(_))
        ));
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_SCHEMA.as_bytes()).unwrap();

        let schema = TypeSchema::from_file(file.path()).unwrap();
        assert_eq!(schema.type_names().len(), 7);
    }
}
