//! Core types for the fixture-forge object-graph generator.
//!
//! This crate provides the foundational types shared by the population
//! engine and the command-line front end:
//!
//! - [`TypeRef`] - Type expressions such as `List<Pair<String, Integer>>`
//! - [`BuiltinType`] - Types the engine generates without a schema definition
//! - [`TypeSchema`] - Class, interface and enum definitions loaded from YAML
//! - [`Value`] - Dynamic representation of generated object graphs
//! - [`Settings`] - Sizes, ranges and probabilities used during generation
//!
//! # Architecture
//!
//! ```text
//! fixture-core (this crate)
//!    │
//!    └─── fixture-populate   (node model, generators, population driver)
//!            │
//!            └─── fixture-forge   (command-line front end)
//! ```
//!
//! # Example
//!
//! ```rust
//! use fixture_core::{TypeRef, TypeSchema};
//!
//! let schema = TypeSchema::from_yaml(r#"
//! types:
//!   - name: Person
//!     fields:
//!       - { name: name, type: String }
//!       - { name: friends, type: "List<Person>" }
//! "#).unwrap();
//!
//! let friends = schema.field_type("Person", "friends").unwrap();
//! assert_eq!(friends, &TypeRef::parse("List<Person>").unwrap());
//! ```

pub mod schema;
pub mod settings;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use schema::{
    ClassDefinition, ClassKind, FieldDefinition, GeneratorConfig, OverrideDefinition, SchemaError,
    TypeSchema,
};
pub use settings::{AfterGenerate, Settings, SettingsError};
pub use types::{BuiltinType, CollectionKind, MapKind, PrimitiveType, TypeRef, TypeSyntaxError};
pub use values::{CollectionValue, MapValue, ObjectValue, Value};
