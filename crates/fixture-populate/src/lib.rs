//! Object-graph population engine for fixture-forge.
//!
//! This crate turns a type expression over a [`TypeSchema`](fixture_core::TypeSchema) into fully
//! populated values. The shape of the object graph is computed once per
//! target type as an immutable [`NodeTree`]; each call to
//! [`Fixture::create`] then walks that tree with its own seeded random
//! source, asking the [`GeneratorFacade`] for every value and letting the
//! [`PopulationDriver`] assign and populate it.
//!
//! # Architecture
//!
//! ```text
//! TypeSchema (YAML) + target type
//!        │
//!        ▼
//! ┌──────────────────┐      ┌────────────────────┐
//! │  FixtureBuilder  │─────▶│  NodeTree (Arc)    │  built once, shared
//! │  overrides       │      │  GeneratorRegistry │
//! │  settings, seed  │      │  Overrides         │
//! └────────┬─────────┘      └─────────┬──────────┘
//!          │ create()                 │
//!          ▼                          ▼
//! ┌──────────────────┐      ┌────────────────────┐
//! │ PopulationDriver │◀────▶│  GeneratorFacade   │  per run
//! │  work queue      │      │  AncestorTree      │
//! │  Random (StdRng) │      │                    │
//! └────────┬─────────┘      └────────────────────┘
//!          │
//!          ▼
//!        Value
//! ```
//!
//! # Example
//!
//! ```rust
//! use fixture_core::{TypeSchema, Value};
//! use fixture_populate::Fixture;
//!
//! let schema = TypeSchema::from_yaml(r#"
//! types:
//!   - name: Pair
//!     type_params: [L, R]
//!     fields:
//!       - { name: left, type: L }
//!       - { name: right, type: R }
//! "#).unwrap();
//!
//! let fixture = Fixture::builder(schema, "Pair<String, Integer>".parse().unwrap())
//!     .seed(42)
//!     .supply_field("Pair.left", Value::from("fixed"))
//!     .build()
//!     .unwrap();
//!
//! let pair = fixture.create().unwrap();
//! let pair = pair.as_object().unwrap();
//! assert_eq!(pair.get("left"), Some(&Value::from("fixed")));
//! assert!(matches!(pair.get("right"), Some(Value::Int32(_))));
//! ```
//!
//! # Generators
//!
//! Leaf types (primitives, boxed primitives, `String`, `Uuid`, `Date`,
//! `DateTime`, `Decimal`) have built-in generators driven by `Settings`.
//! Schema overrides may use these declarative generators:
//!
//! - `uuid_v4` - Random UUID v4
//! - `sequential` - Sequential integers
//! - `pattern` - Pattern strings with placeholders (`{index}`, `{uuid}`, `{rand:N}`)
//! - `int_range` - Random integers in a range
//! - `float_range` - Random floats in a range
//! - `decimal_range` - Random decimals in a range
//! - `timestamp_range` - Random timestamps in a date range
//! - `date_range` - Random dates in a date range
//! - `weighted_bool` - Boolean with configurable true probability
//! - `one_of` - Random selection from a list
//! - `static` - Static value
//! - `null` - Null value
//! - `alphabetic` - Upper-case letters
//! - `collection`, `map`, `array` - Container sizes and nullability

pub mod ancestor;
pub mod conform;
pub mod driver;
pub mod error;
pub mod facade;
pub mod fixture;
pub mod generator;
pub mod generators;
pub mod hints;
pub mod location;
pub mod node;
pub mod random;
pub mod registry;

// Re-exports for convenience
pub use ancestor::AncestorTree;
pub use driver::PopulationDriver;
pub use error::{BoxError, PopulateError, Result};
pub use facade::GeneratorFacade;
pub use fixture::{Fixture, FixtureBuilder};
pub use generator::{Generator, GeneratorContext, GeneratorExt, SharedGenerator};
pub use hints::{GeneratorResult, Hints};
pub use location::{Location, Segment};
pub use node::{FieldRef, Node, NodeId, NodeKind, NodeRole, NodeTree};
pub use random::Random;
pub use registry::{
    GeneratorRegistry, GeneratorSource, ImplementationRegistry, ImplementationResolver, Overrides,
};
