//! Built-in value generators.
//!
//! Leaf types known to the engine (primitives, boxed primitives, `String`,
//! `Uuid`, `Date`, `DateTime`, `Decimal`) get a default generator driven by
//! `Settings`. Schema overrides use the declarative generators in
//! [`config`] and [`container`].

pub mod config;
pub mod container;
pub mod numeric;
pub mod static_value;
pub mod temporal;
pub mod text;
pub mod uuid;

use crate::generator::{GeneratorExt, SharedGenerator};
use fixture_core::{BuiltinType, GeneratorConfig, PrimitiveType, Settings, SettingsError};
use std::collections::HashMap;

pub use config::ConfiguredGenerator;
pub use container::{ArrayGenerator, CollectionGenerator, MapGenerator};

/// Build the generator described by a schema override.
pub fn from_config(config: &GeneratorConfig) -> SharedGenerator {
    match config {
        GeneratorConfig::Collection {
            size,
            nullable_elements,
        } => CollectionGenerator::new(*size, *nullable_elements).shared(),
        GeneratorConfig::Map {
            size,
            nullable_keys,
            nullable_values,
        } => MapGenerator::new(*size, *nullable_keys, *nullable_values).shared(),
        GeneratorConfig::Array {
            length,
            nullable_elements,
        } => ArrayGenerator::new(*length, *nullable_elements).shared(),
        other => ConfiguredGenerator::new(other.clone()).shared(),
    }
}

/// Default generators for built-in leaf types.
#[derive(Clone, Default)]
pub struct BuiltinGenerators {
    generators: HashMap<BuiltinType, SharedGenerator>,
}

impl BuiltinGenerators {
    /// Create the default generators for the given settings.
    pub fn new(settings: &Settings) -> Result<Self, SettingsError> {
        use PrimitiveType::*;

        let mut generators: HashMap<BuiltinType, SharedGenerator> = HashMap::new();
        for kind in [Bool, Char, Int8, Int16, Int32, Int64, Float32, Float64] {
            let generator = match kind {
                Bool => numeric::BoolGenerator.shared(),
                Char => numeric::CharGenerator.shared(),
                Float32 | Float64 => numeric::FloatGenerator::new(kind, settings).shared(),
                _ => numeric::IntGenerator::new(kind, settings).shared(),
            };
            generators.insert(BuiltinType::Primitive(kind), generator.clone());
            generators.insert(BuiltinType::Boxed(kind), generator);
        }

        generators.insert(
            BuiltinType::String,
            text::StringGenerator::new(settings).shared(),
        );
        generators.insert(BuiltinType::Uuid, uuid::UuidGenerator.shared());
        generators.insert(
            BuiltinType::Date,
            temporal::DateGenerator::new(settings)?.shared(),
        );
        generators.insert(
            BuiltinType::DateTime,
            temporal::DateTimeGenerator::new(settings)?.shared(),
        );
        generators.insert(
            BuiltinType::Decimal,
            numeric::DecimalGenerator::new(settings).shared(),
        );

        Ok(Self { generators })
    }

    /// Default generator for a built-in type. Containers have none.
    pub fn get(&self, builtin: BuiltinType) -> Option<&SharedGenerator> {
        self.generators.get(&builtin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Random;
    use fixture_core::{CollectionKind, Value};

    #[test]
    fn test_builtin_generators_cover_leaf_types() {
        let builtins = BuiltinGenerators::new(&Settings::default()).unwrap();
        let mut random = Random::new(42);

        let int = builtins
            .get(BuiltinType::Primitive(PrimitiveType::Int32))
            .unwrap();
        assert!(matches!(int.generate(&mut random).unwrap(), Value::Int32(1..=10_000)));

        let boxed = builtins.get(BuiltinType::Boxed(PrimitiveType::Int64)).unwrap();
        assert!(matches!(boxed.generate(&mut random).unwrap(), Value::Int64(_)));

        for builtin in [
            BuiltinType::String,
            BuiltinType::Uuid,
            BuiltinType::Date,
            BuiltinType::DateTime,
            BuiltinType::Decimal,
        ] {
            let value = builtins.get(builtin).unwrap().generate(&mut random).unwrap();
            assert!(!value.is_null(), "{builtin:?} produced null");
        }

        assert!(builtins
            .get(BuiltinType::Collection(CollectionKind::List))
            .is_none());
    }

    #[test]
    fn test_from_config_dispatch() {
        let generator = from_config(&GeneratorConfig::Collection {
            size: 5,
            nullable_elements: false,
        });
        assert_eq!(generator.hints().unwrap().data_structure_size, Some(5));

        let generator = from_config(&GeneratorConfig::UuidV4);
        assert!(generator.hints().is_none());
        assert!(matches!(
            generator.generate(&mut Random::new(1)).unwrap(),
            Value::Uuid(_)
        ));
    }
}
