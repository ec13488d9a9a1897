//! Container generators.
//!
//! These produce an empty container together with size and nullability
//! hints. The facade converts the container to the kind declared by the
//! position (a set, a sorted map, an array of the hinted length) and the
//! driver fills it.

use crate::error::BoxError;
use crate::generator::Generator;
use crate::hints::Hints;
use crate::random::Random;
use fixture_core::{CollectionKind, CollectionValue, MapKind, MapValue, Value};

/// Fixed-size collection.
#[derive(Debug, Clone)]
pub struct CollectionGenerator {
    size: usize,
    nullable_elements: bool,
}

impl CollectionGenerator {
    pub fn new(size: usize, nullable_elements: bool) -> Self {
        Self {
            size,
            nullable_elements,
        }
    }
}

impl Generator for CollectionGenerator {
    fn generate(&self, _random: &mut Random) -> Result<Value, BoxError> {
        Ok(Value::Collection(CollectionValue::new(CollectionKind::List)))
    }

    fn hints(&self) -> Option<Hints> {
        Some(
            Hints::new()
                .size(self.size)
                .nullable_elements(self.nullable_elements),
        )
    }
}

/// Fixed-size map.
#[derive(Debug, Clone)]
pub struct MapGenerator {
    size: usize,
    nullable_keys: bool,
    nullable_values: bool,
}

impl MapGenerator {
    pub fn new(size: usize, nullable_keys: bool, nullable_values: bool) -> Self {
        Self {
            size,
            nullable_keys,
            nullable_values,
        }
    }
}

impl Generator for MapGenerator {
    fn generate(&self, _random: &mut Random) -> Result<Value, BoxError> {
        Ok(Value::Map(MapValue::new(MapKind::Hash)))
    }

    fn hints(&self) -> Option<Hints> {
        Some(
            Hints::new()
                .size(self.size)
                .nullable_map_keys(self.nullable_keys)
                .nullable_map_values(self.nullable_values),
        )
    }
}

/// Fixed-length array.
#[derive(Debug, Clone)]
pub struct ArrayGenerator {
    length: usize,
    nullable_elements: bool,
}

impl ArrayGenerator {
    pub fn new(length: usize, nullable_elements: bool) -> Self {
        Self {
            length,
            nullable_elements,
        }
    }
}

impl Generator for ArrayGenerator {
    fn generate(&self, _random: &mut Random) -> Result<Value, BoxError> {
        Ok(Value::Array(Vec::new()))
    }

    fn hints(&self) -> Option<Hints> {
        Some(
            Hints::new()
                .size(self.length)
                .nullable_elements(self.nullable_elements),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_generator_hints() {
        let generator = CollectionGenerator::new(5, true);
        let value = generator.generate(&mut Random::new(1)).unwrap();
        assert!(value.is_empty_container());

        let hints = generator.hints().unwrap();
        assert_eq!(hints.data_structure_size, Some(5));
        assert!(hints.nullable_elements);
        assert!(!hints.ignore_children);
    }

    #[test]
    fn test_map_generator_hints() {
        let hints = MapGenerator::new(3, true, false).hints().unwrap();
        assert_eq!(hints.data_structure_size, Some(3));
        assert!(hints.nullable_map_keys);
        assert!(!hints.nullable_map_values);
    }

    #[test]
    fn test_array_generator_hints() {
        let generator = ArrayGenerator::new(4, false);
        assert_eq!(
            generator.generate(&mut Random::new(1)).unwrap(),
            Value::Array(vec![])
        );
        assert_eq!(generator.hints().unwrap().data_structure_size, Some(4));
    }
}
