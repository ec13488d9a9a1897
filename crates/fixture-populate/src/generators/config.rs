//! Generators described by a declarative `GeneratorConfig`.

use crate::error::BoxError;
use crate::generator::Generator;
use crate::generators::static_value::yaml_to_value;
use crate::generators::{numeric, temporal, text, uuid};
use crate::random::Random;
use fixture_core::{GeneratorConfig, Value};

/// Leaf generator driven by a `GeneratorConfig`.
///
/// The `{index}` placeholder of patterns and the `sequential` generator use
/// the run index passed to `generate_nth`.
#[derive(Debug)]
pub struct ConfiguredGenerator {
    config: GeneratorConfig,
}

impl ConfiguredGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl Generator for ConfiguredGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        self.generate_nth(random, 0)
    }

    fn generate_nth(&self, random: &mut Random, index: u64) -> Result<Value, BoxError> {
        let value = match &self.config {
            GeneratorConfig::UuidV4 => uuid::generate_uuid_v4(random),

            GeneratorConfig::Sequential { start } => Value::Int64(start.wrapping_add(index as i64)),

            GeneratorConfig::Pattern { pattern } => text::generate_pattern(pattern, random, index),

            GeneratorConfig::IntRange { min, max } => {
                numeric::generate_int_range(random, *min, *max)
            }

            GeneratorConfig::FloatRange { min, max } => {
                numeric::generate_float_range(random, *min, *max)
            }

            GeneratorConfig::DecimalRange { min, max } => {
                numeric::generate_decimal_range(random, *min, *max)
            }

            GeneratorConfig::TimestampRange { start, end } => {
                temporal::generate_timestamp_range(random, start, end)?
            }

            GeneratorConfig::DateRange { start, end } => {
                temporal::generate_date_range(random, start, end)?
            }

            GeneratorConfig::WeightedBool { true_weight } => {
                Value::Bool(random.dice_roll(*true_weight))
            }

            GeneratorConfig::OneOf { values } => random
                .one_of(values)
                .map(yaml_to_value)
                .unwrap_or(Value::Null),

            GeneratorConfig::Static { value } => yaml_to_value(value),

            GeneratorConfig::Null => Value::Null,

            GeneratorConfig::Alphabetic {
                min_length,
                max_length,
            } => text::generate_alphabetic(random, *min_length, *max_length),

            GeneratorConfig::Collection { .. }
            | GeneratorConfig::Map { .. }
            | GeneratorConfig::Array { .. } => {
                return Err(format!(
                    "container config {:?} is not a leaf generator",
                    self.config
                )
                .into())
            }
        };
        Ok(value)
    }
}
