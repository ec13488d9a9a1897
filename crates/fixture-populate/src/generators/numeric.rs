//! Numeric, boolean and character generators.

use crate::error::BoxError;
use crate::generator::Generator;
use crate::random::Random;
use fixture_core::{PrimitiveType, Settings, Value};

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range(random: &mut Random, min: i64, max: i64) -> Value {
    Value::Int64(random.int_range(min, max))
}

/// Generate a random float in the given range (inclusive).
pub fn generate_float_range(random: &mut Random, min: f64, max: f64) -> Value {
    Value::Float64(random.f64_range(min, max))
}

/// Generate a random decimal in the given range.
///
/// The decimal is stored as a string with 2 decimal places.
pub fn generate_decimal_range(random: &mut Random, min: f64, max: f64) -> Value {
    let value = random.f64_range(min, max);
    Value::Decimal(format!("{value:.2}"))
}

/// Default generator for integral primitives and their boxed forms.
#[derive(Debug, Clone)]
pub struct IntGenerator {
    kind: PrimitiveType,
    min: i64,
    max: i64,
}

impl IntGenerator {
    /// Range from the settings, clamped to what `kind` can hold.
    pub fn new(kind: PrimitiveType, settings: &Settings) -> Self {
        let (lo, hi) = kind.integer_bounds().unwrap_or((i64::MIN, i64::MAX));
        let min = settings.int_min.clamp(lo, hi);
        let max = settings.int_max.clamp(lo, hi).max(min);
        Self { kind, min, max }
    }
}

impl Generator for IntGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        let value = generate_int_range(random, self.min, self.max);
        Ok(value.coerce_primitive(self.kind))
    }
}

/// Default generator for floating point primitives and their boxed forms.
#[derive(Debug, Clone)]
pub struct FloatGenerator {
    kind: PrimitiveType,
    min: f64,
    max: f64,
}

impl FloatGenerator {
    pub fn new(kind: PrimitiveType, settings: &Settings) -> Self {
        Self {
            kind,
            min: settings.float_min,
            max: settings.float_max,
        }
    }
}

impl Generator for FloatGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        let value = generate_float_range(random, self.min, self.max);
        Ok(value.coerce_primitive(self.kind))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoolGenerator;

impl Generator for BoolGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok(Value::Bool(random.true_or_false()))
    }
}

/// Upper-case letters.
#[derive(Debug, Clone, Default)]
pub struct CharGenerator;

impl Generator for CharGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok(Value::Char(random.upper_case_letter()))
    }
}

/// Decimals with two fraction digits in the settings' float range.
#[derive(Debug, Clone)]
pub struct DecimalGenerator {
    min: f64,
    max: f64,
}

impl DecimalGenerator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            min: settings.float_min,
            max: settings.float_max,
        }
    }
}

impl Generator for DecimalGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok(generate_decimal_range(random, self.min, self.max))
    }
}
