//! The `Generator` trait and helpers for building generators from closures
//! and fixed values.
//!
//! Generators are shared between runs and threads, so they take `&self` and
//! keep no per-run state. The facade owns what a run needs: it calls `init`
//! once per run before the generator's first use, and counts how many values
//! each generator has produced so far (see `Generator::generate_nth`).

use crate::error::BoxError;
use crate::hints::Hints;
use crate::random::Random;
use fixture_core::{AfterGenerate, Settings, TypeSchema, Value};
use std::fmt;
use std::sync::Arc;

/// Context handed to `Generator::init`.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub settings: &'a Settings,
    pub schema: &'a TypeSchema,
}

/// Produces values for one kind of position.
pub trait Generator: Send + Sync {
    /// Prepare per-run state.
    fn init(&self, _context: &GeneratorContext<'_>) -> Result<(), BoxError> {
        Ok(())
    }

    /// Produce a value. Returning `Value::Null` clears the position.
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError>;

    /// Produce the value at `index`, the number of values this generator
    /// has already produced in the current run.
    fn generate_nth(&self, random: &mut Random, _index: u64) -> Result<Value, BoxError> {
        self.generate(random)
    }

    /// Hints attached to every value this generator produces.
    fn hints(&self) -> Option<Hints> {
        None
    }
}

/// Type-erased generator shared across runs.
pub type SharedGenerator = Arc<dyn Generator>;

impl fmt::Debug for dyn Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("hints", &self.hints())
            .finish_non_exhaustive()
    }
}

impl<G: Generator + ?Sized> Generator for Arc<G> {
    fn init(&self, context: &GeneratorContext<'_>) -> Result<(), BoxError> {
        (**self).init(context)
    }

    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        (**self).generate(random)
    }

    fn generate_nth(&self, random: &mut Random, index: u64) -> Result<Value, BoxError> {
        (**self).generate_nth(random, index)
    }

    fn hints(&self) -> Option<Hints> {
        (**self).hints()
    }
}

/// Generator backed by an infallible closure.
pub struct FnGenerator<F> {
    f: F,
}

impl<F> Generator for FnGenerator<F>
where
    F: Fn(&mut Random) -> Value + Send + Sync,
{
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok((self.f)(random))
    }
}

/// Generator backed by a fallible closure.
pub struct TryFnGenerator<F> {
    f: F,
}

impl<F> Generator for TryFnGenerator<F>
where
    F: Fn(&mut Random) -> Result<Value, BoxError> + Send + Sync,
{
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        (self.f)(random)
    }
}

/// Build a generator from an infallible closure.
pub fn from_fn<F>(f: F) -> FnGenerator<F>
where
    F: Fn(&mut Random) -> Value + Send + Sync,
{
    FnGenerator { f }
}

/// Build a generator from a fallible closure.
pub fn try_from_fn<F>(f: F) -> TryFnGenerator<F>
where
    F: Fn(&mut Random) -> Result<Value, BoxError> + Send + Sync,
{
    TryFnGenerator { f }
}

/// Generator returning the same value every time.
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    value: Value,
    hints: Hints,
}

impl Generator for ValueGenerator {
    fn generate(&self, _random: &mut Random) -> Result<Value, BoxError> {
        Ok(self.value.clone())
    }

    fn hints(&self) -> Option<Hints> {
        Some(self.hints.clone())
    }
}

/// Supply a fixed, final value. Its children are never populated.
pub fn supply(value: Value) -> ValueGenerator {
    ValueGenerator {
        value,
        hints: Hints::new().ignore_children(true),
    }
}

/// Start from a pre-built value and populate it under `action`.
pub fn prototype(value: Value, action: AfterGenerate) -> ValueGenerator {
    ValueGenerator {
        value,
        hints: Hints::new().after_generate(action),
    }
}

/// Generator whose hints are replaced.
pub struct WithHints<G> {
    inner: G,
    hints: Hints,
}

impl<G: Generator> Generator for WithHints<G> {
    fn init(&self, context: &GeneratorContext<'_>) -> Result<(), BoxError> {
        self.inner.init(context)
    }

    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        self.inner.generate(random)
    }

    fn generate_nth(&self, random: &mut Random, index: u64) -> Result<Value, BoxError> {
        self.inner.generate_nth(random, index)
    }

    fn hints(&self) -> Option<Hints> {
        Some(self.hints.clone())
    }
}

/// Extension methods for generators.
pub trait GeneratorExt: Generator + Sized {
    /// Attach hints to every value this generator produces.
    fn with_hints(self, hints: Hints) -> WithHints<Self> {
        WithHints { inner: self, hints }
    }

    /// Erase the concrete type.
    fn shared(self) -> SharedGenerator
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<G: Generator> GeneratorExt for G {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn() {
        let generator = from_fn(|random| Value::Int64(random.int_range(1, 3)));
        let mut random = Random::new(42);
        let value = generator.generate(&mut random).unwrap();
        assert!(matches!(value, Value::Int64(1..=3)));
        assert!(generator.hints().is_none());
    }

    #[test]
    fn test_try_from_fn_propagates_errors() {
        let generator = try_from_fn(|_| Err("boom".into()));
        let err = generator.generate(&mut Random::new(1)).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_supply_is_final() {
        let generator = supply(Value::from("fixed"));
        assert_eq!(
            generator.generate(&mut Random::new(1)).unwrap(),
            Value::from("fixed")
        );
        assert!(generator.hints().unwrap().ignore_children);
    }

    #[test]
    fn test_prototype_carries_action() {
        let generator = prototype(Value::Int32(0), AfterGenerate::PopulateNulls);
        let hints = generator.hints().unwrap();
        assert_eq!(hints.after_generate, Some(AfterGenerate::PopulateNulls));
        assert!(!hints.ignore_children);
    }

    #[test]
    fn test_with_hints_replaces_hints() {
        let generator = supply(Value::Bool(true)).with_hints(Hints::new().size(4));
        let hints = generator.hints().unwrap();
        assert_eq!(hints.data_structure_size, Some(4));
        assert!(!hints.ignore_children);

        let shared = generator.shared();
        assert_eq!(
            shared.generate(&mut Random::new(3)).unwrap(),
            Value::Bool(true)
        );
    }
}
