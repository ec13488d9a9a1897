//! Public entry point: build a fixture once, create values many times.

use crate::driver::PopulationDriver;
use crate::error::{PopulateError, Result};
use crate::facade::GeneratorFacade;
use crate::generator::{supply, Generator, GeneratorExt, SharedGenerator};
use crate::node::{FieldRef, NodeTree};
use crate::random::{derive_seed, Random};
use crate::registry::{GeneratorRegistry, ImplementationRegistry, Overrides};
use fixture_core::{Settings, TypeRef, TypeSchema, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Configures a [`Fixture`].
///
/// Selector strings (`"Order.id"`, `"List<String>"`) are parsed as they are
/// added; the first parse failure is reported by [`build`](Self::build).
pub struct FixtureBuilder {
    schema: Arc<TypeSchema>,
    target: TypeRef,
    settings: Settings,
    seed: Option<u64>,
    overrides: Overrides,
    implementations: Vec<(String, TypeRef)>,
    defaults: Vec<(TypeRef, SharedGenerator)>,
    error: Option<PopulateError>,
}

impl FixtureBuilder {
    fn new(schema: Arc<TypeSchema>, target: TypeRef) -> Self {
        Self {
            schema,
            target,
            settings: Settings::default(),
            seed: None,
            overrides: Overrides::new(),
            implementations: Vec::new(),
            defaults: Vec::new(),
            error: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Fixed seed for [`Fixture::create`] and [`Fixture::iter`].
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate `field` (written `Owner.field`) with `generator`.
    pub fn generate_field<G: Generator + 'static>(mut self, field: &str, generator: G) -> Self {
        if let Some(field) = self.parse_field(field) {
            self.overrides.generate_field(field, generator.shared());
        }
        self
    }

    /// Generate every position of type `class` with `generator`. A raw name
    /// matches every parameterization.
    pub fn generate_class<G: Generator + 'static>(mut self, class: &str, generator: G) -> Self {
        if let Some(class) = self.parse_type(class) {
            self.overrides.generate_class(class, generator.shared());
        }
        self
    }

    /// Assign a fixed value to `field` and leave its children alone.
    pub fn supply_field(self, field: &str, value: Value) -> Self {
        self.generate_field(field, supply(value))
    }

    pub fn ignore_field(mut self, field: &str) -> Self {
        if let Some(field) = self.parse_field(field) {
            self.overrides.ignore_field(field);
        }
        self
    }

    pub fn ignore_class(mut self, class: &str) -> Self {
        if let Some(class) = self.parse_type(class) {
            self.overrides.ignore_class(class);
        }
        self
    }

    /// Allow `field` to be left null with `Settings::nullable_probability`.
    pub fn nullable_field(mut self, field: &str) -> Self {
        if let Some(field) = self.parse_field(field) {
            self.overrides.nullable_field(field);
        }
        self
    }

    pub fn nullable_class(mut self, class: &str) -> Self {
        if let Some(class) = self.parse_type(class) {
            self.overrides.nullable_class(class);
        }
        self
    }

    /// Use `implementation` wherever `interface` is declared.
    pub fn implementation(mut self, interface: &str, implementation: &str) -> Self {
        if let Some(implementation) = self.parse_type(implementation) {
            self.implementations
                .push((interface.to_string(), implementation));
        }
        self
    }

    /// Default generator for a type, used when no override applies.
    pub fn register_default<G: Generator + 'static>(mut self, ty: &str, generator: G) -> Self {
        if let Some(ty) = self.parse_type(ty) {
            self.defaults.push((ty, generator.shared()));
        }
        self
    }

    /// Validate the configuration and build the node tree.
    ///
    /// Overrides from the schema's `overrides:` section apply first;
    /// programmatic overrides replace them.
    pub fn build(self) -> Result<Fixture> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut settings = self.settings;
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        settings.validate()?;

        let overrides = Overrides::from_definitions(&self.schema.overrides)?.merge(self.overrides);

        let mut resolver = ImplementationRegistry::new(Arc::clone(&self.schema));
        for (interface, implementation) in self.implementations {
            resolver.register(interface, implementation);
        }
        let tree = NodeTree::build(
            Arc::clone(&self.schema),
            &self.target,
            &resolver,
            settings.max_depth,
        )?;

        let mut registry = GeneratorRegistry::new(&settings)?;
        for (ty, generator) in self.defaults {
            registry.register_default(ty, generator);
        }

        debug!(
            target_type = %self.target,
            nodes = tree.len(),
            seed = ?settings.seed,
            "Built fixture"
        );

        Ok(Fixture {
            tree: Arc::new(tree),
            registry: Arc::new(registry),
            overrides: Arc::new(overrides),
            settings: Arc::new(settings),
        })
    }

    fn parse_field(&mut self, field: &str) -> Option<FieldRef> {
        self.record(field.parse())
    }

    fn parse_type(&mut self, ty: &str) -> Option<TypeRef> {
        self.record(TypeRef::parse(ty).map_err(PopulateError::from))
    }

    fn record<T>(&mut self, parsed: Result<T>) -> Option<T> {
        match parsed {
            Ok(value) => Some(value),
            Err(error) => {
                self.error.get_or_insert(error);
                None
            }
        }
    }
}

/// Generator of populated values for one target type.
///
/// The node tree, generators and overrides are shared and read-only; each
/// call to [`create`](Self::create) runs with its own random source and
/// ancestor tracker, so a `Fixture` can be shared between threads.
#[derive(Clone)]
pub struct Fixture {
    tree: Arc<NodeTree>,
    registry: Arc<GeneratorRegistry>,
    overrides: Arc<Overrides>,
    settings: Arc<Settings>,
}

impl Fixture {
    pub fn builder(schema: impl Into<Arc<TypeSchema>>, target: TypeRef) -> FixtureBuilder {
        FixtureBuilder::new(schema.into(), target)
    }

    /// Fixture for a type expression with default settings.
    pub fn of(schema: impl Into<Arc<TypeSchema>>, target: &str) -> Result<Self> {
        Self::builder(schema, TypeRef::parse(target)?).build()
    }

    /// Create a value, seeded from the settings or from entropy.
    pub fn create(&self) -> Result<Value> {
        self.create_with_seed(self.base_seed())
    }

    /// Create a value from a fixed seed.
    pub fn create_with_seed(&self, seed: u64) -> Result<Value> {
        debug!(target_type = %self.target(), seed, "Creating fixture value");
        let facade = GeneratorFacade::new(&self.tree, &self.registry, &self.overrides, &self.settings);
        PopulationDriver::new(facade, Random::new(seed)).populate()
    }

    /// Create `count` values with seeds derived from one base seed.
    pub fn iter(&self, count: usize) -> impl Iterator<Item = Result<Value>> + '_ {
        let base = self.base_seed();
        (0..count as u64).map(move |index| self.create_with_seed(derive_seed(base, index)))
    }

    pub fn target(&self) -> &TypeRef {
        &self.tree.root().declared_type
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn base_seed(&self) -> u64 {
        match self.settings.seed {
            Some(seed) => seed,
            None => {
                let seed = Random::from_entropy().seed();
                debug!(seed, "No seed configured, using a random seed");
                seed
            }
        }
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("target", self.target())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::from_fn;

    fn schema() -> TypeSchema {
        TypeSchema::from_yaml(
            r#"
types:
  - name: Order
    fields:
      - { name: id, type: Uuid }
      - { name: quantity, type: int }
      - { name: note, type: String }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_same_seed_same_value() {
        let fixture = Fixture::builder(schema(), TypeRef::named("Order"))
            .seed(99)
            .build()
            .unwrap();
        assert_eq!(fixture.create().unwrap(), fixture.create().unwrap());
        assert_eq!(
            fixture.create_with_seed(5).unwrap(),
            fixture.create_with_seed(5).unwrap()
        );
        assert_ne!(
            fixture.create_with_seed(5).unwrap(),
            fixture.create_with_seed(6).unwrap()
        );
    }

    #[test]
    fn test_iter_yields_count_values() {
        let fixture = Fixture::builder(schema(), TypeRef::named("Order"))
            .seed(1)
            .build()
            .unwrap();
        let values: Vec<_> = fixture.iter(4).collect::<Result<_>>().unwrap();
        assert_eq!(values.len(), 4);
        assert_ne!(values[0], values[1]);
    }

    #[test]
    fn test_builder_reports_bad_selectors() {
        let result = Fixture::builder(schema(), TypeRef::named("Order"))
            .ignore_field("quantity")
            .build();
        assert!(matches!(result, Err(PopulateError::InvalidOverride(_))));

        let result = Fixture::builder(schema(), TypeRef::named("Order"))
            .generate_class("List<", from_fn(|_| Value::Null))
            .build();
        assert!(matches!(result, Err(PopulateError::TypeSyntax(_))));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            collection_min_size: 5,
            collection_max_size: 1,
            ..Settings::default()
        };
        let result = Fixture::builder(schema(), TypeRef::named("Order"))
            .settings(settings)
            .build();
        assert!(matches!(result, Err(PopulateError::Settings(_))));
    }

    #[test]
    fn test_debug_names_target() {
        let fixture = Fixture::of(schema(), "Order").unwrap();
        let debug = format!("{fixture:?}");
        assert!(debug.starts_with("Fixture { target: "), "{debug}");
        assert!(debug.contains("Order"), "{debug}");
    }

    #[test]
    fn test_fixture_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Fixture>();
    }
}
