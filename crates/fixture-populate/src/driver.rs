//! Population driver.
//!
//! The driver generates the root value and then works through a FIFO queue
//! of `(node, owner, action)` items, one per field still to be populated.
//! Containers are filled as soon as they are assigned; the fields of their
//! elements join the queue like any other field.
//!
//! Each item passes these gates in order:
//!
//! 1. ignored fields and classes are skipped
//! 2. the existing value must be eligible under the owner's populate action
//! 3. the facade produces a result; ignored results leave the field as is
//! 4. nullable results are cleared with `Settings::nullable_probability`
//! 5. null clears the field (primitives keep their default), anything else
//!    is conformed to the declared type and assigned
//! 6. unless the result is final, the value's own children are populated

use crate::conform::conform;
use crate::error::{PopulateError, Result};
use crate::facade::GeneratorFacade;
use crate::hints::Hints;
use crate::location::Location;
use crate::node::{Node, NodeId, NodeKind, NodeTree};
use crate::random::Random;
use fixture_core::{AfterGenerate, CollectionKind, CollectionValue, MapKind, MapValue, Value};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Attempts per element or entry before a duplicate is given up on.
const MAX_DUPLICATE_RETRIES: usize = 10;

/// A field waiting to be populated.
#[derive(Debug, Clone)]
struct WorkItem {
    node: NodeId,
    /// Location of the object holding the field
    owner: Location,
    action: AfterGenerate,
}

/// What a container slot received.
enum Produced {
    /// Circular ownership or an ignored class: stop filling the container
    Stop,
    Null,
    Value(Value, Hints),
}

/// Populates one value graph.
pub struct PopulationDriver<'a> {
    facade: GeneratorFacade<'a>,
    random: Random,
    queue: VecDeque<WorkItem>,
    /// Sorted collections and maps, ordered once the run completes
    sorted: Vec<Location>,
}

impl<'a> PopulationDriver<'a> {
    pub fn new(facade: GeneratorFacade<'a>, random: Random) -> Self {
        Self {
            facade,
            random,
            queue: VecDeque::new(),
            sorted: Vec::new(),
        }
    }

    /// Generate and populate the root value.
    ///
    /// A null or ignored root yields `Value::Null`.
    pub fn populate(mut self) -> Result<Value> {
        let tree = self.facade.tree();
        let root_id = tree.root_id();
        let root_location = Location::root();

        let result = self
            .facade
            .generate(root_id, None, &root_location, &mut self.random)?;
        let (value, hints) = result.into_parts();
        let Some(value) = value else {
            debug!(target_type = %tree.root().declared_type, "Root left unset");
            return Ok(Value::Null);
        };

        let mut root = conform(tree, root_id, value)?;
        self.populate_nested(&mut root, root_id, &root_location, &hints)?;

        let mut processed = 0usize;
        while let Some(item) = self.queue.pop_front() {
            self.process(&mut root, item)?;
            processed += 1;
        }

        self.sort_containers(&mut root);

        debug!(
            target_type = %tree.root().declared_type,
            seed = self.random.seed(),
            fields = processed,
            instances = self.facade.ancestors().len(),
            "Population complete"
        );
        Ok(root)
    }

    fn process(&mut self, root: &mut Value, item: WorkItem) -> Result<()> {
        let tree = self.facade.tree();
        let node = tree.node(item.node);
        let Some(field) = &node.field else {
            return Ok(());
        };

        if self.facade.overrides().is_ignored(node) {
            trace!(path = %tree.path(item.node), "Field ignored");
            return Ok(());
        }

        let eligible = {
            let owner = item
                .owner
                .get(root)
                .and_then(Value::as_object)
                .ok_or_else(|| PopulateError::MissingOwner(item.owner.to_string()))?;
            self.is_eligible(item.action, node, owner.get(&field.name))
        };
        if !eligible {
            trace!(
                path = %tree.path(item.node),
                action = ?item.action,
                "Existing value kept"
            );
            return Ok(());
        }

        let slot = item.owner.field(&field.name);
        let result = self
            .facade
            .generate(item.node, Some(&item.owner), &slot, &mut self.random)?;
        if result.is_ignored() {
            return Ok(());
        }

        let (value, hints) = result.into_parts();
        match self.gate_null(value, hints.nullable_result) {
            None if node.is_primitive() => {}
            None => set_field(root, &item.owner, &field.name, Value::Null)?,
            Some(value) => {
                let value = conform(tree, item.node, value)?;
                set_field(root, &item.owner, &field.name, value)?;
                self.populate_nested(root, item.node, &slot, &hints)?;
            }
        }
        Ok(())
    }

    /// Populate the children of a freshly assigned value unless it is final.
    fn populate_nested(
        &mut self,
        root: &mut Value,
        id: NodeId,
        location: &Location,
        hints: &Hints,
    ) -> Result<()> {
        if hints.ignore_children {
            return Ok(());
        }
        let action = hints
            .after_generate
            .unwrap_or(self.facade.settings().after_generate);

        let tree = self.facade.tree();
        let node = tree.node(id);
        match node.kind {
            NodeKind::Plain => {
                self.queue.extend(node.children.iter().map(|child| WorkItem {
                    node: *child,
                    owner: location.clone(),
                    action,
                }));
                Ok(())
            }
            NodeKind::Collection { kind, element } => {
                self.populate_collection(root, node, kind, element, location, hints, action)
            }
            NodeKind::Map { kind, key, value } => {
                self.populate_map(root, node, kind, (key, value), location, hints, action)
            }
            NodeKind::Array { element } => {
                self.populate_array(root, element, location, hints, action)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn populate_collection(
        &mut self,
        root: &mut Value,
        node: &Node,
        kind: CollectionKind,
        element: NodeId,
        location: &Location,
        hints: &Hints,
        action: AfterGenerate,
    ) -> Result<()> {
        let tree = self.facade.tree();
        let settings = self.facade.settings();

        let existing = collection_mut(root, location)?.elements.len();
        if !self.container_eligible(action, node, existing) {
            trace!(path = %tree.path(node.id), "Existing collection kept");
            return Ok(());
        }

        let size = hints.data_structure_size.unwrap_or_else(|| {
            self.random
                .usize_range(settings.collection_min_size, settings.collection_max_size)
        });
        let nullable = hints.nullable_elements && kind.permits_null_elements();
        let unique = kind.requires_unique();
        let compare = is_final_on_insert(tree, element);

        'elements: for _ in 0..size {
            for _ in 0..=MAX_DUPLICATE_RETRIES {
                let index = collection_mut(root, location)?.elements.len();
                let slot = location.element(index);

                match self.produce(element, location, &slot, nullable)? {
                    Produced::Stop => {
                        trace!(path = %tree.path(node.id), "Circular element, collection closed");
                        break 'elements;
                    }
                    Produced::Null => {
                        let collection = collection_mut(root, location)?;
                        if !kind.permits_null_elements()
                            || (unique && collection.elements.contains(&Value::Null))
                        {
                            continue;
                        }
                        collection.elements.push(Value::Null);
                        continue 'elements;
                    }
                    Produced::Value(value, element_hints) => {
                        let collection = collection_mut(root, location)?;
                        if unique && compare && collection.elements.contains(&value) {
                            continue;
                        }
                        collection.elements.push(value);
                        self.populate_nested(root, element, &slot, &element_hints)?;
                        continue 'elements;
                    }
                }
            }
            trace!(path = %tree.path(element), "Duplicate retries exhausted, element skipped");
        }

        if kind == CollectionKind::SortedSet {
            self.sorted.push(location.clone());
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn populate_map(
        &mut self,
        root: &mut Value,
        node: &Node,
        kind: MapKind,
        (key, value): (NodeId, NodeId),
        location: &Location,
        hints: &Hints,
        action: AfterGenerate,
    ) -> Result<()> {
        let tree = self.facade.tree();
        let settings = self.facade.settings();

        let existing = map_mut(root, location)?.len();
        if !self.container_eligible(action, node, existing) {
            trace!(path = %tree.path(node.id), "Existing map kept");
            return Ok(());
        }

        let size = hints.data_structure_size.unwrap_or_else(|| {
            self.random
                .usize_range(settings.map_min_size, settings.map_max_size)
        });
        let null_keys = hints.nullable_map_keys && kind.permits_null_keys();
        let compare = is_final_on_insert(tree, key);

        'entries: for _ in 0..size {
            for _ in 0..=MAX_DUPLICATE_RETRIES {
                let index = map_mut(root, location)?.len();
                let key_slot = location.key(index);

                let (key_value, key_hints) =
                    match self.produce(key, location, &key_slot, null_keys)? {
                        Produced::Stop => {
                            trace!(path = %tree.path(node.id), "Circular key, map closed");
                            break 'entries;
                        }
                        Produced::Null if null_keys => (Value::Null, None),
                        Produced::Null => {
                            trace!(path = %tree.path(key), "Null key, entry skipped");
                            continue 'entries;
                        }
                        Produced::Value(v, h) => (v, Some(h)),
                    };

                let map = map_mut(root, location)?;
                if (compare || key_value.is_null()) && map.contains_key(&key_value) {
                    continue;
                }

                let value_slot = location.entry(index);
                let (entry_value, value_hints) =
                    match self.produce(value, location, &value_slot, hints.nullable_map_values)? {
                        Produced::Stop => {
                            trace!(path = %tree.path(node.id), "Circular value, map closed");
                            break 'entries;
                        }
                        Produced::Null => (Value::Null, None),
                        Produced::Value(v, h) => (v, Some(h)),
                    };

                map_mut(root, location)?
                    .entries
                    .push((key_value, entry_value));
                if let Some(h) = key_hints {
                    self.populate_nested(root, key, &key_slot, &h)?;
                }
                if let Some(h) = value_hints {
                    self.populate_nested(root, value, &value_slot, &h)?;
                }
                continue 'entries;
            }
            trace!(path = %tree.path(key), "Duplicate retries exhausted, entry skipped");
        }

        if kind == MapKind::Sorted {
            self.sorted.push(location.clone());
        }
        Ok(())
    }

    /// Fill the slots of an allocated array.
    fn populate_array(
        &mut self,
        root: &mut Value,
        element: NodeId,
        location: &Location,
        hints: &Hints,
        action: AfterGenerate,
    ) -> Result<()> {
        let tree = self.facade.tree();
        let element_node = tree.node(element);
        let length = location
            .get(root)
            .and_then(Value::as_array)
            .map(Vec::len)
            .ok_or_else(|| PopulateError::MissingOwner(location.to_string()))?;

        for index in 0..length {
            let slot = location.element(index);
            if !self.is_eligible(action, element_node, slot.get(root)) {
                continue;
            }
            match self.produce(element, location, &slot, hints.nullable_elements)? {
                Produced::Stop => {
                    trace!(path = %tree.path(element), "Circular element, array closed");
                    break;
                }
                Produced::Null if element_node.is_primitive() => {}
                Produced::Null => *slot.resolve_mut(root)? = Value::Null,
                Produced::Value(value, element_hints) => {
                    *slot.resolve_mut(root)? = value;
                    self.populate_nested(root, element, &slot, &element_hints)?;
                }
            }
        }
        Ok(())
    }

    /// Produce the value of one container slot.
    ///
    /// Elements of an ignored class stop the container like a cycle does.
    fn produce(
        &mut self,
        id: NodeId,
        owner: &Location,
        slot: &Location,
        nullable: bool,
    ) -> Result<Produced> {
        let tree = self.facade.tree();
        if self.facade.overrides().is_ignored(tree.node(id)) {
            trace!(path = %tree.path(id), "Ignored class, container closed");
            return Ok(Produced::Stop);
        }

        if nullable
            && !tree.node(id).is_primitive()
            && self
                .random
                .dice_roll(self.facade.settings().nullable_probability)
        {
            return Ok(Produced::Null);
        }

        let result = self
            .facade
            .generate(id, Some(owner), slot, &mut self.random)?;
        if result.is_ignored() {
            return Ok(Produced::Stop);
        }
        let (value, hints) = result.into_parts();
        match self.gate_null(value, hints.nullable_result) {
            None => Ok(Produced::Null),
            Some(value) => Ok(Produced::Value(conform(tree, id, value)?, hints)),
        }
    }

    fn gate_null(&mut self, value: Option<Value>, nullable: bool) -> Option<Value> {
        let probability = self.facade.settings().nullable_probability;
        value.filter(|_| !(nullable && self.random.dice_roll(probability)))
    }

    /// Whether a field holding `current` may be overwritten under `action`.
    fn is_eligible(&self, action: AfterGenerate, node: &Node, current: Option<&Value>) -> bool {
        let unset = current.map_or(true, |v| v.is_null() || v.is_empty_container());
        match action {
            AfterGenerate::DoNotModify => false,
            AfterGenerate::ApplySelectors => self.facade.overrides().is_selected(node),
            AfterGenerate::PopulateNulls => unset,
            AfterGenerate::PopulateNullsAndDefaultPrimitives => {
                unset || (node.is_primitive() && current.is_some_and(Value::is_default))
            }
            AfterGenerate::PopulateAll => true,
        }
    }

    /// Whether a collection or map with `existing` entries may be filled.
    fn container_eligible(&self, action: AfterGenerate, node: &Node, existing: usize) -> bool {
        match action {
            AfterGenerate::DoNotModify => false,
            AfterGenerate::ApplySelectors => self.facade.overrides().is_selected(node),
            AfterGenerate::PopulateAll => true,
            AfterGenerate::PopulateNulls | AfterGenerate::PopulateNullsAndDefaultPrimitives => {
                existing == 0
            }
        }
    }

    /// Order sorted containers, deepest first so outer reordering does not
    /// invalidate inner locations.
    fn sort_containers(&mut self, root: &mut Value) {
        self.sorted
            .sort_by_key(|location| std::cmp::Reverse(location.segments().len()));
        for location in &self.sorted {
            match location.get_mut(root) {
                Some(Value::Collection(collection)) => collection.elements.sort_by(Value::sort_cmp),
                Some(Value::Map(map)) => map.entries.sort_by(|(a, _), (b, _)| a.sort_cmp(b)),
                _ => {}
            }
        }
    }
}

/// Values that are complete when inserted can be compared for uniqueness.
/// Objects are populated after insertion and are treated as distinct.
fn is_final_on_insert(tree: &NodeTree, id: NodeId) -> bool {
    let node = tree.node(id);
    matches!(node.kind, NodeKind::Plain) && node.children.is_empty()
}

fn set_field(root: &mut Value, owner: &Location, name: &str, value: Value) -> Result<()> {
    owner
        .resolve_mut(root)?
        .as_object_mut()
        .ok_or_else(|| PopulateError::MissingOwner(owner.to_string()))?
        .set(name, value);
    Ok(())
}

fn collection_mut<'v>(root: &'v mut Value, location: &Location) -> Result<&'v mut CollectionValue> {
    match location.resolve_mut(root)? {
        Value::Collection(collection) => Ok(collection),
        _ => Err(PopulateError::MissingOwner(location.to_string())),
    }
}

fn map_mut<'v>(root: &'v mut Value, location: &Location) -> Result<&'v mut MapValue> {
    match location.resolve_mut(root)? {
        Value::Map(map) => Ok(map),
        _ => Err(PopulateError::MissingOwner(location.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{from_fn, prototype, GeneratorExt};
    use crate::registry::{GeneratorRegistry, ImplementationRegistry, Overrides};
    use crate::node::FieldRef;
    use fixture_core::{ObjectValue, Settings, TypeRef, TypeSchema};
    use std::sync::Arc;

    const SCHEMA: &str = r#"
types:
  - name: Person
    fields:
      - { name: name, type: String }
      - { name: age, type: int }
      - { name: nickname, type: String }
      - { name: tags, type: "SortedSet<Integer>" }
"#;

    fn run(overrides: Overrides, settings: Settings, seed: u64) -> Value {
        let schema = Arc::new(TypeSchema::from_yaml(SCHEMA).unwrap());
        let resolver = ImplementationRegistry::new(Arc::clone(&schema));
        let tree =
            NodeTree::build(schema, &TypeRef::named("Person"), &resolver, settings.max_depth)
                .unwrap();
        let registry = GeneratorRegistry::new(&settings).unwrap();
        let facade = GeneratorFacade::new(&tree, &registry, &overrides, &settings);
        PopulationDriver::new(facade, Random::new(seed))
            .populate()
            .unwrap()
    }

    #[test]
    fn test_populates_every_field() {
        let value = run(Overrides::new(), Settings::default(), 7);
        let person = value.as_object().unwrap();

        assert!(person.get("name").unwrap().as_str().is_some());
        assert!(matches!(person.get("age"), Some(Value::Int32(1..))));
        let tags = person.get("tags").unwrap().as_collection().unwrap();
        assert!((2..=6).contains(&tags.elements.len()));
    }

    #[test]
    fn test_sorted_set_is_ordered_and_unique() {
        let mut overrides = Overrides::new();
        let counter = std::sync::atomic::AtomicI32::new(0);
        overrides.generate_class(
            TypeRef::named("Integer"),
            from_fn(move |_| {
                let n = counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                Value::Int32((n * 7) % 5)
            })
            .shared(),
        );
        let settings = Settings::default().with_container_sizes(5, 5);
        let value = run(overrides, settings, 3);

        let tags = value
            .as_object()
            .unwrap()
            .get("tags")
            .unwrap()
            .as_collection()
            .unwrap();
        assert_eq!(
            tags.elements,
            (0..5).map(Value::Int32).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_prototype_keeps_existing_values() {
        let mut overrides = Overrides::new();
        let bob = ObjectValue::new(TypeRef::named("Person"))
            .with_field("name", Value::from("Bob"))
            .with_field("age", Value::Int32(0))
            .with_field("nickname", Value::Null);
        overrides.generate_class(
            TypeRef::named("Person"),
            prototype(Value::Object(bob), AfterGenerate::PopulateNulls).shared(),
        );

        let value = run(overrides, Settings::default(), 11);
        let person = value.as_object().unwrap();
        assert_eq!(person.get("name"), Some(&Value::from("Bob")));
        assert_eq!(person.get("age"), Some(&Value::Int32(0)));
        assert!(person.get("nickname").unwrap().as_str().is_some());
    }

    #[test]
    fn test_ignored_field_keeps_default() {
        let mut overrides = Overrides::new();
        overrides.ignore_field(FieldRef::new("Person", "age"));
        let value = run(overrides, Settings::default(), 5);
        assert_eq!(value.as_object().unwrap().get("age"), Some(&Value::Int32(0)));
    }
}
