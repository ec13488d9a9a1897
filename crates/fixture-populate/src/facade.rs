//! Generator facade: decides how a node's value is produced.
//!
//! For each request the facade applies, in order:
//!
//! 0. nodes cut by the depth limit are ignored
//! 1. non-primitive nodes whose declared type is already on the owner chain
//!    are ignored (circular ownership)
//! 2. field and class overrides
//! 3. primitives get their default generator, without ancestor tracking
//! 4. arrays are allocated with default slots
//! 5. defaults: registered or built-in generators, enum variants, empty
//!    containers and default-constructed objects; interfaces without an
//!    implementation are ignored or rejected
//! 6. non-null values are recorded in the ancestor tree

use crate::ancestor::AncestorTree;
use crate::error::{PopulateError, Result};
use crate::generator::{GeneratorContext, SharedGenerator};
use crate::hints::{GeneratorResult, Hints};
use crate::location::Location;
use crate::node::{Node, NodeId, NodeKind, NodeTree};
use crate::random::Random;
use crate::registry::{GeneratorRegistry, Overrides, Resolved};
use fixture_core::{
    AfterGenerate, ClassKind, CollectionValue, MapValue, ObjectValue, Settings, Value,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Per-run generator facade.
pub struct GeneratorFacade<'a> {
    tree: &'a NodeTree,
    registry: &'a GeneratorRegistry,
    overrides: &'a Overrides,
    settings: &'a Settings,
    ancestors: AncestorTree,
    /// Values produced in this run, by generator address. A generator is
    /// initialised when it first appears here.
    produced: HashMap<usize, u64>,
}

impl<'a> GeneratorFacade<'a> {
    pub fn new(
        tree: &'a NodeTree,
        registry: &'a GeneratorRegistry,
        overrides: &'a Overrides,
        settings: &'a Settings,
    ) -> Self {
        Self {
            tree,
            registry,
            overrides,
            settings,
            ancestors: AncestorTree::new(),
            produced: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &'a NodeTree {
        self.tree
    }

    pub fn overrides(&self) -> &'a Overrides {
        self.overrides
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn ancestors(&self) -> &AncestorTree {
        &self.ancestors
    }

    /// Produce the value for `id`, to be stored at `slot` inside the value
    /// at `owner`.
    pub fn generate(
        &mut self,
        id: NodeId,
        owner: Option<&Location>,
        slot: &Location,
        random: &mut Random,
    ) -> Result<GeneratorResult> {
        let tree = self.tree;
        let node = tree.node(id);

        if node.truncated {
            trace!(path = %tree.path(id), "Depth limit reached, skipping");
            return Ok(GeneratorResult::ignored());
        }

        if !node.is_primitive() && self.is_circular(node, owner) {
            trace!(
                path = %self.tree.path(id),
                declared = %node.declared_type,
                "Circular ownership, skipping"
            );
            return Ok(GeneratorResult::ignored());
        }

        let nullable = self.overrides.is_nullable(node);

        if let Some(resolved) = self.registry.resolve_override(node, self.overrides) {
            let result = self.invoke(node, &resolved, random)?;
            return Ok(self.finish(node, owner, slot, result, nullable));
        }

        if node.is_primitive() {
            let resolved = self.registry.resolve_default(node).ok_or_else(|| {
                PopulateError::TypeResolution {
                    detail: format!("no generator for primitive '{}'", node.declared_type),
                    path: self.tree.path(id),
                }
            })?;
            let result = self.invoke(node, &resolved, random)?;
            return Ok(result);
        }

        if let NodeKind::Array { element } = node.kind {
            let length = random.usize_range(
                self.settings.array_min_length,
                self.settings.array_max_length,
            );
            let value = allocate_array(self.tree.node(element), length);
            let hints = Hints::new()
                .size(length)
                .after_generate(AfterGenerate::PopulateAll);
            let result = GeneratorResult::of(value, hints);
            return Ok(self.finish(node, owner, slot, result, nullable));
        }

        let result = match self.registry.resolve_default(node) {
            Some(resolved) => self.invoke(node, &resolved, random)?,
            None => match self.construct(node, random)? {
                Some(value) => GeneratorResult::of(
                    value,
                    Hints::new().after_generate(AfterGenerate::PopulateAll),
                ),
                None => return Ok(GeneratorResult::ignored()),
            },
        };
        Ok(self.finish(node, owner, slot, result, nullable))
    }

    fn is_circular(&self, node: &Node, owner: Option<&Location>) -> bool {
        if node.cyclic {
            return true;
        }
        owner.is_some_and(|owner| {
            self.ancestors
                .find_ancestor(self.tree, &node.declared_type, owner)
                .is_some()
        })
    }

    /// Apply nullability and record the instance.
    fn finish(
        &mut self,
        node: &Node,
        owner: Option<&Location>,
        slot: &Location,
        mut result: GeneratorResult,
        nullable: bool,
    ) -> GeneratorResult {
        result.hints.nullable_result |= nullable;
        if result.value.is_some() {
            self.ancestors.record(slot.clone(), owner.cloned(), node.id);
        }
        result
    }

    /// Invoke a generator, initialising it on first use in this run.
    fn invoke(
        &mut self,
        node: &Node,
        resolved: &Resolved,
        random: &mut Random,
    ) -> Result<GeneratorResult> {
        let index = self.next_index(node, &resolved.generator)?;

        let value = resolved
            .generator
            .generate_nth(random, index)
            .map_err(|source| PopulateError::GeneratorInvocation {
                path: self.tree.path(node.id),
                source,
            })?;

        let mut hints = resolved.hints();
        if hints.after_generate.is_none() {
            hints.after_generate = Some(self.settings.after_generate);
        }
        let value = adapt_container(node, self.tree, self.settings, value, &mut hints, random);
        Ok(GeneratorResult::of(value, hints))
    }

    /// Run index of the generator's next value, initialising it on first use.
    fn next_index(&mut self, node: &Node, generator: &SharedGenerator) -> Result<u64> {
        let key = Arc::as_ptr(generator) as *const () as usize;
        if let Some(count) = self.produced.get_mut(&key) {
            let index = *count;
            *count += 1;
            return Ok(index);
        }

        let context = GeneratorContext {
            settings: self.settings,
            schema: self.tree.schema(),
        };
        generator
            .init(&context)
            .map_err(|source| PopulateError::GeneratorInvocation {
                path: self.tree.path(node.id),
                source,
            })?;
        self.produced.insert(key, 1);
        Ok(0)
    }

    /// Build a value for a node without a generator. `None` means the node
    /// is skipped.
    fn construct(&self, node: &Node, random: &mut Random) -> Result<Option<Value>> {
        match &node.kind {
            NodeKind::Collection { kind, .. } => {
                return Ok(Some(Value::Collection(CollectionValue::new(*kind))))
            }
            NodeKind::Map { kind, .. } => return Ok(Some(Value::Map(MapValue::new(*kind)))),
            NodeKind::Array { element } => {
                return Ok(Some(allocate_array(self.tree.node(*element), 0)))
            }
            NodeKind::Plain => {}
        }

        let Some(class) = self.tree.class_of(node.id) else {
            return Err(PopulateError::UnknownType {
                name: node.target_type.to_string(),
                path: self.tree.path(node.id),
            });
        };

        match class.kind {
            ClassKind::Enum => Ok(Some(
                random
                    .one_of(&class.values)
                    .map(|variant| Value::Enum {
                        type_name: class.name.clone(),
                        variant: variant.clone(),
                    })
                    .unwrap_or(Value::Null),
            )),
            ClassKind::Interface => {
                if self.settings.fail_on_missing_implementation {
                    return Err(PopulateError::NoImplementationFound {
                        interface: node.declared_type.to_string(),
                        path: self.tree.path(node.id),
                    });
                }
                debug!(
                    interface = %node.declared_type,
                    path = %self.tree.path(node.id),
                    "No implementation found, leaving unset"
                );
                Ok(None)
            }
            ClassKind::Class => {
                let mut object = ObjectValue::new(node.target_type.clone());
                for child in &node.children {
                    let child = self.tree.node(*child);
                    if let Some(field) = &child.field {
                        object.set(field.name.clone(), Value::default_for(&child.declared_type));
                    }
                }
                Ok(Some(Value::Object(object)))
            }
        }
    }
}

/// Array of `length` slots holding the element type's default.
fn allocate_array(element: &Node, length: usize) -> Value {
    Value::Array(vec![Value::default_for(&element.declared_type); length])
}

/// Convert a generated container to the kind declared by the node.
///
/// An empty array produced for an array node is grown to the hinted length,
/// or to a random length when no size is hinted.
fn adapt_container(
    node: &Node,
    tree: &NodeTree,
    settings: &Settings,
    value: Value,
    hints: &mut Hints,
    random: &mut Random,
) -> Value {
    match (&node.kind, value) {
        (NodeKind::Collection { kind, .. }, Value::Collection(mut collection)) => {
            collection.kind = *kind;
            Value::Collection(collection)
        }
        (NodeKind::Collection { kind, .. }, Value::Array(items)) => {
            Value::Collection(CollectionValue::from_elements(*kind, items))
        }
        (NodeKind::Map { kind, .. }, Value::Map(mut map)) => {
            map.kind = *kind;
            Value::Map(map)
        }
        (NodeKind::Array { element }, Value::Array(items)) if items.is_empty() => {
            let length = hints.data_structure_size.unwrap_or_else(|| {
                random.usize_range(settings.array_min_length, settings.array_max_length)
            });
            hints.data_structure_size = Some(length);
            allocate_array(tree.node(*element), length)
        }
        (NodeKind::Array { .. }, Value::Collection(collection)) => {
            Value::Array(collection.elements)
        }
        (_, value) => value,
    }
}
