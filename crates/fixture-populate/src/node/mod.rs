//! Node model: the shape of the object graph generated for a target type.
//!
//! A `NodeTree` is built once per target type and is immutable afterwards.
//! Nodes live in an arena and refer to each other by `NodeId`; the parent
//! link is used for navigation and diagnostics only.
//!
//! ```text
//! Order                       Plain (root)
//! ├── id: Uuid                Plain (field)
//! ├── items: List<Item>       Collection { element }
//! │   └── []: Item            Plain (element)
//! │       ├── name: String    Plain (field)
//! │       └── parent: Order   Plain (field, cyclic)
//! └── tags: Map<String, int>  Map { key, value }
//!     ├── {key}: String       Plain (map key)
//!     └── {value}: int        Plain (map value)
//! ```

mod builder;

use crate::error::PopulateError;
use fixture_core::{BuiltinType, ClassDefinition, CollectionKind, MapKind, TypeRef, TypeSchema};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Index of a node in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A field of a schema class, written `Owner.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Name of the declaring class
    pub owner: String,
    /// Field name
    pub name: String,
}

impl FieldRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

impl FromStr for FieldRef {
    type Err = PopulateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('.') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(PopulateError::InvalidOverride(format!(
                "field selector '{s}' is not of the form Owner.field"
            ))),
        }
    }
}

/// How a node's value is attached to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Root,
    Field,
    Element,
    MapKey,
    MapValue,
}

/// Structural variant of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf value or object whose children are its fields
    Plain,
    Collection {
        kind: CollectionKind,
        element: NodeId,
    },
    Map {
        kind: MapKind,
        key: NodeId,
        value: NodeId,
    },
    Array {
        element: NodeId,
    },
}

/// One position in the object graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Static type of this position, with type parameters substituted
    pub declared_type: TypeRef,
    /// Type actually generated; the implementation for interface positions
    pub target_type: TypeRef,
    /// Field through which the value is assigned, absent for the root and
    /// for element, key and value nodes
    pub field: Option<FieldRef>,
    pub parent: Option<NodeId>,
    /// Field nodes of a plain object node
    pub children: Vec<NodeId>,
    pub role: NodeRole,
    pub depth: usize,
    /// The declared type already appears among this node's ancestors
    pub cyclic: bool,
    /// The tree stopped descending at this node because of the depth limit
    pub truncated: bool,
}

impl Node {
    /// Primitives are never null and never tracked as ancestors.
    pub fn is_primitive(&self) -> bool {
        self.declared_type.is_primitive()
    }

    pub fn builtin(&self) -> Option<BuiltinType> {
        self.target_type.builtin()
    }
}

/// Immutable node tree for one target type.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
    schema: Arc<TypeSchema>,
}

impl NodeTree {
    /// Build the tree for `target`.
    ///
    /// Fails before any generation happens if a type parameter, wildcard or
    /// raw container cannot be resolved, or a type name is unknown.
    pub fn build(
        schema: Arc<TypeSchema>,
        target: &TypeRef,
        resolver: &dyn crate::registry::ImplementationResolver,
        max_depth: usize,
    ) -> crate::error::Result<Self> {
        builder::TreeBuilder::new(schema, resolver, max_depth).build(target)
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn schema_arc(&self) -> Arc<TypeSchema> {
        Arc::clone(&self.schema)
    }

    /// Schema class generated by a node, if any.
    pub fn class_of(&self, id: NodeId) -> Option<&ClassDefinition> {
        self.node(id)
            .target_type
            .name()
            .and_then(|name| self.schema.get_class(name))
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.node(id).parent.map(|p| self.node(p)), move |node| {
            node.parent.map(|p| self.node(p))
        })
    }

    /// Diagnostic path of a node, such as `Order.items[].name`.
    pub fn path(&self, id: NodeId) -> String {
        let mut chain: Vec<&Node> = vec![self.node(id)];
        chain.extend(self.ancestors(id));
        chain.reverse();

        let mut path = String::new();
        for node in chain {
            match node.role {
                NodeRole::Root => path.push_str(&node.declared_type.to_string()),
                NodeRole::Field => {
                    if let Some(field) = &node.field {
                        path.push('.');
                        path.push_str(&field.name);
                    }
                }
                NodeRole::Element => path.push_str("[]"),
                NodeRole::MapKey => path.push_str(".{key}"),
                NodeRole::MapValue => path.push_str(".{value}"),
            }
        }
        path
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { id, ..node });
        id
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests;
