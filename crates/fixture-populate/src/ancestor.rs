//! Ancestor tracking for cycle detection.
//!
//! Every generated instance is recorded with its owner and the node that
//! produced it. Before generating a non-primitive value the facade walks the
//! owner chain of the would-be owner and compares the declared types of the
//! producing nodes with the candidate's declared type. A match means the
//! branch would recurse through its own type, so it is skipped.
//!
//! Only direct type cycles along the current path are detected. Two sibling
//! branches of the same type are not related.

use crate::location::Location;
use crate::node::{NodeId, NodeTree};
use fixture_core::TypeRef;
use std::collections::HashMap;

/// Owner and producing node of one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorEntry {
    /// Location of the owning value, absent for the root
    pub owner: Option<Location>,
    pub node: NodeId,
}

/// Per-run map of instance locations to their ancestor entries.
#[derive(Debug, Default)]
pub struct AncestorTree {
    entries: HashMap<Location, AncestorEntry>,
}

impl AncestorTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` produced the instance at `instance`, owned by
    /// the value at `owner`.
    pub fn record(&mut self, instance: Location, owner: Option<Location>, node: NodeId) {
        self.entries.insert(instance, AncestorEntry { owner, node });
    }

    /// Find the nearest instance on the owner chain starting at `start`
    /// whose producing node declares `declared_type`.
    pub fn find_ancestor(
        &self,
        tree: &NodeTree,
        declared_type: &TypeRef,
        start: &Location,
    ) -> Option<(&Location, &AncestorEntry)> {
        let mut current = Some(start);
        while let Some(location) = current {
            let (key, entry) = self.entries.get_key_value(location)?;
            if &tree.node(entry.node).declared_type == declared_type {
                return Some((key, entry));
            }
            current = entry.owner.as_ref();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ImplementationRegistry;
    use fixture_core::TypeSchema;
    use std::sync::Arc;

    fn tree() -> NodeTree {
        let schema = Arc::new(
            TypeSchema::from_yaml(
                r#"
types:
  - name: Team
    fields:
      - { name: lead, type: Member }
  - name: Member
    fields:
      - { name: team, type: Team }
      - { name: name, type: String }
"#,
            )
            .unwrap(),
        );
        let resolver = ImplementationRegistry::new(Arc::clone(&schema));
        NodeTree::build(schema, &TypeRef::named("Team"), &resolver, 8).unwrap()
    }

    #[test]
    fn test_find_ancestor_walks_owner_chain() {
        let tree = tree();
        let root = tree.root_id();
        let lead = tree.root().children[0];

        let mut ancestors = AncestorTree::new();
        ancestors.record(Location::root(), None, root);
        let lead_location = Location::root().field("lead");
        ancestors.record(lead_location.clone(), Some(Location::root()), lead);

        // Member.team would recurse through Team
        let (location, entry) = ancestors
            .find_ancestor(&tree, &TypeRef::named("Team"), &lead_location)
            .unwrap();
        assert!(location.is_root());
        assert_eq!(entry.node, root);

        // A Member under the root is not a cycle
        assert!(ancestors
            .find_ancestor(&tree, &TypeRef::named("Member"), &Location::root())
            .is_none());
        assert!(ancestors
            .find_ancestor(&tree, &TypeRef::named("String"), &lead_location)
            .is_none());
    }

    #[test]
    fn test_unknown_start_finds_nothing() {
        let tree = tree();
        let ancestors = AncestorTree::new();
        assert!(ancestors.is_empty());
        assert!(ancestors
            .find_ancestor(&tree, &TypeRef::named("Team"), &Location::root())
            .is_none());
    }
}
