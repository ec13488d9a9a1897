//! Eager construction of node trees.

use super::{FieldRef, Node, NodeId, NodeKind, NodeRole, NodeTree};
use crate::error::{PopulateError, Result};
use crate::registry::ImplementationResolver;
use fixture_core::{BuiltinType, ClassDefinition, ClassKind, TypeRef, TypeSchema};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Bindings of a class's type parameters at one use site.
#[derive(Debug, Default)]
struct Bindings<'a> {
    /// Every parameter the class declares, bound or not
    params: &'a [String],
    values: HashMap<&'a str, TypeRef>,
}

impl<'a> Bindings<'a> {
    fn for_class(class: &'a ClassDefinition, args: &[TypeRef]) -> Self {
        Self {
            params: &class.type_params,
            values: class
                .type_params
                .iter()
                .map(String::as_str)
                .zip(args.iter().cloned())
                .collect(),
        }
    }

    fn declares(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }
}

pub(super) struct TreeBuilder<'r> {
    tree: NodeTree,
    resolver: &'r dyn ImplementationResolver,
    max_depth: usize,
}

impl<'r> TreeBuilder<'r> {
    pub(super) fn new(
        schema: Arc<TypeSchema>,
        resolver: &'r dyn ImplementationResolver,
        max_depth: usize,
    ) -> Self {
        Self {
            tree: NodeTree {
                nodes: Vec::new(),
                schema,
            },
            resolver,
            max_depth,
        }
    }

    pub(super) fn build(mut self, target: &TypeRef) -> Result<NodeTree> {
        let declared = substitute(target, &Bindings::default(), &|| target.to_string())?;
        self.build_node(declared, NodeRole::Root, None, None, 0)?;
        debug!(
            target = %target,
            nodes = self.tree.len(),
            "Built node tree"
        );
        Ok(self.tree)
    }

    fn build_node(
        &mut self,
        declared: TypeRef,
        role: NodeRole,
        field: Option<FieldRef>,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId> {
        let cyclic = parent.is_some_and(|p| {
            self.tree.node(p).declared_type == declared
                || self.tree.ancestors(p).any(|a| a.declared_type == declared)
        });
        let truncated = !cyclic && depth >= self.max_depth && !is_leaf(&declared, self.tree.schema());

        let id = self.tree.push(Node {
            id: NodeId(0),
            kind: NodeKind::Plain,
            target_type: declared.clone(),
            declared_type: declared,
            field,
            parent,
            children: Vec::new(),
            role,
            depth,
            cyclic,
            truncated,
        });

        if cyclic || truncated {
            return Ok(id);
        }

        let declared = self.tree.node(id).declared_type.clone();
        match &declared {
            TypeRef::Array(component) => {
                let element =
                    self.build_node((**component).clone(), NodeRole::Element, None, Some(id), depth + 1)?;
                self.tree.node_mut(id).kind = NodeKind::Array { element };
            }
            TypeRef::Named { name, args } => match BuiltinType::lookup(name) {
                Some(BuiltinType::Collection(kind)) => {
                    let [element_type] = self.expect_args::<1>(id, args)?;
                    let element =
                        self.build_node(element_type, NodeRole::Element, None, Some(id), depth + 1)?;
                    self.tree.node_mut(id).kind = NodeKind::Collection { kind, element };
                }
                Some(BuiltinType::Map(kind)) => {
                    let [key_type, value_type] = self.expect_args::<2>(id, args)?;
                    let key = self.build_node(key_type, NodeRole::MapKey, None, Some(id), depth + 1)?;
                    let value =
                        self.build_node(value_type, NodeRole::MapValue, None, Some(id), depth + 1)?;
                    self.tree.node_mut(id).kind = NodeKind::Map { kind, key, value };
                }
                Some(_) => {}
                None => self.build_class(id, &declared, depth)?,
            },
            TypeRef::Wildcard(_) => {
                return Err(PopulateError::TypeResolution {
                    detail: format!("wildcard '{declared}' has no concrete type"),
                    path: self.tree.path(id),
                });
            }
        }

        Ok(id)
    }

    fn build_class(&mut self, id: NodeId, declared: &TypeRef, depth: usize) -> Result<()> {
        let schema = self.tree.schema_arc();
        let name = declared.name().unwrap_or_default();
        let class = schema.get_class(name).ok_or_else(|| PopulateError::UnknownType {
            name: name.to_string(),
            path: self.tree.path(id),
        })?;

        let (class, target) = match class.kind {
            ClassKind::Enum => return Ok(()),
            ClassKind::Interface => match self.resolver.resolve(declared) {
                Some(target) => {
                    let implementation = target
                        .name()
                        .and_then(|n| schema.get_class(n))
                        .ok_or_else(|| PopulateError::UnknownType {
                            name: target.to_string(),
                            path: self.tree.path(id),
                        })?;
                    (implementation, target)
                }
                // Left as a leaf; the facade decides whether this is fatal
                None => return Ok(()),
            },
            ClassKind::Class => (class, declared.clone()),
        };

        if !target.args().is_empty() && target.args().len() != class.type_params.len() {
            return Err(PopulateError::TypeResolution {
                detail: format!(
                    "{} expects {} type arguments, got {}",
                    class.name,
                    class.type_params.len(),
                    target.args().len()
                ),
                path: self.tree.path(id),
            });
        }

        let bindings = Bindings::for_class(class, target.args());
        self.tree.node_mut(id).target_type = target;

        let mut children = Vec::new();
        for field in class.populated_fields() {
            let tree = &self.tree;
            let field_type = substitute(&field.field_type, &bindings, &|| {
                format!("{}.{}", tree.path(id), field.name)
            })?;
            let child = self.build_node(
                field_type,
                NodeRole::Field,
                Some(FieldRef::new(class.name.clone(), field.name.clone())),
                Some(id),
                depth + 1,
            )?;
            children.push(child);
        }
        self.tree.node_mut(id).children = children;
        Ok(())
    }

    fn expect_args<const N: usize>(&self, id: NodeId, args: &[TypeRef]) -> Result<[TypeRef; N]> {
        <[TypeRef; N]>::try_from(args.to_vec()).map_err(|_| PopulateError::TypeResolution {
            detail: format!(
                "raw or malformed container type: expected {N} type arguments, got {}",
                args.len()
            ),
            path: self.tree.path(id),
        })
    }
}

/// Leaf types never have children, so the depth limit does not apply.
fn is_leaf(ty: &TypeRef, schema: &TypeSchema) -> bool {
    match ty.builtin() {
        Some(builtin) => builtin.is_leaf(),
        None => ty
            .name()
            .and_then(|name| schema.get_class(name))
            .is_some_and(|class| class.is_enum()),
    }
}

/// Replace type parameters in `ty` with their bindings.
fn substitute(ty: &TypeRef, bindings: &Bindings<'_>, path: &dyn Fn() -> String) -> Result<TypeRef> {
    match ty {
        TypeRef::Named { name, args } if args.is_empty() && bindings.declares(name) => {
            bindings
                .values
                .get(name.as_str())
                .cloned()
                .ok_or_else(|| PopulateError::TypeResolution {
                    detail: format!("type variable '{name}' is not bound"),
                    path: path(),
                })
        }
        TypeRef::Named { name, args } => Ok(TypeRef::Named {
            name: name.clone(),
            args: args
                .iter()
                .map(|arg| substitute(arg, bindings, path))
                .collect::<Result<_>>()?,
        }),
        TypeRef::Array(component) => Ok(TypeRef::array(substitute(component, bindings, path)?)),
        TypeRef::Wildcard(Some(bound)) => substitute(bound, bindings, path),
        TypeRef::Wildcard(None) => Err(PopulateError::TypeResolution {
            detail: "unbounded wildcard '?' has no concrete type".to_string(),
            path: path(),
        }),
    }
}
