//! Addressing of values inside a generated object graph.
//!
//! A `Location` is the path from the root value to a nested value. Within
//! one population run it identifies an instance, which is what the ancestor
//! tracker and the driver use to find owners.

use crate::error::{PopulateError, Result};
use fixture_core::Value;
use std::fmt;

/// One step from a value to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Field of an object
    Field(String),
    /// Element of a collection or array slot
    Element(usize),
    /// Key of the i-th map entry
    Key(usize),
    /// Value of the i-th map entry
    Entry(usize),
}

/// Path from the root value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Location {
    segments: Vec<Segment>,
}

impl Location {
    /// The root value.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Location of a child of this value.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn field(&self, name: &str) -> Self {
        self.child(Segment::Field(name.to_string()))
    }

    pub fn element(&self, index: usize) -> Self {
        self.child(Segment::Element(index))
    }

    pub fn key(&self, index: usize) -> Self {
        self.child(Segment::Key(index))
    }

    pub fn entry(&self, index: usize) -> Self {
        self.child(Segment::Entry(index))
    }

    /// Location of the owning value.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// Read the value at this location.
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |value, segment| step(value, segment))
    }

    /// Mutable access to the value at this location.
    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = root;
        for segment in &self.segments {
            current = step_mut(current, segment)?;
        }
        Some(current)
    }

    /// Like `get_mut`, failing with `MissingOwner` when the path is broken.
    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Result<&'a mut Value> {
        self.get_mut(root)
            .ok_or_else(|| PopulateError::MissingOwner(self.to_string()))
    }
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(obj), Segment::Field(name)) => obj.get(name),
        (Value::Collection(c), Segment::Element(i)) => c.elements.get(*i),
        (Value::Array(a), Segment::Element(i)) => a.get(*i),
        (Value::Map(m), Segment::Key(i)) => m.entries.get(*i).map(|(k, _)| k),
        (Value::Map(m), Segment::Entry(i)) => m.entries.get(*i).map(|(_, v)| v),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(obj), Segment::Field(name)) => obj.get_mut(name),
        (Value::Collection(c), Segment::Element(i)) => c.elements.get_mut(*i),
        (Value::Array(a), Segment::Element(i)) => a.get_mut(*i),
        (Value::Map(m), Segment::Key(i)) => m.entries.get_mut(*i).map(|(k, _)| k),
        (Value::Map(m), Segment::Entry(i)) => m.entries.get_mut(*i).map(|(_, v)| v),
        _ => None,
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Element(i) => write!(f, "[{i}]")?,
                Segment::Key(i) => write!(f, "{{key {i}}}")?,
                Segment::Entry(i) => write!(f, "{{value {i}}}")?,
            }
        }
        Ok(())
    }
}
