//! Value representations for the fixture-forge object model.
//!
//! A `Value` is one node of a generated object graph. Objects, collections,
//! maps and arrays own their children, so a fully populated fixture is a
//! plain tree that can be inspected, compared or converted to JSON.

use crate::types::{CollectionKind, MapKind, PrimitiveType, TypeRef};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use std::cmp::Ordering;
use uuid::Uuid;

/// A generated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,

    Bool(bool),
    Char(char),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),

    /// Text value
    String(String),

    /// UUID value
    Uuid(Uuid),

    /// Calendar date
    Date(NaiveDate),

    /// Date/time in UTC
    DateTime(DateTime<Utc>),

    /// Decimal stored as its canonical string form
    Decimal(String),

    /// Variant of a schema enum
    Enum {
        /// Name of the enum type
        type_name: String,
        /// Selected variant
        variant: String,
    },

    /// Instance of a schema class
    Object(ObjectValue),

    /// List, set or deque
    Collection(CollectionValue),

    /// Key/value entries
    Map(MapValue),

    /// Fixed-length array
    Array(Vec<Value>),
}

/// Instance of a schema class: its concrete type plus ordered field values.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
    /// Concrete type of this instance
    pub ty: TypeRef,

    /// Field values in declaration order
    pub fields: IndexMap<String, Value>,
}

impl ObjectValue {
    /// Create an object with no fields set.
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field assignment.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Read a field. Missing fields read as `None`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable access to a field.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Write a field, inserting it if absent.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Elements of a list, set or deque.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionValue {
    /// Collection flavour
    pub kind: CollectionKind,

    /// Elements in insertion order
    pub elements: Vec<Value>,
}

impl CollectionValue {
    /// Create an empty collection.
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            elements: Vec::new(),
        }
    }

    /// Create a collection from existing elements.
    pub fn from_elements(kind: CollectionKind, elements: Vec<Value>) -> Self {
        Self { kind, elements }
    }
}

/// Entries of a map, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapValue {
    /// Map flavour
    pub kind: MapKind,

    /// Key/value pairs
    pub entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// Create an empty map.
    pub fn new(kind: MapKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Check if a key equal to `key` is present.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Value {
    /// The zero value of a primitive kind.
    pub fn zero(kind: PrimitiveType) -> Self {
        match kind {
            PrimitiveType::Bool => Self::Bool(false),
            PrimitiveType::Char => Self::Char('\0'),
            PrimitiveType::Int8 => Self::Int8(0),
            PrimitiveType::Int16 => Self::Int16(0),
            PrimitiveType::Int32 => Self::Int32(0),
            PrimitiveType::Int64 => Self::Int64(0),
            PrimitiveType::Float32 => Self::Float32(0.0),
            PrimitiveType::Float64 => Self::Float64(0.0),
        }
    }

    /// The value a field of type `ty` holds before population.
    ///
    /// Primitives start at zero; everything else starts as null.
    pub fn default_for(ty: &TypeRef) -> Self {
        match ty.builtin() {
            Some(crate::types::BuiltinType::Primitive(kind)) => Self::zero(kind),
            _ => Self::Null,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value is a zero-valued primitive.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Char(c) => *c == '\0',
            Self::Int8(i) => *i == 0,
            Self::Int16(i) => *i == 0,
            Self::Int32(i) => *i == 0,
            Self::Int64(i) => *i == 0,
            Self::Float32(f) => *f == 0.0,
            Self::Float64(f) => *f == 0.0,
            _ => false,
        }
    }

    /// Check if this value is a collection, map or array without elements.
    pub fn is_empty_container(&self) -> bool {
        match self {
            Self::Collection(c) => c.elements.is_empty(),
            Self::Map(m) => m.entries.is_empty(),
            Self::Array(a) => a.is_empty(),
            _ => false,
        }
    }

    /// Check if this value holds children of its own.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Collection(_) | Self::Map(_) | Self::Array(_))
    }

    /// Number of elements or entries of a container value.
    pub fn container_len(&self) -> Option<usize> {
        match self {
            Self::Collection(c) => Some(c.elements.len()),
            Self::Map(m) => Some(m.entries.len()),
            Self::Array(a) => Some(a.len()),
            _ => None,
        }
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64, widening smaller integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int8(i) => Some(*i as i64),
            Self::Int16(i) => Some(*i as i64),
            Self::Int32(i) => Some(*i as i64),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64, widening f32 and integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(*f as f64),
            Self::Float64(f) => Some(*f),
            other => other.as_i64().map(|i| i as f64),
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an object.
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Try to get this value as a mutable object.
    pub fn as_object_mut(&mut self) -> Option<&mut ObjectValue> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Try to get this value as a collection.
    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Try to get this value as a map.
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Convert a numeric or character value to the given primitive kind.
    ///
    /// Only lossless conversions are applied: an `Int64(5)` becomes
    /// `Int32(5)`, an `Int64` outside the target range is returned unchanged,
    /// and a one-character string becomes a `Char`.
    pub fn coerce_primitive(self, kind: PrimitiveType) -> Value {
        if self.is_primitive_kind(kind) {
            return self;
        }
        match kind {
            PrimitiveType::Bool => self,
            PrimitiveType::Char => match self.single_char() {
                Some(c) => Self::Char(c),
                None => self,
            },
            PrimitiveType::Float64 => match self.as_f64() {
                Some(f) => Self::Float64(f),
                None => self,
            },
            PrimitiveType::Float32 => match self.as_f64() {
                Some(f) if (f as f32).is_finite() || !f.is_finite() => Self::Float32(f as f32),
                _ => self,
            },
            _ => match (kind.integer_bounds(), self.as_i64()) {
                (Some((min, max)), Some(i)) if (min..=max).contains(&i) => match kind {
                    PrimitiveType::Int8 => Self::Int8(i as i8),
                    PrimitiveType::Int16 => Self::Int16(i as i16),
                    PrimitiveType::Int32 => Self::Int32(i as i32),
                    _ => Self::Int64(i),
                },
                _ => self,
            },
        }
    }

    fn single_char(&self) -> Option<char> {
        match self {
            Self::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Check if this value is of the given primitive kind.
    pub fn is_primitive_kind(&self, kind: PrimitiveType) -> bool {
        matches!(
            (kind, self),
            (PrimitiveType::Bool, Self::Bool(_))
                | (PrimitiveType::Char, Self::Char(_))
                | (PrimitiveType::Int8, Self::Int8(_))
                | (PrimitiveType::Int16, Self::Int16(_))
                | (PrimitiveType::Int32, Self::Int32(_))
                | (PrimitiveType::Int64, Self::Int64(_))
                | (PrimitiveType::Float32, Self::Float32(_))
                | (PrimitiveType::Float64, Self::Float64(_))
        )
    }

    /// Runtime type of this value, for diagnostics.
    pub fn type_label(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Char(_) => "char".to_string(),
            Self::Int8(_) => "i8".to_string(),
            Self::Int16(_) => "i16".to_string(),
            Self::Int32(_) => "i32".to_string(),
            Self::Int64(_) => "i64".to_string(),
            Self::Float32(_) => "f32".to_string(),
            Self::Float64(_) => "f64".to_string(),
            Self::String(_) => "String".to_string(),
            Self::Uuid(_) => "Uuid".to_string(),
            Self::Date(_) => "Date".to_string(),
            Self::DateTime(_) => "DateTime".to_string(),
            Self::Decimal(_) => "Decimal".to_string(),
            Self::Enum { type_name, .. } => format!("enum {type_name}"),
            Self::Object(obj) => obj.ty.to_string(),
            Self::Collection(c) => format!("{:?} collection", c.kind),
            Self::Map(m) => format!("{:?} map", m.kind),
            Self::Array(_) => "array".to_string(),
        }
    }

    /// Total order used by sorted collections and maps.
    ///
    /// Nulls sort first, numbers by value, text and temporal values by their
    /// natural order. Values of unrelated kinds fall back to their JSON text.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Null, _) => Ordering::Less,
            (_, Self::Null) => Ordering::Greater,
            (Self::String(a), Self::String(b)) | (Self::Decimal(a), Self::Decimal(b)) => a.cmp(b),
            (Self::Uuid(a), Self::Uuid(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Char(a), Self::Char(b)) => a.cmp(b),
            (Self::Enum { variant: a, .. }, Self::Enum { variant: b, .. }) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.to_json().to_string().cmp(&b.to_json().to_string()),
            },
        }
    }

    /// Convert to a JSON document.
    ///
    /// Maps whose keys are all scalars become JSON objects; maps with
    /// composite keys become arrays of `[key, value]` pairs.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Char(c) => Json::String(c.to_string()),
            Self::Int8(i) => Json::from(*i),
            Self::Int16(i) => Json::from(*i),
            Self::Int32(i) => Json::from(*i),
            Self::Int64(i) => Json::from(*i),
            Self::Float32(f) => float_to_json(*f as f64),
            Self::Float64(f) => float_to_json(*f),
            Self::String(s) => Json::String(s.clone()),
            Self::Uuid(u) => Json::String(u.to_string()),
            Self::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Json::String(dt.to_rfc3339()),
            Self::Decimal(d) => Json::String(d.clone()),
            Self::Enum { variant, .. } => Json::String(variant.clone()),
            Self::Object(obj) => Json::Object(
                obj.fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Collection(c) => Json::Array(c.elements.iter().map(Value::to_json).collect()),
            Self::Array(a) => Json::Array(a.iter().map(Value::to_json).collect()),
            Self::Map(m) => {
                let keys: Option<Vec<String>> =
                    m.entries.iter().map(|(k, _)| k.scalar_key()).collect();
                match keys {
                    Some(keys) => Json::Object(
                        keys.into_iter()
                            .zip(m.entries.iter())
                            .map(|(key, (_, value))| (key, value.to_json()))
                            .collect(),
                    ),
                    None => Json::Array(
                        m.entries
                            .iter()
                            .map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()]))
                            .collect(),
                    ),
                }
            }
        }
    }

    /// String form of a scalar usable as a JSON object key.
    fn scalar_key(&self) -> Option<String> {
        match self {
            Self::Null => Some("null".to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Object(_) | Self::Collection(_) | Self::Map(_) | Self::Array(_) => None,
            other => match other.to_json() {
                serde_json::Value::String(s) => Some(s),
                json => Some(json.to_string()),
            },
        }
    }
}

fn float_to_json(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ObjectValue> for Value {
    fn from(value: ObjectValue) -> Self {
        Self::Object(value)
    }
}
