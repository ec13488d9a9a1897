//! Type expressions for the fixture-forge object model.
//!
//! This module defines `TypeRef`, the type expression a schema author writes
//! when declaring fields and fixture targets, and `BuiltinType`, the table of
//! names the engine knows how to generate without a schema definition.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A type expression.
///
/// # Syntax
///
/// ```text
/// String
/// List<Item>
/// Pair<String, Integer>
/// int[]
/// Map<String, List<Item>>
/// ?
/// ? extends Shape
/// ```
///
/// Type parameters are written as plain names (`T`, `L`, `R`) and are bound
/// while building a node tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A named type with optional type arguments
    Named {
        /// Type name (class, interface, enum, built-in or type parameter)
        name: String,
        /// Type arguments, empty for non-generic use
        args: Vec<TypeRef>,
    },

    /// Fixed-length array of a component type
    Array(Box<TypeRef>),

    /// Wildcard with an optional upper bound
    Wildcard(Option<Box<TypeRef>>),
}

/// Error produced when a type expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeSyntaxError {
    /// The expression was empty or whitespace
    #[error("empty type expression")]
    Empty,

    /// A character that does not fit the grammar
    #[error("unexpected '{found}' at position {position} in '{input}'")]
    Unexpected {
        input: String,
        position: usize,
        found: char,
    },

    /// The expression stopped in the middle of a construct
    #[error("unexpected end of type expression '{0}'")]
    UnexpectedEnd(String),
}

impl TypeRef {
    /// Create a non-generic named type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a generic named type.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// Create an array type with the given component type.
    pub fn array(component: TypeRef) -> Self {
        Self::Array(Box::new(component))
    }

    /// Parse a type expression.
    pub fn parse(input: &str) -> Result<Self, TypeSyntaxError> {
        input.parse()
    }

    /// The raw name of a named type (`List` for `List<String>`).
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type arguments of a named type.
    pub fn args(&self) -> &[TypeRef] {
        match self {
            Self::Named { args, .. } => args,
            _ => &[],
        }
    }

    /// The same named type without its type arguments.
    pub fn raw(&self) -> TypeRef {
        match self {
            Self::Named { name, .. } => Self::named(name.clone()),
            other => other.clone(),
        }
    }

    /// Look up the built-in classification of this type, if any.
    pub fn builtin(&self) -> Option<BuiltinType> {
        self.name().and_then(BuiltinType::lookup)
    }

    /// Primitive types can never hold null and default to zero.
    pub fn is_primitive(&self) -> bool {
        matches!(self.builtin(), Some(BuiltinType::Primitive(_)))
    }

    /// The primitive kind for primitive and boxed types.
    pub fn primitive_kind(&self) -> Option<PrimitiveType> {
        match self.builtin() {
            Some(BuiltinType::Primitive(p)) | Some(BuiltinType::Boxed(p)) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Array(component) => write!(f, "{component}[]"),
            Self::Wildcard(None) => f.write_str("?"),
            Self::Wildcard(Some(bound)) => write!(f, "? extends {bound}"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeSyntaxError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.trim().is_empty() {
            return Err(TypeSyntaxError::Empty);
        }
        let mut parser = Parser::new(input);
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(ty),
            Some(c) => Err(parser.unexpected(c)),
        }
    }
}

/// Recursive-descent parser over the characters of a type expression.
struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, found: char) -> TypeSyntaxError {
        TypeSyntaxError::Unexpected {
            input: self.input.to_string(),
            position: self.pos,
            found,
        }
    }

    fn end(&self) -> TypeSyntaxError {
        TypeSyntaxError::UnexpectedEnd(self.input.to_string())
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeSyntaxError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(self.end()),
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_identifier_char(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Consume `keyword` if it appears next as a whole word.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let len = keyword.chars().count();
        let matches_word = self
            .chars
            .get(self.pos..self.pos + len)
            .is_some_and(|window| window.iter().copied().eq(keyword.chars()));
        let boundary = !matches!(self.chars.get(self.pos + len), Some(c) if is_identifier_char(*c));
        if matches_word && boundary {
            self.pos += len;
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeSyntaxError> {
        self.skip_whitespace();
        let base = match self.peek() {
            None => return Err(self.end()),
            Some('?') => {
                self.pos += 1;
                self.skip_whitespace();
                if self.eat_keyword("extends") {
                    let bound = self.parse_type()?;
                    return Ok(TypeRef::Wildcard(Some(Box::new(bound))));
                }
                return Ok(TypeRef::Wildcard(None));
            }
            Some(c) if is_identifier_start(c) => {
                let name = self.identifier();
                let args = self.parse_args()?;
                TypeRef::Named { name, args }
            }
            Some(c) => return Err(self.unexpected(c)),
        };
        self.parse_array_suffix(base)
    }

    fn parse_args(&mut self) -> Result<Vec<TypeRef>, TypeSyntaxError> {
        self.skip_whitespace();
        if self.peek() != Some('<') {
            return Ok(Vec::new());
        }
        self.pos += 1;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('>') => break,
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.unexpected(c));
                }
                None => return Err(self.end()),
            }
        }
        Ok(args)
    }

    fn parse_array_suffix(&mut self, mut ty: TypeRef) -> Result<TypeRef, TypeSyntaxError> {
        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                return Ok(ty);
            }
            self.pos += 1;
            self.expect(']')?;
            ty = TypeRef::Array(Box::new(ty));
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '.')
}

// Type expressions are written as strings in YAML: `type: "List<Item>"`

impl Serialize for TypeRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct TypeRefVisitor;

        impl<'de> Visitor<'de> for TypeRefVisitor {
            type Value = TypeRef;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a type expression such as \"List<String>\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TypeRefVisitor)
    }
}

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl PrimitiveType {
    /// Inclusive integer bounds for integral kinds.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Check if this kind is a floating point kind.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

/// Collection flavours, which decide uniqueness and null-element rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    #[default]
    List,
    Set,
    SortedSet,
    Deque,
}

impl CollectionKind {
    /// Sets reject elements equal to one already present.
    pub fn requires_unique(&self) -> bool {
        matches!(self, Self::Set | Self::SortedSet)
    }

    /// Sorted sets cannot order a null element.
    pub fn permits_null_elements(&self) -> bool {
        !matches!(self, Self::SortedSet)
    }
}

/// Map flavours, which decide whether a null key is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    #[default]
    Hash,
    Sorted,
}

impl MapKind {
    /// Hash maps accept a single null key; sorted maps cannot order one.
    pub fn permits_null_keys(&self) -> bool {
        matches!(self, Self::Hash)
    }
}

/// Types known to the engine without a schema definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// Non-nullable primitive
    Primitive(PrimitiveType),
    /// Nullable wrapper of a primitive
    Boxed(PrimitiveType),
    String,
    Uuid,
    Date,
    DateTime,
    Decimal,
    /// Single-argument collection family
    Collection(CollectionKind),
    /// Two-argument map family
    Map(MapKind),
}

impl BuiltinType {
    /// Classify a raw type name.
    pub fn lookup(name: &str) -> Option<Self> {
        use PrimitiveType::*;

        let builtin = match name {
            "bool" | "boolean" => Self::Primitive(Bool),
            "char" => Self::Primitive(Char),
            "i8" | "byte" => Self::Primitive(Int8),
            "i16" | "short" => Self::Primitive(Int16),
            "i32" | "int" => Self::Primitive(Int32),
            "i64" | "long" => Self::Primitive(Int64),
            "f32" | "float" => Self::Primitive(Float32),
            "f64" | "double" => Self::Primitive(Float64),

            "Boolean" => Self::Boxed(Bool),
            "Character" => Self::Boxed(Char),
            "Byte" => Self::Boxed(Int8),
            "Short" => Self::Boxed(Int16),
            "Integer" => Self::Boxed(Int32),
            "Long" => Self::Boxed(Int64),
            "Float" => Self::Boxed(Float32),
            "Double" => Self::Boxed(Float64),

            "String" => Self::String,
            "Uuid" | "UUID" => Self::Uuid,
            "Date" | "LocalDate" | "NaiveDate" => Self::Date,
            "DateTime" | "Instant" | "LocalDateTime" => Self::DateTime,
            "Decimal" | "BigDecimal" => Self::Decimal,

            "List" | "ArrayList" | "LinkedList" | "Vec" | "Collection" | "Iterable" => {
                Self::Collection(CollectionKind::List)
            }
            "Set" | "HashSet" | "LinkedHashSet" => Self::Collection(CollectionKind::Set),
            "SortedSet" | "TreeSet" | "BTreeSet" => Self::Collection(CollectionKind::SortedSet),
            "Deque" | "ArrayDeque" | "Queue" | "VecDeque" => {
                Self::Collection(CollectionKind::Deque)
            }

            "Map" | "HashMap" | "LinkedHashMap" => Self::Map(MapKind::Hash),
            "SortedMap" | "TreeMap" | "BTreeMap" => Self::Map(MapKind::Sorted),

            _ => return None,
        };
        Some(builtin)
    }

    /// Number of type arguments the built-in expects.
    pub fn arity(&self) -> usize {
        match self {
            Self::Collection(_) => 1,
            Self::Map(_) => 2,
            _ => 0,
        }
    }

    /// Leaf types are generated whole and never have children.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Collection(_) | Self::Map(_))
    }
}
