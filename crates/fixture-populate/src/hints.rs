//! Generator hints and results.

use fixture_core::{AfterGenerate, Value};

/// Structural hints attached to a generated value.
///
/// The nullable flags only enable a null outcome. Whether a position is
/// actually left null is decided by the driver with
/// `Settings::nullable_probability`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    /// Exact number of elements, entries or array slots
    pub data_structure_size: Option<usize>,
    pub nullable_elements: bool,
    pub nullable_map_keys: bool,
    pub nullable_map_values: bool,
    /// The value itself may be replaced by null
    pub nullable_result: bool,
    /// The value is final and its children are not populated
    pub ignore_children: bool,
    /// How the value's own fields are populated afterwards
    pub after_generate: Option<AfterGenerate>,
}

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, size: usize) -> Self {
        self.data_structure_size = Some(size);
        self
    }

    pub fn nullable_elements(mut self, enabled: bool) -> Self {
        self.nullable_elements = enabled;
        self
    }

    pub fn nullable_map_keys(mut self, enabled: bool) -> Self {
        self.nullable_map_keys = enabled;
        self
    }

    pub fn nullable_map_values(mut self, enabled: bool) -> Self {
        self.nullable_map_values = enabled;
        self
    }

    pub fn nullable_result(mut self, enabled: bool) -> Self {
        self.nullable_result = enabled;
        self
    }

    pub fn ignore_children(mut self, enabled: bool) -> Self {
        self.ignore_children = enabled;
        self
    }

    pub fn after_generate(mut self, action: AfterGenerate) -> Self {
        self.after_generate = Some(action);
        self
    }
}

/// Outcome of asking the facade for a value.
///
/// | value  | ignore_children | meaning                           |
/// |--------|-----------------|-----------------------------------|
/// | `None` | false           | the position is cleared (null)    |
/// | `None` | true            | the position is left untouched    |
/// | `Some` | true            | the value is final                |
/// | `Some` | false           | the value's children are populated |
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorResult {
    pub value: Option<Value>,
    pub hints: Hints,
}

impl GeneratorResult {
    /// A produced value. `Value::Null` is stored as `None`.
    pub fn of(value: Value, hints: Hints) -> Self {
        let value = match value {
            Value::Null => None,
            other => Some(other),
        };
        Self { value, hints }
    }

    /// A result that leaves the position untouched.
    pub fn ignored() -> Self {
        Self {
            value: None,
            hints: Hints::default().ignore_children(true),
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.value.is_none() && self.hints.ignore_children
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none() && !self.hints.ignore_children
    }

    pub fn into_parts(self) -> (Option<Value>, Hints) {
        (self.value, self.hints)
    }
}
