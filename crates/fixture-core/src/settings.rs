//! Generation settings.
//!
//! Settings are loaded from YAML where every key is optional:
//!
//! ```yaml
//! seed: 42
//! collection_min_size: 1
//! collection_max_size: 3
//! nullable_probability: 0.25
//! after_generate: populate_all
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Error reading settings file
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A min/max pair where min exceeds max
    #[error("Invalid range for {name}: min {min} is greater than max {max}")]
    InvalidRange {
        name: &'static str,
        min: String,
        max: String,
    },

    /// A probability outside [0, 1]
    #[error("Invalid probability for {name}: {value} (expected 0.0 to 1.0)")]
    InvalidProbability { name: &'static str, value: f64 },

    /// A date that cannot be parsed
    #[error("Invalid date for {name}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { name: &'static str, value: String },
}

/// What happens to a value after a generator produced it.
///
/// Variants are ordered from least to most invasive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AfterGenerate {
    /// Keep the value exactly as produced
    DoNotModify,
    /// Populate only fields targeted by an override
    ApplySelectors,
    /// Populate null fields and empty containers
    PopulateNulls,
    /// Populate null fields, empty containers and zero-valued primitives
    #[default]
    PopulateNullsAndDefaultPrimitives,
    /// Populate every field
    PopulateAll,
}

/// Settings controlling sizes, ranges and probabilities of generated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the random source; random when absent
    pub seed: Option<u64>,

    pub collection_min_size: usize,
    pub collection_max_size: usize,
    pub map_min_size: usize,
    pub map_max_size: usize,
    pub array_min_length: usize,
    pub array_max_length: usize,
    pub string_min_length: usize,
    pub string_max_length: usize,

    /// Integer range, clamped to each primitive's own range
    pub int_min: i64,
    pub int_max: i64,

    pub float_min: f64,
    pub float_max: f64,

    /// Earliest generated date (YYYY-MM-DD)
    pub temporal_start: String,
    /// Latest generated date (YYYY-MM-DD)
    pub temporal_end: String,

    /// Probability that a nullable position is left null
    pub nullable_probability: f64,

    /// Depth at which the node tree stops descending
    pub max_depth: usize,

    /// Fail instead of skipping interfaces without an implementation
    pub fail_on_missing_implementation: bool,

    /// Action applied to generator-produced values without an explicit hint
    pub after_generate: AfterGenerate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            collection_min_size: 2,
            collection_max_size: 6,
            map_min_size: 2,
            map_max_size: 6,
            array_min_length: 2,
            array_max_length: 6,
            string_min_length: 3,
            string_max_length: 10,
            int_min: 1,
            int_max: 10_000,
            float_min: 1.0,
            float_max: 10_000.0,
            temporal_start: "1970-01-01".to_string(),
            temporal_end: "2030-12-31".to_string(),
            nullable_probability: 1.0 / 6.0,
            max_depth: 8,
            fail_on_missing_implementation: false,
            after_generate: AfterGenerate::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string and validate them.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check ranges, probabilities and dates.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range(
            "collection size",
            self.collection_min_size,
            self.collection_max_size,
        )?;
        check_range("map size", self.map_min_size, self.map_max_size)?;
        check_range(
            "array length",
            self.array_min_length,
            self.array_max_length,
        )?;
        check_range(
            "string length",
            self.string_min_length,
            self.string_max_length,
        )?;
        check_range("int", self.int_min, self.int_max)?;
        check_range("float", self.float_min, self.float_max)?;

        if !(0.0..=1.0).contains(&self.nullable_probability) {
            return Err(SettingsError::InvalidProbability {
                name: "nullable_probability",
                value: self.nullable_probability,
            });
        }

        let (start, end) = self.temporal_range()?;
        check_range("temporal", start, end)?;
        Ok(())
    }

    /// The parsed temporal bounds.
    pub fn temporal_range(&self) -> Result<(NaiveDate, NaiveDate), SettingsError> {
        Ok((
            parse_date("temporal_start", &self.temporal_start)?,
            parse_date("temporal_end", &self.temporal_end)?,
        ))
    }

    /// Builder-style seed assignment.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use the same size bounds for collections, maps and arrays.
    pub fn with_container_sizes(mut self, min: usize, max: usize) -> Self {
        self.collection_min_size = min;
        self.collection_max_size = max;
        self.map_min_size = min;
        self.map_max_size = max;
        self.array_min_length = min;
        self.array_max_length = max;
        self
    }
}

fn check_range<T: PartialOrd + ToString>(
    name: &'static str,
    min: T,
    max: T,
) -> Result<(), SettingsError> {
    if min > max {
        return Err(SettingsError::InvalidRange {
            name,
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

fn parse_date(name: &'static str, value: &str) -> Result<NaiveDate, SettingsError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| SettingsError::InvalidDate {
        name,
        value: value.to_string(),
    })
}
