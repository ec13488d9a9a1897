//! Error types for node-tree building and population.

use fixture_core::{SchemaError, SettingsError, TypeSyntaxError};

/// Error raised by a user-supplied generator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for population operations.
#[derive(Debug, thiserror::Error)]
pub enum PopulateError {
    /// A type variable, wildcard or raw container could not be resolved
    #[error("Cannot resolve type at {path}: {detail}")]
    TypeResolution { detail: String, path: String },

    /// A type name is neither built in nor defined by the schema
    #[error("Unknown type '{name}' at {path}")]
    UnknownType { name: String, path: String },

    /// An interface-typed position has no implementation
    #[error("No implementation found for interface '{interface}' at {path}")]
    NoImplementationFound { interface: String, path: String },

    /// A generator failed while initialising or generating
    #[error("Generator failed at {path}: {source}")]
    GeneratorInvocation {
        path: String,
        #[source]
        source: BoxError,
    },

    /// A generated value does not fit the declared type of its position
    #[error("Cannot assign {actual} to {path} of type {declared}")]
    Assignment {
        path: String,
        declared: String,
        actual: String,
    },

    /// An override that cannot be applied
    #[error("Invalid override: {0}")]
    InvalidOverride(String),

    /// Type expression parse failure
    #[error("Type syntax error: {0}")]
    TypeSyntax(#[from] TypeSyntaxError),

    /// Schema error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// An owner location no longer points at a container or object
    #[error("Owner value missing at {0}")]
    MissingOwner(String),
}

/// Result alias for population operations.
pub type Result<T> = std::result::Result<T, PopulateError>;
