//! Data schemas and the schema-context walker.
//!
//! A [`DataSchema`] describes the shape of a tree value. Self-referential
//! schemas use [`DataSchema::Recursive`] nodes that name an ancestor by
//! distance. A [`SchemaContext`] follows data-path descent through the schema
//! one component at a time, resolving recursive nodes and reporting the
//! context keys its ancestors declare.
//!
//! Schemas are usually loaded from JSON config files with [`build_schema`].

use thiserror::Error;

pub mod builder;
pub mod config;
pub mod context;
pub mod schema;
pub mod source;

pub use builder::{build_schema, build_schema_from_config, SchemaBuilder};
pub use config::{SchemaConfig, SchemaRef};
pub use context::SchemaContext;
pub use schema::{DataSchema, FixedField, FixedMapSchema, ListSchema, MapSchema};
pub use source::{resolve_reference, DirSource, MemorySource, SchemaSource};

/// Errors raised while building or walking a schema. All of them are fatal
/// for the schema concerned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema file not found: {path}")]
    NotFound { path: String },
    #[error("cannot read schema file {path}: {message}")]
    Io { path: String, message: String },
    #[error("malformed schema in {path}: {message}")]
    Malformed { path: String, message: String },
    #[error("reference {reference:?} from {from} leaves the schema root")]
    BadReference { from: String, reference: String },
    #[error("recursive depth {depth} in {location} exceeds the {available} enclosing schema nodes")]
    RecursiveDepth {
        location: String,
        depth: usize,
        available: usize,
    },
    #[error("the root schema cannot be a recursive node")]
    RecursiveRoot,
}
