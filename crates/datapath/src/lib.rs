//! datapath: persistent tree values, the DataPath query language, and
//! schema contexts.
//!
//! This crate re-exports the member crates under one roof:
//!
//! - [`model`]: tree values and their copy-on-write mutators
//! - [`schema`]: schemas, schema contexts and the schema config loader
//! - [`path`]: the path parser, the collector, the manager and templates
//!
//! The most used items are also available at the crate root.

pub use datapath_model as model;
pub use datapath_path as path;
pub use datapath_schema as schema;

pub use datapath_model::{
    data_model_to_json, get, push_at, set_at, unknown_to_data_model, DataModel,
    DataModelOperationError, ForwardComponent, ForwardPath, KeyOrIndex,
};
pub use datapath_path::{
    fill_template, Collected, DataModelCollector, DataModelManager, DataPathParser, MultiPath,
    PathComponent, PathError, PathSyntaxError,
};
pub use datapath_schema::{build_schema, DataSchema, SchemaContext, SchemaError};

pub mod query_cli;
