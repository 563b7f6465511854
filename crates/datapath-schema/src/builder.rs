//! Builds [`DataSchema`] trees from schema config files.

use std::sync::Arc;

use crate::config::{SchemaConfig, SchemaRef};
use crate::schema::{DataSchema, FixedField, FixedMapSchema, ListSchema, MapSchema};
use crate::source::{resolve_reference, SchemaSource};
use crate::SchemaError;

/// Load the schema file at `entry` and every file it references.
///
/// `entry` is normalized like any reference, so `./main.json` and
/// `main.json` name the same file. A reference to a file that is still
/// being built (a cycle through files) becomes a [`DataSchema::Recursive`]
/// node pointing back at the node where that file started.
pub fn build_schema<S: SchemaSource + ?Sized>(
    source: &S,
    entry: &str,
) -> Result<Arc<DataSchema>, SchemaError> {
    let entry = resolve_reference("", entry)?;
    let root = SchemaBuilder::new(source).load_file(&entry, 0)?;
    root.validate()?;
    Ok(root)
}

/// Build a schema from a config value. References are resolved against
/// `base`, a file path inside `source`.
pub fn build_schema_from_config<S: SchemaSource + ?Sized>(
    source: &S,
    base: &str,
    config: &SchemaConfig,
) -> Result<Arc<DataSchema>, SchemaError> {
    let root = SchemaBuilder::new(source).build_config(config, base, 0)?;
    root.validate()?;
    Ok(root)
}

pub struct SchemaBuilder<'s, S: SchemaSource + ?Sized> {
    source: &'s S,
    /// Files currently being built, with the depth their root node sits at.
    open: Vec<(String, usize)>,
}

impl<'s, S: SchemaSource + ?Sized> SchemaBuilder<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            open: Vec::new(),
        }
    }

    /// Build the file at `path` as a node `depth` levels below the root.
    pub fn load_file(&mut self, path: &str, depth: usize) -> Result<Arc<DataSchema>, SchemaError> {
        if let Some((_, start)) = self.open.iter().find(|(open, _)| open == path) {
            let back = depth.saturating_sub(*start);
            tracing::debug!(path, depth, back, "schema reference closes a cycle");
            return Ok(Arc::new(DataSchema::Recursive { depth: back }));
        }

        tracing::debug!(path, depth, "loading schema file");
        let text = self.source.load(path)?;
        let config: SchemaConfig =
            serde_json::from_str(&text).map_err(|err| SchemaError::Malformed {
                path: path.to_string(),
                message: err.to_string(),
            })?;

        self.open.push((path.to_string(), depth));
        let built = self.build_config(&config, path, depth);
        self.open.pop();
        built
    }

    /// Build one config node found in `file` at `depth`.
    pub fn build_config(
        &mut self,
        config: &SchemaConfig,
        file: &str,
        depth: usize,
    ) -> Result<Arc<DataSchema>, SchemaError> {
        let schema = match config {
            SchemaConfig::Any => DataSchema::Any,
            SchemaConfig::Null => DataSchema::Null,
            SchemaConfig::Boolean => DataSchema::Boolean,
            SchemaConfig::Integer => DataSchema::Integer,
            SchemaConfig::Number => DataSchema::Number,
            SchemaConfig::String => DataSchema::String,
            SchemaConfig::List { item, context_key } => DataSchema::List(ListSchema {
                item: self.build_ref(item, file, depth + 1)?,
                context_key: context_key.clone(),
            }),
            SchemaConfig::Map { item, context_key } => DataSchema::Map(MapSchema {
                item: self.build_ref(item, file, depth + 1)?,
                context_key: context_key.clone(),
            }),
            SchemaConfig::FixedMap {
                properties,
                context_key,
            } => {
                let mut fields = Vec::with_capacity(properties.len());
                for (key, value) in properties {
                    fields.push(FixedField {
                        key: key.clone(),
                        schema: self.build_ref(value, file, depth + 1)?,
                    });
                }
                DataSchema::FixedMap(FixedMapSchema::new(fields, context_key.clone()))
            }
            SchemaConfig::Recursive { depth: back } => {
                if *back == 0 || *back > depth {
                    return Err(SchemaError::RecursiveDepth {
                        location: file.to_string(),
                        depth: *back,
                        available: depth,
                    });
                }
                DataSchema::Recursive { depth: *back }
            }
        };
        Ok(Arc::new(schema))
    }

    fn build_ref(
        &mut self,
        reference: &SchemaRef,
        file: &str,
        depth: usize,
    ) -> Result<Arc<DataSchema>, SchemaError> {
        match reference {
            SchemaRef::Inline(config) => self.build_config(config, file, depth),
            SchemaRef::File(target) => {
                let path = resolve_reference(file, target)?;
                self.load_file(&path, depth)
            }
        }
    }
}
