//! Schema node types.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::SchemaError;

/// A node of a data schema.
///
/// Self-referential schemas do not hold cycles: a [`DataSchema::Recursive`]
/// node names an ancestor by its distance up the enclosing chain instead.
#[derive(Debug, Clone)]
pub enum DataSchema {
    Any,
    Null,
    Boolean,
    Integer,
    Number,
    String,
    List(ListSchema),
    Map(MapSchema),
    FixedMap(FixedMapSchema),
    /// Stands for the ancestor `depth` levels up (1 = the parent).
    Recursive { depth: usize },
}

/// A list whose items all follow `item`.
#[derive(Debug, Clone)]
pub struct ListSchema {
    pub item: Arc<DataSchema>,
    pub context_key: Option<String>,
}

/// A map with arbitrary keys whose values all follow `item`.
#[derive(Debug, Clone)]
pub struct MapSchema {
    pub item: Arc<DataSchema>,
    pub context_key: Option<String>,
}

/// One named field of a [`FixedMapSchema`].
#[derive(Debug, Clone)]
pub struct FixedField {
    pub key: String,
    pub schema: Arc<DataSchema>,
}

/// A map with a known, ordered set of fields.
#[derive(Debug, Clone)]
pub struct FixedMapSchema {
    fields: Vec<FixedField>,
    context_key: Option<String>,
    index: OnceLock<HashMap<String, usize>>,
}

impl FixedMapSchema {
    pub fn new(fields: Vec<FixedField>, context_key: Option<String>) -> Self {
        Self {
            fields,
            context_key,
            index: OnceLock::new(),
        }
    }

    pub fn fields(&self) -> &[FixedField] {
        &self.fields
    }

    pub fn context_key(&self) -> Option<&str> {
        self.context_key.as_deref()
    }

    /// Field declared under `key`. The first declaration wins.
    pub fn field(&self, key: &str) -> Option<&FixedField> {
        let index = self.index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.fields.len());
            for (i, field) in self.fields.iter().enumerate() {
                index.entry(field.key.clone()).or_insert(i);
            }
            index
        });
        index.get(key).map(|&i| &self.fields[i])
    }
}

impl DataSchema {
    pub fn list(item: DataSchema) -> Self {
        Self::List(ListSchema {
            item: Arc::new(item),
            context_key: None,
        })
    }

    pub fn map(item: DataSchema) -> Self {
        Self::Map(MapSchema {
            item: Arc::new(item),
            context_key: None,
        })
    }

    pub fn fixed_map<K: Into<String>>(fields: impl IntoIterator<Item = (K, DataSchema)>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(key, schema)| FixedField {
                key: key.into(),
                schema: Arc::new(schema),
            })
            .collect();
        Self::FixedMap(FixedMapSchema::new(fields, None))
    }

    pub fn recursive(depth: usize) -> Self {
        Self::Recursive { depth }
    }

    /// Declare a context key on a container node. Scalars are returned as is.
    pub fn with_context_key(self, name: impl Into<String>) -> Self {
        let name = Some(name.into());
        match self {
            Self::List(list) => Self::List(ListSchema {
                context_key: name,
                ..list
            }),
            Self::Map(map) => Self::Map(MapSchema {
                context_key: name,
                ..map
            }),
            Self::FixedMap(fixed) => Self::FixedMap(FixedMapSchema::new(fixed.fields, name)),
            other => other,
        }
    }

    /// The kind name used in schema config files.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::FixedMap(_) => "fixedMap",
            Self::Recursive { .. } => "recursive",
        }
    }

    pub fn context_key(&self) -> Option<&str> {
        match self {
            Self::List(list) => list.context_key.as_deref(),
            Self::Map(map) => map.context_key.as_deref(),
            Self::FixedMap(fixed) => fixed.context_key(),
            _ => None,
        }
    }

    /// Direct child schemas, in declaration order.
    pub fn children(&self) -> Vec<&Arc<DataSchema>> {
        match self {
            Self::List(list) => vec![&list.item],
            Self::Map(map) => vec![&map.item],
            Self::FixedMap(fixed) => fixed.fields.iter().map(|f| &f.schema).collect(),
            _ => Vec::new(),
        }
    }

    /// Check that the root is not recursive and that every recursive node
    /// points at an ancestor that exists.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if let Self::Recursive { .. } = self {
            return Err(SchemaError::RecursiveRoot);
        }
        self.validate_at(0)
    }

    fn validate_at(&self, ancestors: usize) -> Result<(), SchemaError> {
        match self {
            Self::Recursive { depth } if *depth == 0 || *depth > ancestors => {
                Err(SchemaError::RecursiveDepth {
                    location: "<schema>".to_string(),
                    depth: *depth,
                    available: ancestors,
                })
            }
            _ => self
                .children()
                .into_iter()
                .try_for_each(|child| child.validate_at(ancestors + 1)),
        }
    }
}

impl fmt::Display for DataSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(list) => write!(f, "list<{}>", list.item),
            Self::Map(map) => write!(f, "map<{}>", map.item),
            Self::FixedMap(fixed) => {
                f.write_str("{")?;
                for (i, field) in fixed.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.key, field.schema)?;
                }
                f.write_str("}")
            }
            Self::Recursive { depth } => write!(f, "recursive({depth})"),
            other => f.write_str(other.kind()),
        }
    }
}
