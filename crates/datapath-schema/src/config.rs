//! Serialized schema format.
//!
//! A schema file holds one [`SchemaConfig`] object tagged by `type`:
//!
//! ```json
//! {
//!   "type": "fixedMap",
//!   "contextKey": "page",
//!   "properties": {
//!     "title": {"type": "string"},
//!     "sections": {"type": "list", "item": "./section.json"}
//!   }
//! }
//! ```
//!
//! Any nested position may hold a string instead of an object: a path to
//! another schema file, relative to the file containing the reference.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SchemaConfig {
    Any,
    Null,
    Boolean,
    Integer,
    Number,
    String,
    List {
        item: SchemaRef,
        #[serde(default, rename = "contextKey", skip_serializing_if = "Option::is_none")]
        context_key: Option<String>,
    },
    Map {
        item: SchemaRef,
        #[serde(default, rename = "contextKey", skip_serializing_if = "Option::is_none")]
        context_key: Option<String>,
    },
    FixedMap {
        properties: IndexMap<String, SchemaRef>,
        #[serde(default, rename = "contextKey", skip_serializing_if = "Option::is_none")]
        context_key: Option<String>,
    },
    Recursive {
        depth: usize,
    },
}

/// A nested schema: inline, or a reference to another file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    File(String),
    Inline(Box<SchemaConfig>),
}

impl From<SchemaConfig> for SchemaRef {
    fn from(config: SchemaConfig) -> Self {
        Self::Inline(Box::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tagged_config() {
        let config: SchemaConfig = serde_json::from_value(json!({
            "type": "fixedMap",
            "contextKey": "page",
            "properties": {
                "title": {"type": "string"},
                "rows": {"type": "list", "item": "./row.json"},
                "self": {"type": "recursive", "depth": 1}
            }
        }))
        .unwrap();
        let SchemaConfig::FixedMap { properties, context_key } = config else {
            panic!("expected a fixed map");
        };
        assert_eq!(context_key.as_deref(), Some("page"));
        let keys: Vec<&str> = properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "rows", "self"]);
        assert_eq!(properties["title"], SchemaRef::from(SchemaConfig::String));
        assert_eq!(
            properties["rows"],
            SchemaRef::from(SchemaConfig::List {
                item: SchemaRef::File("./row.json".into()),
                context_key: None,
            })
        );
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<SchemaConfig, _> = serde_json::from_value(json!({"type": "tuple"}));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_back_to_the_same_shape() {
        let value = json!({
            "type": "map",
            "item": {"type": "integer"},
            "contextKey": "id"
        });
        let config: SchemaConfig = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&config).unwrap(), value);
    }
}
