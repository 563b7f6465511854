//! DataPath: a path language for addressing and collecting nodes of a tree
//! value.
//!
//! Beyond plain descent (`users/0/name`) a multi-path may fan out over all
//! children (`*`), try alternatives (`{a,b}`), climb (`..`), climb to an
//! ancestor named by the schema (`..row`), use a value found elsewhere as a
//! key (`items/[selected]`) or yield the key of a node (`$key`).
//!
//! # Example
//!
//! ```
//! use datapath_path::{DataModelCollector, DataPathParser};
//! use datapath_model::{data_model_to_json, unknown_to_data_model};
//! use serde_json::json;
//!
//! let tree = unknown_to_data_model(&json!({
//!     "selected": 1,
//!     "items": [{"name": "a"}, {"name": "b"}]
//! }));
//! let collector = DataModelCollector::new(tree);
//!
//! let path = DataPathParser::parse("items/[selected]/name").unwrap();
//! let found = collector.collect(&path);
//! assert_eq!(found.len(), 1);
//! assert_eq!(data_model_to_json(&found[0].value), json!("b"));
//! assert_eq!(found[0].path.to_string(), "/items/1/name");
//! ```

use thiserror::Error;

mod types;
pub use types::{MultiPath, PathComponent};

mod parser;
pub use parser::{DataPathParser, PathSyntaxError, SyntaxErrorKind};

mod collect;
pub use collect::{Collected, DataModelCollector};

mod manager;
pub use manager::DataModelManager;

mod template;
pub use template::{fill_template, PARSE_ERROR_PLACEHOLDER};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error(transparent)]
    Syntax(#[from] PathSyntaxError),
    #[error("illegal component {component}: {reason}")]
    IllegalComponent {
        component: String,
        reason: &'static str,
    },
}

impl std::str::FromStr for MultiPath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataPathParser::parse(s)
    }
}
