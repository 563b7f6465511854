//! Persistent tree values.
//!
//! A [`DataModel`] is a JSON-like value (null, integer, float, boolean,
//! string, list, ordered map) that is never mutated in place. The mutators
//! ([`set_at`], [`push_at`], [`delete_at`], [`rename_key_at`]) return a new
//! tree sharing every untouched subtree with the input, or `None` when the
//! write would not change anything.
//!
//! Maps keep their entries in order, allow repeated keys, and allow entries
//! without a key (added by [`push_at`] and keyed later).
//!
//! # Example
//!
//! ```
//! use datapath_model::{get, set_at, unknown_to_data_model, data_model_to_json, ForwardPath, DataModel};
//! use serde_json::json;
//!
//! let tree = unknown_to_data_model(&json!({"x": [1, 2], "y": 2}));
//!
//! let next = set_at(&tree, &ForwardPath::from_words(["y"]), DataModel::from(3))
//!     .unwrap()
//!     .expect("value changed");
//! assert_eq!(data_model_to_json(&next), json!({"x": [1, 2], "y": 3}));
//!
//! // The untouched list is shared, not copied.
//! let x = ForwardPath::from_words(["x"]);
//! assert!(get(&tree, &x).unwrap().ptr_eq(get(&next, &x).unwrap()));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{ContainerId, DataModel, DataPointer, KeyOrIndex, ListNode, MapEntry, MapNode, SlotId};

pub mod path;
pub use path::{write_word, ForwardComponent, ForwardPath};

mod get;
pub use get::{get, key_at, normalize_path, step, Step};

mod set;
pub use set::{delete_at, push_at, rename_key_at, set_at};

mod equal;
pub use equal::{data_model_equals, list_data_model_equals, map_data_model_equals};

mod convert;
pub use convert::{data_model_to_json, unknown_to_data_model};

/// A write that cannot be carried out.
///
/// Writes that would not change anything are not errors; they return
/// `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataModelOperationError {
    #[error("cannot address a child of a {kind} value at depth {depth}")]
    NotAContainer { kind: &'static str, depth: usize },
    #[error("index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("nothing matches {component} at depth {depth}")]
    NotFound { component: String, depth: usize },
    #[error("{component} cannot address a {kind}")]
    KindMismatch { component: String, kind: &'static str },
    #[error("the root value is not stored in a container")]
    RootEntry,
}
