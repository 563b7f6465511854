//! Copy-on-write mutators.
//!
//! Every mutator returns `Ok(Some(tree))` with a new tree, `Ok(None)` when the
//! write would not change anything, or an operation error. The new tree
//! shares every subtree that is not on the written path.

use std::sync::Arc;

use crate::equal::data_model_equals;
use crate::get::step;
use crate::path::{ForwardComponent, ForwardPath};
use crate::types::{DataModel, KeyOrIndex};
use crate::DataModelOperationError;

type OpResult = Result<Option<DataModel>, DataModelOperationError>;

/// Write `value` at `path`.
///
/// An empty path replaces the whole tree. A missing *terminal* key on a map
/// appends a new entry under that key; any other missing step is an error.
///
/// # Example
///
/// ```
/// use datapath_model::{get, set_at, unknown_to_data_model, ForwardPath, DataModel};
/// use serde_json::json;
///
/// let tree = unknown_to_data_model(&json!({"a": {"b": 1}}));
/// let path = ForwardPath::from_words(["a", "b"]);
///
/// let next = set_at(&tree, &path, DataModel::from(2)).unwrap().unwrap();
/// assert_eq!(get(&next, &path), Some(&DataModel::from(2)));
///
/// // Writing the same value again is a no-op.
/// assert!(set_at(&next, &path, DataModel::from(2)).unwrap().is_none());
/// ```
pub fn set_at(model: &DataModel, path: &ForwardPath, value: DataModel) -> OpResult {
    let Some((last, parent)) = path.components().split_last() else {
        return Ok((!data_model_equals(model, &value)).then_some(value));
    };
    let depth = parent.len();
    update_at(model, parent, 0, |target| set_child(target, last, value, depth))
}

/// Append `value` to the list or map at `path`. Map entries are appended
/// without a key.
pub fn push_at(model: &DataModel, path: &ForwardPath, value: DataModel) -> OpResult {
    let depth = path.len();
    update_at(model, path.components(), 0, |target| match target {
        DataModel::List(list) => Ok(Some(DataModel::List(Arc::new(list.with_pushed(value))))),
        DataModel::Map(map) => Ok(Some(DataModel::Map(Arc::new(map.with_pushed(None, value))))),
        other => Err(DataModelOperationError::NotAContainer {
            kind: other.kind(),
            depth,
        }),
    })
}

/// Remove the entry at `path`. Removing an entry that does not exist is a
/// no-op; the root cannot be removed.
pub fn delete_at(model: &DataModel, path: &ForwardPath) -> OpResult {
    let Some((last, parent)) = path.components().split_last() else {
        return Err(DataModelOperationError::RootEntry);
    };
    let depth = parent.len();
    update_at(model, parent, 0, |target| {
        check_fits(target, last, depth)?;
        let Some(found) = step(target, last) else {
            return Ok(None);
        };
        match target {
            DataModel::List(list) => Ok(Some(DataModel::List(Arc::new(list.without(found.position))))),
            DataModel::Map(map) => Ok(Some(DataModel::Map(Arc::new(map.without(found.position))))),
            other => Err(DataModelOperationError::NotAContainer {
                kind: other.kind(),
                depth,
            }),
        }
    })
}

/// Give the map entry at `path` the key `key`, e.g. to key an entry added by
/// [`push_at`].
pub fn rename_key_at(model: &DataModel, path: &ForwardPath, key: &str) -> OpResult {
    let Some((last, parent)) = path.components().split_last() else {
        return Err(DataModelOperationError::RootEntry);
    };
    let depth = parent.len();
    update_at(model, parent, 0, |target| {
        let DataModel::Map(map) = target else {
            return Err(DataModelOperationError::KindMismatch {
                component: last.to_string(),
                kind: target.kind(),
            });
        };
        let found = descend(target, last, depth)?;
        if map.entry(found.position).and_then(|e| e.key.as_deref()) == Some(key) {
            return Ok(None);
        }
        Ok(Some(DataModel::Map(Arc::new(map.with_key(found.position, key.to_string())))))
    })
}

/// Walk `path` and apply `apply` to the value found there, rebuilding every
/// container on the way back up when it reports a change.
fn update_at<F>(model: &DataModel, path: &[ForwardComponent], depth: usize, apply: F) -> OpResult
where
    F: FnOnce(&DataModel) -> OpResult,
{
    let Some((head, rest)) = path.split_first() else {
        return apply(model);
    };
    let found = descend(model, head, depth)?;
    match update_at(found.value, rest, depth + 1, apply)? {
        Some(child) => replace_child(model, found.position, child, depth).map(Some),
        None => Ok(None),
    }
}

struct Found<'a> {
    value: &'a DataModel,
    position: usize,
}

/// Like [`step`], but reports why a step does not resolve.
fn descend<'a>(
    model: &'a DataModel,
    component: &ForwardComponent,
    depth: usize,
) -> Result<Found<'a>, DataModelOperationError> {
    check_fits(model, component, depth)?;
    if let Some(found) = step(model, component) {
        return Ok(Found {
            value: found.value,
            position: found.position,
        });
    }
    match (model, component) {
        (DataModel::List(list), ForwardComponent::Index(index))
        | (DataModel::List(list), ForwardComponent::IndexOrKey(KeyOrIndex::Index(index))) => {
            Err(DataModelOperationError::IndexOutOfRange {
                index: *index,
                len: list.len(),
            })
        }
        _ => Err(DataModelOperationError::NotFound {
            component: component.to_string(),
            depth,
        }),
    }
}

/// Reject scalars and components that can never address this container kind.
fn check_fits(
    model: &DataModel,
    component: &ForwardComponent,
    depth: usize,
) -> Result<(), DataModelOperationError> {
    let fits = match (model, component) {
        (DataModel::List(_), ForwardComponent::Key(_))
        | (DataModel::List(_), ForwardComponent::IndexOrKey(KeyOrIndex::Key(_)))
        | (DataModel::Map(_), ForwardComponent::Index(_)) => false,
        (DataModel::List(_), _) | (DataModel::Map(_), _) => true,
        (other, _) => {
            return Err(DataModelOperationError::NotAContainer {
                kind: other.kind(),
                depth,
            })
        }
    };
    if fits {
        Ok(())
    } else {
        Err(DataModelOperationError::KindMismatch {
            component: component.to_string(),
            kind: model.kind(),
        })
    }
}

fn set_child(target: &DataModel, last: &ForwardComponent, value: DataModel, depth: usize) -> OpResult {
    check_fits(target, last, depth)?;
    if let (DataModel::Map(map), None) = (target, step(target, last)) {
        let key = match last {
            ForwardComponent::Key(key) | ForwardComponent::IndexOrKey(KeyOrIndex::Key(key)) => {
                key.clone()
            }
            ForwardComponent::IndexOrKey(KeyOrIndex::Index(index)) => index.to_string(),
            _ => {
                return Err(DataModelOperationError::NotFound {
                    component: last.to_string(),
                    depth,
                })
            }
        };
        return Ok(Some(DataModel::Map(Arc::new(map.with_pushed(Some(key), value)))));
    }
    let found = descend(target, last, depth)?;
    if data_model_equals(found.value, &value) {
        return Ok(None);
    }
    replace_child(target, found.position, value, depth).map(Some)
}

fn replace_child(
    container: &DataModel,
    position: usize,
    child: DataModel,
    depth: usize,
) -> Result<DataModel, DataModelOperationError> {
    match container {
        DataModel::List(list) => Ok(DataModel::List(Arc::new(list.with_item(position, child)))),
        DataModel::Map(map) => Ok(DataModel::Map(Arc::new(map.with_value(position, child)))),
        other => Err(DataModelOperationError::NotAContainer {
            kind: other.kind(),
            depth,
        }),
    }
}
