use std::sync::Arc;

use crate::types::{DataModel, ListNode, MapNode};

/// Structural equality of two tree values.
///
/// - Scalars compare by variant and value (`Integer(1)` is not `Float(1.0)`)
/// - Lists compare element by element
/// - Maps compare entry by entry in their current order, keys included, so
///   the same entries in a different order are *not* equal
///
/// Container identities and pointers play no part. Shared containers
/// short-circuit to `true`.
///
/// # Examples
///
/// ```
/// use datapath_model::{data_model_equals, unknown_to_data_model};
/// use serde_json::json;
///
/// let a = unknown_to_data_model(&json!({"a": 1, "b": 2}));
/// let b = unknown_to_data_model(&json!({"a": 1, "b": 2}));
/// let c = unknown_to_data_model(&json!({"b": 2, "a": 1}));
///
/// assert!(data_model_equals(&a, &b));
/// assert!(!data_model_equals(&a, &c));
/// ```
pub fn data_model_equals(a: &DataModel, b: &DataModel) -> bool {
    match (a, b) {
        (DataModel::Null, DataModel::Null) => true,
        (DataModel::Integer(a), DataModel::Integer(b)) => a == b,
        (DataModel::Float(a), DataModel::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        (DataModel::Boolean(a), DataModel::Boolean(b)) => a == b,
        (DataModel::String(a), DataModel::String(b)) => a == b,
        (DataModel::List(a), DataModel::List(b)) => {
            Arc::ptr_eq(a, b) || list_data_model_equals(a, b)
        }
        (DataModel::Map(a), DataModel::Map(b)) => Arc::ptr_eq(a, b) || map_data_model_equals(a, b),
        _ => false,
    }
}

pub fn list_data_model_equals(a: &ListNode, b: &ListNode) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(a, b)| data_model_equals(a, b))
}

pub fn map_data_model_equals(a: &MapNode, b: &MapNode) -> bool {
    a.len() == b.len()
        && a.entries()
            .iter()
            .zip(b.entries())
            .all(|(a, b)| a.key == b.key && data_model_equals(&a.value, &b.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::unknown_to_data_model;
    use crate::types::MapEntry;
    use serde_json::json;

    fn model(value: serde_json::Value) -> DataModel {
        unknown_to_data_model(&value)
    }

    #[test]
    fn scalars() {
        assert!(data_model_equals(&model(json!(1)), &model(json!(1))));
        assert!(!data_model_equals(&model(json!(1)), &model(json!(2))));
        assert!(!data_model_equals(&model(json!(1)), &model(json!(1.0))));
        assert!(!data_model_equals(&model(json!(0)), &model(json!(false))));
        assert!(!data_model_equals(&model(json!("")), &model(json!(null))));
        assert!(data_model_equals(&DataModel::Float(f64::NAN), &DataModel::Float(f64::NAN)));
    }

    #[test]
    fn lists() {
        assert!(data_model_equals(&model(json!([])), &model(json!([]))));
        assert!(data_model_equals(&model(json!([1, [2]])), &model(json!([1, [2]]))));
        assert!(!data_model_equals(&model(json!([1, 2, 3])), &model(json!([1, 2]))));
        assert!(!data_model_equals(&model(json!([])), &model(json!({}))));
    }

    #[test]
    fn map_order_is_significant() {
        let a = model(json!({"a": 1, "b": "2"}));
        let b = model(json!({"b": "2", "a": 1}));
        assert!(!data_model_equals(&a, &b));
        assert!(!map_data_model_equals(a.as_map().unwrap(), b.as_map().unwrap()));
    }

    #[test]
    fn unkeyed_entries_differ_from_keyed() {
        let keyed = DataModel::map_from_entries([MapEntry::keyed("a", DataModel::Null)]);
        let unkeyed = DataModel::map_from_entries([MapEntry::new(None, DataModel::Null)]);
        assert!(!data_model_equals(&keyed, &unkeyed));
    }

    #[test]
    fn identities_are_ignored() {
        // Two separately built maps have distinct container ids.
        let a = model(json!({"x": [1, 2]}));
        let b = model(json!({"x": [1, 2]}));
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
    }
}
