use datapath_model::{
    data_model_to_json, get, map_data_model_equals, push_at, set_at, unknown_to_data_model,
    DataModel, DataModelOperationError, ForwardComponent, ForwardPath, MapEntry,
};
use serde_json::json;

#[test]
fn keyed_map_write_shares_untouched_entry() {
    let tree = DataModel::map([
        ("x", DataModel::from(1)),
        ("y", DataModel::from(2)),
    ]);
    let tree = set_at(&tree, &ForwardPath::from_words(["x"]), DataModel::list([DataModel::from(1)]))
        .unwrap()
        .unwrap();

    let next = set_at(&tree, &ForwardPath::from_words(["y"]), DataModel::from(3))
        .unwrap()
        .unwrap();

    assert_eq!(data_model_to_json(&next), json!({"x": [1], "y": 3}));
    let before = &tree.as_map().unwrap().entries()[0];
    let after = &next.as_map().unwrap().entries()[0];
    assert_eq!(after.key.as_deref(), Some("x"));
    assert!(before.value.ptr_eq(&after.value));
}

#[test]
fn reordered_maps_are_a_change() {
    let ab = unknown_to_data_model(&json!({"a": 1, "b": 2}));
    let ba = unknown_to_data_model(&json!({"b": 2, "a": 1}));
    assert!(!map_data_model_equals(ab.as_map().unwrap(), ba.as_map().unwrap()));

    let tree = unknown_to_data_model(&json!({"m": {"a": 1, "b": 2}}));
    let written = set_at(&tree, &ForwardPath::from_words(["m"]), ba).unwrap();
    assert!(written.is_some());
}

#[test]
fn duplicate_keys_resolve_to_first_entry() {
    let tree = DataModel::map_from_entries([
        MapEntry::keyed("k", DataModel::from("first")),
        MapEntry::keyed("k", DataModel::from("second")),
    ]);
    let path = ForwardPath::from_words(["k"]);
    assert_eq!(get(&tree, &path), Some(&DataModel::from("first")));

    let next = set_at(&tree, &path, DataModel::from("changed")).unwrap().unwrap();
    let entries = next.as_map().unwrap().entries();
    assert_eq!(entries[0].value, DataModel::from("changed"));
    assert_eq!(entries[1].value, DataModel::from("second"));

    let pointer = next.as_map().unwrap().pointer_at(1).unwrap();
    let second = ForwardPath::new(vec![ForwardComponent::Pointer(pointer)]);
    assert_eq!(get(&next, &second), Some(&DataModel::from("second")));
}

#[test]
fn push_then_write_into_pushed_list_item() {
    let tree = unknown_to_data_model(&json!({"rows": []}));
    let rows = ForwardPath::from_words(["rows"]);
    let tree = push_at(&tree, &rows, DataModel::empty_map()).unwrap().unwrap();
    let tree = set_at(&tree, &ForwardPath::from_words(["rows", "0", "name"]), DataModel::from("n"))
        .unwrap()
        .unwrap();
    assert_eq!(data_model_to_json(&tree), json!({"rows": [{"name": "n"}]}));
}

#[test]
fn errors_describe_the_failed_step() {
    let tree = unknown_to_data_model(&json!({"a": [0]}));
    let err = set_at(&tree, &ForwardPath::from_words(["a", "4"]), DataModel::Null).unwrap_err();
    assert_eq!(err.to_string(), "index 4 is out of range for a list of length 1");
    assert!(matches!(err, DataModelOperationError::IndexOutOfRange { .. }));
}
