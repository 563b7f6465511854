use datapath_model::{
    data_model_to_json, get, set_at, step, unknown_to_data_model, DataModel, ForwardPath,
};
use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::Value;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,3}", inner), 0..5)
                .prop_map(|members| Value::Object(members.into_iter().collect())),
        ]
    })
}

/// Every path that resolves in `model`, root included.
fn all_paths(model: &DataModel) -> Vec<ForwardPath> {
    fn walk(model: &DataModel, at: ForwardPath, out: &mut Vec<ForwardPath>) {
        out.push(at.clone());
        match model {
            DataModel::List(list) => {
                for (index, child) in list.iter().enumerate() {
                    walk(child, at.with(list.component_at(index)), out);
                }
            }
            DataModel::Map(map) => {
                for (index, entry) in map.entries().iter().enumerate() {
                    if let Some(component) = map.component_at(index) {
                        walk(&entry.value, at.with(component), out);
                    }
                }
            }
            _ => {}
        }
    }
    let mut out = Vec::new();
    walk(model, ForwardPath::root(), &mut out);
    out
}

proptest! {
    #[test]
    fn json_round_trip(value in arb_json()) {
        prop_assert_eq!(data_model_to_json(&unknown_to_data_model(&value)), value);
    }

    #[test]
    fn writing_current_value_is_noop(value in arb_json(), pick in any::<Index>()) {
        let tree = unknown_to_data_model(&value);
        let paths = all_paths(&tree);
        let path = pick.get(&paths);
        let current = get(&tree, path).unwrap().clone();
        prop_assert!(set_at(&tree, path, current).unwrap().is_none());
    }

    #[test]
    fn write_shares_off_path_subtrees(value in arb_json(), pick in any::<Index>()) {
        let tree = unknown_to_data_model(&value);
        let paths = all_paths(&tree);
        let path = pick.get(&paths);
        let marker = DataModel::from("__written__");
        let next = set_at(&tree, path, marker.clone()).unwrap().unwrap();
        prop_assert_eq!(get(&next, path), Some(&marker));

        // Along the written path, every sibling container is the same Arc.
        let mut before = &tree;
        let mut after = &next;
        for component in path {
            let on_path = step(before, component).unwrap().position;
            match (before, after) {
                (DataModel::List(b), DataModel::List(a)) => {
                    for (index, (b, a)) in b.iter().zip(a.iter()).enumerate() {
                        if index != on_path && b.is_container() {
                            prop_assert!(b.ptr_eq(a));
                        }
                    }
                }
                (DataModel::Map(b), DataModel::Map(a)) => {
                    for (index, (b, a)) in b.entries().iter().zip(a.entries()).enumerate() {
                        if index != on_path && b.value.is_container() {
                            prop_assert!(b.value.ptr_eq(&a.value));
                        }
                    }
                }
                _ => prop_assert!(false, "path must run through containers"),
            }
            before = step(before, component).unwrap().value;
            after = step(after, component).unwrap().value;
        }
    }
}
