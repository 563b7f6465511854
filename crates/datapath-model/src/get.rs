use crate::path::{ForwardComponent, ForwardPath};
use crate::types::{DataModel, KeyOrIndex};

/// A child reached by applying one component to a container.
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub value: &'a DataModel,
    /// Position of the child within its container.
    pub position: usize,
}

impl<'a> Step<'a> {
    /// The key (maps) or index (lists) the child is stored under, `None`
    /// for unkeyed map entries.
    pub fn key_in(&self, container: &DataModel) -> Option<KeyOrIndex> {
        match container {
            DataModel::List(_) => Some(KeyOrIndex::Index(self.position)),
            DataModel::Map(map) => map
                .entry(self.position)
                .and_then(|entry| entry.key.clone())
                .map(KeyOrIndex::Key),
            _ => None,
        }
    }
}

/// Apply one component to `model`.
///
/// Returns `None` for scalars, out-of-range indices, missing keys, dangling
/// pointers, and components that do not fit the container kind.
pub fn step<'a>(model: &'a DataModel, component: &ForwardComponent) -> Option<Step<'a>> {
    let position = match (model, component) {
        (DataModel::List(list), ForwardComponent::Index(index))
        | (DataModel::List(list), ForwardComponent::IndexOrKey(KeyOrIndex::Index(index))) => {
            (*index < list.len()).then_some(*index)?
        }
        (DataModel::List(list), ForwardComponent::Pointer(pointer)) => list.position_of(pointer)?,
        (DataModel::Map(map), ForwardComponent::Key(key))
        | (DataModel::Map(map), ForwardComponent::IndexOrKey(KeyOrIndex::Key(key))) => {
            map.position(key)?
        }
        (DataModel::Map(map), ForwardComponent::IndexOrKey(KeyOrIndex::Index(index))) => {
            map.position(&index.to_string())?
        }
        (DataModel::Map(map), ForwardComponent::Pointer(pointer)) => map.position_of(pointer)?,
        _ => return None,
    };
    let value = match model {
        DataModel::List(list) => list.get(position)?,
        DataModel::Map(map) => &map.entry(position)?.value,
        _ => return None,
    };
    Some(Step { value, position })
}

/// Get the value at `path`, or `None` when any step does not resolve.
pub fn get<'a>(model: &'a DataModel, path: &ForwardPath) -> Option<&'a DataModel> {
    path.iter()
        .try_fold(model, |current, component| step(current, component).map(|s| s.value))
}

/// The key or index under which the value at `path` is stored.
///
/// `None` for the root, unresolvable paths, and unkeyed map entries.
pub fn key_at(model: &DataModel, path: &ForwardPath) -> Option<KeyOrIndex> {
    let parent = get(model, &path.parent()?)?;
    step(parent, path.last()?)?.key_in(parent)
}

/// Rewrite `path` so every component is unambiguous: `Index` for lists,
/// `Key` for first-occurrence map keys, `Pointer` otherwise.
pub fn normalize_path(model: &DataModel, path: &ForwardPath) -> Option<ForwardPath> {
    let mut current = model;
    let mut out = ForwardPath::root();
    for component in path {
        let next = step(current, component)?;
        let normalized = match current {
            DataModel::List(list) => list.component_at(next.position),
            DataModel::Map(map) => map.component_at(next.position)?,
            _ => return None,
        };
        out.push(normalized);
        current = next.value;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::unknown_to_data_model;
    use serde_json::json;

    fn model(value: serde_json::Value) -> DataModel {
        unknown_to_data_model(&value)
    }

    #[test]
    fn get_descends_maps_and_lists() {
        let doc = model(json!({"foo": {"bar": [10, 20, null]}}));
        let path = ForwardPath::from_words(["foo", "bar", "1"]);
        assert_eq!(get(&doc, &path), Some(&DataModel::Integer(20)));
        assert_eq!(
            get(&doc, &ForwardPath::from_words(["foo", "bar", "2"])),
            Some(&DataModel::Null)
        );
    }

    #[test]
    fn get_absent_cases() {
        let doc = model(json!({"foo": {"bar": [10]}, "s": "text"}));
        for words in [
            vec!["missing"],
            vec!["foo", "bar", "1"],
            vec!["s", "0"],
            vec!["foo", "bar", "x"],
        ] {
            assert_eq!(get(&doc, &ForwardPath::from_words(words.clone())), None, "{words:?}");
        }
    }

    #[test]
    fn strict_components_only_fit_their_container() {
        let doc = model(json!({"0": "key", "list": ["item"]}));
        let by_index = ForwardPath::new(vec![ForwardComponent::Index(0)]);
        assert_eq!(get(&doc, &by_index), None);
        assert_eq!(
            get(&doc, &ForwardPath::from_words(["0"])),
            Some(&DataModel::from("key"))
        );
        let by_key = ForwardPath::new(vec![ForwardComponent::key("list"), ForwardComponent::key("0")]);
        assert_eq!(get(&doc, &by_key), None);
    }

    #[test]
    fn pointer_components_resolve_by_slot() {
        let doc = model(json!(["a", "b", "c"]));
        let pointer = doc.as_list().unwrap().pointer_at(1).unwrap();
        let path = ForwardPath::new(vec![ForwardComponent::Pointer(pointer)]);
        assert_eq!(get(&doc, &path), Some(&DataModel::from("b")));
    }

    #[test]
    fn key_at_reports_storage_key() {
        let doc = model(json!({"a": [{"b": 1}]}));
        assert_eq!(
            key_at(&doc, &ForwardPath::from_words(["a", "0", "b"])),
            Some(KeyOrIndex::Key("b".into()))
        );
        assert_eq!(
            key_at(&doc, &ForwardPath::from_words(["a", "0"])),
            Some(KeyOrIndex::Index(0))
        );
        assert_eq!(key_at(&doc, &ForwardPath::root()), None);
    }

    #[test]
    fn zero_padded_words_are_keys() {
        let doc = model(json!({"007": "bond", "7": "seven"}));
        assert_eq!(
            get(&doc, &ForwardPath::from_words(["007"])),
            Some(&DataModel::from("bond"))
        );
        assert_eq!(
            get(&doc, &ForwardPath::from_words(["7"])),
            Some(&DataModel::from("seven"))
        );

        let next = crate::set_at(&doc, &ForwardPath::from_words(["007"]), DataModel::from("q"))
            .unwrap()
            .unwrap();
        assert_eq!(
            crate::data_model_to_json(&next),
            json!({"007": "q", "7": "seven"})
        );

        let list = model(json!(["a", "b"]));
        assert_eq!(get(&list, &ForwardPath::from_words(["01"])), None);
    }

    #[test]
    fn normalize_path_removes_ambiguity() {
        let doc = model(json!({"a": [{"b": 1}]}));
        let normalized = normalize_path(&doc, &ForwardPath::from_words(["a", "0", "b"])).unwrap();
        assert_eq!(
            normalized.components(),
            &[
                ForwardComponent::key("a"),
                ForwardComponent::Index(0),
                ForwardComponent::key("b"),
            ]
        );
    }
}
