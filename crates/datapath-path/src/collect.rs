//! Multi-path evaluation.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;

use datapath_model::{
    get, key_at, normalize_path, step, DataModel, ForwardComponent, ForwardPath, KeyOrIndex,
};
use datapath_schema::SchemaContext;

use crate::types::{MultiPath, PathComponent};

/// One match of a multi-path.
#[derive(Debug, Clone, PartialEq)]
pub struct Collected {
    /// The matched value, or for `$key` paths the key itself (a string for
    /// map keys, an integer for list indices).
    pub value: DataModel,
    /// Absolute path of the matched node. Components are unambiguous: list
    /// indices, first-occurrence map keys, or pointers.
    pub path: ForwardPath,
    /// The key or index the matched node is stored under.
    pub key: Option<KeyOrIndex>,
}

/// Position reached while walking a path.
#[derive(Debug, Clone)]
struct Cursor<'m> {
    value: &'m DataModel,
    path: ForwardPath,
    key: Option<KeyOrIndex>,
}

/// Evaluates multi-paths against one tree from one origin.
///
/// The origin is the node a relative query starts at. `..` and context keys
/// climb from it by re-reading the tree from the root, and nested paths are
/// always evaluated from it. Both context keys and nested path results
/// depend on the origin alone, so they are computed once per collector.
#[derive(Debug, Clone)]
pub struct DataModelCollector {
    root: DataModel,
    origin_path: ForwardPath,
    schema: Option<SchemaContext>,
    context_keys: OnceCell<Vec<(String, usize)>>,
    nested: RefCell<HashMap<MultiPath, Vec<DataModel>>>,
}

impl DataModelCollector {
    /// Collector whose origin is the root.
    pub fn new(root: DataModel) -> Self {
        Self {
            root,
            origin_path: ForwardPath::root(),
            schema: None,
            context_keys: OnceCell::new(),
            nested: RefCell::default(),
        }
    }

    /// Move the origin to `path` (absolute). Resolvable paths are stored in
    /// their unambiguous form.
    pub fn with_origin(mut self, path: ForwardPath) -> Self {
        self.origin_path = normalize_path(&self.root, &path).unwrap_or(path);
        self.context_keys = OnceCell::new();
        self.nested = RefCell::default();
        self
    }

    /// Attach the schema context of the root, enabling context keys.
    pub fn with_schema(mut self, schema: SchemaContext) -> Self {
        self.schema = Some(schema);
        self.context_keys = OnceCell::new();
        self.nested = RefCell::default();
        self
    }

    pub fn root(&self) -> &DataModel {
        &self.root
    }

    pub fn origin_path(&self) -> &ForwardPath {
        &self.origin_path
    }

    /// The value at the origin, `None` if the origin does not resolve.
    pub fn origin(&self) -> Option<&DataModel> {
        get(&self.root, &self.origin_path)
    }

    /// Context keys visible at the origin with their pop depths, nearest
    /// first. Computed on first use.
    pub fn context_keys(&self) -> &[(String, usize)] {
        self.context_keys.get_or_init(|| {
            let Some(schema) = &self.schema else {
                return Vec::new();
            };
            match schema.descend_path(&self.root, &self.origin_path) {
                Some(context) => context.context_keys(),
                None => {
                    tracing::debug!(origin = %self.origin_path, "origin has no schema context");
                    Vec::new()
                }
            }
        })
    }

    fn context_key_depth(&self, name: &str) -> Option<usize> {
        self.context_keys()
            .iter()
            .find(|(key, _)| key == name)
            .map(|&(_, depth)| depth)
    }

    /// Every match of `path`, in evaluation order.
    pub fn collect(&self, path: &MultiPath) -> Vec<Collected> {
        let mut out = Vec::new();
        if let Some(cursor) = self.start(path) {
            self.eval(path.components(), cursor, &mut out);
        }
        out
    }

    /// The matched values only.
    pub fn collect_values(&self, path: &MultiPath) -> Vec<DataModel> {
        self.collect(path).into_iter().map(|c| c.value).collect()
    }

    /// The first match of `path`.
    pub fn first(&self, path: &MultiPath) -> Option<Collected> {
        self.collect(path).into_iter().next()
    }

    /// Values of the nested path `sub`, evaluated from the origin.
    fn nested_selectors(&self, sub: &MultiPath) -> Vec<DataModel> {
        if let Some(values) = self.nested.borrow().get(sub) {
            return values.clone();
        }
        let values = self.collect_values(sub);
        tracing::trace!(path = %sub, selectors = values.len(), "nested path");
        self.nested.borrow_mut().insert(sub.clone(), values.clone());
        values
    }

    fn start(&self, path: &MultiPath) -> Option<Cursor<'_>> {
        if path.is_absolute() {
            return Some(Cursor {
                value: &self.root,
                path: ForwardPath::root(),
                key: None,
            });
        }
        Some(Cursor {
            value: self.origin()?,
            path: self.origin_path.clone(),
            key: key_at(&self.root, &self.origin_path),
        })
    }

    fn eval<'m>(&'m self, components: &[PathComponent], cursor: Cursor<'m>, out: &mut Vec<Collected>) {
        match components.split_first() {
            None => out.push(Collected {
                value: cursor.value.clone(),
                path: cursor.path,
                key: cursor.key,
            }),
            Some((first, rest)) => self.apply(first, rest, cursor, out),
        }
    }

    fn apply<'m>(
        &'m self,
        component: &PathComponent,
        rest: &[PathComponent],
        cursor: Cursor<'m>,
        out: &mut Vec<Collected>,
    ) {
        match component {
            PathComponent::Forward(forward) => {
                if let Some(next) = self.descend(&cursor, forward) {
                    self.eval(rest, next, out);
                }
            }
            PathComponent::Key => {
                if let Some(key) = cursor.key {
                    out.push(Collected {
                        value: key.to_model(),
                        path: cursor.path,
                        key: Some(key),
                    });
                }
            }
            PathComponent::Wildcard(_) => {
                let before = out.len();
                for position in 0..cursor.value.len() {
                    if let Some(next) = self.child(&cursor, position) {
                        self.eval(rest, next, out);
                    }
                }
                tracing::trace!(at = %cursor.path, matches = out.len() - before, "wildcard fan-out");
            }
            PathComponent::Reverse | PathComponent::ContextKey(_) => {
                self.climb(component, rest, cursor, out);
            }
            PathComponent::Nested(sub) => {
                for selector in self.nested_selectors(sub) {
                    let forward = match (cursor.value, selector) {
                        (DataModel::List(_), DataModel::Integer(index)) => match usize::try_from(index) {
                            Ok(index) => ForwardComponent::Index(index),
                            Err(_) => continue,
                        },
                        (DataModel::Map(_), DataModel::String(key)) => ForwardComponent::Key(key),
                        _ => continue,
                    };
                    if let Some(next) = self.descend(&cursor, &forward) {
                        self.eval(rest, next, out);
                    }
                }
            }
            PathComponent::Union(alternatives) => {
                for alternative in alternatives {
                    self.apply(alternative, rest, cursor.clone(), out);
                }
            }
        }
    }

    /// Pop `component` and every reverse or context-key component directly
    /// after it in one go, then continue from the node re-read at the
    /// shortened path.
    fn climb<'m>(
        &'m self,
        component: &PathComponent,
        rest: &[PathComponent],
        cursor: Cursor<'m>,
        out: &mut Vec<Collected>,
    ) {
        let mut pops = 0;
        let mut consumed = 0;
        for upward in std::iter::once(component).chain(rest.iter()) {
            match upward {
                PathComponent::Reverse => pops += 1,
                PathComponent::ContextKey(name) => match self.context_key_depth(name) {
                    Some(depth) => pops += depth,
                    None => {
                        tracing::trace!(name = name.as_str(), "unknown context key");
                        return;
                    }
                },
                _ => break,
            }
            consumed += 1;
        }
        let Some(path) = cursor.path.popped(pops) else {
            return;
        };
        let Some(value) = get(&self.root, &path) else {
            return;
        };
        let key = key_at(&self.root, &path);
        // `consumed` counts `component` itself, which is not part of `rest`.
        self.eval(&rest[consumed - 1..], Cursor { value, path, key }, out);
    }

    fn descend<'m>(&'m self, cursor: &Cursor<'m>, component: &ForwardComponent) -> Option<Cursor<'m>> {
        let position = step(cursor.value, component)?.position;
        self.child(cursor, position)
    }

    fn child<'m>(&'m self, cursor: &Cursor<'m>, position: usize) -> Option<Cursor<'m>> {
        let container: &'m DataModel = cursor.value;
        let (value, component, key) = match container {
            DataModel::List(list) => (
                list.get(position)?,
                list.component_at(position),
                Some(KeyOrIndex::Index(position)),
            ),
            DataModel::Map(map) => {
                let entry = map.entry(position)?;
                (
                    &entry.value,
                    map.component_at(position)?,
                    entry.key.clone().map(KeyOrIndex::Key),
                )
            }
            _ => return None,
        };
        Some(Cursor {
            value,
            path: cursor.path.with(component),
            key,
        })
    }
}
