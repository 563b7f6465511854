//! Tree value types.
//!
//! A [`DataModel`] is an immutable value. Lists and maps live behind [`Arc`]
//! handles so a derived tree shares every subtree it did not touch.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::convert::data_model_to_json;
use crate::equal::data_model_equals;
use crate::path::ForwardComponent;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a list or map.
///
/// Allocated when a container is first built and carried over by every
/// copy-on-write derivation of it, so a pointer taken before an edit still
/// names the same container afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    fn fresh() -> Self {
        ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// An id read back from text, e.g. a printed [`DataPointer`]. It only
    /// addresses a container that was allocated with this id.
    pub fn from_raw(raw: u64) -> Self {
        ContainerId(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Identity of an entry within its container. Never reused by that container.
pub type SlotId = u64;

/// A stable reference to one slot of one container.
///
/// Unlike a list index, a pointer keeps addressing the same entry when
/// siblings are inserted or removed before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataPointer {
    pub container: ContainerId,
    pub slot: SlotId,
}

impl fmt::Display for DataPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}.{}", self.container.0, self.slot)
    }
}

/// A map key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyOrIndex {
    Key(String),
    Index(usize),
}

impl KeyOrIndex {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            KeyOrIndex::Key(key) => Some(key),
            KeyOrIndex::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            KeyOrIndex::Key(_) => None,
            KeyOrIndex::Index(index) => Some(*index),
        }
    }

    /// The key as a tree value: a string for map keys, an integer for indices.
    pub fn to_model(&self) -> DataModel {
        match self {
            KeyOrIndex::Key(key) => DataModel::String(key.clone()),
            KeyOrIndex::Index(index) => DataModel::Integer(*index as i64),
        }
    }
}

impl fmt::Display for KeyOrIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOrIndex::Key(key) => f.write_str(key),
            KeyOrIndex::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for KeyOrIndex {
    fn from(key: &str) -> Self {
        KeyOrIndex::Key(key.to_string())
    }
}

impl From<String> for KeyOrIndex {
    fn from(key: String) -> Self {
        KeyOrIndex::Key(key)
    }
}

impl From<usize> for KeyOrIndex {
    fn from(index: usize) -> Self {
        KeyOrIndex::Index(index)
    }
}

/// A generic tree value.
///
/// Equality (`==`) is structural, see [`data_model_equals`].
#[derive(Debug, Clone)]
pub enum DataModel {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    List(Arc<ListNode>),
    Map(Arc<MapNode>),
}

impl DataModel {
    /// Build a new list. The list gets a fresh container identity.
    pub fn list(items: impl IntoIterator<Item = DataModel>) -> Self {
        DataModel::List(Arc::new(ListNode::new(items.into_iter().collect())))
    }

    /// Build a new map from `(key, value)` entries, in order.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, DataModel)>) -> Self {
        DataModel::Map(Arc::new(MapNode::new(
            entries
                .into_iter()
                .map(|(key, value)| MapEntry::new(Some(key.into()), value))
                .collect(),
        )))
    }

    /// Build a new map whose entries may carry no key.
    pub fn map_from_entries(entries: impl IntoIterator<Item = MapEntry>) -> Self {
        DataModel::Map(Arc::new(MapNode::new(entries.into_iter().collect())))
    }

    pub fn empty_list() -> Self {
        DataModel::list(std::iter::empty())
    }

    pub fn empty_map() -> Self {
        DataModel::map_from_entries(std::iter::empty())
    }

    /// Lower-case name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DataModel::Null => "null",
            DataModel::Integer(_) => "integer",
            DataModel::Float(_) => "float",
            DataModel::Boolean(_) => "boolean",
            DataModel::String(_) => "string",
            DataModel::List(_) => "list",
            DataModel::Map(_) => "map",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, DataModel::List(_) | DataModel::Map(_))
    }

    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            DataModel::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapNode> {
        match self {
            DataModel::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataModel::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataModel::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataModel::Integer(n) => Some(*n as f64),
            DataModel::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataModel::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Number of children of a container, `0` for scalars.
    pub fn len(&self) -> usize {
        match self {
            DataModel::List(list) => list.len(),
            DataModel::Map(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `self` and `other` are the same shared container.
    ///
    /// Scalars are never shared.
    pub fn ptr_eq(&self, other: &DataModel) -> bool {
        match (self, other) {
            (DataModel::List(a), DataModel::List(b)) => Arc::ptr_eq(a, b),
            (DataModel::Map(a), DataModel::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Text form for display purposes: strings unquoted, null empty,
    /// containers as compact JSON.
    pub fn to_display_string(&self) -> String {
        match self {
            DataModel::Null => String::new(),
            DataModel::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for DataModel {
    fn eq(&self, other: &Self) -> bool {
        data_model_equals(self, other)
    }
}

impl fmt::Display for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", data_model_to_json(self))
    }
}

impl From<i64> for DataModel {
    fn from(n: i64) -> Self {
        DataModel::Integer(n)
    }
}

impl From<f64> for DataModel {
    fn from(f: f64) -> Self {
        DataModel::Float(f)
    }
}

impl From<bool> for DataModel {
    fn from(b: bool) -> Self {
        DataModel::Boolean(b)
    }
}

impl From<&str> for DataModel {
    fn from(s: &str) -> Self {
        DataModel::String(s.to_string())
    }
}

impl From<String> for DataModel {
    fn from(s: String) -> Self {
        DataModel::String(s)
    }
}

/// Ordered sequence of values.
#[derive(Debug, Clone)]
pub struct ListNode {
    id: ContainerId,
    items: Vec<DataModel>,
    slots: Vec<SlotId>,
    next_slot: SlotId,
}

impl ListNode {
    pub fn new(items: Vec<DataModel>) -> Self {
        let count = SlotId::try_from(items.len()).unwrap_or(SlotId::MAX);
        ListNode {
            id: ContainerId::fresh(),
            items,
            slots: (0..count).collect(),
            next_slot: count,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DataModel> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[DataModel] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DataModel> {
        self.items.iter()
    }

    /// A stable pointer to the item currently at `index`.
    pub fn pointer_at(&self, index: usize) -> Option<DataPointer> {
        self.slots.get(index).map(|slot| DataPointer {
            container: self.id,
            slot: *slot,
        })
    }

    /// Current position of the item `pointer` refers to.
    pub fn position_of(&self, pointer: &DataPointer) -> Option<usize> {
        if pointer.container != self.id {
            return None;
        }
        self.slots.iter().position(|slot| *slot == pointer.slot)
    }

    /// The forward component addressing the item at `index`.
    pub fn component_at(&self, index: usize) -> ForwardComponent {
        ForwardComponent::Index(index)
    }

    pub(crate) fn with_item(&self, index: usize, value: DataModel) -> ListNode {
        let mut next = self.clone();
        next.items[index] = value;
        next
    }

    pub(crate) fn with_pushed(&self, value: DataModel) -> ListNode {
        let mut next = self.clone();
        next.items.push(value);
        next.slots.push(next.next_slot);
        next.next_slot += 1;
        next
    }

    pub(crate) fn without(&self, index: usize) -> ListNode {
        let mut next = self.clone();
        next.items.remove(index);
        next.slots.remove(index);
        next
    }
}

/// One entry of a [`MapNode`]. A `None` key marks an entry that was pushed
/// and has not been keyed yet.
#[derive(Debug, Clone)]
pub struct MapEntry {
    pub key: Option<String>,
    pub value: DataModel,
}

impl MapEntry {
    pub fn new(key: Option<String>, value: DataModel) -> Self {
        MapEntry { key, value }
    }

    pub fn keyed(key: impl Into<String>, value: DataModel) -> Self {
        MapEntry {
            key: Some(key.into()),
            value,
        }
    }
}

/// Ordered sequence of `(key, value)` entries. Keys may repeat.
#[derive(Debug, Clone)]
pub struct MapNode {
    id: ContainerId,
    entries: Vec<MapEntry>,
    slots: Vec<SlotId>,
    next_slot: SlotId,
}

impl MapNode {
    pub fn new(entries: Vec<MapEntry>) -> Self {
        let count = SlotId::try_from(entries.len()).unwrap_or(SlotId::MAX);
        MapNode {
            id: ContainerId::fresh(),
            entries,
            slots: (0..count).collect(),
            next_slot: count,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every raw entry, in order, duplicates and unkeyed entries included.
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&MapEntry> {
        self.entries.get(index)
    }

    /// Position of the first entry stored under `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.key.as_deref() == Some(key))
    }

    /// Value of the first entry stored under `key`.
    pub fn get(&self, key: &str) -> Option<&DataModel> {
        self.position(key).map(|index| &self.entries[index].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Whether the entry at `index` is the one a lookup by its key finds.
    pub fn is_first_occurrence(&self, index: usize) -> bool {
        match self.entries.get(index).and_then(|entry| entry.key.as_deref()) {
            Some(key) => self.position(key) == Some(index),
            None => false,
        }
    }

    /// The logical key/value view: first occurrence of each key, unkeyed
    /// entries dropped.
    pub fn logical_entries(&self) -> impl Iterator<Item = (&str, &DataModel)> + '_ {
        let mut seen = HashSet::new();
        self.entries.iter().filter_map(move |entry| {
            let key = entry.key.as_deref()?;
            seen.insert(key).then_some((key, &entry.value))
        })
    }

    pub fn pointer_at(&self, index: usize) -> Option<DataPointer> {
        self.slots.get(index).map(|slot| DataPointer {
            container: self.id,
            slot: *slot,
        })
    }

    pub fn position_of(&self, pointer: &DataPointer) -> Option<usize> {
        if pointer.container != self.id {
            return None;
        }
        self.slots.iter().position(|slot| *slot == pointer.slot)
    }

    /// The forward component addressing the entry at `index`.
    ///
    /// A key lookup only reaches the first entry with that key, so later
    /// duplicates and unkeyed entries are addressed by pointer.
    pub fn component_at(&self, index: usize) -> Option<ForwardComponent> {
        let entry = self.entries.get(index)?;
        match &entry.key {
            Some(key) if self.is_first_occurrence(index) => Some(ForwardComponent::Key(key.clone())),
            _ => self.pointer_at(index).map(ForwardComponent::Pointer),
        }
    }

    pub(crate) fn with_value(&self, index: usize, value: DataModel) -> MapNode {
        let mut next = self.clone();
        next.entries[index].value = value;
        next
    }

    pub(crate) fn with_key(&self, index: usize, key: String) -> MapNode {
        let mut next = self.clone();
        next.entries[index].key = Some(key);
        next
    }

    pub(crate) fn with_pushed(&self, key: Option<String>, value: DataModel) -> MapNode {
        let mut next = self.clone();
        next.entries.push(MapEntry { key, value });
        next.slots.push(next.next_slot);
        next.next_slot += 1;
        next
    }

    pub(crate) fn without(&self, index: usize) -> MapNode {
        let mut next = self.clone();
        next.entries.remove(index);
        next.slots.remove(index);
        next
    }
}
