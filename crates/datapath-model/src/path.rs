//! Forward paths: pure descent from a tree value to one of its descendants.

use std::fmt;

use crate::types::{DataPointer, KeyOrIndex};

/// One descent step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForwardComponent {
    /// Map key. Only addresses maps.
    Key(String),
    /// List index. Only addresses lists.
    Index(usize),
    /// A key or an index, disambiguated by the container it is applied to.
    IndexOrKey(KeyOrIndex),
    /// Stable slot reference, see [`DataPointer`].
    Pointer(DataPointer),
}

impl ForwardComponent {
    pub fn key(key: impl Into<String>) -> Self {
        ForwardComponent::Key(key.into())
    }

    /// Interpret a bare word: canonical integers (`0`, `12`, not `012`)
    /// become indices, anything else a key. Both stay ambiguous until
    /// applied to a container, where an index on a map is looked up by its
    /// decimal text.
    pub fn word(word: &str) -> Self {
        match word.parse::<usize>() {
            Ok(index) if is_index_word(word) => ForwardComponent::IndexOrKey(KeyOrIndex::Index(index)),
            _ => ForwardComponent::IndexOrKey(KeyOrIndex::Key(word.to_string())),
        }
    }
}

fn is_index_word(word: &str) -> bool {
    !word.is_empty()
        && word.bytes().all(|b| b.is_ascii_digit())
        && (word == "0" || !word.starts_with('0'))
}

impl From<KeyOrIndex> for ForwardComponent {
    fn from(key: KeyOrIndex) -> Self {
        match key {
            KeyOrIndex::Key(key) => ForwardComponent::Key(key),
            KeyOrIndex::Index(index) => ForwardComponent::Index(index),
        }
    }
}

impl fmt::Display for ForwardComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardComponent::Key(key) | ForwardComponent::IndexOrKey(KeyOrIndex::Key(key)) => {
                write_word(f, key)
            }
            ForwardComponent::Index(index)
            | ForwardComponent::IndexOrKey(KeyOrIndex::Index(index)) => write!(f, "{index}"),
            ForwardComponent::Pointer(pointer) => write!(f, "{pointer}"),
        }
    }
}

/// Write a key, quoting it when it would not read back as the same key.
pub fn write_word(f: &mut impl fmt::Write, word: &str) -> fmt::Result {
    if needs_quotes(word) {
        f.write_char('"')?;
        for ch in word.chars() {
            match ch {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\t' => f.write_str("\\t")?,
                _ => f.write_char(ch)?,
            }
        }
        f.write_char('"')
    } else {
        f.write_str(word)
    }
}

fn needs_quotes(word: &str) -> bool {
    word.is_empty()
        || is_index_word(word)
        || word.starts_with("..")
        || word.starts_with('$')
        || word.starts_with('@')
        || word
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '/' | '*' | '[' | ']' | '{' | '}' | ',' | '"' | '\\'))
}

/// A sequence of descent steps from some tree value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ForwardPath {
    components: Vec<ForwardComponent>,
}

impl ForwardPath {
    /// The empty path, addressing the value it is applied to.
    pub fn root() -> Self {
        ForwardPath::default()
    }

    pub fn new(components: Vec<ForwardComponent>) -> Self {
        ForwardPath { components }
    }

    /// Build a path from bare words, see [`ForwardComponent::word`].
    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        words.into_iter().map(ForwardComponent::word).collect()
    }

    pub fn components(&self) -> &[ForwardComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn last(&self) -> Option<&ForwardComponent> {
        self.components.last()
    }

    pub fn push(&mut self, component: ForwardComponent) {
        self.components.push(component);
    }

    pub fn pop(&mut self) -> Option<ForwardComponent> {
        self.components.pop()
    }

    /// A copy of this path extended by `component`.
    pub fn with(&self, component: ForwardComponent) -> Self {
        let mut next = self.clone();
        next.push(component);
        next
    }

    /// A copy of this path with the last `count` components removed, or
    /// `None` when the path is shorter than `count`.
    pub fn popped(&self, count: usize) -> Option<Self> {
        let len = self.components.len().checked_sub(count)?;
        Some(ForwardPath::new(self.components[..len].to_vec()))
    }

    pub fn parent(&self) -> Option<Self> {
        self.popped(1)
    }

    /// Whether `self` is a strict prefix of `other`.
    pub fn is_parent_of(&self, other: &ForwardPath) -> bool {
        self.len() < other.len() && other.components[..self.len()] == self.components[..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForwardComponent> {
        self.components.iter()
    }
}

impl FromIterator<ForwardComponent> for ForwardPath {
    fn from_iter<T: IntoIterator<Item = ForwardComponent>>(iter: T) -> Self {
        ForwardPath::new(iter.into_iter().collect())
    }
}

impl From<Vec<ForwardComponent>> for ForwardPath {
    fn from(components: Vec<ForwardComponent>) -> Self {
        ForwardPath::new(components)
    }
}

impl<'a> IntoIterator for &'a ForwardPath {
    type Item = &'a ForwardComponent;
    type IntoIter = std::slice::Iter<'a, ForwardComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

/// Rendered as an absolute path, e.g. `/users/0/name`; the root is `/`.
impl fmt::Display for ForwardPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}
