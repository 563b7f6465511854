//! DataPath syntax tree.

use std::fmt;

use datapath_model::{write_word, ForwardComponent, ForwardPath};

use crate::PathError;

/// One segment of a [`MultiPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// Plain descent: `name`, `0`, `"quoted"`, `@12.3`.
    Forward(ForwardComponent),
    /// `$key`: the key the current value is stored under. Always last.
    Key,
    /// `*`, `prefix*` or `*suffix`. The affixes are kept for printing only;
    /// every entry matches.
    Wildcard(String),
    /// `..`: one level up.
    Reverse,
    /// `..name`: up to the entry below the nearest ancestor whose schema
    /// declares the context key `name`.
    ContextKey(String),
    /// `[path]`: evaluate `path` from the query origin and descend by each
    /// key or index it yields.
    Nested(Box<MultiPath>),
    /// `{a,b}`: evaluate the rest of the path once per alternative.
    Union(Vec<PathComponent>),
}

impl PathComponent {
    pub fn word(word: &str) -> Self {
        PathComponent::Forward(ForwardComponent::word(word))
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, PathComponent::Forward(_))
    }

    /// Whether nothing may follow this component.
    pub fn is_terminal(&self) -> bool {
        match self {
            PathComponent::Key => true,
            PathComponent::Union(alternatives) => alternatives.iter().any(Self::is_terminal),
            _ => false,
        }
    }
}

impl From<ForwardComponent> for PathComponent {
    fn from(component: ForwardComponent) -> Self {
        PathComponent::Forward(component)
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathComponent::Forward(component) => write!(f, "{component}"),
            PathComponent::Key => f.write_str("$key"),
            PathComponent::Wildcard(pattern) => f.write_str(pattern),
            PathComponent::Reverse => f.write_str(".."),
            PathComponent::ContextKey(name) => {
                f.write_str("..")?;
                write_word(f, name)
            }
            PathComponent::Nested(path) => write!(f, "[{path}]"),
            PathComponent::Union(alternatives) => {
                f.write_str("{")?;
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{alternative}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A parsed DataPath query.
///
/// Absolute paths start at the root of the tree, relative ones at the
/// position the query is evaluated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MultiPath {
    absolute: bool,
    components: Vec<PathComponent>,
}

impl MultiPath {
    /// The empty relative path.
    pub fn relative() -> Self {
        MultiPath::default()
    }

    /// The empty absolute path.
    pub fn absolute() -> Self {
        MultiPath {
            absolute: true,
            components: Vec::new(),
        }
    }

    /// Build a path, checking that `$key` only appears last.
    pub fn new(absolute: bool, components: Vec<PathComponent>) -> Result<Self, PathError> {
        let mut path = MultiPath {
            absolute,
            components: Vec::with_capacity(components.len()),
        };
        for component in components {
            path.push(component)?;
        }
        Ok(path)
    }

    pub fn from_forward(path: &ForwardPath, absolute: bool) -> Self {
        MultiPath {
            absolute,
            components: path.iter().cloned().map(PathComponent::Forward).collect(),
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Append a component. Nothing may follow `$key`.
    pub fn push(&mut self, component: PathComponent) -> Result<(), PathError> {
        if self.ends_with_key() {
            return Err(PathError::IllegalComponent {
                component: component.to_string(),
                reason: "nothing may follow $key",
            });
        }
        self.components.push(component);
        Ok(())
    }

    /// Whether the path yields keys rather than values.
    pub fn ends_with_key(&self) -> bool {
        self.components.last().is_some_and(PathComponent::is_terminal)
    }

    /// The path as pure descent, or the first component that is not one.
    pub fn to_forward(&self) -> Result<ForwardPath, PathError> {
        self.components
            .iter()
            .map(|component| match component {
                PathComponent::Forward(forward) => Ok(forward.clone()),
                other => Err(PathError::IllegalComponent {
                    component: other.to_string(),
                    reason: "a data path can only descend",
                }),
            })
            .collect()
    }
}

impl fmt::Display for MultiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        }
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}
