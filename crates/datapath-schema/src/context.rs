use std::sync::Arc;

use datapath_model::{step, DataModel, ForwardComponent, ForwardPath, KeyOrIndex};

use crate::schema::DataSchema;
use crate::SchemaError;

/// A position inside a schema tree.
///
/// Holds the root schema, the node at the current position and the stack of
/// ancestors that led to it. Descending never mutates a context; each child
/// method returns a new one. [`DataSchema::Recursive`] children are replaced
/// by the ancestor they name, so [`SchemaContext::schema`] is never recursive.
#[derive(Debug, Clone)]
pub struct SchemaContext {
    root: Arc<DataSchema>,
    node: Arc<DataSchema>,
    ancestors: Vec<Arc<DataSchema>>,
}

impl SchemaContext {
    /// Context at the root of `root`, after validating its recursive nodes.
    pub fn new(root: Arc<DataSchema>) -> Result<Self, SchemaError> {
        root.validate()?;
        Ok(Self {
            node: Arc::clone(&root),
            root,
            ancestors: Vec::new(),
        })
    }

    pub fn root(&self) -> &Arc<DataSchema> {
        &self.root
    }

    /// The schema node at the current position.
    pub fn schema(&self) -> &Arc<DataSchema> {
        &self.node
    }

    /// Number of descents from the root.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Ancestor nodes, root first.
    pub fn ancestors(&self) -> &[Arc<DataSchema>] {
        &self.ancestors
    }

    /// Context for an item of the current list. `Any` yields `Any`.
    pub fn list_child(&self) -> Option<Self> {
        match &*self.node {
            DataSchema::List(list) => self.descend(&list.item),
            DataSchema::Any => self.descend_any(),
            _ => None,
        }
    }

    /// Context for a value of the current map. `Any` yields `Any`.
    pub fn map_child(&self) -> Option<Self> {
        match &*self.node {
            DataSchema::Map(map) => self.descend(&map.item),
            DataSchema::Any => self.descend_any(),
            _ => None,
        }
    }

    /// Context for the field `key` of the current fixed map.
    pub fn fixed_map_child(&self, key: &str) -> Option<Self> {
        match &*self.node {
            DataSchema::FixedMap(fixed) => self.descend(&fixed.field(key)?.schema),
            DataSchema::Any => self.descend_any(),
            _ => None,
        }
    }

    /// Context for the child `component` addresses.
    ///
    /// `data` is the container at the current position. It is only consulted
    /// to find the key of a pointer into a fixed map.
    pub fn child_for(&self, component: &ForwardComponent, data: Option<&DataModel>) -> Option<Self> {
        match &*self.node {
            DataSchema::Any => self.descend_any(),
            DataSchema::List(_) => match component {
                ForwardComponent::Index(_)
                | ForwardComponent::IndexOrKey(KeyOrIndex::Index(_))
                | ForwardComponent::Pointer(_) => self.list_child(),
                _ => None,
            },
            DataSchema::Map(_) => match component {
                ForwardComponent::Index(_) => None,
                _ => self.map_child(),
            },
            DataSchema::FixedMap(_) => match component {
                ForwardComponent::Key(key)
                | ForwardComponent::IndexOrKey(KeyOrIndex::Key(key)) => self.fixed_map_child(key),
                ForwardComponent::IndexOrKey(KeyOrIndex::Index(index)) => {
                    self.fixed_map_child(&index.to_string())
                }
                ForwardComponent::Pointer(pointer) => {
                    let map = data?.as_map()?;
                    let entry = map.entry(map.position_of(pointer)?)?;
                    self.fixed_map_child(entry.key.as_deref()?)
                }
                ForwardComponent::Index(_) => None,
            },
            _ => None,
        }
    }

    /// Follow `path` from this position, using `model` (the value at this
    /// position) to resolve pointers. Stops with `None` where either the
    /// schema or the data has no child.
    pub fn descend_path(&self, model: &DataModel, path: &ForwardPath) -> Option<Self> {
        let mut context = self.clone();
        let mut current = model;
        for component in path {
            let next = step(current, component)?;
            context = context.child_for(component, Some(current))?;
            current = next.value;
        }
        Some(context)
    }

    /// The ancestor `depth` levels above the current position (1 = parent).
    pub fn resolve_recursive(&self, depth: usize) -> Result<Arc<DataSchema>, SchemaError> {
        let available = self.ancestors.len();
        if depth == 0 || depth > available {
            return Err(SchemaError::RecursiveDepth {
                location: "<context>".to_string(),
                depth,
                available,
            });
        }
        Ok(Arc::clone(&self.ancestors[available - depth]))
    }

    /// Levels to pop from the current position to stand on the child of the
    /// nearest ancestor declaring the context key `name`.
    pub fn context_key_depth(&self, name: &str) -> Option<usize> {
        self.context_keys()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, depth)| depth)
    }

    /// Every context key declared by an ancestor, nearest first, with the
    /// pop depth [`SchemaContext::context_key_depth`] would report. Shadowed
    /// names appear more than once.
    pub fn context_keys(&self) -> Vec<(String, usize)> {
        let depth = self.ancestors.len();
        self.ancestors
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(i, ancestor)| {
                let name = ancestor.context_key()?;
                Some((name.to_string(), depth - i - 1))
            })
            .collect()
    }

    fn descend(&self, child: &Arc<DataSchema>) -> Option<Self> {
        let mut ancestors = Vec::with_capacity(self.ancestors.len() + 1);
        ancestors.extend(self.ancestors.iter().cloned());
        ancestors.push(Arc::clone(&self.node));
        let mut next = Self {
            root: Arc::clone(&self.root),
            node: Arc::clone(child),
            ancestors,
        };
        if let DataSchema::Recursive { depth } = &**child {
            next.node = match next.resolve_recursive(*depth) {
                Ok(node) => node,
                Err(err) => {
                    tracing::debug!(%err, "unresolvable recursive schema node");
                    return None;
                }
            };
        }
        Some(next)
    }

    fn descend_any(&self) -> Option<Self> {
        self.descend(&Arc::new(DataSchema::Any))
    }
}
