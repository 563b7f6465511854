use datapath_model::{
    delete_at, get, push_at, rename_key_at, set_at, DataModel, DataModelOperationError,
    ForwardPath,
};
use datapath_schema::SchemaContext;

use crate::collect::{Collected, DataModelCollector};
use crate::types::MultiPath;

/// Owns the current root of a tree and applies edits to it.
///
/// Every successful edit replaces the root with the derived tree; earlier
/// roots handed out by [`DataModelManager::root`] stay valid and unchanged.
/// The edit methods return `Ok(true)` when the tree changed.
#[derive(Debug, Clone)]
pub struct DataModelManager {
    root: DataModel,
    schema: Option<SchemaContext>,
}

impl DataModelManager {
    pub fn new(root: DataModel) -> Self {
        Self { root, schema: None }
    }

    pub fn with_schema(mut self, schema: SchemaContext) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn root(&self) -> &DataModel {
        &self.root
    }

    pub fn schema(&self) -> Option<&SchemaContext> {
        self.schema.as_ref()
    }

    /// Schema context of the node at `path`.
    pub fn schema_at(&self, path: &ForwardPath) -> Option<SchemaContext> {
        self.schema.as_ref()?.descend_path(&self.root, path)
    }

    pub fn get(&self, path: &ForwardPath) -> Option<&DataModel> {
        get(&self.root, path)
    }

    pub fn set(&mut self, path: &ForwardPath, value: DataModel) -> Result<bool, DataModelOperationError> {
        let next = set_at(&self.root, path, value)?;
        Ok(self.replace(next))
    }

    pub fn push(&mut self, path: &ForwardPath, value: DataModel) -> Result<bool, DataModelOperationError> {
        let next = push_at(&self.root, path, value)?;
        Ok(self.replace(next))
    }

    pub fn delete(&mut self, path: &ForwardPath) -> Result<bool, DataModelOperationError> {
        let next = delete_at(&self.root, path)?;
        Ok(self.replace(next))
    }

    pub fn rename_key(&mut self, path: &ForwardPath, key: &str) -> Result<bool, DataModelOperationError> {
        let next = rename_key_at(&self.root, path, key)?;
        Ok(self.replace(next))
    }

    /// A collector over the current root with its origin at `origin`.
    pub fn collector(&self, origin: &ForwardPath) -> DataModelCollector {
        let collector = DataModelCollector::new(self.root.clone()).with_origin(origin.clone());
        match &self.schema {
            Some(schema) => collector.with_schema(schema.clone()),
            None => collector,
        }
    }

    pub fn collect(&self, origin: &ForwardPath, path: &MultiPath) -> Vec<Collected> {
        self.collector(origin).collect(path)
    }

    /// The first match of `path`.
    pub fn resolve(&self, origin: &ForwardPath, path: &MultiPath) -> Option<Collected> {
        self.collector(origin).first(path)
    }

    /// Write `value` at every node `path` matches and return how many nodes
    /// changed.
    ///
    /// For a `$key` path each matched map entry is renamed to `value`, which
    /// must then be a string; list items and non-string values are skipped.
    ///
    /// The writes apply in match order to a working copy; the root is only
    /// replaced once all of them succeed, so an error leaves it untouched.
    pub fn set_all(
        &mut self,
        origin: &ForwardPath,
        path: &MultiPath,
        value: DataModel,
    ) -> Result<usize, DataModelOperationError> {
        let targets = self.collect(origin, path);
        let rename = path.ends_with_key();
        let mut working = self.root.clone();
        let mut changed = 0;
        for target in targets {
            let next = if rename {
                match (value.as_str(), target.value.as_str()) {
                    (Some(key), Some(_)) => rename_key_at(&working, &target.path, key)?,
                    _ => None,
                }
            } else {
                set_at(&working, &target.path, value.clone())?
            };
            if let Some(next) = next {
                working = next;
                changed += 1;
            }
        }
        tracing::debug!(%path, changed, "set_all");
        self.replace((changed > 0).then_some(working));
        Ok(changed)
    }

    fn replace(&mut self, next: Option<DataModel>) -> bool {
        match next {
            Some(next) => {
                self.root = next;
                true
            }
            None => false,
        }
    }
}
