use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use crate::SchemaError;

/// Where schema files come from.
///
/// Paths are `/`-separated and relative to the source root, already
/// normalized (no `.` or `..` segments).
pub trait SchemaSource {
    fn load(&self, path: &str) -> Result<String, SchemaError>;
}

/// Schema files held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl SchemaSource for MemorySource {
    fn load(&self, path: &str) -> Result<String, SchemaError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SchemaError::NotFound {
                path: path.to_string(),
            })
    }
}

/// Schema files below a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SchemaSource for DirSource {
    fn load(&self, path: &str) -> Result<String, SchemaError> {
        let full = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment));
        std::fs::read_to_string(&full).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SchemaError::NotFound {
                path: path.to_string(),
            },
            _ => SchemaError::Io {
                path: path.to_string(),
                message: err.to_string(),
            },
        })
    }
}

/// Resolve `reference` against the directory of the file `from`.
///
/// A leading `/` makes the reference relative to the source root. `.` and
/// `..` segments are folded; climbing above the root is an error.
pub fn resolve_reference(from: &str, reference: &str) -> Result<String, SchemaError> {
    let mut segments: Vec<&str> = Vec::new();
    if !reference.starts_with('/') {
        segments.extend(from.split('/').filter(|s| !s.is_empty()));
        segments.pop();
    }
    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(SchemaError::BadReference {
                        from: from.to_string(),
                        reference: reference.to_string(),
                    });
                }
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(SchemaError::BadReference {
            from: from.to_string(),
            reference: reference.to_string(),
        });
    }
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_resolve_against_the_referencing_file() {
        assert_eq!(resolve_reference("main.json", "row.json").unwrap(), "row.json");
        assert_eq!(
            resolve_reference("pages/main.json", "./row.json").unwrap(),
            "pages/row.json"
        );
        assert_eq!(
            resolve_reference("pages/main.json", "../shared/cell.json").unwrap(),
            "shared/cell.json"
        );
        assert_eq!(
            resolve_reference("pages/deep/main.json", "/top.json").unwrap(),
            "top.json"
        );
    }

    #[test]
    fn references_cannot_escape_the_root() {
        assert!(matches!(
            resolve_reference("main.json", "../outside.json"),
            Err(SchemaError::BadReference { .. })
        ));
        assert!(resolve_reference("a/main.json", "..").is_err());
    }

    #[test]
    fn memory_source_reports_missing_files() {
        let source = MemorySource::new().with("a.json", "{}");
        assert_eq!(source.load("a.json").unwrap(), "{}");
        assert_eq!(
            source.load("b.json"),
            Err(SchemaError::NotFound { path: "b.json".into() })
        );
    }
}
