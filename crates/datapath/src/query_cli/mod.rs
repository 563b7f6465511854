//! `datapath-query`: run a multi-path over a JSON document.
//!
//! Provides the logic behind the binary entry point. Each match becomes one
//! line of compact JSON: `{"path": "/a/0", "value": ...}`.

use std::path::{Path, PathBuf};

use clap::Parser;
use datapath_model::{data_model_to_json, unknown_to_data_model, ForwardPath};
use datapath_path::{DataModelCollector, DataPathParser, MultiPath, PathError};
use datapath_schema::{build_schema, DirSource, SchemaContext, SchemaError};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("not a schema file: {}", .0.display())]
    SchemaFile(PathBuf),
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Parser)]
#[command(name = "datapath-query")]
#[command(version, about = "Collect the nodes a DataPath matches in a JSON document read from stdin", long_about = None)]
pub struct QueryArgs {
    /// Multi-path to evaluate, e.g. `items/*/name`
    pub path: String,

    /// Absolute data path relative queries start from
    #[arg(long)]
    pub origin: Option<String>,

    /// Schema file enabling context keys
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Run the query in `args` over `doc_json` and return one output line per
/// match.
pub fn run_query(doc_json: &str, args: &QueryArgs) -> Result<Vec<String>, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let path: MultiPath = DataPathParser::parse(&args.path).map_err(PathError::from)?;
    let origin = match &args.origin {
        Some(origin) => DataPathParser::parse_forward(origin)?,
        None => ForwardPath::root(),
    };

    let mut collector = DataModelCollector::new(unknown_to_data_model(&doc)).with_origin(origin);
    if let Some(file) = &args.schema {
        collector = collector.with_schema(load_schema(file)?);
    }

    let lines = collector
        .collect(&path)
        .into_iter()
        .map(|hit| {
            json!({
                "path": hit.path.to_string(),
                "value": data_model_to_json(&hit.value),
            })
            .to_string()
        })
        .collect::<Vec<_>>();
    tracing::debug!(path = %path, matches = lines.len(), "query finished");
    Ok(lines)
}

fn load_schema(file: &Path) -> Result<SchemaContext, CliError> {
    let dir = file.parent().unwrap_or_else(|| Path::new("."));
    let name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::SchemaFile(file.to_path_buf()))?;
    let schema = build_schema(&DirSource::new(dir), name)?;
    Ok(SchemaContext::new(schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(doc: &str, path: &str) -> Result<Vec<String>, CliError> {
        run_query(
            doc,
            &QueryArgs {
                path: path.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn parse_args() {
        let parsed = QueryArgs::try_parse_from([
            "datapath-query",
            "a/*",
            "--origin",
            "/x/0",
            "--schema",
            "s.json",
        ])
        .unwrap();
        assert_eq!(parsed.path, "a/*");
        assert_eq!(parsed.origin.as_deref(), Some("/x/0"));
        assert_eq!(parsed.schema, Some(PathBuf::from("s.json")));

        let bare = QueryArgs::try_parse_from(["datapath-query", "a"]).unwrap();
        assert_eq!(bare.origin, None);
        assert_eq!(bare.schema, None);

        assert!(QueryArgs::try_parse_from(["datapath-query"]).is_err());
        assert!(QueryArgs::try_parse_from(["datapath-query", "a", "b"]).is_err());
        assert!(QueryArgs::try_parse_from(["datapath-query", "a", "--origin"]).is_err());
        assert!(QueryArgs::try_parse_from(["datapath-query", "a", "--depth", "2"]).is_err());
    }

    #[test]
    fn prints_one_line_per_match() {
        let out = query(r#"{"a": [1, {"b": true}]}"#, "a/*").unwrap();
        assert_eq!(
            out,
            vec![
                r#"{"path":"/a/0","value":1}"#.to_string(),
                r#"{"path":"/a/1","value":{"b":true}}"#.to_string(),
            ]
        );
    }

    #[test]
    fn root_query() {
        assert_eq!(query("[]", "").unwrap(), vec![r#"{"path":"/","value":[]}"#.to_string()]);
    }

    #[test]
    fn relative_to_origin() {
        let out = run_query(
            r#"{"a": {"b": 1, "c": 2}}"#,
            &QueryArgs {
                path: "../c".into(),
                origin: Some("/a/b".into()),
                schema: None,
            },
        )
        .unwrap();
        assert_eq!(out, vec![r#"{"path":"/a/c","value":2}"#.to_string()]);
    }

    #[test]
    fn errors() {
        assert!(matches!(query("{", "a"), Err(CliError::Json(_))));
        assert!(matches!(query("{}", "a//b"), Err(CliError::Path(PathError::Syntax(_)))));
        let bad_origin = run_query(
            "{}",
            &QueryArgs {
                path: "a".into(),
                origin: Some("a/*".into()),
                schema: None,
            },
        );
        assert!(matches!(
            bad_origin,
            Err(CliError::Path(PathError::IllegalComponent { .. }))
        ));
    }
}
