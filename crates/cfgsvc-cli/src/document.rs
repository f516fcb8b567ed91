//! Local document input and JSON output helpers shared by subcommands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;

use cfgsvc_client::ConfigDocument;

/// Read a JSON object from `path`.
pub fn read_document(path: &Path) -> Result<ConfigDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("{} does not contain a JSON object", path.display()),
    }
}

/// Parse a `key=value` assignment. The value is read as JSON when it parses,
/// otherwise taken as a plain string, so `mode=night` and `mode="night"` agree.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected KEY=VALUE, got `{raw}`");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in `{raw}`");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Collect `--set` assignments into a document; later keys win.
pub fn assignments_to_document(assignments: &[String]) -> Result<ConfigDocument> {
    let mut doc = ConfigDocument::new();
    for raw in assignments {
        let (key, value) = parse_assignment(raw)?;
        doc.insert(key, value);
    }
    Ok(doc)
}

/// Print `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{text}");
    Ok(())
}

/// Print each validation error under a FAIL header.
pub fn print_failures(header: &str, errors: &[String]) {
    println!("FAIL: {header}");
    for error in errors {
        println!("  - {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn assignment_values_are_json_or_string() {
        assert_eq!(parse_assignment("brightness=80").unwrap(), ("brightness".into(), json!(80)));
        assert_eq!(parse_assignment("mode=night").unwrap(), ("mode".into(), json!("night")));
        assert_eq!(parse_assignment("mode=\"night\"").unwrap(), ("mode".into(), json!("night")));
        assert_eq!(parse_assignment("tags=[1,2]").unwrap(), ("tags".into(), json!([1, 2])));
        assert_eq!(parse_assignment("expr=a=b").unwrap(), ("expr".into(), json!("a=b")));
        assert_eq!(parse_assignment("empty=").unwrap(), ("empty".into(), json!("")));
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn later_assignments_win() {
        let doc = assignments_to_document(&["a=1".into(), "b=true".into(), "a=2".into()]).unwrap();
        assert_eq!(Value::Object(doc), json!({"a": 2, "b": true}));
    }

    #[test]
    fn read_document_requires_an_object() {
        let mut obj = tempfile::NamedTempFile::new().unwrap();
        write!(obj, r#"{{"brightness": 40}}"#).unwrap();
        assert_eq!(read_document(obj.path()).unwrap().get("brightness"), Some(&json!(40)));

        let mut arr = tempfile::NamedTempFile::new().unwrap();
        write!(arr, "[1, 2]").unwrap();
        assert!(read_document(arr.path()).is_err());

        let mut junk = tempfile::NamedTempFile::new().unwrap();
        write!(junk, "not json").unwrap();
        let err = read_document(junk.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse JSON"));
    }

    #[test]
    fn read_document_reports_missing_file() {
        let err = read_document(Path::new("/nonexistent/cfgsvc.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read file"));
    }
}
