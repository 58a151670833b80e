//! Document loading.
//!
//! Every input is read as YAML, which also accepts JSON, into a
//! `serde_json::Value` with source key order kept.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::Parse` if it isn't valid YAML/JSON.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let value = serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded document");
    Ok(value)
}

/// Load a document from a YAML or JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidYaml` if the string doesn't parse.
pub fn load_document_str(content: &str) -> Result<Value, LoadError> {
    serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_document_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "openapi: 3.1.0\ninfo:\n  title: t").unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc["info"]["title"], "t");
    }

    #[test]
    fn load_document_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "object"}}"#).unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc["type"], "object");
    }

    #[test]
    fn load_document_file_not_found() {
        let result = load_document(Path::new("/nonexistent/path.yaml"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_document_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a: [1, 2").unwrap();

        let result = load_document(file.path());
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn load_document_str_keeps_key_order() {
        let doc = load_document_str("z: 1\na: 2\nm: 3").unwrap();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn load_document_str_invalid() {
        let result = load_document_str("key: {unclosed");
        assert!(matches!(result, Err(LoadError::InvalidYaml { .. })));
    }
}
