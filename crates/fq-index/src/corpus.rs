//! Corpus loading.
//!
//! A corpus is a JSON file holding an array of records (or a single record), a JSON-lines
//! file with one record per line, or a directory walked recursively for such files.
//! Every record is a JSON object with a non-negative integer `id`.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use fq_query::DocumentId;
use serde_json::{Map, Value};
use tracing::debug;
use walkdir::WalkDir;

use crate::IndexError;

/// A document of the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Document identifier.
    pub id: DocumentId,
    /// All attributes of the record, `id` included.
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Builds a record from a JSON value. Returns `None` if it has no usable id.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(attributes) = value else {
            return None;
        };
        let id = attributes.get("id")?.as_u64()?;
        Some(Self { id, attributes })
    }

    /// Returns the text stored under `key`.
    ///
    /// Dotted keys (`source.title`) descend into nested objects. Arrays yield every
    /// element; numbers and booleans are rendered as text.
    pub fn texts(&self, key: &str) -> Vec<String> {
        let mut parts = key.split('.');
        let Some(first) = parts.next() else {
            return Vec::new();
        };
        let mut current = self.attributes.get(first);
        for part in parts {
            current = current.and_then(|v| v.get(part));
        }

        let mut out = Vec::new();
        if let Some(value) = current {
            collect_texts(value, &mut out);
        }
        out
    }
}

/// Appends the scalar text found in `value` to `out`.
fn collect_texts(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Array(items) => {
            for item in items {
                collect_texts(item, out);
            }
        }
        Value::Null | Value::Object(_) => {}
    }
}

/// Converts one parsed JSON value into a record.
fn to_record(value: Value, path: &Path, line: Option<usize>) -> Result<Record, IndexError> {
    Record::from_value(value).ok_or_else(|| IndexError::MissingId {
        path: path.to_path_buf(),
        line,
    })
}

/// Parses the contents of a JSON file: an array of records or a single record.
pub fn parse_json(content: &str, path: &Path) -> Result<Vec<Record>, IndexError> {
    let value: Value = serde_json::from_str(content).map_err(|source| IndexError::Json {
        path: path.to_path_buf(),
        line: None,
        source,
    })?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| to_record(item, path, None))
            .collect(),
        Value::Object(_) => Ok(vec![to_record(value, path, None)?]),
        _ => Err(IndexError::NotRecords {
            path: path.to_path_buf(),
        }),
    }
}

/// Parses the contents of a JSON-lines file. Blank lines are skipped.
pub fn parse_jsonl(content: &str, path: &Path) -> Result<Vec<Record>, IndexError> {
    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = Some(i + 1);
        let value: Value = serde_json::from_str(line).map_err(|source| IndexError::Json {
            path: path.to_path_buf(),
            line: line_no,
            source,
        })?;
        records.push(to_record(value, path, line_no)?);
    }
    Ok(records)
}

/// True for `.jsonl` files.
fn is_jsonl(path: &Path) -> bool {
    path.extension().and_then(OsStr::to_str) == Some("jsonl")
}

/// True for files a corpus directory walk picks up.
fn is_corpus_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("json" | "jsonl")
    )
}

/// Checks if a filename represents a hidden file (starts with '.').
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

/// Loads the records of a single corpus file.
pub fn load_file(path: &Path) -> Result<Vec<Record>, IndexError> {
    let content = fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = if is_jsonl(path) {
        parse_jsonl(&content, path)?
    } else {
        parse_json(&content, path)?
    };
    debug!(path = %path.display(), records = records.len(), "loaded corpus file");
    Ok(records)
}

/// Lists the corpus files below `dir`, sorted by path. Hidden entries are skipped.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>, IndexError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
    {
        let entry = entry.map_err(|e| IndexError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && is_corpus_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Loads a corpus from a file or a directory.
pub fn load_corpus(path: &Path) -> Result<Vec<Record>, IndexError> {
    let metadata = fs::metadata(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return load_file(path);
    }

    let mut records = Vec::new();
    for file in discover_files(path)? {
        records.extend(load_file(&file)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn record_requires_integer_id() {
        assert!(Record::from_value(json!({"title": "x"})).is_none());
        assert!(Record::from_value(json!({"id": "7"})).is_none());
        assert!(Record::from_value(json!({"id": -1})).is_none());
        assert!(Record::from_value(json!([1, 2])).is_none());
        assert_eq!(record(json!({"id": 7})).id, 7);
    }

    #[test]
    fn texts_of_scalars_and_arrays() {
        let r = record(json!({
            "id": 1,
            "title": "Deep Learning",
            "authors": ["Smith, J.", "Jones, K."],
            "year": 2020,
            "open": true,
            "missing": null
        }));
        assert_eq!(r.texts("title"), vec!["Deep Learning"]);
        assert_eq!(r.texts("authors"), vec!["Smith, J.", "Jones, K."]);
        assert_eq!(r.texts("year"), vec!["2020"]);
        assert_eq!(r.texts("open"), vec!["true"]);
        assert!(r.texts("missing").is_empty());
        assert!(r.texts("absent").is_empty());
    }

    #[test]
    fn texts_follow_dotted_keys() {
        let r = record(json!({"id": 1, "source": {"title": "Nature", "issue": 4}}));
        assert_eq!(r.texts("source.title"), vec!["Nature"]);
        assert_eq!(r.texts("source.issue"), vec!["4"]);
        assert!(r.texts("source.volume").is_empty());
        assert!(r.texts("source").is_empty());
    }

    #[test]
    fn parse_json_array_and_object() {
        let path = Path::new("corpus.json");
        let records = parse_json(r#"[{"id": 1}, {"id": 2}]"#, path).unwrap();
        assert_eq!(records.len(), 2);
        let single = parse_json(r#"{"id": 3}"#, path).unwrap();
        assert_eq!(single[0].id, 3);
    }

    #[test]
    fn parse_json_rejects_scalars() {
        let err = parse_json("42", Path::new("corpus.json")).unwrap_err();
        assert!(matches!(err, IndexError::NotRecords { .. }));
    }

    #[test]
    fn parse_json_reports_missing_id() {
        let err = parse_json(r#"[{"id": 1}, {"title": "x"}]"#, Path::new("c.json")).unwrap_err();
        assert!(matches!(err, IndexError::MissingId { line: None, .. }));
    }

    #[test]
    fn parse_jsonl_skips_blank_lines() {
        let content = "{\"id\": 1}\n\n{\"id\": 2}\n";
        let records = parse_jsonl(content, Path::new("c.jsonl")).unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn parse_jsonl_reports_line() {
        let content = "{\"id\": 1}\nnot json\n";
        let err = parse_jsonl(content, Path::new("c.jsonl")).unwrap_err();
        assert!(matches!(err, IndexError::Json { line: Some(2), .. }));
        assert!(err.to_string().contains("c.jsonl:2"));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id": 1}]"#).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.jsonl"), "{\"id\": 2}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden/c.json"), r#"[{"id": 3}]"#).unwrap();

        let records = load_corpus(dir.path()).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn load_missing_path() {
        let err = load_corpus(Path::new("/nonexistent/corpus.json")).unwrap_err();
        assert!(matches!(err, IndexError::Io { .. }));
    }
}
