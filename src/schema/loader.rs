//! Schema registry backed by a directory of form definitions
//!
//! - One JSON file per form: `<schema_dir>/<key>.json`
//! - Every file is integrity-checked before it becomes available
//! - An activated schema is never replaced in place

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::FormSchema;
use crate::observability::{log_event_with_fields, Event};

/// Loads form schemas from disk and keeps them in memory by key.
pub struct SchemaLoader {
    /// Directory containing schema files
    schema_dir: PathBuf,
    /// Activated schemas indexed by key
    schemas: HashMap<String, FormSchema>,
}

impl SchemaLoader {
    /// Creates a loader for the given schema directory.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            schemas: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `*.json` file in the schema directory.
    ///
    /// A missing directory is treated as empty. Any unreadable or
    /// invalid file aborts the load.
    pub fn load_all(&mut self) -> SchemaResult<usize> {
        if !self.schema_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }

        // Deterministic load order
        paths.sort();

        let mut loaded = 0;
        for path in &paths {
            self.load_schema_file(path)?;
            loaded += 1;
        }

        let count = loaded.to_string();
        let dir = self.schema_dir.display().to_string();
        log_event_with_fields(
            Event::SchemasLoaded,
            &[("count", count.as_str()), ("dir", dir.as_str())],
        );

        Ok(loaded)
    }

    /// Loads a single schema file, keyed by its file stem.
    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let display = path.display().to_string();

        let key = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SchemaError::malformed_schema(&display, "File name is not valid UTF-8"))?
            .to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(&display, format!("Failed to read file: {}", e))
        })?;

        let raw: Value = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed_schema(&display, format!("Invalid JSON: {}", e)))?;

        let schema = FormSchema::from_value(&raw).map_err(|e| e.with_key(&key))?;
        self.register(key, schema)
    }

    /// Activates a schema under `key`.
    ///
    /// Re-registering an existing key is rejected.
    pub fn register(&mut self, key: impl Into<String>, schema: FormSchema) -> SchemaResult<()> {
        let key = key.into();

        if self.schemas.contains_key(&key) {
            return Err(SchemaError::schema_immutable(key));
        }

        self.schemas.insert(key, schema);
        Ok(())
    }

    /// Gets a schema by key.
    pub fn get(&self, key: &str) -> Option<&FormSchema> {
        self.schemas.get(key)
    }

    /// Gets a schema by key, failing with FORM_UNKNOWN_SCHEMA.
    pub fn require(&self, key: &str) -> SchemaResult<&FormSchema> {
        self.get(key).ok_or_else(|| SchemaError::unknown_schema(key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.schemas.contains_key(key)
    }

    /// Returns all registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Writes a schema to `<schema_dir>/<key>.json`.
    ///
    /// Refuses to overwrite an existing file.
    pub fn save_schema(&self, key: &str, schema: &FormSchema) -> SchemaResult<PathBuf> {
        let path = self.schema_dir.join(format!("{}.json", key));

        if path.exists() {
            return Err(SchemaError::schema_immutable(key));
        }

        if !self.schema_dir.exists() {
            fs::create_dir_all(&self.schema_dir).map_err(|e| {
                SchemaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to create schema directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to serialize schema: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{FieldType, FormField};
    use tempfile::TempDir;

    fn sample_schema() -> FormSchema {
        FormSchema::new(
            "Visit report",
            vec![
                FormField::new("site", FieldType::Text, "Site").required(),
                FormField::new("visited_on", FieldType::Date, "Visited on"),
            ],
        )
    }

    #[test]
    fn test_register_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register("visit", sample_schema()).unwrap();

        let schema = loader.get("visit").unwrap();
        assert_eq!(schema.title, "Visit report");
        assert!(loader.exists("visit"));
    }

    #[test]
    fn test_schema_immutability() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SchemaLoader::new(temp_dir.path());

        loader.register("visit", sample_schema()).unwrap();

        let result = loader.register("visit", sample_schema());
        assert_eq!(result.unwrap_err().code().code(), "FORM_SCHEMA_IMMUTABLE");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path().join("schemas"));
        loader.save_schema("visit", &sample_schema()).unwrap();

        let mut loader2 = SchemaLoader::new(temp_dir.path().join("schemas"));
        assert_eq!(loader2.load_all().unwrap(), 1);
        assert_eq!(loader2.get("visit"), Some(&sample_schema()));
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let loader = SchemaLoader::new(temp_dir.path());
        loader.save_schema("visit", &sample_schema()).unwrap();

        let err = loader.save_schema("visit", &sample_schema()).unwrap_err();
        assert_eq!(err.code().code(), "FORM_SCHEMA_IMMUTABLE");
    }

    #[test]
    fn test_load_rejects_invalid_definition() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("broken.json"),
            r#"{"title": "", "fields": [{"id": "a", "type": "select", "label": "A"}]}"#,
        )
        .unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert_eq!(err.code().code(), "FORM_SCHEMA_INTEGRITY_FAILED");
        assert_eq!(err.key(), Some("broken"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.json"), "{ not json").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        let err = loader.load_all().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.message().contains("Invalid JSON"));
    }

    #[test]
    fn test_load_skips_other_files_and_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("README.txt"), "ignore me").unwrap();

        let mut loader = SchemaLoader::new(temp_dir.path());
        assert_eq!(loader.load_all().unwrap(), 0);

        let mut missing = SchemaLoader::new(temp_dir.path().join("nope"));
        assert_eq!(missing.load_all().unwrap(), 0);
    }

    #[test]
    fn test_require_unknown() {
        let loader = SchemaLoader::new("/nonexistent");
        let err = loader.require("ghost").unwrap_err();
        assert_eq!(err.code().code(), "FORM_UNKNOWN_SCHEMA");
        assert!(loader.keys().is_empty());
    }
}
