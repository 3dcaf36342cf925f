//! Corpus storage: content records as JSON or YAML files on disk.
//!
//! A file holds either one record or an array of records. Files are read in
//! sorted path order so that rebuilding from the same directory is
//! deterministic.
//!
//! # Layout
//!
//! ```text
//! <corpus>/
//! ├── conditions/
//! │   ├── sinusitis.json        # one record
//! │   └── ent.yaml              # or a list of records
//! └── concepts/
//!     └── anchoring-bias.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

use crate::domain::ContentRecord;

/// Default glob patterns, relative to the corpus root
pub const DEFAULT_PATTERNS: [&str; 3] = ["**/*.json", "**/*.yaml", "**/*.yml"];

/// A record and the file it came from
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    pub source: PathBuf,
    pub record: ContentRecord,
}

/// A file that could not be read or parsed
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of loading a corpus directory
#[derive(Debug, Clone, Default)]
pub struct CorpusLoad {
    pub records: Vec<LoadedRecord>,
    pub failures: Vec<LoadFailure>,
    pub files_read: usize,
}

impl CorpusLoad {
    /// Just the records, in load order
    pub fn into_records(self) -> Vec<ContentRecord> {
        self.records.into_iter().map(|l| l.record).collect()
    }
}

/// Directory-backed record source
#[derive(Debug, Clone)]
pub struct CorpusStore {
    root: PathBuf,
    patterns: Vec<String>,
}

impl CorpusStore {
    /// Store rooted at `root` with the default patterns
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Replace the file patterns
    pub fn with_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// All matching files, sorted and deduplicated
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for pattern in &self.patterns {
            let full = self.root.join(pattern);
            let full = full.to_string_lossy();
            let paths = glob::glob(&full)
                .with_context(|| format!("Invalid corpus pattern: {}", pattern))?;

            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Unreadable corpus path: {}", e),
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Load every record under the root. Bad files are collected, not fatal.
    pub async fn load(&self) -> Result<CorpusLoad> {
        if !self.root.exists() {
            anyhow::bail!("Corpus directory does not exist: {}", self.root.display());
        }

        let mut load = CorpusLoad::default();

        for path in self.discover()? {
            load.files_read += 1;
            match load_file(&path).await {
                Ok(records) => {
                    tracing::debug!(path = %path.display(), count = records.len(), "Loaded corpus file");
                    load.records.extend(records.into_iter().map(|record| LoadedRecord {
                        source: path.clone(),
                        record,
                    }));
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {:#}", path.display(), e);
                    load.failures.push(LoadFailure {
                        path,
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        tracing::info!(
            files = load.files_read,
            records = load.records.len(),
            failures = load.failures.len(),
            "Corpus loaded"
        );
        Ok(load)
    }
}

/// Read one file holding a record or a list of records
pub async fn load_file(path: &Path) -> Result<Vec<ContentRecord>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read content file: {}", path.display()))?;

    if is_yaml(path) {
        parse_yaml(&content).with_context(|| format!("Failed to parse YAML: {}", path.display()))
    } else {
        parse_json(&content).with_context(|| format!("Failed to parse JSON: {}", path.display()))
    }
}

// The shape is decided up front so a parse error names the offending field
// instead of "did not match any variant".
fn parse_json(content: &str) -> Result<Vec<ContentRecord>> {
    if content.trim_start().starts_with('[') {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(vec![serde_json::from_str(content)?])
    }
}

fn parse_yaml(content: &str) -> Result<Vec<ContentRecord>> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    if value.is_sequence() {
        Ok(serde_yaml::from_value(value)?)
    } else {
        Ok(vec![serde_yaml::from_value(value)?])
    }
}

/// Write a single record as pretty JSON (or YAML, by extension)
pub async fn save_record(path: &Path, record: &ContentRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = if is_yaml(path) {
        serde_yaml::to_string(record)?
    } else {
        serde_json::to_string_pretty(record)?
    };

    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write content file: {}", path.display()))?;

    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentType;
    use tempfile::TempDir;

    #[test]
    fn test_is_yaml() {
        assert!(is_yaml(Path::new("a/b.yaml")));
        assert!(is_yaml(Path::new("b.YML")));
        assert!(!is_yaml(Path::new("b.json")));
    }

    #[test]
    fn test_parse_levels_from_json_and_yaml() {
        let json = r#"{"id": "a", "levels": {"1": {"level": 1, "summary": "s", "explanation": "e"}}}"#;
        let yaml = "- id: a\n  levels:\n    1:\n      level: 1\n      summary: s\n      explanation: e\n";

        let from_json = parse_json(json).unwrap();
        let from_yaml = parse_yaml(yaml).unwrap();

        assert_eq!(from_json.len(), 1);
        assert_eq!(from_json, from_yaml);
        assert!(from_json[0].levels.unexpected().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_single_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("topics").join("anchoring.json");
        let record = ContentRecord::new("concept-anchoring", "Anchoring Bias", ContentType::Concept);

        save_record(&path, &record).await.unwrap();
        let loaded = load_file(&path).await.unwrap();

        assert_eq!(loaded, vec![record]);
    }

    #[tokio::test]
    async fn test_load_collects_failures() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("good.json"), r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        std::fs::write(temp.path().join("bad.json"), "{ not json").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let load = CorpusStore::new(temp.path()).load().await.unwrap();

        assert_eq!(load.files_read, 2);
        assert_eq!(load.failures.len(), 1);
        assert!(load.failures[0].path.ends_with("bad.json"));
        let ids: Vec<String> = load.into_records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_load_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let store = CorpusStore::new(temp.path().join("nope"));
        assert!(store.load().await.is_err());
    }
}
