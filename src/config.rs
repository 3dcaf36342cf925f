//! Configuration for tierbook.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TIERBOOK_HOME, TIERBOOK_CORPUS)
//! 2. Config file (.tierbook/config.yaml)
//! 3. Defaults (~/.tierbook, corpus at ~/.tierbook/corpus)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tierbook/config.yaml
//! - Paths in config file are relative to the project root (the directory
//!   holding .tierbook/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::library::store::DEFAULT_PATTERNS;
use crate::validation::ValidationSettings;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub validation: Option<ValidationSettings>,
    #[serde(default)]
    pub watch: Option<WatchConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory
    pub home: Option<String>,
    /// Corpus directory holding content files
    pub corpus: Option<String>,
    /// Glob patterns for content files, relative to the corpus
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub debounce_ms: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to tierbook home
    pub home: PathBuf,
    /// Absolute path to the corpus
    pub corpus: PathBuf,
    /// Content file patterns
    pub patterns: Vec<String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Validator settings
    pub validation: ValidationSettings,
    /// Hot-reload settings
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

impl WatchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tierbook").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// Combine a parsed config file (if any) with env overrides and defaults
fn resolve(
    config_file: Option<(PathBuf, ConfigFile)>,
    env_home: Option<String>,
    env_corpus: Option<String>,
    default_home: PathBuf,
) -> ResolvedConfig {
    let Some((config_path, config)) = config_file else {
        let home = env_home.map(PathBuf::from).unwrap_or(default_home);
        let corpus = env_corpus
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("corpus"));

        return ResolvedConfig {
            home,
            corpus,
            patterns: default_patterns(),
            config_file: None,
            validation: ValidationSettings::default(),
            watch: WatchSettings::default(),
        };
    };

    // Base directory is the parent of .tierbook/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .parent() // .tierbook/
        .and_then(|p| p.parent()) // project root
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let home = if let Some(env_home) = env_home {
        PathBuf::from(env_home)
    } else if let Some(ref home_path) = config.paths.home {
        resolve_path(&base_dir, home_path)
    } else {
        default_home
    };

    let corpus = if let Some(env_corpus) = env_corpus {
        PathBuf::from(env_corpus)
    } else if let Some(ref corpus_path) = config.paths.corpus {
        resolve_path(&base_dir, corpus_path)
    } else {
        home.join("corpus")
    };

    let patterns = if config.paths.patterns.is_empty() {
        default_patterns()
    } else {
        config.paths.patterns
    };

    let watch = WatchSettings {
        debounce_ms: config
            .watch
            .and_then(|w| w.debounce_ms)
            .unwrap_or(WatchSettings::default().debounce_ms),
    };

    ResolvedConfig {
        home,
        corpus,
        patterns,
        config_file: Some(config_path),
        validation: config.validation.unwrap_or_default(),
        watch,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".tierbook");

    let config_file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            tracing::debug!(path = %path.display(), "Using config file");
            Some((path, config))
        }
        None => None,
    };

    Ok(resolve(
        config_file,
        std::env::var("TIERBOOK_HOME").ok(),
        std::env::var("TIERBOOK_CORPUS").ok(),
        default_home,
    ))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
