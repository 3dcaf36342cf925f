//! Corpus watcher for hot reload.
//!
//! Watches the corpus directory and, once changes settle, reloads the files,
//! builds a fresh catalog and swaps it into the shared handle. A failed
//! build keeps the previous catalog in service.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use thiserror::Error;
use tokio::sync::mpsc;

use super::catalog::{Catalog, SharedCatalog};
use super::store::CorpusStore;
use crate::validation::Validator;

/// Errors that can occur with the watcher
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Corpus directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Outcome of one reload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new catalog was swapped in
    Swapped { indexed: usize, fingerprint: String },

    /// No input record changed; nothing swapped
    Unchanged,

    /// The build failed; the previous catalog stays
    Kept { error: String },
}

/// Load the corpus, rebuild and swap if the content changed
pub async fn reload(
    store: &CorpusStore,
    validator: &Validator,
    shared: &SharedCatalog,
) -> Result<ReloadOutcome> {
    let load = store.load().await?;

    let catalog = match Catalog::build_with(load.into_records(), validator.clone()) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!("Rebuild failed, keeping previous catalog: {}", e);
            return Ok(ReloadOutcome::Kept {
                error: e.to_string(),
            });
        }
    };

    if catalog.source_fingerprint() == shared.snapshot().source_fingerprint() {
        tracing::debug!("Corpus unchanged after reload");
        return Ok(ReloadOutcome::Unchanged);
    }

    let outcome = ReloadOutcome::Swapped {
        indexed: catalog.len(),
        fingerprint: catalog.source_fingerprint().to_string(),
    };
    shared.swap(catalog);
    tracing::info!("Catalog swapped");
    Ok(outcome)
}

/// Watches a corpus and keeps a [`SharedCatalog`] current
pub struct CorpusWatcher {
    store: CorpusStore,
    validator: Validator,
    debounce: Duration,
}

impl CorpusWatcher {
    pub fn new(store: CorpusStore, validator: Validator) -> Self {
        Self {
            store,
            validator,
            debounce: Duration::from_millis(500),
        }
    }

    /// Set the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching. Reload outcomes are sent on the returned channel.
    pub fn watch(
        self,
        shared: SharedCatalog,
    ) -> Result<(mpsc::Receiver<ReloadOutcome>, WatchHandle), WatcherError> {
        let root = self.store.root().to_path_buf();
        if !root.exists() {
            return Err(WatcherError::DirectoryNotFound(root));
        }

        let (change_tx, mut change_rx) = mpsc::channel::<()>(16);
        let (outcome_tx, outcome_rx) = mpsc::channel::<ReloadOutcome>(16);
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        let mut debouncer = new_debouncer(self.debounce, move |res: notify_debouncer_mini::DebounceEventResult| {
            match res {
                Ok(events) if !events.is_empty() => {
                    let _ = change_tx.try_send(());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Watcher error: {:?}", e),
            }
        })?;
        debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;

        tracing::info!("Watching {} for content changes", root.display());

        let task = tokio::spawn(async move {
            // Dropping the debouncer stops the notify thread
            let _debouncer = debouncer;

            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        tracing::info!("Watcher stopping...");
                        break;
                    }
                    changed = change_rx.recv() => {
                        if changed.is_none() {
                            tracing::error!("Watcher channel disconnected");
                            break;
                        }
                        // Coalesce bursts that arrived while we were busy
                        while change_rx.try_recv().is_ok() {}

                        match reload(&self.store, &self.validator, &shared).await {
                            Ok(outcome) => {
                                if outcome_tx.send(outcome).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("Reload failed: {:#}", e),
                        }
                    }
                }
            }
        });

        Ok((outcome_rx, WatchHandle { stop_tx, task }))
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl WatchHandle {
    /// Stop the watcher
    pub async fn stop(self) -> Result<()> {
        let _ = self.stop_tx.send(()).await;
        self.task.await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RECORD: &str = r#"{
        "id": "topic-a", "type": "topic", "name": "A", "status": "published", "version": 1,
        "levels": {
            "1": {"level": 1, "summary": "s", "explanation": "e"},
            "2": {"level": 2, "summary": "s", "explanation": "e"},
            "3": {"level": 3, "summary": "s", "explanation": "e"},
            "4": {"level": 4, "summary": "s", "explanation": "e"},
            "5": {"level": 5, "summary": "s", "explanation": "e"}
        }
    }"#;

    #[tokio::test]
    async fn test_reload_swaps_then_reports_unchanged() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.json"), RECORD).unwrap();

        let store = CorpusStore::new(temp.path());
        let validator = Validator::default();
        let shared = SharedCatalog::default();

        let first = reload(&store, &validator, &shared).await.unwrap();
        assert!(matches!(first, ReloadOutcome::Swapped { indexed: 1, .. }));
        assert!(shared.snapshot().get_by_id("topic-a").is_ok());

        let second = reload(&store, &validator, &shared).await.unwrap();
        assert_eq!(second, ReloadOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_reload_keeps_catalog_on_duplicate_id() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.json"), RECORD).unwrap();

        let store = CorpusStore::new(temp.path());
        let validator = Validator::default();
        let shared = SharedCatalog::default();
        reload(&store, &validator, &shared).await.unwrap();

        std::fs::write(temp.path().join("b.json"), RECORD).unwrap();
        let outcome = reload(&store, &validator, &shared).await.unwrap();

        assert!(matches!(outcome, ReloadOutcome::Kept { .. }));
        assert_eq!(shared.snapshot().len(), 1);
    }

    #[test]
    fn test_watch_missing_directory() {
        let temp = TempDir::new().unwrap();
        let watcher = CorpusWatcher::new(CorpusStore::new(temp.path().join("nope")), Validator::default());

        let err = watcher.watch(SharedCatalog::default()).err().unwrap();
        assert!(matches!(err, WatcherError::DirectoryNotFound(_)));
    }
}
