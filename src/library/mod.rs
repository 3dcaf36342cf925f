//! Content library: indexing, the catalog read API, storage and reload.
//!
//! # Data flow
//!
//! ```text
//! corpus files ──► CorpusStore::load ──► Catalog::build
//!                                          ├── Validator   (reject malformed)
//!                                          ├── ReferenceGraph (all records)
//!                                          └── ContentIndex   (published + valid)
//! ```
//!
//! A built catalog is immutable. `CorpusWatcher` rebuilds on change and
//! swaps the result into a `SharedCatalog`.

pub mod catalog;
pub mod index;
pub mod store;
pub mod watcher;

pub use catalog::{BuildReport, Catalog, Rejected, SharedCatalog};
pub use index::{ContentIndex, IndexError, NotFound};
pub use store::{load_file, save_record, CorpusLoad, CorpusStore, LoadFailure, LoadedRecord};
pub use watcher::{reload, CorpusWatcher, ReloadOutcome, WatchHandle, WatcherError};
