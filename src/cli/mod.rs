//! Command-line interface for tierbook.
//!
//! Provides commands for validating content files, building the catalog,
//! querying it by id, category, tag or name, inspecting the reference graph,
//! publishing drafts and watching a corpus for changes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::domain::{ContentRecord, LevelNumber, Tier};
use crate::library::{self, Catalog, CorpusStore, CorpusWatcher, ReloadOutcome, SharedCatalog};
use crate::validation::{Severity, Validator};

pub mod graph;

/// tierbook - Tiered knowledge-content repository
#[derive(Parser, Debug)]
#[command(name = "tierbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Corpus directory (overrides config and TIERBOOK_CORPUS)
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate content files and report every finding
    Validate {
        /// Files or directories (defaults to the corpus)
        paths: Vec<PathBuf>,

        /// Only show errors
        #[arg(short, long)]
        errors_only: bool,
    },

    /// Build the catalog and print a summary
    Build,

    /// Show a record
    Show {
        /// Content ID
        content_id: String,

        /// Show only this level (1-5)
        #[arg(short, long)]
        level: Option<u32>,
    },

    /// List records of a category (concept, condition, procedure, topic)
    Category {
        category: String,
    },

    /// List records carrying a tag
    Tag {
        tag: String,
    },

    /// Show record counts per category
    Counts,

    /// Search names and alternate names
    Search {
        query: String,
    },

    /// Inspect cross-references
    Graph {
        #[command(subcommand)]
        command: graph::GraphCommands,
    },

    /// Publish a draft file in place if it passes validation
    Publish {
        /// Content file holding one record
        file: PathBuf,
    },

    /// Watch the corpus and rebuild on change
    Watch,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?;
        let corpus = self.corpus.clone().unwrap_or_else(|| cfg.corpus.clone());
        let store = CorpusStore::new(&corpus).with_patterns(cfg.patterns.clone());
        let validator = Validator::new(cfg.validation.clone());
        let json = self.json;

        match self.command {
            Commands::Validate { paths, errors_only } => {
                validate_paths(&store, &validator, paths, errors_only, json).await
            }
            Commands::Build => {
                let catalog = load_catalog(&store, &validator).await?;
                print_build(&catalog, json)
            }
            Commands::Show { content_id, level } => {
                let catalog = load_catalog(&store, &validator).await?;
                show_record(&catalog, &content_id, level, json)
            }
            Commands::Category { category } => {
                let catalog = load_catalog(&store, &validator).await?;
                print_listing(&catalog.get_by_category(&category), json)
            }
            Commands::Tag { tag } => {
                let catalog = load_catalog(&store, &validator).await?;
                print_listing(&catalog.get_by_tag(&tag), json)
            }
            Commands::Counts => {
                let catalog = load_catalog(&store, &validator).await?;
                print_counts(&catalog, json)
            }
            Commands::Search { query } => {
                let catalog = load_catalog(&store, &validator).await?;
                print_listing(&catalog.search(&query), json)
            }
            Commands::Graph { command } => {
                let catalog = load_catalog(&store, &validator).await?;
                graph::execute(command, &catalog, json)
            }
            Commands::Publish { file } => publish_file(&validator, &file).await,
            Commands::Watch => watch_corpus(store, validator, cfg).await,
            Commands::Config => show_config(cfg, &corpus),
        }
    }
}

/// Load the corpus and build a catalog
async fn load_catalog(store: &CorpusStore, validator: &Validator) -> Result<Catalog> {
    let load = store.load().await?;
    for failure in &load.failures {
        eprintln!("⚠️  Skipped {}: {}", failure.path.display(), failure.error);
    }

    Catalog::build_with(load.into_records(), validator.clone())
        .context("Failed to build catalog; fix the duplicate id and retry")
}

/// Validate files (or the whole corpus) and print findings per record
async fn validate_paths(
    store: &CorpusStore,
    validator: &Validator,
    paths: Vec<PathBuf>,
    errors_only: bool,
    json: bool,
) -> Result<()> {
    let mut loaded = Vec::new();

    if paths.is_empty() {
        let load = store.load().await?;
        for failure in &load.failures {
            eprintln!("❌ {}: {}", failure.path.display(), failure.error);
        }
        loaded.extend(load.records.into_iter().map(|l| (l.source, l.record)));
    } else {
        for path in paths {
            if path.is_dir() {
                let load = CorpusStore::new(&path)
                    .with_patterns(store.patterns().to_vec())
                    .load()
                    .await?;
                loaded.extend(load.records.into_iter().map(|l| (l.source, l.record)));
            } else {
                let records = library::load_file(&path).await?;
                loaded.extend(records.into_iter().map(|r| (path.clone(), r)));
            }
        }
    }

    let mut failed = 0;
    let mut report = Vec::new();

    for (source, record) in &loaded {
        let result = validator.validate(record);
        if !result.ok {
            failed += 1;
        }

        if json {
            report.push(serde_json::json!({
                "source": source,
                "id": record.id,
                "result": result,
            }));
            continue;
        }

        let shown: Vec<_> = result
            .findings
            .iter()
            .filter(|f| !errors_only || f.severity == Severity::Error)
            .collect();

        let mark = if result.ok { "✅" } else { "❌" };
        println!("{} {} ({})", mark, display_id(record), source.display());
        for finding in shown {
            println!("   {}", finding);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{} record(s) checked, {} with blocking findings", loaded.len(), failed);
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn display_id(record: &ContentRecord) -> &str {
    if record.id.is_empty() {
        "<missing id>"
    } else {
        &record.id
    }
}

fn print_build(catalog: &Catalog, json: bool) -> Result<()> {
    let report = catalog.report();

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Indexed:     {}", report.indexed.len());
    println!("Drafts:      {}", report.drafts.len());
    println!("Rejected:    {}", report.rejected.len());
    println!("Edges:       {}", catalog.graph().edge_count());
    println!("Unresolved:  {}", catalog.unresolved_references().len());
    println!("Fingerprint: {}", report.fingerprint);

    for rejected in &report.rejected {
        println!("\n❌ {}", rejected.id);
        for finding in rejected.result.errors() {
            println!("   {}", finding);
        }
    }

    Ok(())
}

fn show_record(catalog: &Catalog, content_id: &str, level: Option<u32>, json: bool) -> Result<()> {
    let record = match catalog.get_by_id(content_id) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("  ID: {}", record.id);
    println!("  Name: {}", record.name);
    if !record.alternate_names.is_empty() {
        println!("  Also known as: {}", record.alternate_names.join(", "));
    }
    println!("  Type: {}", record.content_type);
    println!("  Version: {}", record.version);
    if let Some(relevance) = &record.tags.clinical_relevance {
        println!("  Clinical relevance: {}", relevance);
    }
    let tags = record.tags.all_normalized();
    if !tags.is_empty() {
        println!("  Tags: {}", tags.join(", "));
    }

    let levels: Vec<LevelNumber> = match level {
        Some(n) => vec![LevelNumber::new(n)
            .with_context(|| format!("Level must be between 1 and 5, got {}", n))?],
        None => LevelNumber::ALL.to_vec(),
    };

    for level in levels {
        let Some(content) = record.levels.get(level) else {
            continue;
        };
        let tier = Tier::of(level);
        println!("\n═══ Level {} · {} ({}) ═══\n", level, tier.name, tier.audience);
        println!("{}", content.summary);
        println!("\n{}", content.explanation);
        for term in &content.key_terms {
            println!("  • {}: {}", term.term, term.definition);
        }
    }

    if !record.citations.is_empty() {
        println!("\nCitations:");
        for citation in &record.citations {
            println!("  [{}] {}", citation.id, citation.title);
        }
    }

    Ok(())
}

fn print_listing(records: &[&ContentRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No matching content.");
        return Ok(());
    }

    println!("{:<40} {:<10} {:<40}", "ID", "TYPE", "NAME");
    println!("{}", "-".repeat(90));

    for record in records {
        let name_truncated = if record.name.chars().count() > 37 {
            format!("{}...", record.name.chars().take(37).collect::<String>())
        } else {
            record.name.clone()
        };
        println!(
            "{:<40} {:<10} {:<40}",
            record.id,
            record.content_type.to_string(),
            name_truncated
        );
    }

    println!("\nTotal: {} record(s)", records.len());

    Ok(())
}

fn print_counts(catalog: &Catalog, json: bool) -> Result<()> {
    let counts = catalog.get_category_counts();

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    for (category, count) in &counts {
        println!("{:<12} {}", category, count);
    }
    println!("{:<12} {}", "total", catalog.len());

    Ok(())
}

/// Publish a single-record file in place
async fn publish_file(validator: &Validator, file: &Path) -> Result<()> {
    let mut records = library::load_file(file).await?;
    if records.len() != 1 {
        anyhow::bail!(
            "{} holds {} records; publish works on single-record files",
            file.display(),
            records.len()
        );
    }
    let record = records.remove(0);

    match validator.publish(&record, Utc::now()) {
        Ok(published) => {
            library::save_record(file, &published).await?;
            eprintln!("✅ Published {} (version {})", published.id, published.version);
            Ok(())
        }
        Err(rejected) => {
            eprintln!("❌ {}", rejected);
            for finding in rejected.result.errors() {
                eprintln!("   {}", finding);
            }
            std::process::exit(1);
        }
    }
}

/// Build once, then rebuild whenever the corpus changes
async fn watch_corpus(store: CorpusStore, validator: Validator, cfg: &ResolvedConfig) -> Result<()> {
    let shared = SharedCatalog::new(load_catalog(&store, &validator).await?);
    eprintln!("👀 Watching {} ({} records indexed)", store.root().display(), shared.snapshot().len());

    let watcher = CorpusWatcher::new(store, validator).with_debounce(cfg.watch.debounce());
    let (mut outcomes, handle) = watcher.watch(shared.clone())?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            outcome = outcomes.recv() => match outcome {
                Some(ReloadOutcome::Swapped { indexed, fingerprint }) => {
                    eprintln!("🔄 Rebuilt: {} records indexed ({})", indexed, &fingerprint[..12]);
                }
                Some(ReloadOutcome::Unchanged) => {}
                Some(ReloadOutcome::Kept { error }) => {
                    eprintln!("❌ Rebuild failed, still serving previous catalog: {}", error);
                }
                None => break,
            },
        }
    }

    handle.stop().await
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &ResolvedConfig, corpus: &Path) -> Result<()> {
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:     {}", cfg.home.display());
    println!("  Corpus:   {}", corpus.display());
    println!("  Patterns: {}", cfg.patterns.join(", "));
    println!();
    println!("Validation:");
    println!("  Placeholder markers:      {}", cfg.validation.placeholder_markers.join(", "));
    println!("  Known exam types:         {}", cfg.validation.known_exam_types.join(", "));
    println!("  Clinical notes from level: {}", cfg.validation.clinical_notes_from_level);
    println!();
    println!("Watch:");
    println!("  Debounce: {}ms", cfg.watch.debounce_ms);

    Ok(())
}
