//! Reference graph subcommands.
//!
//! Provides commands to:
//! - `unresolved`: List cross-references whose target is not indexed
//! - `links`: Show incoming and outgoing references of one record
//! - `asymmetries`: List one-directional parent/child/sibling references

use anyhow::Result;
use clap::Subcommand;

use crate::domain::Relationship;
use crate::graph::Direction;
use crate::library::Catalog;

/// Graph-related subcommands
#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// List cross-references whose target is not in the index
    Unresolved,

    /// Show the references of a record
    Links {
        /// Content ID
        content_id: String,

        /// Only show this relationship (parent, child, sibling, related)
        #[arg(short, long)]
        relationship: Option<String>,
    },

    /// List references missing their inverse edge
    Asymmetries,
}

pub fn execute(command: GraphCommands, catalog: &Catalog, json: bool) -> Result<()> {
    match command {
        GraphCommands::Unresolved => show_unresolved(catalog, json),
        GraphCommands::Links {
            content_id,
            relationship,
        } => {
            let kind = relationship.map(|r| Relationship::from(r.trim().to_lowercase()));
            show_links(catalog, &content_id, kind.as_ref(), json)
        }
        GraphCommands::Asymmetries => show_asymmetries(catalog, json),
    }
}

fn show_unresolved(catalog: &Catalog, json: bool) -> Result<()> {
    let unresolved = catalog.unresolved_references();

    if json {
        println!("{}", serde_json::to_string_pretty(&unresolved)?);
        return Ok(());
    }

    if unresolved.is_empty() {
        println!("All cross-references resolve.");
        return Ok(());
    }

    println!("{:<40} {:<40}", "SOURCE", "TARGET");
    println!("{}", "-".repeat(80));
    for edge in &unresolved {
        println!("{:<40} {:<40}", edge.source_id, edge.target_id);
    }
    println!("\nTotal: {} unresolved reference(s)", unresolved.len());

    Ok(())
}

fn show_links(
    catalog: &Catalog,
    content_id: &str,
    kind: Option<&Relationship>,
    json: bool,
) -> Result<()> {
    if let Some(kind) = kind.filter(|k| !k.is_recognized()) {
        anyhow::bail!(
            "Unknown relationship \"{}\". Must be one of: parent, child, sibling, related",
            kind
        );
    }

    let links = catalog.relationships_of_kind(content_id, kind);

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
        return Ok(());
    }

    if links.is_empty() {
        println!("No references to or from: {}", content_id);
        return Ok(());
    }

    for link in &links {
        let resolved = |id: &str| if catalog.index().contains(id) { "" } else { " (unresolved)" };
        match link.direction {
            Direction::Outgoing => println!(
                "  -> {:<10} {}{}",
                link.edge.relationship.to_string(),
                link.edge.target_id,
                resolved(&link.edge.target_id)
            ),
            Direction::Incoming => println!(
                "  <- {:<10} {}{}",
                link.edge.relationship.to_string(),
                link.edge.source_id,
                resolved(&link.edge.source_id)
            ),
        }
    }

    Ok(())
}

fn show_asymmetries(catalog: &Catalog, json: bool) -> Result<()> {
    let findings = catalog.asymmetries();

    if json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
        return Ok(());
    }

    if findings.is_empty() {
        println!("No asymmetric references.");
        return Ok(());
    }

    for finding in &findings {
        println!("{}", finding);
    }
    println!("\nTotal: {} asymmetric reference(s)", findings.len());

    Ok(())
}
