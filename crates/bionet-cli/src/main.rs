//! Bionet CLI
//!
//! - `import`: XBEL / BioPAX / SIF / XGMML files into `.bnet` network snapshots
//! - `export`: a snapshot back out as an XBEL document
//! - `inspect`: counts and provenance of a snapshot

use anyhow::{anyhow, Context, Result};
use bionet_core::{
    AuditReport, EngineConfig, EngineError, Network, SessionError, SessionOperation, SessionReport,
};
use bionet_ingest::SourceDocument;
use bionet_store::MemoryStore;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod formats;

use formats::{collect_sources, SourceFormat};

#[derive(Parser)]
#[command(name = "bionet")]
#[command(author, version, about = "Bionet: biological network model translation")]
struct Cli {
    /// Engine configuration (JSON); missing fields take their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import source files or directories, one network snapshot per file.
    Import {
        /// Files or directories (walked recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory receiving `<name>.bnet` snapshots
        #[arg(short, long)]
        out_dir: PathBuf,
        /// Force a format instead of detecting it from the extension
        #[arg(long, value_enum)]
        format: Option<SourceFormat>,
    },

    /// Export a network snapshot as XBEL.
    Export {
        /// Input `.bnet` snapshot
        snapshot: PathBuf,
        /// Output `.xbel` file; replaced only when the export succeeds
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Print a snapshot's summary.
    Inspect {
        snapshot: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Import {
            inputs,
            out_dir,
            format,
        } => cmd_import(&inputs, &out_dir, format, &config),
        Commands::Export { snapshot, out } => cmd_export(&snapshot, &out, &config),
        Commands::Inspect { snapshot, json } => cmd_inspect(&snapshot, json),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_import(
    inputs: &[PathBuf],
    out_dir: &Path,
    format: Option<SourceFormat>,
    config: &EngineConfig,
) -> Result<()> {
    let sources = collect_sources(inputs, format)?;
    if sources.is_empty() {
        return Err(anyhow!("no importable files found"));
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    println!(
        "{} {} file(s) → {}",
        "Importing".green().bold(),
        sources.len(),
        out_dir.display()
    );

    let store = MemoryStore::new();
    let reports: Vec<(PathBuf, SourceFormat, SessionReport)> = sources
        .into_par_iter()
        .map(|(path, format)| {
            tracing::debug!(path = %path.display(), format = format.as_str(), "importing source");
            let report = match SourceDocument::from_path(&path) {
                Ok(source) => format.import(&source, store.begin(source.name.clone()), config),
                Err(err) => unreadable(&path, err),
            };
            (path, format, report)
        })
        .collect();

    let mut failures = 0usize;
    for (path, format, report) in &reports {
        match report.network_id {
            Some(id) if report.is_success() => {
                let out = snapshot_path(out_dir, path);
                store
                    .save_snapshot(id, &out)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                let counts = &report.counts;
                println!(
                    "  {} {} [{}] nodes={} edges={} terms={} citations={} → {}",
                    "ok".green().bold(),
                    path.display(),
                    format.as_str(),
                    counts.nodes,
                    counts.edges,
                    counts.terms(),
                    counts.citations,
                    out.display()
                );
                print_audit(&report.audit);
            }
            _ => {
                failures += 1;
                println!(
                    "  {} {}",
                    "failed".red().bold(),
                    report.reason().unwrap_or_default()
                );
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{failures} of {} import(s) failed", reports.len()));
    }
    Ok(())
}

fn cmd_export(snapshot: &Path, out: &Path, config: &EngineConfig) -> Result<()> {
    let network = load_network(snapshot)?;
    tracing::debug!(
        snapshot = %snapshot.display(),
        edges = network.edges.len(),
        "snapshot loaded for export"
    );
    println!(
        "{} {} → {}",
        "Exporting".green().bold(),
        snapshot.display(),
        out.display()
    );

    let report = bionet_export::export_to_path(&network, out, config);
    if !report.is_success() {
        return Err(anyhow!(report.reason().unwrap_or_default()));
    }
    print_audit(&report.audit);
    eprintln!("{} {}", "wrote".green().bold(), out.display().to_string().bold());
    Ok(())
}

fn cmd_inspect(snapshot: &Path, json: bool) -> Result<()> {
    let network = load_network(snapshot)?;
    let summary = &network.summary;
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Network".green().bold(),
        summary.name.as_deref().unwrap_or("(unnamed)").bold()
    );
    if let Some(description) = &summary.description {
        println!("  {description}");
    }
    let counts = &summary.counts;
    println!("  namespaces:        {}", counts.namespaces);
    println!("  base terms:        {}", counts.base_terms);
    println!("  function terms:    {}", counts.function_terms);
    println!("  reified edges:     {}", counts.reified_edge_terms);
    println!("  nodes:             {}", counts.nodes);
    println!("  edges:             {}", counts.edges);
    println!("  citations:         {}", counts.citations);
    println!("  supports:          {}", counts.supports);
    for property in &summary.properties {
        println!("  {} = {}", property.name.dimmed(), property.value.to_text());
    }
    for event in &summary.provenance {
        let detail: Vec<String> = event
            .properties
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!(
            "  {} {} {}",
            event.event_type.cyan(),
            event.ended_at.to_rfc3339(),
            detail.join(" ")
        );
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// A source that could not be read still yields a failed session report.
fn unreadable(path: &Path, err: std::io::Error) -> SessionReport {
    SessionReport::failed(
        SessionError {
            operation: SessionOperation::Import,
            source_name: path.display().to_string(),
            cause: EngineError::Io(err),
        },
        Default::default(),
        Default::default(),
    )
}

fn snapshot_path(out_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "network".to_string());
    out_dir.join(format!("{stem}.bnet"))
}

fn load_network(path: &Path) -> Result<Network> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Network::from_bytes(&bytes).with_context(|| format!("failed to load {}", path.display()))
}

fn print_audit(audit: &AuditReport) {
    if audit.is_complete() {
        println!("    {}", "audit complete".green());
        return;
    }
    for delta in audit.deltas.iter().filter(|d| d.delta() != 0) {
        println!(
            "    {} {}: expected {}, observed {}",
            "delta".yellow(),
            delta.kind,
            delta.expected,
            delta.observed
        );
    }
    if !audit.unprocessed.is_empty() {
        println!(
            "    {} {} unprocessed entit(ies)",
            "warn".yellow().bold(),
            audit.unprocessed.len()
        );
    }
    if !audit.repeated.is_empty() {
        println!(
            "    {} {} repeated entit(ies)",
            "warn".yellow().bold(),
            audit.repeated.len()
        );
    }
    for warning in &audit.warnings {
        println!("    {} {warning}", "warn".yellow().bold());
    }
}
