//! MindMesh CLI
//!
//! Offline maintenance commands against the note database.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use mindmesh_core::{build_embedder, EmbedderKind, Layer, NoteService, ReembedScope, Storage};

/// MindMesh - note graph maintenance CLI
#[derive(Parser)]
#[command(name = "mindmesh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Maintenance CLI for the MindMesh note database")]
struct Cli {
    /// SQLite database file (default: platform data directory)
    #[arg(long, global = true, env = "MINDMESH_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and apply migrations
    InitDb,

    /// Show note statistics
    Stats,

    /// List notes, one per line
    List {
        /// Only notes in this layer
        #[arg(long)]
        layer: Option<Layer>,
    },

    /// Compute embeddings for notes that lack one
    Reembed {
        /// Re-embed every note, e.g. after switching models
        #[arg(long)]
        all: bool,

        /// Embedding backend: fastembed or hash
        #[arg(long, env = "MINDMESH_EMBEDDER", default_value = "fastembed")]
        embedder: EmbedderKind,

        /// Directory holding a local sentence-transformers ONNX export
        #[arg(long, env = "MINDMESH_LOCAL_MODEL_PATH")]
        local_model_path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => run_init_db(cli.db_path),
        Commands::Stats => run_stats(cli.db_path),
        Commands::List { layer } => run_list(cli.db_path, layer),
        Commands::Reembed {
            all,
            embedder,
            local_model_path,
        } => run_reembed(cli.db_path, all, embedder, local_model_path),
    }
}

fn run_init_db(db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let storage = Storage::new(db_path)?;
    println!(
        "{} {} (schema v{})",
        "Database ready:".green().bold(),
        storage.path().display(),
        storage.schema_version()?
    );
    Ok(())
}

fn run_stats(db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let storage = Storage::new(db_path)?;
    let stats = storage.stats()?;

    println!("{}", "=== MindMesh Note Statistics ===".cyan().bold());
    println!();

    println!("{}: {}", "Database".white().bold(), storage.path().display());
    println!("{}: {}", "Total Notes".white().bold(), stats.total_notes);
    println!("{}: {}", "Total Links".white().bold(), stats.total_links);
    println!("{}: {}", "With Embeddings".white().bold(), stats.embedded_notes);

    let embedding_coverage = if stats.total_notes > 0 {
        (stats.embedded_notes as f64 / stats.total_notes as f64) * 100.0
    } else {
        0.0
    };
    println!("{}: {:.1}%", "Embedding Coverage".white().bold(), embedding_coverage);

    for (model, count) in &stats.embedding_models {
        println!("  {} {}", model.dimmed(), count);
    }

    if let Some(oldest) = stats.oldest_note {
        println!("{}: {}", "Oldest Note".white().bold(), oldest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(newest) = stats.newest_note {
        println!("{}: {}", "Newest Note".white().bold(), newest.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    println!("{}", "=== Layer Distribution ===".yellow().bold());

    let total = stats.total_notes.max(0) as usize;
    if total == 0 {
        println!("{}", "No notes found.".dimmed());
        return Ok(());
    }

    for (layer, color) in [
        (Layer::Factual, "green"),
        (Layer::Creative, "magenta"),
        (Layer::Emotional, "red"),
    ] {
        let count = stats.layers.get(layer.as_str()).copied().unwrap_or(0);
        print_distribution_bar(layer.as_str(), count as usize, total, color);
    }
    if let Some(count) = stats.layers.get("unclassified") {
        print_distribution_bar("unclassified", *count as usize, total, "white");
    }

    if stats.missing_embeddings() > 0 {
        println!();
        println!(
            "{} {} note(s) have no embedding; run `mindmesh reembed`",
            "!".yellow().bold(),
            stats.missing_embeddings()
        );
    }

    Ok(())
}

fn print_distribution_bar(label: &str, count: usize, total: usize, color: &str) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "green" => bar.green(),
        "magenta" => bar.magenta(),
        "red" => bar.red(),
        _ => bar.white(),
    };

    println!(
        "  {:13} [{:30}] {:>4} ({:>5.1}%)",
        label, colored_bar, count, percentage
    );
}

fn run_list(db_path: Option<PathBuf>, layer: Option<Layer>) -> anyhow::Result<()> {
    let storage = Storage::new(db_path)?;
    let notes: Vec<_> = storage
        .list_notes()?
        .into_iter()
        .filter(|n| layer.is_none() || n.layer == layer)
        .collect();

    if notes.is_empty() {
        println!("{}", "No notes found.".dimmed());
        return Ok(());
    }

    for note in notes {
        let layer = note.layer.map(|l| l.as_str()).unwrap_or("-");
        let marker = if note.has_embedding() { " " } else { "*" };
        println!(
            "{:>5}{} {:10} {}  {}",
            note.id.to_string().cyan(),
            marker.yellow(),
            layer,
            note.title.bold(),
            note.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }

    Ok(())
}

fn run_reembed(
    db_path: Option<PathBuf>,
    all: bool,
    embedder: EmbedderKind,
    local_model_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let storage = Storage::new(db_path)?;
    let embedder = build_embedder(embedder, local_model_path)?;
    println!("{} {}", "Using model".white().bold(), embedder.model_name());
    embedder.init()?;

    let service = NoteService::new(Arc::new(storage), embedder);
    let scope = if all { ReembedScope::All } else { ReembedScope::Missing };
    let written = service.reembed(scope)?;

    println!("{} {} note(s)", "Re-embedded".green().bold(), written);
    Ok(())
}
