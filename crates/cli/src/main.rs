//! openapi-expand CLI
//!
//! Command-line interface for expanding internal `$ref` pointers in OpenAPI
//! documents into a single self-contained file.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use openapi_expand_expander::{
    ExpandOptions, ExpansionStats, RefExpander, SiblingPolicy, DEFAULT_MAX_DEPTH,
};
use openapi_expand_parser::{DocumentFormat, DocumentLoader, DocumentWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "openapi-expand")]
#[command(version, about = "Expand all internal $ref pointers in an OpenAPI document", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    # Expand a YAML spec into a self-contained YAML file\n  \
    openapi-expand control-plane.yaml control-plane.expanded.yaml\n\n  \
    # Expand to JSON and drop the now unused components section\n  \
    openapi-expand --prune-components management-plane.yaml management-plane.json")]
struct Cli {
    /// Input document (JSON or YAML)
    input: PathBuf,

    /// Output document; the format follows the extension (.json or YAML)
    output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Reuse the expansion of a reference target instead of re-expanding it
    #[arg(long)]
    memoize: bool,

    /// Remove the top-level components section after expansion
    #[arg(long)]
    prune_components: bool,

    /// How to treat `$ref` mappings that carry other keys
    #[arg(long, value_enum, default_value_t = SiblingMode::Merge)]
    siblings: SiblingMode,

    /// Maximum length of a reference chain
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SiblingMode {
    /// Overlay sibling keys onto the resolved target
    Merge,
    /// Keep the mapping as is, `$ref` included
    Preserve,
}

impl From<SiblingMode> for SiblingPolicy {
    fn from(mode: SiblingMode) -> Self {
        match mode {
            SiblingMode::Merge => SiblingPolicy::Merge,
            SiblingMode::Preserve => SiblingPolicy::Preserve,
        }
    }
}

impl Cli {
    fn options(&self) -> ExpandOptions {
        ExpandOptions::default()
            .with_max_depth(self.max_depth)
            .with_memoize(self.memoize)
            .with_siblings(self.siblings.into())
            .with_prune_components(self.prune_components)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match expand_command(&cli) {
        Ok(stats) => {
            if cli.verbose {
                print_stats(&stats);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("\n{} {:#}", "✗ Expansion failed:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn expand_command(cli: &Cli) -> Result<ExpansionStats> {
    let options = cli.options();

    println!("{} Loading {}...", "→".cyan(), cli.input.display());
    let doc = DocumentLoader::from_file(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    if cli.verbose {
        println!("  References: {}", doc.count_references());
        println!("  Siblings: {:?}", options.siblings);
        println!("  Memoize: {}", options.memoize);
    }

    println!(
        "{} Expanding all $ref pointers (max depth: {})...",
        "→".cyan(),
        options.max_depth
    );
    let expansion = RefExpander::new(&doc)
        .with_options(options)
        .expand()
        .with_context(|| format!("Failed to expand {}", cli.input.display()))?;

    if expansion.stats.components_pruned {
        println!("{} Removed unused components section", "→".cyan());
    }

    let writer = DocumentWriter::for_path(&cli.output);
    println!(
        "{} Saving to {} ({})...",
        "→".cyan(),
        cli.output.display(),
        output_format_label(&cli.output, writer.format())
    );
    writer
        .write_to_file(&expansion.document, &cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    println!(
        "\n{} {} references expanded",
        "✓ Done!".green().bold(),
        expansion.stats.references_resolved
    );

    Ok(expansion.stats)
}

fn output_format_label(path: &Path, format: DocumentFormat) -> String {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{} from .{}", format, ext),
        None => format.to_string(),
    }
}

fn print_stats(stats: &ExpansionStats) {
    println!("\n{}", "Statistics:".bold());
    println!(
        "  References resolved: {}",
        stats.references_resolved.to_string().yellow()
    );
    println!("  Cache hits: {}", stats.cache_hits.to_string().yellow());
    println!(
        "  Deepest chain: {}",
        stats.deepest_chain.to_string().yellow()
    );
}
