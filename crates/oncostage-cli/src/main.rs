//! oncostage — staging extraction from oncology notes.
//! Entry point for the note driver binary.

mod report;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use oncostage_common::{Config, OutputFormat};
use oncostage_extract::{NotePipeline, Vocabularies};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "oncostage")]
#[command(version, about = "Extract TNM, stage group and histology from oncology notes", long_about = None)]
struct Cli {
    /// Config file (defaults to $ONCOSTAGE_CONFIG, then ./oncostage.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Notes file, one note per line
    #[arg(short, long)]
    notes: Option<PathBuf>,

    /// Histology CSV with site and histology description columns
    #[arg(long)]
    histologies: Option<PathBuf>,

    /// Drop histology phrases with more words than this
    #[arg(long)]
    max_words: Option<usize>,

    /// Minimum similarity for a histology match
    #[arg(long)]
    cutoff: Option<f64>,

    /// Output format for the extraction results
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl Cli {
    /// Command-line values take precedence over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(ref notes) = self.notes {
            config.resources.notes_path = notes.clone();
        }
        if let Some(ref histologies) = self.histologies {
            config.resources.histology_path = histologies.clone();
        }
        if let Some(max_words) = self.max_words {
            config.histology.max_words = max_words;
        }
        if let Some(cutoff) = self.cutoff {
            config.histology.similarity_cutoff = cutoff;
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
    }
}

#[tokio::main]
async fn main() {
    // Results go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("oncostage=info,warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let notes = read_notes(&config.resources.notes_path).await?;
    info!("Read {} notes from {:?}", notes.len(), config.resources.notes_path);

    let vocabularies = Vocabularies::load(&config.resources.histology_path, config.histology.max_words)
        .context("Failed to load histology vocabulary")?;
    let pipeline = NotePipeline::new(vocabularies)
        .with_similarity_cutoff(config.histology.similarity_cutoff)?;

    let refs: Vec<&str> = notes.iter().map(String::as_str).collect();
    let extractions = pipeline.extract_batch(&refs);

    let rendered = match config.output.format {
        OutputFormat::Text => report::render_text(&extractions),
        OutputFormat::Json => report::render_json(&extractions)?,
    };
    print!("{}", rendered);

    Ok(())
}

/// Trimmed non-blank lines of the notes file.
async fn read_notes(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not open/read file: {}", path.display()))?;
    Ok(report::split_notes(&content))
}
