//! `webfetch` CLI - Fetch URLs or extract local PDFs as markdown

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use webfetch::content::truncate_markdown;
use webfetch::{Config, ConversionResult, Fetcher};

#[derive(Parser)]
#[command(name = "webfetch")]
#[command(about = "Fetch any URL as clean markdown")]
#[command(version)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/webfetch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a URL and print it as markdown
    Fetch {
        /// URL to fetch
        url: String,

        /// Request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Cut the markdown to this many bytes (0 = no limit)
        #[arg(long)]
        max_length: Option<usize>,

        /// Print the conversion result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract text from a local PDF file
    Extract {
        /// PDF file to extract
        file: PathBuf,

        /// Maximum number of extraction workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Cut the markdown to this many bytes (0 = no limit)
        #[arg(long)]
        max_length: Option<usize>,

        /// Print the conversion result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Fetch {
            url,
            timeout,
            max_length,
            json,
        } => {
            if let Some(secs) = timeout {
                config.fetch.timeout_secs = secs;
            }
            if let Some(max) = max_length {
                config.fetch.max_content_len = max;
            }
            cmd_fetch(&config, &url, json).await?;
        }
        Commands::Extract {
            file,
            workers,
            max_length,
            json,
        } => {
            if let Some(workers) = workers {
                config.extract.max_workers = workers;
            }
            if let Some(max) = max_length {
                config.fetch.max_content_len = max;
            }
            cmd_extract(&config, &file, json)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only the markdown.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn cmd_fetch(config: &Config, url: &str, json: bool) -> Result<()> {
    let fetcher = Fetcher::new(config)?;
    let result = fetcher
        .fetch_and_convert(url)
        .await
        .with_context(|| format!("failed to convert {url}"))?;
    print_result(result, config.fetch.max_content_len, json)
}

#[cfg(feature = "pdf")]
fn cmd_extract(config: &Config, file: &Path, json: bool) -> Result<()> {
    use std::sync::Arc;
    use webfetch::content::pdfium::PdfiumParser;
    use webfetch::PdfExtractor;

    let start = std::time::Instant::now();
    let data = std::fs::File::open(file)
        .with_context(|| format!("failed to open {}", file.display()))?;
    let declared = data.metadata().ok().map(|m| m.len());

    let extractor =
        PdfExtractor::new(Arc::new(PdfiumParser)).with_config(config.extract.clone());
    let bytes = extractor
        .size_guard()
        .read_from(data, declared, extractor.document_pool())
        .with_context(|| format!("failed to read {}", file.display()))?;
    let extraction = extractor
        .extract_bytes(&bytes)
        .with_context(|| format!("failed to extract {}", file.display()))?;

    let result = ConversionResult {
        markdown: extraction.text,
        page_count: Some(extraction.page_count),
        content_type: "application/pdf".to_string(),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    print_result(result, config.fetch.max_content_len, json)
}

#[cfg(not(feature = "pdf"))]
fn cmd_extract(_config: &Config, file: &Path, _json: bool) -> Result<()> {
    anyhow::bail!(
        "cannot extract {}: PDF support not compiled in (rebuild with --features pdf)",
        file.display()
    )
}

fn print_result(mut result: ConversionResult, max_len: usize, json: bool) -> Result<()> {
    let full_len = result.markdown.len();
    if truncate_markdown(&mut result.markdown, max_len) {
        debug!(full_len, max_len, "markdown truncated");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.markdown);
    }
    Ok(())
}
