//! cl-scout - Craigslist product watcher with language-model relevance checks

use anyhow::Result;
use cl_scout::commands::ScanCommand;
use cl_scout::config::{OutputFormat, ProductsFile, Settings, DEFAULT_PRODUCTS_PATH};
use cl_scout::evaluator::PromptProfile;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cl-scout",
    version,
    about = "Scrape Craigslist listings for multiple products",
    long_about = "Searches Craigslist for every configured product and uses Gemini to decide which listings are the product being searched for."
)]
struct Cli {
    /// Path to products config JSON file
    #[arg(long, default_value = DEFAULT_PRODUCTS_PATH)]
    config: PathBuf,

    /// Path to settings TOML file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Delay between requests in seconds (overrides CL_SCOUT_DELAY)
    #[arg(long)]
    delay: Option<f64>,

    /// Skip Gemini evaluation (just scrape)
    #[arg(long)]
    no_eval: bool,

    /// Only scrape products whose name contains this text (case-insensitive)
    #[arg(long)]
    product: Option<String>,

    /// Evaluation strictness
    #[arg(long)]
    profile: Option<PromptProfile>,

    /// Output format
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Email a digest of matches (needs RESEND_API_KEY and NOTIFY_EMAIL)
    #[arg(long)]
    notify: bool,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, env = "CL_SCOUT_PROXY")]
    proxy: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut settings = Settings::load(cli.settings.as_deref())?.with_env();

    if let Some(delay) = cli.delay {
        settings.delay_secs = delay;
    }
    if let Some(profile) = cli.profile {
        settings.profile = profile;
    }
    if let Some(format) = cli.format {
        settings.format = format;
    }
    if cli.notify {
        settings.notify = true;
    }
    if let Some(proxy) = cli.proxy {
        settings.proxy = Some(proxy);
    }

    let products = ProductsFile::from_file(&cli.config)?;
    if products.products.is_empty() {
        println!("No products found in configuration file.");
        return Ok(());
    }

    let queries = products.queries(cli.product.as_deref())?;

    let cmd = ScanCommand::new(settings, !cli.no_eval);
    let output = cmd.execute(&queries).await?;
    println!("{}", output);

    Ok(())
}
