//! Sumi-Sitemap main entry point
//!
//! This is the command-line interface for the Sumi-Sitemap generator.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_sitemap::config::{load_config_with_hash, Config, OutputFormat};
use sumi_sitemap::output::{print_statistics, write_sitemap};
use sumi_sitemap::{generate_with_stats, CrawlOptions};
use tracing_subscriber::EnvFilter;

/// Sumi-Sitemap: a concurrent single-host sitemap generator
///
/// Sumi-Sitemap crawls every page reachable from the given URL on the same
/// host, using a pool of rate-limited workers, and prints the discovered
/// URLs as a sitemap.
#[derive(Parser, Debug)]
#[command(name = "sumi-sitemap")]
#[command(version)]
#[command(about = "A concurrent single-host sitemap generator", long_about = None)]
struct Cli {
    /// Root URL to crawl (http:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: String,

    /// Number of parallel fetch workers
    #[arg(long)]
    workers: Option<u32>,

    /// Maximum requests per second for each worker
    #[arg(long)]
    rate: Option<u32>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the sitemap to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Abort the crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print crawl statistics to stderr when done
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_or_default_config(cli.config.as_ref())?;
    apply_overrides(&mut config, &cli);
    sumi_sitemap::config::validate(&config).context("Invalid configuration")?;

    let options = CrawlOptions::from_config(&config);

    let (sitemap, stats) = match generate_with_stats(&cli.url, &options).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Sitemap generation failed: {}", e);
            return Err(e).with_context(|| format!("Failed to crawl {}", cli.url));
        }
    };

    let output_path = config.output.path.as_ref().map(PathBuf::from);
    write_sitemap(&sitemap, config.output.format, output_path.as_deref())
        .context("Failed to write sitemap")?;

    if cli.stats {
        print_statistics(&stats);
    }

    Ok(())
}

/// Loads the configuration file if one was given, defaults otherwise
fn load_or_default_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(rate) = cli.rate {
        config.crawler.rate = rate;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_secs = Some(timeout);
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(output) = &cli.output {
        config.output.path = Some(output.display().to_string());
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the sitemap.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sitemap=info,warn"),
            1 => EnvFilter::new("sumi_sitemap=debug,info"),
            2 => EnvFilter::new("sumi_sitemap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
