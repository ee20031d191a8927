//! lorelink: rewrite `{{mentions}}` in text into era-scoped Wowhead links.
//!
//! Reads FILE (or stdin), prints the rewritten text to stdout. Logs go to
//! stderr so output can be piped.

use anyhow::Context;
use clap::Parser;
use lorelink_core::Era;
use lorelink_links::{LinkerConfig, MentionResolver};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lorelink")]
#[command(author, version, about = "Rewrite {{mentions}} into canonical game-database links")]
struct Cli {
    /// Game era: Anniversary, Classic, TBC, WotLK or Retail (unknown values use Classic)
    #[arg(short, long, default_value_t = Era::Classic, value_parser = parse_era)]
    era: Era,

    /// Print a JSON report of every mention instead of the rewritten text
    #[arg(long)]
    report: bool,

    /// Input file (default: stdin)
    file: Option<PathBuf>,
}

/// Unknown eras fall back to the default instead of failing the run.
fn parse_era(value: &str) -> Result<Era, std::convert::Infallible> {
    let era = Era::parse_lenient(value);
    if value.parse::<Era>().is_err() {
        warn!(requested = value, era = %era, "Unknown era, using default");
    }
    Ok(era)
}

fn init_tracing() {
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "lorelink=info,lorelink_links=warn")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lorelink=info,lorelink_links=warn".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = LinkerConfig::from_env();
    let resolver =
        MentionResolver::from_config(&config).context("Invalid lorelink configuration")?;

    let text = read_input(cli.file.as_ref())?;
    debug!(era = %cli.era, text_len = text.len(), "Input loaded");

    if cli.report {
        let report = resolver.rewrite_with_report(&text, cli.era).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let rewritten = resolver.rewrite_mentions(&text, cli.era).await;
        print!("{}", rewritten);
    }

    let stats = resolver.cache().stats();
    info!(
        era = %cli.era,
        misses = stats.misses,
        hits = stats.hits,
        coalesced = stats.coalesced,
        "Rewrite finished"
    );

    Ok(())
}
