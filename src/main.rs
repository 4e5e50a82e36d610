// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (RUST_LOG wins over -v / -q)
// 3. Validate the configuration and create the output directory
// 4. Run the mirror crawl
// 5. Exit with proper code (0 = crawl ran, 2 = could not start)
//
// Individual page failures never change the exit code: the mirror is best
// effort, and every failure has already been logged where it happened.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use cli::Cli;
use site_mirror::{CrawlSummary, Mirror};

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Parse CLI arguments first, so --help works without any log output
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns Err only when the crawl could not start at all
async fn run(cli: &Cli) -> Result<()> {
    debug!(?cli, "CLI arguments parsed");

    let config = cli.to_config().context("invalid configuration")?;

    tokio::fs::create_dir_all(&config.output_root)
        .await
        .with_context(|| {
            format!(
                "failed to create output directory {}",
                config.output_root.display()
            )
        })?;

    let mirror = Mirror::new(&config).context("failed to set up mirror")?;
    let summary = mirror.run(config.seed.clone()).await;

    if cli.json {
        print_summary_json(&summary)?;
    }

    Ok(())
}

// stdout carries only the JSON, logs go to stderr
fn print_summary_json(summary: &CrawlSummary) -> Result<()> {
    let json_output = serde_json::to_string_pretty(summary)?;
    println!("{}", json_output);
    Ok(())
}
