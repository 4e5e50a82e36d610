// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The CLI is deliberately thin: it only turns flags into a MirrorConfig.
// Everything interesting happens in the library.
// =============================================================================

use clap::Parser;

use site_mirror::config::{
    ConfigError, MirrorConfig, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT_SECS,
};
use site_mirror::fetch::HtmlDetection;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "site-mirror",
    version,
    about = "Mirror a website into a local directory",
    long_about = "site-mirror downloads a page, stores it under the output directory using the \
                  URL path as the file path, and follows same-host links recursively."
)]
pub struct Cli {
    /// Starting URL of the website (absolute http/https URL)
    #[arg(long)]
    pub url: String,

    /// Output directory (created if missing)
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: String,

    /// Recursion depth (0 for unlimited)
    ///
    /// Depth 0 = the starting page, depth 1 = pages it links to, etc.
    #[arg(long, default_value_t = 0)]
    pub depth: usize,

    /// Maximum number of recursive fetches in flight at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds (0 disables the timeout)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Treat any `text/html` response as HTML, not only `text/html; charset=utf-8`
    #[arg(long)]
    pub lenient_html: bool,

    /// Print the final crawl summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// More log output (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter when RUST_LOG is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Turns the parsed flags into a validated crawl configuration.
    pub fn to_config(&self) -> Result<MirrorConfig, ConfigError> {
        let detection = if self.lenient_html {
            HtmlDetection::MediaType
        } else {
            HtmlDetection::Strict
        };

        Ok(MirrorConfig::new(&self.url, &self.output)?
            .with_max_depth(self.depth)
            .with_concurrency(self.concurrency)?
            .with_timeout_secs(self.timeout)
            .with_html_detection(detection))
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a flat struct instead of subcommands?
//    - The tool does exactly one thing, so there is nothing to dispatch
//    - Every flag maps 1:1 onto a MirrorConfig field
//
// 2. What is ArgAction::Count?
//    - It counts how often a flag appears: -v -> 1, -vv -> 2
//
// 3. Why is validation not done by clap?
//    - The library validates MirrorConfig itself, so tests and other callers
//      get the same checks without going through the CLI
// -----------------------------------------------------------------------------
