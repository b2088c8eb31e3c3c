use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sale-tracker")]
#[command(about = "Multi-retailer product price tracker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape one or more product URLs
    Scrape {
        /// Product page URLs (Lululemon, Nike)
        #[arg(required = true)]
        urls: Vec<String>,

        /// Always fetch, ignoring cached results
        #[arg(long)]
        no_cache: bool,

        /// Seconds to wait between requests (0 disables pacing; defaults to the configured rate limit)
        #[arg(long, value_name = "SECS")]
        delay: Option<f64>,

        /// Print results as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Scrape every configured product and print the update report
    Run {
        /// Print results as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// List supported retailers and their scraping settings
    Retailers,

    /// Validate the configuration and list any issues
    Check,
}
