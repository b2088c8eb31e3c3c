use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use sale_tracker::cli::{Cli, Commands};
use sale_tracker::config::Config;
use sale_tracker::domain::{ProductReport, ProductResult};
use sale_tracker::errors::TrackerError;
use sale_tracker::services::ScrapeService;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "sale_tracker=info,warn",
        1 => "sale_tracker=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // `check` reports validation problems itself
    let config = match cli.command {
        Commands::Check => Config::load(),
        _ => Config::from_env(),
    }
    .context("Failed to load configuration")?;

    match cli.command {
        Commands::Scrape {
            urls,
            no_cache,
            delay,
            json,
        } => cmd_scrape(&config, &urls, !no_cache, delay, json),
        Commands::Run { json } => cmd_run(&config, json),
        Commands::Retailers => cmd_retailers(&config),
        Commands::Check => cmd_check(&config),
    }
}

fn cmd_scrape(
    config: &Config,
    urls: &[String],
    use_cache: bool,
    delay: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let delay = match delay {
        Some(secs) => Duration::try_from_secs_f64(secs).map_err(|_| {
            TrackerError::InvalidInput(format!("--delay must be a non-negative number, got {}", secs))
        })?,
        None => config.scraping.rate_limit_delay()?,
    };

    let service = ScrapeService::from_config(config)?;
    let results = service.scrape_multiple(urls, use_cache, delay);

    print_results(&results, json)
}

fn cmd_run(config: &Config, json: bool) -> anyhow::Result<()> {
    let urls = config.product_urls();

    if urls.is_empty() {
        println!("No products configured.");
        return Ok(());
    }

    let service = ScrapeService::from_config(config)?;
    let delay = config.scraping.rate_limit_delay()?;

    if !json {
        println!("Scraping {} products...\n", urls.len());
    }

    let results = service.scrape_multiple(&urls, config.scraping.enable_cache, delay);

    print_results(&results, json)
}

fn print_results(results: &[ProductResult], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        println!("{}", ProductReport::from_results(results).format());
    }

    Ok(())
}

fn cmd_retailers(config: &Config) -> anyhow::Result<()> {
    let service = ScrapeService::from_config(config)?;
    let registry = service.registry();

    println!("Supported retailers:\n");
    for name in registry.supported_retailers() {
        let Some(retailer) = registry.get(name) else {
            continue;
        };
        let settings = retailer.settings();

        println!("  {}", name);
        println!("    Timeout: {}s", settings.timeout.as_secs());
        println!("    Retry attempts: {}", settings.retry_attempts);
        println!(
            "    Rate limit delay: {:.1}s",
            settings.rate_limit_delay.as_secs_f64()
        );
        match settings.cache_ttl {
            Some(ttl) => println!("    Cache TTL: {}s", ttl.as_secs()),
            None => println!("    Cache TTL: {}s (default)", config.scraping.cache_ttl_secs),
        }
        println!();
    }

    let stats = service.cache_stats();
    if stats.enabled {
        println!("Cache: enabled");
    } else {
        println!("Cache: disabled");
    }

    Ok(())
}

fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let issues = config.issues();

    println!(
        "Products configured: {} across {} retailers",
        config.product_urls().len(),
        config.products.len()
    );

    if issues.is_empty() {
        println!("Configuration OK");
        return Ok(());
    }

    println!("Configuration issues:");
    for issue in &issues {
        println!("  - {}", issue);
    }

    config.validate().context("Invalid configuration")?;

    Ok(())
}
