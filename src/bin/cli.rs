//! web-monitor CLI
//!
//! Local execution entry point. For AWS Lambda, use `web-monitor-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use web_monitor::{
    context::MonitorContext,
    error::{AppError, Result},
    models::{Config, FeedCheckEvent, MonitorResult, WebsiteTarget},
    pipeline,
    services::LogNotifier,
    storage::{LocalStorage, RevisionKey},
};

/// Topic name used for results when running locally.
const RESULT_TOPIC: &str = "results";

/// web-monitor - Website and feed change detector
#[derive(Parser, Debug)]
#[command(
    name = "web-monitor",
    version,
    about = "Detects changes on web pages and new relevant feed entries"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory holding stored revisions
    #[arg(short, long, default_value = ".web-monitor")]
    storage_dir: PathBuf,

    /// Render pages in a headless browser
    #[cfg(feature = "browser")]
    #[arg(long)]
    browser: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every configured site and feed once
    Check,

    /// Check a single website
    Website {
        url: String,

        /// CSS selector of the watched element
        #[arg(long, default_value = "body")]
        selector: String,

        /// Display title overriding the page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Check a single feed for new relevant entries
    Feed {
        url: String,

        /// CSS selector applied to entry pages
        #[arg(long, default_value = "body")]
        selector: String,

        /// Keyword pattern (repeatable); defaults to the configured keywords
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Print the storage key of a website or feed entry
    Key {
        url: String,

        /// Selector of a website target
        #[arg(long, conflicts_with = "entry")]
        selector: Option<String>,

        /// Entry URL, making `url` a feed
        #[arg(long)]
        entry: Option<String>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[cfg(feature = "browser")]
async fn build_context(cli: &Cli, config: &Config) -> Result<MonitorContext> {
    let store = Arc::new(LocalStorage::new(&cli.storage_dir));
    let notifier = Arc::new(LogNotifier);
    if cli.browser {
        MonitorContext::browser(&config.fetcher, store, notifier).await
    } else {
        MonitorContext::http(&config.fetcher, store, notifier)
    }
}

#[cfg(not(feature = "browser"))]
async fn build_context(cli: &Cli, config: &Config) -> Result<MonitorContext> {
    let store = Arc::new(LocalStorage::new(&cli.storage_dir));
    MonitorContext::http(&config.fetcher, store, Arc::new(LogNotifier))
}

/// Log the status message a result would produce.
fn print_status(config: &Config, result: MonitorResult) {
    if let Some(message) = pipeline::render_status(&result, &config.message_format) {
        log::info!("» {}", message.status);
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());
            let config = Config::load(&cli.config)?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} sites, {} feeds, {} keywords)",
                config.site_targets.len(),
                config.rss_targets.len(),
                config.keywords.len()
            );
            return Ok(());
        }
        Command::Key {
            url,
            selector,
            entry,
        } => {
            let key = match (selector, entry) {
                (_, Some(entry)) => RevisionKey::feed(url, Some(entry.as_str())),
                (Some(selector), None) => RevisionKey::website(url, selector),
                (None, None) => RevisionKey::feed(url, None),
            };
            println!("{}", key);
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load_or_default(&cli.config);
    config.validate()?;
    log::info!("Revisions stored in {}", cli.storage_dir.display());

    let ctx = build_context(&cli, &config).await?;
    let outcome = run_command(&cli.command, &ctx, &config).await;
    if let Err(e) = ctx.shutdown().await {
        log::warn!("Failed to release fetcher: {}", e);
    }
    outcome?;

    log::info!("Done!");
    Ok(())
}

async fn run_command(command: &Command, ctx: &MonitorContext, config: &Config) -> Result<()> {
    match command {
        Command::Check => {
            let summary = pipeline::run_checks(ctx, config, RESULT_TOPIC).await;

            for result in &summary.websites {
                print_status(config, result.clone().into());
            }
            for result in summary.feeds.iter().flat_map(|f| &f.matches) {
                print_status(config, result.clone().into());
            }

            log::info!(
                "Checked {} sites and {} feeds in {}ms: {} changed, {} matched, {} failed",
                summary.websites.len(),
                summary.feeds.len(),
                (summary.end_time - summary.start_time).num_milliseconds(),
                summary.changed_websites(),
                summary.matched_entries(),
                summary.failures.len()
            );
            for (url, error) in &summary.failures {
                log::warn!("  {}: {}", url, error);
            }
        }

        Command::Website {
            url,
            selector,
            title,
        } => {
            let mut target = WebsiteTarget::new(url, selector);
            target.title = title.clone();

            let result = ctx.check_website(&target, RESULT_TOPIC).await?;
            if result.text_previous.is_none() {
                log::info!("First check of {}: baseline recorded", result.url);
            } else if !result.has_changed {
                log::info!("No change on {}", result.url);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
            print_status(config, result.into());
        }

        Command::Feed {
            url,
            selector,
            keywords,
        } => {
            let keywords = if keywords.is_empty() {
                config.keywords.clone()
            } else {
                keywords.clone()
            };
            if keywords.is_empty() {
                return Err(AppError::validation(
                    "No keywords given and none configured",
                ));
            }

            let event = FeedCheckEvent {
                feed_url: url.clone(),
                selector: selector.clone(),
                keywords,
            };
            let report = ctx.check_feed(&event, RESULT_TOPIC).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            for result in report.matches {
                print_status(config, result.into());
            }
        }

        Command::Validate | Command::Key { .. } => {}
    }

    Ok(())
}
