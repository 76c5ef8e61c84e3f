//! better-trainer CLI
//!
//! Loads skill descriptions the way the trainer page tooltips do and prints
//! them to the terminal.

use anyhow::{Context, bail};
use better_trainer::config::DEFAULT_BASE_URL;
use better_trainer::{
    ClickDisposition, DescriptionLoader, HttpFetcher, LoaderOptions, Locator, MemorySurface, PageFetcher, TargetId,
    TooltipContent, TooltipController, TooltipTarget, links,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Trainer page that lists the guild skills
const DEFAULT_TRAINER_PAGE: &str = "guild.php";

#[derive(Parser)]
#[command(name = "better-trainer", version, about = "Load trainer skill descriptions like the hover tooltips do")]
struct Cli {
    /// Base URL that locators resolve against
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Request timeout in milliseconds
    #[arg(long, global = true, default_value_t = 15_000)]
    timeout: u64,

    /// Print JSON reports instead of markdown
    #[arg(long, global = true)]
    json: bool,

    /// Retry failed primary loads once
    #[arg(long, global = true)]
    retry: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load one description by skill id or URL
    Describe {
        /// Skill id (digits) or description page URL
        locator: String,

        /// Follow the n-th viewable link inside the description
        #[arg(long)]
        follow: Option<usize>,
    },
    /// Load every tooltip target of a trainer page
    Scan {
        /// Trainer page, relative to the base URL
        page: Option<String>,

        /// Read the trainer page from a file instead
        #[arg(long, conflicts_with = "page")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = LoaderOptions::new().base_url(&cli.base_url)?.timeout(cli.timeout);
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&options)?);

    match &cli.command {
        Command::Describe { locator, follow } => describe(&cli, locator, *follow, options, fetcher).await,
        Command::Scan { page, file } => scan(&cli, page.as_deref(), file.as_ref(), options, fetcher).await,
    }
}

async fn describe(
    cli: &Cli,
    locator: &str,
    follow: Option<usize>,
    options: LoaderOptions,
    fetcher: Arc<dyn PageFetcher>,
) -> anyhow::Result<()> {
    let target = TooltipTarget::new(TargetId(0), Locator::from_arg(locator), locator);
    let controller = TooltipController::new(target, Arc::new(options), fetcher, Box::new(MemorySurface::new()));

    controller.load_primary().await;
    if cli.retry {
        controller.retry_primary().await;
    }

    if let Some(n) = follow {
        let fragment = controller
            .displayed()
            .fragment()
            .cloned()
            .context("Nothing to follow: the description did not load")?;
        let viewable: Vec<_> = fragment.links().into_iter().filter(|l| links::is_viewable(&l.url)).collect();
        let link = viewable
            .get(n)
            .with_context(|| format!("No viewable link #{} ({} available)", n, viewable.len()))?;

        match controller.click(&link.href) {
            ClickDisposition::Intercepted(navigation) => {
                navigation.run().await;
            }
            ClickDisposition::PassThrough => bail!("Link {} was not intercepted", link.url),
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&controller.report())?);
    } else {
        print_controller(&controller);
    }
    Ok(())
}

async fn scan(
    cli: &Cli,
    page: Option<&str>,
    file: Option<&PathBuf>,
    options: LoaderOptions,
    fetcher: Arc<dyn PageFetcher>,
) -> anyhow::Result<()> {
    let host_html = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let url = Locator::Url(page.unwrap_or(DEFAULT_TRAINER_PAGE).to_string()).resolve(&options.base_url)?;
            fetcher.fetch(&url).await?
        }
    };

    let loader = DescriptionLoader::initialize(&host_html, options, fetcher, |_| Box::new(MemorySurface::new()));
    if loader.is_empty() {
        log::warn!("No tooltip targets found on the trainer page");
        return Ok(());
    }

    loader.load_all().await;
    if cli.retry {
        loader.retry_failed().await;
    }

    let reports = loader.reports();
    let loaded = reports.iter().filter(|r| r.state == "loaded").count();
    log::info!("{}/{} descriptions loaded", loaded, reports.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for controller in loader.controllers() {
            print_controller(controller);
        }
    }
    Ok(())
}

fn print_controller(controller: &TooltipController) {
    let report = controller.report();
    println!("## {} ({})", report.label, report.locator);
    if let Some(url) = &report.url {
        println!("{}", url);
    }
    println!();

    match controller.displayed() {
        TooltipContent::Fragment(fragment) => {
            println!("{}", fragment.to_markdown());
            let viewable: Vec<_> = fragment.links().into_iter().filter(|l| links::is_viewable(&l.url)).collect();
            if !viewable.is_empty() {
                println!();
                println!("Links:");
                for (i, link) in viewable.iter().enumerate() {
                    println!("  [{}] {} -> {}", i, link.text, link.url);
                }
            }
        }
        TooltipContent::Placeholder(text) => println!("{}", text),
    }
    println!();
}
