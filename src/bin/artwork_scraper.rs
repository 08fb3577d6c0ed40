use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use xenia_artwork_scraper::config::{ConfigLoader, ConfigOverrides, ScraperConfig};
use xenia_artwork_scraper::error::ArtworkError;
use xenia_artwork_scraper::http::BlockingHttpClient;
use xenia_artwork_scraper::marketplace::MarketplaceWalker;
use xenia_artwork_scraper::output::{JsonOutput, OutputMode, print_summary};
use xenia_artwork_scraper::walker::{CatalogWalker, RunReport};

#[derive(Parser)]
#[command(name = "artwork-scraper")]
#[command(about = "Mirror Xbox 360 title artwork (box art, banners, icons, backgrounds) into a local tree")]
#[command(version, author)]
struct Cli {
    /// JSON settings file (defaults to ./artwork-scraper.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Skip TLS certificate verification. Only for hosts with broken certificates.
    #[arg(long, global = true)]
    insecure: bool,

    /// Print the run report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download artwork for every title in the games list (default)")]
    Artwork(ArtworkArgs),
    #[command(about = "Download marketplace box art and icons named by BOX_ART_ENV / ICON_ENV")]
    Marketplace(MarketplaceArgs),
}

#[derive(Args, Default)]
struct ArtworkArgs {
    #[arg(long)]
    catalog_url: Option<String>,

    #[arg(long)]
    output: Option<String>,
}

#[derive(Args)]
struct MarketplaceArgs {
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    output: Option<String>,

    #[arg(long)]
    box_art_field: Option<String>,

    #[arg(long)]
    icon_field: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<ArtworkError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ArtworkError) -> u8 {
    if error.is_config() {
        return 2;
    }
    match error {
        ArtworkError::HttpClient(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Summary
    };

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Artwork(ArtworkArgs::default()));

    let report = match command {
        Commands::Artwork(args) => {
            config.apply_overrides(ConfigOverrides {
                catalog_url: args.catalog_url,
                output_dir: args.output,
                accept_invalid_certs: cli.insecure,
                ..ConfigOverrides::default()
            });
            run_artwork(&config)?
        }
        Commands::Marketplace(args) => {
            config.apply_overrides(ConfigOverrides {
                marketplace_url: args.url,
                marketplace_dir: args.output,
                box_art_field: args.box_art_field,
                icon_field: args.icon_field,
                accept_invalid_certs: cli.insecure,
                ..ConfigOverrides::default()
            });
            run_marketplace(&config)?
        }
    };

    match output_mode {
        OutputMode::Json => JsonOutput::print_report(&report).into_diagnostic()?,
        OutputMode::Summary => print_summary(&report),
    }
    Ok(())
}

fn run_artwork(config: &ScraperConfig) -> Result<RunReport, ArtworkError> {
    config.require_catalog_url()?;
    let client = BlockingHttpClient::new(config)?;
    CatalogWalker::new(config, &client).run()
}

fn run_marketplace(config: &ScraperConfig) -> Result<RunReport, ArtworkError> {
    config.require_marketplace_fields()?;
    let client = BlockingHttpClient::new(config)?;
    MarketplaceWalker::new(config, &client).run()
}
