use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use webfont_dl::app::ports::HttpClientPort;
use webfont_dl::catalog::{CatalogView, FontEntry};
use webfont_dl::common::RetrievalResult;
use webfont_dl::observability::init_logging;
use webfont_dl::{
    CatalogCache, CatalogLoader, Config, FontError, FontFormat, PlatformRegistrar, ReqwestHttp,
    RetrieveUseCase, SingleMatch,
};

#[derive(Parser)]
#[command(name = "webfont-dl")]
#[command(about = "Search, download and install Google Fonts")]
#[command(version)]
struct Cli {
    /// Ignore the cached catalog and fetch a fresh copy
    #[arg(long, global = true)]
    refresh: bool,

    /// Verbose logging on stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search families by name (or by category)
    Search {
        term: Vec<String>,
        #[arg(long)]
        category: bool,
    },
    /// Show details of one family
    Info { family: Vec<String> },
    /// Download variant files into a folder
    Download {
        family: Vec<String>,
        /// Variants, comma-separated (default: all)
        #[arg(long, short = 'v', value_delimiter = ',')]
        variants: Vec<String>,
        /// Destination folder (default: current directory)
        #[arg(long, short = 'd')]
        dest: Option<PathBuf>,
        #[arg(long, default_value_t = FontFormat::Ttf)]
        format: FontFormat,
    },
    /// Install TTF variants into the user font directory
    Install {
        family: Vec<String>,
        #[arg(long, short = 'v', value_delimiter = ',')]
        variants: Vec<String>,
    },
    /// Print the stylesheet URL of a family
    Link {
        family: Vec<String>,
        #[arg(long, short = 'v', value_delimiter = ',')]
        variants: Vec<String>,
    },
    /// Refresh the cached catalog
    Refresh,
    /// Manage the local catalog cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete the cached catalog
    Clear,
    /// Print the cache location
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(&config.log_dir(), cli.verbose);
    debug!("Using config {:?}", config);

    let http: Arc<dyn HttpClientPort> = Arc::new(ReqwestHttp::new(config.http_settings()));
    let cache = CatalogCache::new(config.cache_path());
    let loader = CatalogLoader::with_endpoints(
        http.clone(),
        cache.clone(),
        &config.api.catalog_url,
        &config.api.detail_base_url,
    );
    let retriever = RetrieveUseCase::new(http, Arc::new(PlatformRegistrar::new()));

    match &cli.command {
        Commands::Cache { action } => {
            match action {
                CacheAction::Clear => {
                    cache.clear();
                    println!("Cache cleared: {}", cache.path().display());
                }
                CacheAction::Path => println!("{}", cache.path().display()),
            }
            return Ok(());
        }
        Commands::Refresh => {
            loader.load(true).await?;
            println!("Catalog refreshed: {} families", loader.len());
            return Ok(());
        }
        _ => {}
    }

    let outcome = loader.load(cli.refresh).await?;
    info!("Catalog ready ({} families, from cache: {})", loader.len(), outcome.from_cache);
    let catalog = loader.view();

    match cli.command {
        Commands::Search { term, category } => {
            let term = term.join(" ");
            let results = if category {
                catalog.search_category(&term)
            } else {
                catalog.search_family(&term)
            };
            print_results(&results);
        }
        Commands::Info { family } => {
            if let Some(entry) = resolve(&catalog, &family.join(" ")) {
                print_info(&entry);
            }
        }
        Commands::Link { family, variants } => {
            if let Some(entry) = resolve(&catalog, &family.join(" ")) {
                println!("{}", entry.stylesheet_url_with(&variants));
            }
        }
        Commands::Download { family, variants, dest, format } => {
            if let Some(entry) = resolve(&catalog, &family.join(" ")) {
                let outcome = retriever.download(&entry, &variants, dest, format).await;
                report(&entry, outcome)?;
            }
        }
        Commands::Install { family, variants } => {
            if let Some(entry) = resolve(&catalog, &family.join(" ")) {
                let outcome = retriever.install(&entry, &variants).await;
                report(&entry, outcome)?;
            }
        }
        Commands::Refresh | Commands::Cache { .. } => {}
    }
    Ok(())
}

fn resolve(catalog: &CatalogView, name: &str) -> Option<Arc<FontEntry>> {
    match catalog.resolve_single(name) {
        SingleMatch::Found(entry) => Some(entry),
        SingleMatch::NotFound => {
            println!("No font matches \"{}\"", name);
            None
        }
        SingleMatch::Ambiguous(view) => {
            println!("\"{}\" matches {} fonts, be more specific:", name, view.len());
            for family in view.families() {
                println!("   - {}", family);
            }
            None
        }
    }
}

fn print_results(results: &CatalogView) {
    if let Some(filter) = results.filter() {
        println!("{} result(s) for {} \"{}\"", results.len(), filter.field, filter.term);
    }
    for entry in results.iter() {
        println!(
            "   {} ({}) [{}]",
            entry.family(),
            entry.category().unwrap_or("unknown"),
            entry.variants().join(", ")
        );
    }
}

fn print_info(entry: &FontEntry) {
    println!("{}", entry.family());
    println!("   Category: {}", entry.category().unwrap_or("unknown"));
    println!("   Variants: {}", entry.variants().join(", "));
    if !entry.subsets().is_empty() {
        println!("   Subsets: {}", entry.subsets().join(", "));
    }
    if let Some(modified) = entry.last_modified() {
        println!("   Last modified: {}", modified);
    }
    println!("   CSS: {}", entry.stylesheet_url());
}

/// Prints what was placed; any failure is handed back so the process exits non-zero.
fn report(entry: &FontEntry, outcome: Result<Vec<RetrievalResult>, FontError>) -> Result<(), FontError> {
    match outcome {
        Ok(results) if results.is_empty() => {
            println!("Nothing to retrieve for {}: no requested variant is available", entry.family());
            Ok(())
        }
        Ok(results) => {
            print_placed(&results);
            Ok(())
        }
        Err(FontError::PartialFailure(partial)) => {
            print_placed(&partial.succeeded);
            println!(
                "{} succeeded, {} failed:",
                partial.succeeded.len(),
                partial.failed_count()
            );
            for failure in &partial.failures {
                println!("   - {}: {}", failure.variant, failure.reason);
            }
            Err(FontError::PartialFailure(partial))
        }
        Err(e) => {
            error!("Retrieval of {} failed: {}", entry.family(), e);
            Err(e)
        }
    }
}

fn print_placed(results: &[RetrievalResult]) {
    for result in results {
        println!("   {} {} -> {}", result.family, result.variant, result.path.display());
    }
}
