//! VO Conesearch - command line entry point
//!
//! Lists catalogs of a registry database, runs cone searches and predicts
//! their cost.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use vo_conesearch::{
    CatalogSelector, Config, ConeQuery, ConeSearch, SearchOptions, SearchResult, VoClient,
};

#[derive(Parser)]
#[command(name = "vo-conesearch")]
#[command(about = "Query Virtual Observatory Simple Cone Search services")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogs of a registry database
    List {
        /// Database name (defaults to CONESEARCH_DBNAME)
        #[arg(long)]
        registry: Option<String>,
        /// Case-insensitive name pattern, e.g. "usno*a"
        #[arg(long)]
        pattern: Option<String>,
        /// Sort names alphabetically
        #[arg(long)]
        sort: bool,
    },
    /// Run a cone search
    Search {
        /// Right ascension in degrees
        #[arg(allow_hyphen_values = true)]
        ra: f64,
        /// Declination in degrees
        #[arg(allow_hyphen_values = true)]
        dec: f64,
        /// Search radius in degrees
        sr: f64,
        /// Catalog name or access URL; repeat to give fallbacks in order
        #[arg(long)]
        catalog: Vec<String>,
        /// Query every catalog concurrently and print all results
        #[arg(long)]
        all: bool,
        /// Reject non-compliant responses
        #[arg(long)]
        pedantic: bool,
        /// Request all columns and log each candidate
        #[arg(long)]
        verbose: bool,
        /// Print elapsed time
        #[arg(long)]
        timer: bool,
        /// Run in the background and give up waiting after this many seconds
        #[arg(long)]
        wait: Option<f64>,
    },
    /// Predict time and row count of a cone search from small probes
    Predict {
        /// Access URL of the service
        url: String,
        /// Right ascension in degrees
        #[arg(allow_hyphen_values = true)]
        ra: f64,
        /// Declination in degrees
        #[arg(allow_hyphen_values = true)]
        dec: f64,
        /// Search radius in degrees
        sr: f64,
        /// Reject non-compliant responses
        #[arg(long)]
        pedantic: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Logging goes to stderr so results on stdout stay clean
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Using registry at {}", config.vos_baseurl);

    let client = Arc::new(VoClient::new(&config));
    let searcher = ConeSearch::with_service(config, client.clone());

    let outcome = run(&searcher, cli.command);
    debug!("Metrics: {:?}", client.metrics().summary());

    if let Err(e) = &outcome {
        error!("{}", e);
    }
    outcome
}

fn run(searcher: &ConeSearch, command: Commands) -> Result<()> {
    match command {
        Commands::List {
            registry,
            pattern,
            sort,
        } => {
            let name = registry.unwrap_or_else(|| searcher.config().conesearch_dbname.clone());
            let database = searcher.registry().get_remote_catalog_db(&name)?;
            for catalog in database.list_catalogs(pattern.as_deref(), sort) {
                println!("{}", catalog);
            }
        }
        Commands::Search {
            ra,
            dec,
            sr,
            catalog,
            all,
            pedantic,
            verbose,
            timer,
            wait,
        } => {
            let query = ConeQuery::new(ra, dec, sr)?;
            let options = SearchOptions { pedantic, verbose };
            let selector = match catalog.len() {
                0 => CatalogSelector::Default,
                1 => CatalogSelector::from(catalog[0].clone()),
                _ => CatalogSelector::from(catalog),
            };

            if all {
                for result in searcher.search_all(&query, selector, options)? {
                    print_result(&result);
                }
            } else if let Some(seconds) = wait {
                let search = searcher.conesearch_async(query, selector, options);
                print_result(&search.get(Some(wait_timeout(seconds)?))?);
            } else if timer {
                let (elapsed, result) = searcher.conesearch_timer(&query, selector, options)?;
                print_result(&result);
                println!("Elapsed: {:.3} s", elapsed);
            } else {
                print_result(&searcher.conesearch(&query, selector, options)?);
            }
        }
        Commands::Predict {
            url,
            ra,
            dec,
            sr,
            pedantic,
        } => {
            let query = ConeQuery::new(ra, dec, sr)?;
            let options = SearchOptions {
                pedantic,
                verbose: false,
            };
            let (seconds, rows) = searcher.predict_search(&url, &query, options)?;
            println!("Predicted: {:.3} s, {} rows", seconds, rows);
        }
    }

    Ok(())
}

fn wait_timeout(seconds: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("invalid --wait value {}", seconds))
}

fn print_result(result: &SearchResult) {
    println!("# {} ({} rows)", result.url, result.size());
    let header: Vec<&str> = result
        .array
        .fields()
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    println!("{}", header.join("\t"));
    for row in result.array.rows() {
        println!("{}", row.join("\t"));
    }
}
