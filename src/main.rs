use std::{path::PathBuf, time::Duration};

use carserv::cli::{self, CliError, SearchOptions};
use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "carserv")]
#[command(about = "Carserv - faceted search over a vehicle catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog and print the JSON response
    Search {
        /// Make substring (case-sensitive)
        #[arg(long)]
        make: Option<String>,

        /// Model substring (case-sensitive)
        #[arg(long)]
        model: Option<String>,

        /// Target price; matches within 10% either side
        #[arg(long, allow_hyphen_values = true)]
        budget: Option<String>,

        /// Exact model year
        #[arg(long, allow_hyphen_values = true)]
        year: Option<String>,

        /// Dataset file (JSON array of vehicle records)
        #[arg(long, env = "CARSERV_DATASET")]
        dataset: Option<PathBuf>,

        /// Abort the search after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Load a dataset and report what it contains
    CheckDataset {
        /// Dataset file (the embedded catalog if omitted)
        #[arg(env = "CARSERV_DATASET")]
        path: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("carserv=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            make,
            model,
            budget,
            year,
            dataset,
            timeout_ms,
            pretty,
        } => run_search(SearchOptions {
            make,
            model,
            budget,
            year,
            dataset,
            timeout: timeout_ms.map(Duration::from_millis),
            pretty,
        }),
        Commands::CheckDataset { path } => cli::check_dataset(path.as_deref()).map(|summary| {
            println!("{}", summary);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        // 2 mirrors a rejected request, 1 a failure on our side
        std::process::exit(if e.is_client_error() { 2 } else { 1 });
    }
}

fn run_search(options: SearchOptions) -> Result<(), CliError> {
    tracing::info!(
        make = ?options.make,
        model = ?options.model,
        budget = ?options.budget,
        year = ?options.year,
        "search requested"
    );
    let output = cli::execute_search(&options)?;
    println!("{}", output.json);
    Ok(())
}
