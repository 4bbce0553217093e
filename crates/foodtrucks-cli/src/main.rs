use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foodtrucks_core::{Coordinates, SearchCriteria, SearchQuery, StatusFilter};
use foodtrucks_engine::{execute, CsvFileSource, DatasetStore, LoadOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "foodtrucks-cli")]
#[command(about = "Search the food truck permit dataset from the command line")]
struct Cli {
    /// Permit CSV to search.
    #[arg(
        long,
        global = true,
        env = "FOODTRUCKS_DATA_PATH",
        default_value = "datastore/Mobile_Food_Facility_Permit.csv"
    )]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one search and print the result as JSON.
    Search {
        #[command(subcommand)]
        mode: SearchMode,

        /// Only return permits with this status (APPROVED, REQUESTED, EXPIRED).
        #[arg(long, global = true)]
        status: Option<StatusFilter>,

        /// Maximum number of results (1-100).
        #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..=100))]
        limit: Option<u16>,
    },
}

#[derive(Debug, Subcommand)]
enum SearchMode {
    /// Applicant name contains TEXT.
    Name { text: String },
    /// Address contains TEXT.
    Street { text: String },
    /// Nearest permits to a point.
    #[command(allow_negative_numbers = true)]
    Near { latitude: f64, longitude: f64 },
}

impl SearchMode {
    fn into_criteria(self) -> SearchCriteria {
        match self {
            SearchMode::Name { text } => SearchCriteria::Name { applicant: text },
            SearchMode::Street { text } => SearchCriteria::Street { street: text },
            SearchMode::Near {
                latitude,
                longitude,
            } => SearchCriteria::Proximity {
                origin: Coordinates {
                    latitude,
                    longitude,
                },
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            mode,
            status,
            limit,
        } => run_search(cli.data, mode, status, limit),
    }
}

fn run_search(
    data: PathBuf,
    mode: SearchMode,
    status: Option<StatusFilter>,
    limit: Option<u16>,
) -> anyhow::Result<()> {
    let store = DatasetStore::new(CsvFileSource::new(data));
    if let LoadOutcome::SourceUnavailable { reason } = store.load() {
        anyhow::bail!("could not load permit data: {reason}");
    }

    let query = SearchQuery {
        criteria: mode.into_criteria(),
        status,
        limit: limit.map(usize::from),
    };
    let result = execute(&store.current_snapshot(), &query)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
