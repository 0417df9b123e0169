use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Terrain .dat elevation CLI tool
#[derive(Parser)]
#[command(name = "apterrain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing .dat tile files
    #[arg(short, long, env = "APTERRAIN_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query elevation for a single coordinate
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Process elevation for multiple coordinates from a file
    Batch {
        /// Input file (CSV or GeoJSON)
        input: PathBuf,

        /// Output file (same format as input if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude (CSV only)
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude (CSV only)
        #[arg(long, default_value = "lon")]
        lon_col: String,
    },

    /// Display information about a terrain tile
    Info {
        /// Path to .dat file, or tile name (e.g., N27E086)
        #[arg(required_unless_present = "lat")]
        tile: Option<String>,

        /// Specify tile by latitude instead of filename
        #[arg(long, requires = "lon", conflicts_with = "tile", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Specify tile by longitude instead of filename
        #[arg(long, requires = "lat", conflicts_with = "tile", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List terrain tiles in the data directory
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query { lat, lon, json } => commands::query::run(cli.data_dir, lat, lon, json),
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
        } => commands::batch::run(cli.data_dir, input, output, lat_col, lon_col),
        Commands::Info { tile, lat, lon } => commands::info::run(cli.data_dir, tile, lat, lon),
        Commands::List => commands::list::run(cli.data_dir),
    }
}
