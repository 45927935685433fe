//! romshelf CLI
//!
//! Scan ROM folders into a catalog, report duplicate files, and backfill
//! metadata from IGDB.

mod commands;
mod error;
mod spinner;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "romshelf")]
#[command(about = "Catalog ROM collections and enrich them with metadata", long_about = None)]
struct Cli {
    /// Catalog database (defaults to settings, then the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a folder and add its files to the catalog
    Scan {
        /// Folder to scan
        directory: PathBuf,

        /// Platform id (see `romshelf platforms`)
        #[arg(short, long)]
        platform: String,

        /// Server/location label recorded on each file (default from settings)
        #[arg(short, long)]
        server: Option<String>,

        /// Descend into subfolders
        #[arg(short, long)]
        recursive: bool,

        /// Don't record files already catalogued at the same path with the same hash
        #[arg(long)]
        skip_existing: bool,

        /// Print the scan result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report files that share a content hash
    Duplicates {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch missing descriptions, ratings and cover art from IGDB
    Enrich {
        /// Catalog entry ids (default: every entry missing metadata)
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<i64>>,

        /// Entries per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Seconds to pause between batches
        #[arg(long)]
        delay: Option<u64>,

        /// Print the acknowledgment and final status as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known platforms
    Platforms,

    /// Show catalog database statistics
    Stats,

    /// Manage settings and IGDB credentials
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show settings and where each credential comes from
    Show,

    /// Print the settings and credentials file paths
    Path,

    /// Write a settings file with the default values
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },

    /// Save IGDB credentials to the credentials file
    Credentials {
        #[arg(long)]
        client_id: String,

        #[arg(long)]
        client_secret: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = romshelf_lib::Settings::load()?;
    let db_path = settings.database_path(cli.db);

    match cli.command {
        Commands::Scan {
            directory,
            platform,
            server,
            recursive,
            skip_existing,
            json,
        } => commands::scan::run_scan(
            &settings,
            &db_path,
            commands::scan::ScanArgs {
                directory,
                platform,
                server,
                recursive,
                skip_existing,
                json,
            },
            cli.quiet,
        ),
        Commands::Duplicates { json } => commands::duplicates::run_duplicates(&db_path, json),
        Commands::Enrich {
            ids,
            batch_size,
            delay,
            json,
        } => commands::enrich::run_enrich(
            &settings,
            &db_path,
            romshelf_import::EnrichRequest {
                game_ids: ids,
                batch_size,
                delay_seconds: delay,
            },
            json,
            cli.quiet,
        ),
        Commands::Platforms => commands::platforms::run_platforms(&db_path),
        Commands::Stats => commands::stats::run_stats(&db_path),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings, &db_path),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::Init { force } => commands::config::run_config_init(force),
            ConfigAction::Credentials {
                client_id,
                client_secret,
            } => commands::config::run_config_credentials(client_id, client_secret),
        },
    }
}

/// Plain-message logger on stderr. `RUST_LOG` still overrides the level.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Error => writeln!(buf, "error: {}", record.args()),
            log::Level::Warn => writeln!(buf, "warning: {}", record.args()),
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}

/// Log an empty line at info level.
pub(crate) fn log_blank() {
    log::info!("");
}
