use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dao-catalog")]
#[command(about = "Collective DAO Archive Catalog: web front end and record store", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Serve the landing page and the searchable catalog.
    Serve {
        /// Address to bind (env: CATALOG_BIND)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (env: CATALOG_PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Base URL of the search backend (env: BACKEND_URL)
        #[arg(long)]
        backend_url: Option<String>,
        /// Request worker threads (env: CATALOG_WORKERS)
        #[arg(long)]
        workers: Option<usize>,
        /// JSON config file (env: CATALOG_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create the schema if needed and upsert the built-in records.
    Seed {
        /// SQLite database file (env: DATABASE_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
        /// JSON config file (env: CATALOG_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },

    /// List records stored in the database, newest first.
    Records {
        /// SQLite database file (env: DATABASE_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
        /// JSON config file (env: CATALOG_CONFIG)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Only records in this category id
        #[arg(long)]
        category: Option<i64>,
        /// Show a single record, including its summary
        #[arg(long, conflicts_with = "category")]
        id: Option<i64>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}
