// Module declarations
mod backend;
mod catalog_db;
mod cli;
mod config;
mod error;
mod pagination;
mod records;
mod render;
mod search_params;
mod seed;
mod server;
mod util;

// Items are re-exported at the crate root so modules can refer to each
// other through `crate::` without long paths.
#[allow(unused_imports)]
pub(crate) use backend::*;
#[allow(unused_imports)]
pub(crate) use catalog_db::*;
#[allow(unused_imports)]
pub(crate) use cli::*;
#[allow(unused_imports)]
pub(crate) use config::*;
#[allow(unused_imports)]
pub(crate) use error::*;
#[allow(unused_imports)]
pub(crate) use pagination::*;
#[allow(unused_imports)]
pub(crate) use records::*;
#[allow(unused_imports)]
pub(crate) use render::*;
#[allow(unused_imports)]
pub(crate) use search_params::*;
#[allow(unused_imports)]
pub(crate) use seed::*;
#[allow(unused_imports)]
pub(crate) use server::*;
#[allow(unused_imports)]
pub(crate) use util::*;

use std::sync::Arc;

use clap::Parser;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve {
            bind,
            port,
            backend_url,
            workers,
            config,
        } => {
            let config = AppConfig::load(ConfigOverrides {
                config_path: config,
                bind,
                port,
                backend_url,
                workers,
                ..Default::default()
            })?;
            let backend = HttpBackend::new(&config.backend_url, config.backend_timeout);
            tracing::info!(backend = backend.base_url(), "using search backend");
            let server = CatalogServer::bind(&config.listen_addr())?;
            server.run(Arc::new(backend), config.workers)?;
            Ok(())
        }

        Command::Seed { db, config, json } => {
            let config = AppConfig::load(ConfigOverrides {
                config_path: config,
                database_path: db,
                ..Default::default()
            })?;
            let mut catalog = CatalogDb::open_or_create(&config.database_path)?;
            let report = run_seed(&mut catalog)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Seeded {}: created={} unchanged={} (categories={} records={})",
                    config.database_path.display(),
                    report.created,
                    report.unchanged,
                    catalog.category_count()?,
                    catalog.record_count()?
                );
            }
            Ok(())
        }

        Command::Records {
            db,
            config,
            category,
            id,
            json,
        } => {
            let config = AppConfig::load(ConfigOverrides {
                config_path: config,
                database_path: db,
                ..Default::default()
            })?;
            let catalog = CatalogDb::open(&config.database_path)?;
            let query = RecordsQuery { category, id, json };
            write_records(&catalog, query, &mut std::io::stdout().lock())?;
            Ok(())
        }
    }
}
