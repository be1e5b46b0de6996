//! pgreshape: insert a column at any position of a PostgreSQL table
//!
//! PostgreSQL only appends columns. This library reads the catalog facts of
//! a table and writes a SQL script that rebuilds the table's columns with a
//! new one in the requested place, dropping and recreating everything that
//! depends on the column layout along the way. The script is only
//! generated; running it is left to the operator.

pub mod acl;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod planner;
pub mod script;
pub mod sql;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

pub use catalog::{CatalogSource, PgCatalog};
pub use config::{ConnectionConfig, ConnectionOverrides};
pub use error::ReshapeError;
pub use planner::ReshapeRequest;

/// Options for generating a reshape script
#[derive(Debug, Clone)]
pub struct ReshapeOptions {
    pub request: ReshapeRequest,
    pub connection: ConnectionConfig,
    /// Output path for the script (defaults to `<schema>.<table>.sql`)
    pub output_path: Option<PathBuf>,
}

/// Connect, snapshot the table and write the reshape script.
///
/// Returns the path of the written script. Nothing is written unless the
/// whole script could be generated.
pub fn reshape_table(options: ReshapeOptions) -> Result<PathBuf> {
    let target = options.connection.display_target();
    info!(server = %target, "connecting");

    // Step 1: Open the catalog session
    let catalog = PgCatalog::connect(&options.connection.to_pg_config(), &target)?;

    // Step 2: Snapshot, plan and render
    let script = generate_script(&catalog, &options.request)?;

    // Step 3: Write the script in one go
    let output_path = options.output_path.unwrap_or_else(|| {
        PathBuf::from(format!(
            "{}.{}.sql",
            options.request.schema, options.request.table
        ))
    });
    std::fs::write(&output_path, script).map_err(|source| ReshapeError::OutputWrite {
        path: output_path.clone(),
        source,
    })?;

    info!(path = %output_path.display(), "script written");
    Ok(output_path)
}

/// Build the snapshot from any catalog source, plan the request and render
/// the script text.
pub fn generate_script<C: CatalogSource + ?Sized>(
    catalog: &C,
    request: &ReshapeRequest,
) -> Result<String> {
    let snapshot = model::build_snapshot(catalog, &request.schema, &request.table)?;
    let plan = planner::plan(&snapshot, request)?;
    script::render_script(&plan)
}
