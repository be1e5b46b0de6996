//! Error types for pgreshape

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a reshape run
#[derive(Error, Debug)]
pub enum ReshapeError {
    #[error("Failed to connect to {target}")]
    Connection {
        target: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Failed to start the async runtime")]
    Runtime {
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog query for {fact} failed")]
    Query {
        fact: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Schema \"{schema}\" does not exist")]
    SchemaNotFound { schema: String },

    #[error("Table \"{schema}\".\"{table}\" does not exist")]
    TableNotFound { schema: String, table: String },

    #[error("Offset column \"{column}\" does not exist in \"{schema}\".\"{table}\"")]
    OffsetNotFound {
        schema: String,
        table: String,
        column: String,
    },

    #[error(
        "Offset column \"{column}\" is the last column of \"{schema}\".\"{table}\"; \
         use ALTER TABLE ... ADD COLUMN instead"
    )]
    OffsetIsLastColumn {
        schema: String,
        table: String,
        column: String,
    },

    #[error("Column \"{column}\" already exists in \"{schema}\".\"{table}\"")]
    ColumnAlreadyExists {
        schema: String,
        table: String,
        column: String,
    },

    #[error(
        "Table \"{schema}\".\"{table}\" is referenced by foreign keys on other tables \
         ({references}); drop them before reshaping and recreate them afterwards"
    )]
    ReferencedByForeignKeys {
        schema: String,
        table: String,
        /// `schema.table.constraint` entries, comma separated
        references: String,
    },

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Failed to write script to {path}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReshapeError {
    /// True for the planner preconditions checked against a snapshot
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ReshapeError::OffsetNotFound { .. }
                | ReshapeError::OffsetIsLastColumn { .. }
                | ReshapeError::ColumnAlreadyExists { .. }
                | ReshapeError::ReferencedByForeignKeys { .. }
        )
    }
}
