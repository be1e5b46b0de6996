use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pgreshape::{
    reshape_table, ConnectionConfig, ConnectionOverrides, ReshapeOptions, ReshapeRequest,
};

#[derive(Parser)]
#[command(name = "pgreshape")]
#[command(author, version, about = "Insert a column at any position of a PostgreSQL table")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a script that inserts a new column after an existing one
    Insert {
        /// Schema of the table
        #[arg(short, long, default_value = "public")]
        schema: String,

        /// Table to reshape
        #[arg(short, long)]
        table: String,

        /// Existing column the new column goes after
        #[arg(short, long)]
        after: String,

        /// Name of the new column
        #[arg(long)]
        column: String,

        /// Type of the new column, optionally with DEFAULT or constraints
        #[arg(long = "type")]
        column_type: String,

        /// Output path for the script (defaults to <schema>.<table>.sql)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        connection: ConnectionArgs,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(clap::Args)]
struct ConnectionArgs {
    /// Connection settings file with host, port, dbname, user and password keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, env = "PGHOST")]
    host: Option<String>,

    #[arg(long, env = "PGPORT")]
    port: Option<u16>,

    #[arg(long, env = "PGDATABASE")]
    dbname: Option<String>,

    #[arg(long, env = "PGUSER")]
    user: Option<String>,

    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl ConnectionArgs {
    fn resolve(self) -> Result<ConnectionConfig> {
        let mut config = match &self.config {
            Some(path) => ConnectionConfig::load(path)?,
            None => ConnectionConfig::default(),
        };
        config.apply(ConnectionOverrides {
            host: self.host,
            port: self.port,
            dbname: self.dbname,
            user: self.user,
            password: self.password,
        });
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Insert {
            schema,
            table,
            after,
            column,
            column_type,
            output,
            connection,
            verbose,
        } => {
            init_logging(verbose);

            let options = ReshapeOptions {
                request: ReshapeRequest {
                    schema,
                    table,
                    insert_after: after,
                    new_column: column,
                    new_column_type: column_type,
                },
                connection: connection.resolve()?,
                output_path: output,
            };

            let path = reshape_table(options)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
