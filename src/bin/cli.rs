//! HeapDB CLI
//!
//! Command-line interface for creating, loading, querying and joining tables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use heapdb::{join, Catalog, Config, Result, Table};
use tracing_subscriber::{fmt, EnvFilter};

/// HeapDB CLI
#[derive(Parser, Debug)]
#[command(name = "heapdb-cli")]
#[command(about = "CLI for the HeapDB single-file table store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./heapdb_data")]
    data_dir: PathBuf,

    /// Field delimiter for bulk loads
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// fsync after every append
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table from a schema descriptor
    Create {
        table: String,

        /// Schema descriptor file (`<name> <type> [<width>]` per line)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Insert one row
    Insert {
        table: String,

        /// Field values in catalog order
        fields: Vec<String>,
    },

    /// Get a row by identifier
    Get { table: String, id: u64 },

    /// Bulk load a delimited text file (first line is a header)
    Load { table: String, path: PathBuf },

    /// Run a `SELECT ... [WHERE ...]` filter
    Query { table: String, filter: String },

    /// Equi-join two tables
    Join {
        inner: String,
        outer: String,

        #[arg(long)]
        inner_column: String,

        #[arg(long)]
        outer_column: String,

        /// Pin a single inner row by index position
        #[arg(long)]
        inner_row: Option<usize>,
    },

    /// Print the rows of a table
    Dump {
        table: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the offset index of a table
    Index {
        table: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete a table and its files
    Drop { table: String },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,heapdb=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .delimiter(args.delimiter)
        .sync_writes(args.sync)
        .build();

    if let Err(e) = run(&config, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn open(config: &Config, name: &str) -> Result<Table> {
    let catalog = Catalog::load(&config.schema_path(name))?;
    Table::open(config, name, catalog)
}

fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Create { table, schema } => {
            let catalog = Catalog::import(&schema)?;
            std::fs::create_dir_all(&config.data_dir)
                .map_err(|e| heapdb::HeapError::io(heapdb::IoOp::Open, &config.data_dir, e))?;
            catalog.save(&config.schema_path(&table))?;
            let table = Table::open(config, table, catalog)?;
            println!(
                "created '{}' ({} columns, {} bytes per record)",
                table.name(),
                table.catalog().len(),
                table.record_size()
            );
        }
        Commands::Insert { table, fields } => {
            let mut table = open(config, &table)?;
            let id = table.insert(&fields)?;
            println!("{}", id);
        }
        Commands::Get { table, id } => {
            let table = open(config, &table)?;
            match table.read_row_by_id(id)? {
                Some(row) => println!("{}", row.join(" | ")),
                None => println!("not found"),
            }
        }
        Commands::Load { table, path } => {
            let mut table = open(config, &table)?;
            let count = table.load_delimited(&path)?;
            println!("{} rows loaded", count);
        }
        Commands::Query { table, filter } => {
            let table = open(config, &table)?;
            let cursor = table.query(&filter)?;
            let header: Vec<&str> = cursor
                .catalog()
                .columns()
                .iter()
                .map(|c| c.name.as_str())
                .collect();
            println!("{}", header.join(" | "));
            for row in cursor {
                println!("{}", row.join(" | "));
            }
        }
        Commands::Join {
            inner,
            outer,
            inner_column,
            outer_column,
            inner_row,
        } => {
            let inner = open(config, &inner)?;
            let outer = open(config, &outer)?;
            let pairs = match inner_row {
                Some(position) => join::index_nested_loop_join(
                    &inner,
                    &outer,
                    &outer_column,
                    &inner_column,
                    position,
                )?,
                None => join::nested_loop_join(&inner, &outer, &inner_column, &outer_column)?,
            };
            for (left, right) in join::materialize(&inner, &outer, &pairs)? {
                println!("{} || {}", left.join(" | "), right.join(" | "));
            }
            println!("{} pairs", pairs.len());
        }
        Commands::Dump { table, limit } => {
            let table = open(config, &table)?;
            let limit = limit.unwrap_or(usize::MAX);
            let mut reader = table.reader();
            for entry in table.entries().iter().take(limit) {
                let row = reader.read_row_at(entry.offset)?;
                println!("{} | {}", entry.id, row.join(" | "));
            }
        }
        Commands::Index { table, limit } => {
            let table = open(config, &table)?;
            let limit = limit.unwrap_or(usize::MAX);
            for entry in table.entries().iter().take(limit) {
                println!("{} {}", entry.id, entry.offset);
            }
        }
        Commands::Drop { table } => {
            let schema_path = config.schema_path(&table);
            let mut table = open(config, &table)?;
            table.drop()?;
            std::fs::remove_file(&schema_path)
                .map_err(|e| heapdb::HeapError::io(heapdb::IoOp::Remove, &schema_path, e))?;
            println!("dropped '{}'", table.name());
        }
    }
    Ok(())
}
