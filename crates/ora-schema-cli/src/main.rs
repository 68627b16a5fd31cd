//! ora-schema CLI - Oracle schema reflection and DDL synthesis.

use clap::{Parser, Subcommand};
use ora_schema::typemap::{self, LogicalType};
use ora_schema::{
    apply_model, Config, OracleTableSchema, SchemaError, SchemaModel, SchemaProvider,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "ora-schema")]
#[command(about = "Oracle schema reflection and DDL synthesis")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Echo every SQL statement sent to the database to stderr
    #[arg(long)]
    sql_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tables owned by the connected user
    Tables,

    /// Show the columns of a table
    Columns {
        /// Table name, exactly as stored in the catalog
        table: String,
    },

    /// Print the Oracle type for a logical column type (no connection needed)
    ColumnType {
        /// Logical type, e.g. string, int32, decimal, datetime
        logical: LogicalType,

        /// Maximum length, or precision for decimals
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        max_length: i32,

        /// Minimum length, or scale for decimals
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        min_length: i32,
    },

    /// Create the tables, columns and indexes a model file declares
    Apply {
        /// Path to the YAML schema model
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Drop an index when it exists
    DropIndex {
        table: String,
        index: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), SchemaError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    // Pure type lookup; no configuration or session involved.
    if let Commands::ColumnType {
        logical,
        max_length,
        min_length,
    } = cli.command
    {
        let native = typemap::column_type(logical, max_length, min_length).ok_or_else(|| {
            SchemaError::UnmappableType {
                column: "-".to_string(),
                logical: logical.to_string(),
            }
        })?;
        if cli.output_json {
            println!(
                "{}",
                serde_json::json!({ "logical": logical.as_str(), "native": native })
            );
        } else {
            println!("{}", native);
        }
        return Ok(());
    }

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let model = match &cli.command {
        Commands::Apply { model } => Some(load_model(model)?),
        _ => None,
    };

    let schema = OracleTableSchema::connect(&config.connection).await?;
    if cli.sql_log {
        schema.set_log(Some(Arc::new(|sql: &str| eprintln!("SQL> {}", sql))));
    }

    let result = execute(&schema, cli.command, model, cli.output_json).await;
    if let Err(e) = schema.close().await {
        tracing::warn!("Closing the session failed: {}", e);
    }
    result
}

fn load_model(path: &Path) -> Result<SchemaModel, SchemaError> {
    let model = SchemaModel::load(path)?;
    info!(
        "Loaded schema model from {:?} ({} tables)",
        path,
        model.tables.len()
    );
    Ok(model)
}

async fn execute<P: SchemaProvider>(
    schema: &P,
    command: Commands,
    model: Option<SchemaModel>,
    output_json: bool,
) -> Result<(), SchemaError> {
    match command {
        Commands::ColumnType { .. } => {}

        Commands::Tables => {
            let tables = schema.get_tables().await?;
            if output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for table in &tables {
                    println!("{}", table.name);
                }
                println!("\n{} tables", tables.len());
            }
        }

        Commands::Columns { table } => {
            let columns = schema.get_table_columns(&table).await?;
            if columns.is_empty() {
                return Err(SchemaError::Config(format!(
                    "Table not found or has no columns: {}",
                    table
                )));
            }

            if output_json {
                println!("{}", serde_json::to_string_pretty(&columns)?);
            } else {
                println!("Table {}:", table);
                for column in &columns {
                    let mut flags = Vec::new();
                    if column.is_key {
                        flags.push("key".to_string());
                    }
                    if column.is_auto_increment {
                        flags.push("auto_increment".to_string());
                    }
                    if !column.is_nullable {
                        flags.push("not null".to_string());
                    }
                    for index in &column.indexes {
                        flags.push(format!(
                            "{}{}",
                            if index.is_unique { "unique " } else { "" },
                            index.name
                        ));
                    }
                    println!(
                        "  {:>3} {} {}({}, {}) {}",
                        column.order,
                        column.name,
                        column.data_type,
                        column.max_length,
                        column.min_length,
                        flags.join(", ")
                    );
                }
            }
        }

        Commands::Apply { .. } => {
            let model = model.ok_or(SchemaError::InvalidArgument("model"))?;
            let report = apply_model(schema, &model).await?;

            if output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\nApply completed!");
                println!("  Tables created: {}", report.tables_created.len());
                println!("  Columns added: {}", report.columns_added.len());
                println!("  Tables with new indexes: {}", report.indexes_created.len());
                if !report.type_mismatches.is_empty() {
                    println!("  Type mismatches: {:?}", report.type_mismatches);
                }
            }
        }

        Commands::DropIndex { table, index } => {
            let dropped = schema.delete_index(&table, &index).await?;
            if output_json {
                println!("{}", serde_json::json!({ "dropped": dropped }));
            } else if dropped {
                println!("Dropped index {} on {}", index, table);
            } else {
                println!("Index {} on {} does not exist", index, table);
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout stays parseable with --output-json.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
