use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use sqlsharp::codegen::CsharpGenerator;
use sqlsharp::config::GeneratorConfig;

#[derive(Debug, Clone, Subcommand)]
enum Flow {
    /// Generate one model class per base table
    Tables,
    /// Generate request/result classes per stored procedure
    Procedures,
}

#[derive(Parser, Debug)]
#[command(name = "sqlsharp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Generation flow to run
    #[command(subcommand)]
    flow: Flow,

    /// Database schema to read
    #[arg(long, default_value = "public")]
    schema: String,

    /// Path to .env file for connection config
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    if let Err(e) = run() {
        error!(error = ?e, "Fatal error");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("sqlsharp v{}", env!("CARGO_PKG_VERSION"));
    info!(flow = ?cli.flow, schema = ?cli.schema, "Starting model generation");

    let config =
        GeneratorConfig::load(&cli.env_file).context("Failed to load generator configuration")?;
    debug!(connection = ?config.redacted_connection_string(), "Loaded configuration");

    generate(&cli, &config)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[cfg(feature = "postgres")]
fn generate(cli: &Cli, config: &GeneratorConfig) -> Result<()> {
    use postgres::NoTls;
    use sqlsharp::PostgresCatalog;

    info!(connection = ?config.redacted_connection_string(), "Connecting to PostgreSQL");

    let mut client = postgres::Client::connect(&config.postgres_connection_string(), NoTls)
        .with_context(|| {
            format!(
                "Failed to connect to PostgreSQL at {}",
                config.redacted_connection_string()
            )
        })?;

    info!("Connected to database");

    let mut catalog = PostgresCatalog::new(&mut client, cli.schema.as_str());
    let generator = CsharpGenerator::new();

    match cli.flow {
        Flow::Tables => generator
            .generate_tables(&mut catalog, config)
            .context("Table model generation failed")?,
        Flow::Procedures => generator
            .generate_procedures(&mut catalog, config)
            .context("Procedure model generation failed")?,
    }

    Ok(())
}

#[cfg(not(feature = "postgres"))]
fn generate(_cli: &Cli, _config: &GeneratorConfig) -> Result<()> {
    anyhow::bail!("PostgreSQL support not enabled. Rebuild with --features postgres")
}
