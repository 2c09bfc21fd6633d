mod convert;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::convert::{convert_table, DEFAULT_TABLES};

#[derive(Parser)]
#[command(name = "csv-json")]
#[command(about = "Convert CSV tables into JSON record arrays for seeding the job registry")]
struct Cli {
    /// Directory holding the `<table>.csv` inputs
    #[arg(long, default_value = "data")]
    input_dir: PathBuf,

    /// Directory the `.json` outputs are written to
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Tables to convert (file stems, without `.csv`). Defaults to the full data set.
    tables: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let tables: Vec<String> = if cli.tables.is_empty() {
        DEFAULT_TABLES.iter().map(|t| t.to_string()).collect()
    } else {
        cli.tables
    };

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("cannot create {}", cli.output_dir.display()))?;

    for table in &tables {
        convert_table(&cli.input_dir, &cli.output_dir, table, cli.pretty)?;
    }

    info!("JSON files created successfully.");
    Ok(())
}
