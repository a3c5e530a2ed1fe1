use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use threshold_filter::{ColumnarDataset, DataSource, FilterConfig, Scalar, ThresholdSelector};

/// Apply a threshold selection to a columnar JSON data source.
#[derive(Debug, clap::Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Filter configuration file (JSON).
    #[clap(long)]
    config: Option<PathBuf>,

    /// Print the slider range instead of filtering.
    #[clap(long)]
    range: bool,

    /// Threshold to select, as a JSON scalar (`4`, `2.5`, `"fast"`).
    /// Defaults to the smallest key in the dataset.
    #[clap(long, short = 't', allow_hyphen_values = true)]
    threshold: Option<String>,

    /// Columnar JSON input. Reads stdin when omitted.
    input: Option<PathBuf>,
}

/// Parse a threshold as a JSON scalar; anything else is taken as text.
fn parse_threshold(text: &str) -> Scalar {
    serde_json::from_str(text).unwrap_or_else(|_| Scalar::String(text.to_string()))
}

fn read_dataset(input: Option<&Path>) -> Result<ColumnarDataset> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("parsing columnar JSON")
}

fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let config = match &args.config {
        Some(path) => FilterConfig::load(path)?,
        None => FilterConfig::default(),
    };

    let dataset = read_dataset(args.input.as_deref())?;
    info!(
        "loaded {} rows, columns {:?}",
        dataset.row_count(),
        dataset.column_names()
    );

    let mut source = DataSource::new(dataset.clone());
    let mut selector = ThresholdSelector::new(dataset, config.filter(), config.refilter_base);

    if args.range {
        serde_json::to_writer_pretty(&mut *out, &selector.range()?)?;
        writeln!(out)?;
        return Ok(());
    }

    let threshold = match &args.threshold {
        Some(text) => parse_threshold(text),
        None => selector
            .initial_threshold()?
            .context("no threshold given and the key column holds no values")?,
    };
    selector
        .on_threshold_changed(&mut source, threshold)
        .context("applying threshold")?;
    serde_json::to_writer_pretty(&mut *out, source.data())?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    run(&args, &mut std::io::stdout().lock())
}
