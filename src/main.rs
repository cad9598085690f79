use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{error, info};

mod aggregate;
mod chart;
mod error;
mod ingest;
mod logging;
mod models;
mod report;

use models::Granularity;

#[derive(Parser)]
#[command(name = "nps-trend")]
#[command(about = "Stacked NPS category shares over time from a survey CSV", long_about = None)]
struct Cli {
    /// CSV with `timestamp` and `nps` columns
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Bucket size: week, month, quarter or year
    #[arg(long, default_value = "month")]
    granularity: Granularity,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the chart here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn run(
    csv: &Path,
    granularity: Granularity,
    format: OutputFormat,
) -> anyhow::Result<Option<String>> {
    let rows = ingest::read_responses_from_path(csv)?;
    let records = aggregate::aggregate(&rows, granularity);

    if records.is_empty() {
        return Ok(None);
    }

    let chart = chart::render(&records)?;
    let rendered = match format {
        OutputFormat::Json => chart::chart_to_json(&chart)?,
        OutputFormat::Text => {
            report::build_report(&chart, &csv.display().to_string(), granularity)
        }
    };
    Ok(Some(rendered))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let Some(csv) = cli.csv.as_deref() else {
        println!("Waiting for a CSV file (pass --csv <PATH>).");
        return Ok(());
    };

    info!(file = %csv.display(), granularity = %cli.granularity, "building NPS chart");
    let rendered = match run(csv, cli.granularity, cli.format) {
        Ok(Some(rendered)) => rendered,
        Ok(None) => {
            println!("No responses found in {}.", csv.display());
            return Ok(());
        }
        Err(err) => {
            let invalid_input = err
                .downcast_ref::<error::NpsError>()
                .is_some_and(error::NpsError::is_validation);
            error!("no chart rendered: {err:#}");
            std::process::exit(if invalid_input { 2 } else { 1 });
        }
    };

    match &cli.out {
        Some(out) => {
            std::fs::write(out, rendered)
                .with_context(|| format!("failed to write chart to {}", out.display()))?;
            println!("Chart written to {}.", out.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
