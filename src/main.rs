use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use motorank::{
    load_records, write_report, Config, FixedYear, Pipeline, SystemYear, Wait, YearSource,
    DEFAULT_RECORDS, DEFAULT_THRESHOLD, DEFAULT_WORKERS,
};

/// Rank vehicle records in parallel and write a report of those below the threshold
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file holding the input records
    #[arg(default_value = "data/motos.json")]
    input: PathBuf,

    /// Path of the text report
    #[arg(short, long, default_value = "data/motos_report.txt")]
    output: PathBuf,

    /// Keep records whose rank is strictly below this value
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: i32,

    /// Bounded buffer capacity [default: half the expected records]
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Number of worker threads, 0 for one per logical CPU
    #[arg(short, long, default_value_t = DEFAULT_WORKERS, env = "MOTORANK_WORKERS")]
    workers: usize,

    /// Number of records the input must contain, 0 to accept any count
    #[arg(short, long, default_value_t = DEFAULT_RECORDS)]
    expected: usize,

    /// Rank against this year instead of the current one
    #[arg(short, long)]
    year: Option<i32>,

    /// Busy-retry on the buffer instead of blocking
    #[arg(long)]
    spin: bool,
}
impl Args {
    fn config(&self) -> motorank::Result<Config> {
        let mut builder = Config::builder()
            .expected_records(self.expected)
            .threshold(self.threshold)
            .workers(self.workers)
            .wait(if self.spin { Wait::Spin } else { Wait::Block });
        if let Some(capacity) = self.capacity {
            builder = builder.capacity(capacity);
        }
        builder.build()
    }

    fn clock(&self) -> Box<dyn YearSource> {
        match self.year {
            Some(year) => Box::new(FixedYear(year)),
            None => Box::new(SystemYear),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.config()?;

    // fail before any thread starts if the input is unusable
    let records = load_records(&args.input, config.expected_records)?;

    let outcome = Pipeline::new(config)?.run(&records, args.clock().as_ref())?;
    write_report(&args.output, &records, &outcome.results)?;

    eprintln!(
        "Kept {} of {} records (rank < {}, year {})",
        outcome.results.len(),
        records.len(),
        config.threshold,
        outcome.current_year
    );
    Ok(())
}
