use anyhow::{Context, Result};
use certstats::{process, select, write_results, Config, Field};
use clap::Parser;
use std::{path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Top occupations and work states of certified applications"
)]
struct Args {
    /// `;`-delimited input file with a header row
    input: PathBuf,
    /// Destination for the top occupations
    occupations_out: PathBuf,
    /// Destination for the top states
    states_out: PathBuf,
    /// Approximate bytes per chunk
    #[arg(long, env = "CERTSTATS_CHUNK_SIZE")]
    chunk_size: Option<u64>,
    /// Worker threads (defaults to the number of cores)
    #[arg(long, env = "CERTSTATS_WORKERS")]
    workers: Option<usize>,
    /// YAML file with `chunk_size` and/or `workers`
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    // ─── 2) resolve configuration ────────────────────────────────────
    let base = match &args.config {
        Some(path) => Config::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    let config = base.with_overrides(args.chunk_size, args.workers);

    // ─── 3) aggregate ────────────────────────────────────────────────
    let start = Instant::now();
    info!(input = %args.input.display(), "reading input data");
    let aggregate = process::run(&args.input, &config)
        .with_context(|| format!("aggregating {}", args.input.display()))?;

    // ─── 4) rank both fields before writing anything ─────────────────
    info!("computing summaries");
    let occupations = select(&aggregate, Field::SocName)?;
    let states = select(&aggregate, Field::WorkState)?;

    // ─── 5) write ────────────────────────────────────────────────────
    info!("writing results");
    write_results(&occupations, &args.occupations_out)
        .with_context(|| format!("writing {}", args.occupations_out.display()))?;
    write_results(&states, &args.states_out)
        .with_context(|| format!("writing {}", args.states_out.display()))?;

    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}
