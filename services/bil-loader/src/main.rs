//! BIL loader
//!
//! Sweeps the layers listed in a YAML config and writes one JSON document per
//! tile with data, or looks up a single coordinate.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use bil_loader::{run_sweep, BatchWriter, TileDocument};
use bil_reader::SweepConfig;

#[derive(Parser, Debug)]
#[command(name = "bil-loader")]
#[command(about = "Load BIL raster layers as per-tile JSON documents")]
struct Args {
    /// Sweep configuration file (YAML)
    #[arg(short, long, default_value = "config/sweep.yaml", env = "BIL_CONFIG")]
    config: PathBuf,

    /// Absolute tile offset to resume from (overrides the config)
    #[arg(long)]
    skip: Option<u64>,

    /// Stop after writing this many documents
    #[arg(long)]
    limit: Option<u64>,

    /// Documents per write batch
    #[arg(long, default_value_t = 1000)]
    batch_size: usize,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Look up one coordinate ("lon,lat") instead of sweeping
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    point: Option<(f64, f64)>,

    /// Log level (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lon,lat\", got \"{}\"", s))?;
    let lon = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    let lat = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    Ok((lon, lat))
}

fn init_tracing(args: &Args) {
    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);
    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {:?}", path))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    info!(config = %args.config.display(), "Starting BIL loader");

    let mut config = SweepConfig::from_yaml_file(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;
    config.apply_env_overrides();
    if let Some(skip) = args.skip {
        config.skip = skip;
    }

    let out = open_output(args.output.as_ref())?;

    if let Some((lon, lat)) = args.point {
        let mut sampler = config.build_sampler().context("Failed to set up layers")?;
        let mut writer = BatchWriter::new(out, 1);
        match sampler.sample(lon, lat)? {
            Some(record) => writer.push(record.key, &TileDocument::from(&record))?,
            None => info!(lon, lat, "No data at coordinate"),
        }
        writer.finish()?;
        return Ok(());
    }

    let filter = config.build_filter().context("Failed to set up layers")?;
    let stats = run_sweep(filter, args.limit, BatchWriter::new(out, args.batch_size))?;

    info!(
        documents = stats.documents,
        resume_skip = ?stats.last_key,
        "BIL loader finished"
    );
    Ok(())
}
