use anyhow::{bail, Context, Result};
use clap::Parser;
use mattekey::output::{FileOutput, OutputSink};
use mattekey::source::{FileSource, ImageSource};
use mattekey::{key_image_in_place, AlphaCoverage, KeyConfig, MatteColor, SpillRule};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Key a solid matte color out of images and suppress its spill.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input images
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Output file (only with a single input)
    #[arg(short, long, value_name = "FILE", required_unless_present = "out_dir", conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Output directory, each input is written as <stem>.png
    #[arg(short = 'd', long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Matte color: magenta, white, a hex color or R,G,B
    #[arg(short, long, default_value = "magenta")]
    matte: MatteColor,

    /// Distance to the matte below which pixels become fully transparent
    #[arg(short, long, default_value_t = 80.0, value_name = "FLOAT")]
    tolerance: f64,

    /// Distance over which alpha ramps from transparent to opaque
    #[arg(short, long, default_value_t = 40.0, value_name = "FLOAT")]
    soft_edge: f64,

    /// Override the despill rule picked for the matte
    #[arg(long, value_name = "DOMINANT,REFERENCE,COMPENSATED", conflicts_with = "no_despill")]
    despill: Option<SpillRule>,

    /// Only key alpha, leave colors untouched
    #[arg(long)]
    no_despill: bool,

    /// Number of worker threads for per-pixel work
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// One input and where its keyed result goes.
struct Job {
    source: FileSource,
    output: FileOutput,
}

#[derive(Default)]
struct StageTimes {
    decode: Duration,
    key: Duration,
    encode: Duration,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("mattekey={log_level}"))),
        )
        .with_target(false)
        .init();

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns the number of images that failed.
fn run(args: &Args) -> Result<usize> {
    let config = build_config(args)?;
    let Plan { jobs, skipped } = plan_jobs(args)?;

    if let Some(threads) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    tracing::info!(
        "Matte {} ({}), tolerance={}, soft_edge={}",
        config.matte(),
        config.matte().family(),
        config.tolerance(),
        config.soft_edge()
    );
    match config.spill_rule() {
        Some(rule) => tracing::info!("Despill rule: {}", rule),
        None if args.no_despill => tracing::info!("Despill disabled"),
        None => tracing::warn!(
            "No despill rule for {} mattes, edge pixels keep their matte tint",
            config.matte().family()
        ),
    }

    let total = jobs.len();
    let mut failed = skipped;
    let mut times = StageTimes::default();

    for (index, mut job) in jobs.into_iter().enumerate() {
        let _span = tracing::info_span!("image", n = index + 1, of = total).entered();

        match process(&mut job.source, &mut job.output, &config, &mut times) {
            Ok(coverage) => {
                tracing::info!(
                    "Processed {} -> {}",
                    job.source.describe(),
                    job.output.describe()
                );
                tracing::debug!(
                    "Coverage: transparent={}, partial={}, opaque={}",
                    coverage.transparent,
                    coverage.partial,
                    coverage.opaque
                );
            }
            Err(err) => {
                failed += 1;
                tracing::error!("{}: {err:#}", job.source.describe());
            }
        }
    }

    let done = total + skipped - failed;
    if done > 0 {
        let per_image = |d: Duration| d.as_secs_f64() * 1000.0 / done as f64;
        tracing::debug!(
            "Average: decode={:.1}ms, key={:.1}ms, encode={:.1}ms",
            per_image(times.decode),
            per_image(times.key),
            per_image(times.encode)
        );
    }
    tracing::info!("Done: {} processed, {} failed", done, failed);

    Ok(failed)
}

fn build_config(args: &Args) -> Result<KeyConfig> {
    let config = KeyConfig::new(args.matte, args.tolerance, args.soft_edge)
        .context("Invalid keying parameters")?;

    Ok(if args.no_despill {
        config.with_spill_rule(None)
    } else if let Some(rule) = args.despill {
        config.with_spill_rule(Some(rule))
    } else {
        config
    })
}

/// Jobs to run, plus inputs that were dropped while planning.
struct Plan {
    jobs: Vec<Job>,
    skipped: usize,
}

/// Option misuse and output collisions abort the run. An input that can't be
/// mapped to a destination is logged and counted as failed.
fn plan_jobs(args: &Args) -> Result<Plan> {
    if let Some(output) = &args.output {
        if args.inputs.len() != 1 {
            bail!(
                "--output takes a single input, got {}; use --out-dir for batches",
                args.inputs.len()
            );
        }
        let output = FileOutput::new(output).context("Cannot write keyed image")?;
        return Ok(Plan {
            jobs: vec![Job {
                source: FileSource::new(&args.inputs[0]),
                output,
            }],
            skipped: 0,
        });
    }

    let Some(dir) = &args.out_dir else {
        bail!("either --output or --out-dir is required");
    };

    let mut seen = HashSet::new();
    let mut plan = Plan {
        jobs: Vec::with_capacity(args.inputs.len()),
        skipped: 0,
    };
    for input in &args.inputs {
        let Some(destination) = batch_destination(dir, input) else {
            tracing::error!("{}: no file name to derive an output from", input.display());
            plan.skipped += 1;
            continue;
        };
        if !seen.insert(destination.clone()) {
            bail!(
                "{} would overwrite another output at {}",
                input.display(),
                destination.display()
            );
        }
        plan.jobs.push(Job {
            source: FileSource::new(input),
            output: FileOutput::png(destination),
        });
    }
    Ok(plan)
}

fn batch_destination(dir: &Path, input: &Path) -> Option<PathBuf> {
    let mut name = input.file_stem()?.to_os_string();
    name.push(".png");
    Some(dir.join(name))
}

fn process<S, O>(
    source: &mut S,
    output: &mut O,
    config: &KeyConfig,
    times: &mut StageTimes,
) -> Result<AlphaCoverage>
where
    S: ImageSource,
    O: OutputSink,
{
    let decode_start = Instant::now();
    let mut image = source.load()?;
    let decode_time = decode_start.elapsed();

    let key_start = Instant::now();
    key_image_in_place(&mut image, config);
    let key_time = key_start.elapsed();

    let encode_start = Instant::now();
    output.write_image(&image)?;
    let encode_time = encode_start.elapsed();

    tracing::debug!(
        "{}x{}: decode={:.1}ms, key={:.1}ms, encode={:.1}ms",
        image.width(),
        image.height(),
        decode_time.as_secs_f64() * 1000.0,
        key_time.as_secs_f64() * 1000.0,
        encode_time.as_secs_f64() * 1000.0
    );

    times.decode += decode_time;
    times.key += key_time;
    times.encode += encode_time;

    Ok(AlphaCoverage::measure(&image))
}
