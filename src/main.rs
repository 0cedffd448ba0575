use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use soundcompare::config::{FingerprintConfig, PercentageBasis, SampleDecode, WindowKind};
use soundcompare::fingerprint::{
    FingerprintComparator, FingerprintStream, FingerprintSummary, Progress,
    build_fingerprint_with_progress, fingerprint_path, write_pair_dump,
};
use soundcompare::output::{ComparisonReport, OutputFormat, create_formatter};

#[derive(Parser, Debug)]
#[command(name = "soundcompare")]
#[command(about = "Build spectral fingerprints of WAV recordings and compare them", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Reproduce legacy artifacts and scores
    #[arg(long, global = true)]
    legacy: bool,

    /// Filter window
    #[arg(long, value_enum, global = true)]
    window: Option<WindowKind>,

    /// Passband start in Hz
    #[arg(long, global = true)]
    band_from: Option<f32>,

    /// Passband end in Hz
    #[arg(long, global = true)]
    band_to: Option<f32>,

    /// Sample decoding mode
    #[arg(long, value_enum, global = true)]
    decode: Option<SampleDecode>,

    /// Denominator of the overall percentage
    #[arg(long, value_enum, global = true)]
    basis: Option<PercentageBasis>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build `<wav>.fft.dat` fingerprints
    Build {
        /// WAV files to fingerprint
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Fingerprint two WAV files and compare them
    Compare {
        file_a: PathBuf,
        file_b: PathBuf,

        /// Output format: text, json, csv
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write paired bin values as `a,b` lines
        #[arg(long)]
        dump: Option<PathBuf>,

        /// Compare existing fingerprints instead of rebuilding them
        #[arg(long)]
        prebuilt: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = load_config(&args)?;

    match &args.command {
        Command::Build { files } => {
            for path in files {
                let summary = build(path, &config)?;
                println!(
                    "{}: {} frames ({} Hz, {} bit, {} ch) -> {}",
                    path.display(),
                    summary.frame_count,
                    summary.format.sample_rate,
                    summary.format.bits_per_sample,
                    summary.format.channels,
                    summary.artifact_path.display()
                );
            }
        }
        Command::Compare {
            file_a,
            file_b,
            format,
            dump,
            prebuilt,
        } => {
            if !prebuilt {
                build(file_a, &config)?;
                build(file_b, &config)?;
            }

            let a = load_artifact(file_a)?;
            let b = load_artifact(file_b)?;

            if let Some(dump_path) = dump {
                let file = File::create(dump_path)
                    .with_context(|| format!("Failed to create {}", dump_path.display()))?;
                let lines = write_pair_dump(&a, &b, file)?;
                log::info!("Wrote {} value pairs to {}", lines, dump_path.display());
            }

            let comparator = FingerprintComparator::new(&config.compare, config.frame.fft_point);
            let report = ComparisonReport::new(file_a, file_b, comparator.compare(&a, &b));

            let formatter = create_formatter(*format, args.verbose > 0);
            if let Some(header) = formatter.header() {
                println!("{}", header);
            }
            println!("{}", formatter.format(&report));
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<FingerprintConfig> {
    let mut config = match &args.config {
        Some(path) => FingerprintConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None if args.legacy => FingerprintConfig::legacy(),
        None => FingerprintConfig::default(),
    };

    if args.legacy && args.config.is_some() {
        let legacy = FingerprintConfig::legacy();
        config.filter.taps = legacy.filter.taps;
        config.decode.mode = legacy.decode.mode;
        config.compare.basis = legacy.compare.basis;
        config.compare.frame_ratio = legacy.compare.frame_ratio;
    }
    if let Some(window) = args.window {
        config.filter.window = window;
    }
    if let Some(band_from) = args.band_from {
        config.filter.band_from = band_from;
    }
    if let Some(band_to) = args.band_to {
        config.filter.band_to = band_to;
    }
    if let Some(mode) = args.decode {
        config.decode.mode = mode;
    }
    if let Some(basis) = args.basis {
        config.compare.basis = basis;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build(path: &Path, config: &FingerprintConfig) -> anyhow::Result<FingerprintSummary> {
    let mut last_decile = 0;
    build_fingerprint_with_progress(path, config, |progress: Progress| {
        let decile = (progress.fraction() * 10.0) as usize;
        if decile > last_decile {
            last_decile = decile;
            log::debug!(
                "{}: frame {}/{}",
                path.display(),
                progress.frame,
                progress.total_frames
            );
        }
        ControlFlow::Continue(())
    })
    .with_context(|| format!("Failed to fingerprint {}", path.display()))
}

fn load_artifact(wav_path: &Path) -> anyhow::Result<FingerprintStream> {
    let artifact = fingerprint_path(wav_path);
    FingerprintStream::load(&artifact)
        .with_context(|| format!("Failed to read fingerprint {}", artifact.display()))
}
