use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use soundcompare::save_wav;
use soundcompare::simulation::{add_noise, chirp, silence_then, tone, white_noise};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum SignalKind {
    Tone,
    Chirp,
    Noise,
}

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate mono PCM WAV fixtures for fingerprint testing")]
struct Args {
    /// Output file
    output: PathBuf,

    /// Signal to synthesise
    #[arg(short, long, value_enum, default_value = "tone")]
    kind: SignalKind,

    /// Tone frequency, or chirp start frequency, in Hz
    #[arg(long, default_value_t = 1000.0)]
    freq: f32,

    /// Chirp end frequency in Hz
    #[arg(long, default_value_t = 3000.0)]
    end_freq: f32,

    /// Peak amplitude (0-1)
    #[arg(short, long, default_value_t = 0.5)]
    amplitude: f32,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 2.0)]
    duration: f32,

    /// Leading silence in seconds
    #[arg(long, default_value_t = 0.0)]
    lead_in: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 8000)]
    sample_rate: u32,

    /// Bits per sample (8 or 16 are fingerprintable)
    #[arg(short, long, default_value_t = 16)]
    bits: u16,

    /// Add Gaussian noise at this SNR in dB
    #[arg(long)]
    snr: Option<f32>,

    /// Seed for noise generation
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut signal = match args.kind {
        SignalKind::Tone => tone(args.freq, args.amplitude, args.duration, args.sample_rate),
        SignalKind::Chirp => chirp(
            args.freq,
            args.end_freq,
            args.amplitude,
            args.duration,
            args.sample_rate,
        ),
        SignalKind::Noise => {
            let len = (args.duration * args.sample_rate as f32) as usize;
            white_noise(len, args.amplitude, args.seed)
        }
    };

    if let Some(snr_db) = args.snr {
        add_noise(&mut signal, snr_db, args.seed);
    }
    if args.lead_in > 0.0 {
        signal = silence_then(&signal, args.lead_in, args.sample_rate);
    }

    save_wav(&args.output, &signal, args.sample_rate, args.bits)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} samples ({:.2} s, {} bit, {} Hz) to {}",
        signal.len(),
        signal.len() as f32 / args.sample_rate as f32,
        args.bits,
        args.sample_rate,
        args.output.display()
    );
    Ok(())
}
