use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::{CompareConfig, FingerprintConfig, FrameRatio, PercentageBasis};
use crate::constants::FRAME_SENTINEL;
use crate::error::Result;
use crate::fingerprint::stream::{FingerprintStream, fingerprint_path};

/// Outcome of comparing two fingerprints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Share of matching frames, 0 to 100
    pub overall_percentage: f32,
    /// Indices of compared frames below the match threshold, ascending
    pub mismatched_frames: Vec<usize>,
    /// Match ratio of every frame closed by a sentinel
    pub frame_ratios: Vec<f32>,
    /// `min(frames_a, frames_b)`
    pub frames_compared: usize,
    pub frames_a: usize,
    pub frames_b: usize,
}

impl ComparisonResult {
    /// Mismatched frame indices joined by `;`
    pub fn mismatch_list(&self) -> String {
        self.mismatched_frames
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn matching_frames(&self) -> usize {
        self.frames_compared - self.mismatched_frames.len()
    }
}

/// Scores two fingerprints frame by frame
///
/// Both value sequences are walked in lockstep until either runs out. A bin
/// pair matches when the values differ by at most the tolerance. A sentinel
/// on either side closes the current frame and records its match ratio.
pub struct FingerprintComparator {
    config: CompareConfig,
    fft_point: usize,
}

impl FingerprintComparator {
    pub fn new(config: &CompareConfig, fft_point: usize) -> Self {
        Self {
            config: config.clone(),
            fft_point,
        }
    }

    pub fn compare(&self, a: &FingerprintStream, b: &FingerprintStream) -> ComparisonResult {
        let frame_ratios = self.frame_ratios(a, b);

        let frames_a = a.frame_count();
        let frames_b = b.frame_count();
        let frames_compared = frames_a.min(frames_b);

        let mismatched_frames: Vec<usize> = (0..frames_compared)
            .filter(|&i| {
                let ratio = frame_ratios.get(i).copied().unwrap_or(0.0);
                ratio < self.config.frame_match_threshold
            })
            .collect();
        let matching = frames_compared - mismatched_frames.len();

        let denominator = match self.config.basis {
            PercentageBasis::Compared => frames_compared,
            PercentageBasis::Longest => frames_a.max(frames_b),
        };
        let overall_percentage = if denominator == 0 {
            log::warn!("No frames to compare ({} vs {})", frames_a, frames_b);
            0.0
        } else {
            matching as f32 * 100.0 / denominator as f32
        };

        log::info!(
            "Compared {} frames ({} vs {}): {:.1}% similar, {} mismatched",
            frames_compared,
            frames_a,
            frames_b,
            overall_percentage,
            mismatched_frames.len()
        );

        ComparisonResult {
            overall_percentage,
            mismatched_frames,
            frame_ratios,
            frames_compared,
            frames_a,
            frames_b,
        }
    }

    fn frame_ratios(&self, a: &FingerprintStream, b: &FingerprintStream) -> Vec<f32> {
        let full_spectrum = (self.fft_point / 2).max(1) as f32;
        let tolerance = i32::from(self.config.tolerance);

        let mut ratios = Vec::new();
        let mut matched = 0usize;
        let mut pairs = 0usize;

        for (&x, &y) in a.values().iter().zip(b.values()) {
            if x == FRAME_SENTINEL || y == FRAME_SENTINEL {
                let ratio = match self.config.frame_ratio {
                    FrameRatio::FullSpectrum => matched as f32 / full_spectrum,
                    FrameRatio::ComparedBins if pairs == 0 => 1.0,
                    FrameRatio::ComparedBins => matched as f32 / pairs as f32,
                };
                ratios.push(ratio);
                matched = 0;
                pairs = 0;
            } else {
                pairs += 1;
                if (i32::from(x) - i32::from(y)).abs() <= tolerance {
                    matched += 1;
                }
            }
        }

        ratios
    }
}

/// Write every lockstep value pair as an `a,b` line; returns the line count
pub fn write_pair_dump<W: Write>(
    a: &FingerprintStream,
    b: &FingerprintStream,
    writer: W,
) -> Result<usize> {
    let mut writer = BufWriter::new(writer);
    let mut lines = 0;
    for (x, y) in a.values().iter().zip(b.values()) {
        writeln!(writer, "{},{}", x, y)?;
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}

/// Compare two fingerprint artifacts
pub fn compare_artifacts<P: AsRef<Path>, Q: AsRef<Path>>(
    artifact_a: P,
    artifact_b: Q,
    config: &FingerprintConfig,
) -> Result<ComparisonResult> {
    let a = FingerprintStream::load(artifact_a)?;
    let b = FingerprintStream::load(artifact_b)?;
    let comparator = FingerprintComparator::new(&config.compare, config.frame.fft_point);
    Ok(comparator.compare(&a, &b))
}

/// Compare the fingerprints previously built for two WAV files
pub fn compare_fingerprints<P: AsRef<Path>, Q: AsRef<Path>>(
    wav_a: P,
    wav_b: Q,
    config: &FingerprintConfig,
) -> Result<ComparisonResult> {
    compare_artifacts(fingerprint_path(wav_a), fingerprint_path(wav_b), config)
}
