mod csv;
mod json;
mod text;

use std::path::Path;

use chrono::Utc;
use rolling_stats::Stats;
use serde::Serialize;

use crate::fingerprint::ComparisonResult;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Distribution of per-frame match ratios
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatioStats {
    pub count: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl RatioStats {
    pub fn from_ratios(ratios: &[f32]) -> Option<Self> {
        let mut stats: Stats<f32> = Stats::new();
        for &ratio in ratios {
            stats.update(ratio);
        }
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// A comparison result with the files it came from
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub file_a: String,
    pub file_b: String,
    #[serde(flatten)]
    pub result: ComparisonResult,
    pub ratio_stats: Option<RatioStats>,
}

impl ComparisonReport {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(file_a: P, file_b: Q, result: ComparisonResult) -> Self {
        let ratios = &result.frame_ratios[..result.frames_compared.min(result.frame_ratios.len())];
        Self {
            file_a: file_a.as_ref().display().to_string(),
            file_b: file_b.as_ref().display().to_string(),
            ratio_stats: RatioStats::from_ratios(ratios),
            result,
        }
    }
}

pub trait Formatter: Send {
    fn format(&self, report: &ComparisonReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ComparisonReport {
        ComparisonReport::new(
            "a.wav",
            "b.wav",
            ComparisonResult {
                overall_percentage: 75.0,
                mismatched_frames: vec![2],
                frame_ratios: vec![1.0, 0.9, 0.5, 0.8, 0.1],
                frames_compared: 4,
                frames_a: 4,
                frames_b: 5,
            },
        )
    }

    #[test]
    fn test_ratio_stats_cover_compared_frames_only() {
        let stats = sample_report().ratio_stats.unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 1.0);
    }

    #[test]
    fn test_ratio_stats_empty() {
        assert!(RatioStats::from_ratios(&[]).is_none());
    }

    #[test]
    fn test_formatters_mention_percentage() {
        let report = sample_report();
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Csv] {
            let line = create_formatter(format, true).format(&report);
            assert!(line.contains("75.0"), "{:?} output: {}", format, line);
        }
    }
}
