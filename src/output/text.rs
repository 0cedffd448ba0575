use super::{ComparisonReport, Formatter};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &ComparisonReport) -> String {
        let result = &report.result;
        let mismatched = if result.mismatched_frames.is_empty() {
            "none".to_string()
        } else {
            result.mismatch_list()
        };

        let mut text = format!(
            "{} vs {}: {:.1}% similar ({}/{} frames match)\nMismatched frames: {}",
            report.file_a,
            report.file_b,
            result.overall_percentage,
            result.matching_frames(),
            result.frames_compared,
            mismatched
        );

        if self.verbose {
            text.push_str(&format!(
                "\nFrames: {} vs {}",
                result.frames_a, result.frames_b
            ));
            if let Some(stats) = &report.ratio_stats {
                text.push_str(&format!(
                    "\nFrame match ratio: mean {:.3}, std {:.3}, min {:.3}, max {:.3}",
                    stats.mean, stats.std_dev, stats.min, stats.max
                ));
            }
        }

        text
    }
}
