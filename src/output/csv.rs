use super::{ComparisonReport, Formatter, iso8601_timestamp};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &ComparisonReport) -> String {
        let result = &report.result;
        let mean_ratio = report
            .ratio_stats
            .map_or(String::new(), |s| format!("{:.3}", s.mean));
        format!(
            "{},{},{},{:.1},{},{},{},{},{}",
            iso8601_timestamp(),
            report.file_a,
            report.file_b,
            result.overall_percentage,
            result.frames_compared,
            result.frames_a,
            result.frames_b,
            mean_ratio,
            result.mismatch_list()
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,file_a,file_b,percentage,frames_compared,frames_a,frames_b,mean_ratio,mismatched")
    }
}
