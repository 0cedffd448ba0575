use serde::Serialize;

use super::{ComparisonReport, Formatter, iso8601_timestamp};

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonRecord<'a> {
    ts: String,
    #[serde(flatten)]
    report: &'a ComparisonReport,
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &ComparisonReport) -> String {
        let record = JsonRecord {
            ts: iso8601_timestamp(),
            report,
        };
        serde_json::to_string(&record)
            .unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}
