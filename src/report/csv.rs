use crate::perf::metrics::UrlSummary;

// ============================================================================
// CSV reporter — per-URL performance summaries
// ============================================================================

pub const CSV_HEADER: [&str; 11] = [
    "url",
    "runs",
    "avg_total_time",
    "avg_startup_time",
    "avg_navigation_time",
    "avg_js_extraction_time",
    "avg_sanitization_time",
    "avg_action_generation_time",
    "avg_classification_time",
    "avg_elements_count",
    "avg_actions_count",
];

/// Render summaries as CSV with a header row. Times are in seconds.
pub fn generate_csv(summaries: &[UrlSummary]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');

    for s in summaries {
        let row = [
            escape_csv(&s.url),
            s.runs.to_string(),
            format!("{:.6}", s.avg_total_time),
            format!("{:.6}", s.avg_startup_time),
            format!("{:.6}", s.avg_navigation_time),
            format!("{:.6}", s.avg_js_extraction_time),
            format!("{:.6}", s.avg_sanitization_time),
            format!("{:.6}", s.avg_action_generation_time),
            format!("{:.6}", s.avg_classification_time),
            s.avg_elements_count.to_string(),
            s.avg_actions_count.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// `<base>_<unix-seconds>.csv`
pub fn csv_filename(base: &str, unix_secs: u64) -> String {
    format!("{}_{}.csv", base, unix_secs)
}
