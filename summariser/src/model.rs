use paging_bench_summary_model::ScenarioOutcome;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Latency statistics of one scenario at one dataset size.
///
/// Median and percentiles are positional over the series in the order it was recorded, not over
/// the sorted latencies. See [crate::summarize_series].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "Query")]
    pub query: String,
    #[tabled(rename = "Type")]
    pub pagination_type: String,
    #[tabled(rename = "Dataset Size")]
    pub dataset_size: String,
    #[tabled(rename = "Total Pages")]
    pub total_pages: u64,
    #[tabled(rename = "First Page")]
    pub first_page_ms: u64,
    #[tabled(rename = "Last Page")]
    pub last_page_ms: u64,
    #[tabled(rename = "Avg Response Time (ms)", display = "float2")]
    pub avg_ms: f64,
    #[tabled(rename = "Median Response Time (ms)")]
    pub median_ms: u64,
    #[tabled(rename = "P90 Response Time (ms)")]
    pub p90_ms: u64,
    #[tabled(rename = "P95 Response Time (ms)")]
    pub p95_ms: u64,
    #[tabled(rename = "P99 Response Time (ms)")]
    pub p99_ms: u64,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

/// A scenario that did not complete in the latest run for a dataset size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct IncompleteRow {
    #[tabled(rename = "Scenario")]
    pub scenario: String,
    #[tabled(rename = "Dataset Size")]
    pub dataset_size: String,
    #[tabled(rename = "Outcome", display = "outcome_name")]
    pub outcome: ScenarioOutcome,
    #[tabled(rename = "Pages Visited")]
    pub pages_visited: u64,
    #[tabled(rename = "Total Pages", display = "optional_pages")]
    pub total_pages: Option<u64>,
    #[tabled(rename = "Run")]
    pub run_id: String,
}

fn outcome_name(outcome: &ScenarioOutcome) -> String {
    format!("{outcome:?}")
}

fn optional_pages(pages: &Option<u64>) -> String {
    pages.map_or_else(|| "-".to_string(), |pages| pages.to_string())
}

/// Contents of `summary_report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// RFC 3339 time the report was generated
    pub generated_at: String,
    /// The dataset size labels that had a snapshot, in the order they were requested
    pub dataset_labels: Vec<String>,
    pub rows: Vec<SummaryRow>,
    /// Scenarios whose latest run did not complete, so their rows may be partial or stale
    #[serde(default)]
    pub incomplete: Vec<IncompleteRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    Linear,
    Log,
}

/// One line of a comparison: a scenario at a dataset size, smoothed and mapped onto the progress
/// axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSeries {
    /// Legend entry, `<scenario> (<dataset label>)`
    pub label: String,
    pub scenario: String,
    pub dataset_label: String,
    pub colour: String,
    /// Progress through the results, 0 to 100
    pub x: Vec<f64>,
    /// Smoothed response time in milliseconds
    pub y: Vec<f64>,
}

/// Everything needed to draw one group's comparison chart. Written to
/// `response_time_comparison_<slug>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub group: String,
    pub slug: String,
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub y_scale: AxisScale,
    pub series: Vec<ComparisonSeries>,
}
