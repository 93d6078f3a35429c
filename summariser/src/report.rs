use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::model::{Comparison, SummaryReport};

pub const SUMMARY_REPORT_FILE: &str = "summary_report.json";

/// Render the rows as a table, either for a terminal or as markdown.
pub fn render_table<T: Tabled>(rows: &[T], markdown: bool) -> String {
    let mut table = Table::new(rows);
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::modern());
    }

    table.to_string()
}

/// Write `value` as pretty JSON, replacing `path` in one step.
fn write_json<T: Serialize>(value: &T, path: &Path) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

pub fn write_summary_report(report: &SummaryReport, output_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = output_dir.join(SUMMARY_REPORT_FILE);
    write_json(report, &path)?;
    log::info!("Wrote {} rows to {}", report.rows.len(), path.display());

    Ok(path)
}

pub fn comparison_path(comparison: &Comparison, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("response_time_comparison_{}.json", comparison.slug))
}

pub fn write_comparison(comparison: &Comparison, output_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = comparison_path(comparison, output_dir);
    write_json(comparison, &path)?;
    log::info!(
        "Wrote comparison of {} series for {} to {}",
        comparison.series.len(),
        comparison.group,
        path.display()
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AxisScale, ComparisonSeries, IncompleteRow, SummaryRow};
    use paging_bench_summary_model::ScenarioOutcome;

    fn row() -> SummaryRow {
        SummaryRow {
            query: "Popular Products".to_string(),
            pagination_type: "Cursor".to_string(),
            dataset_size: "10k".to_string(),
            total_pages: 500,
            first_page_ms: 4,
            last_page_ms: 6,
            avg_ms: 5.125,
            median_ms: 5,
            p90_ms: 7,
            p95_ms: 8,
            p99_ms: 12,
        }
    }

    #[test]
    fn markdown_table() {
        let table = render_table(&[row()], true);
        let mut lines = table.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("| Query "));
        assert!(header.contains("| Dataset Size "));
        assert!(header.contains("| P99 Response Time (ms) |"));
        assert!(lines.next().unwrap().starts_with("|--"));
        let data = lines.next().unwrap();
        assert!(data.contains("| Popular Products "));
        assert!(data.contains("| 5.13 ") || data.contains("| 5.12 "));
    }

    #[test]
    fn terminal_table_has_every_row() {
        let mut second = row();
        second.pagination_type = "Offset".to_string();
        let table = render_table(&[row(), second], false);
        assert!(table.contains("Cursor"));
        assert!(table.contains("Offset"));
    }

    #[test]
    fn incomplete_table() {
        let table = render_table(
            &[IncompleteRow {
                scenario: "Text Search (Cursor Pagination)".to_string(),
                dataset_size: "1M".to_string(),
                outcome: ScenarioOutcome::Skipped,
                pages_visited: 0,
                total_pages: None,
                run_id: "abc".to_string(),
            }],
            true,
        );
        let data = table.lines().nth(2).unwrap();
        assert!(data.contains("| Skipped "));
        assert!(data.contains("| - "));
    }

    #[test]
    fn writes_files_into_output_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let output_dir = dir.path().join("reports");

        let report = SummaryReport {
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            dataset_labels: vec!["10k".to_string()],
            rows: vec![row()],
            incomplete: vec![IncompleteRow {
                scenario: "Popular Products (Offset Pagination)".to_string(),
                dataset_size: "10k".to_string(),
                outcome: ScenarioOutcome::Failed,
                pages_visited: 3,
                total_pages: Some(500),
                run_id: "abc".to_string(),
            }],
        };
        let path = write_summary_report(&report, &output_dir)?;
        let read: SummaryReport = serde_json::from_reader(std::fs::File::open(&path)?)?;
        assert_eq!(read, report);

        let comparison = Comparison {
            group: "Global Sorting".to_string(),
            slug: "global_sorting".to_string(),
            title: "Response Time Comparison - Global Sorting".to_string(),
            x_axis_title: "Progress Through Results (%)".to_string(),
            y_axis_title: "Response Time (ms)".to_string(),
            y_scale: AxisScale::Linear,
            series: vec![ComparisonSeries {
                label: "Popular Products (Cursor Pagination) (10k)".to_string(),
                scenario: "Popular Products (Cursor Pagination)".to_string(),
                dataset_label: "10k".to_string(),
                colour: "#2E86AB".to_string(),
                x: vec![0.0, 100.0],
                y: vec![4.0, 4.7],
            }],
        };
        let path = write_comparison(&comparison, &output_dir)?;
        assert_eq!(
            path.file_name().unwrap(),
            "response_time_comparison_global_sorting.json"
        );
        let value: serde_json::Value = serde_json::from_reader(std::fs::File::open(&path)?)?;
        assert_eq!(value["y_scale"], "linear");
        Ok(())
    }
}
