use anyhow::Context;
use polars::prelude::*;
use thiserror::Error;

use paging_bench_summary_model::{MetricSeries, QueryCatalog};

use crate::model::SummaryRow;
use crate::snapshots::Snapshots;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("No samples for {scenario} at dataset size {dataset_label}")]
    EmptySeries {
        scenario: String,
        dataset_label: String,
    },
}

/// Split a stored scenario key such as `Popular Products (Cursor Pagination)` into the query name
/// and the first word of the trailing parenthesized segment, here `Popular Products` and `Cursor`.
///
/// Keys without a trailing segment keep their whole text as the query and have an empty type.
pub fn parse_scenario_label(label: &str) -> (String, String) {
    let trimmed = label.trim();
    let Some(segment) = trimmed
        .strip_suffix(')')
        .and_then(|rest| rest.rfind('(').map(|open| (open, rest)))
    else {
        return (trimmed.to_string(), String::new());
    };

    let (open, rest) = segment;
    let query = rest[..open].trim().to_string();
    let pagination_type = rest[open + 1..]
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string();

    (query, pagination_type)
}

/// Index of the `fraction` position in a sequence of `len` values, clamped to the last element.
fn positional_index(len: usize, fraction: f64) -> usize {
    ((len as f64 * fraction) as usize).min(len.saturating_sub(1))
}

/// Summarize one series.
///
/// Statistics are taken over the samples in recorded order. The median is the element at index
/// `len / 2` and percentile `p` is the element at index `floor(len * p)`, both without sorting by
/// latency.
pub fn summarize_series(
    scenario: &str,
    dataset_label: &str,
    series: &MetricSeries,
) -> anyhow::Result<SummaryRow> {
    if series.is_empty() {
        return Err(AggregateError::EmptySeries {
            scenario: scenario.to_string(),
            dataset_label: dataset_label.to_string(),
        }
        .into());
    }

    let pages = series.samples().iter().map(|s| s.page).collect::<Vec<_>>();
    let latencies = series
        .samples()
        .iter()
        .map(|s| s.response_time_ms)
        .collect::<Vec<_>>();
    let frame = df![
        "page" => pages,
        "response_time_ms" => latencies,
    ]?;

    let stats = frame
        .clone()
        .lazy()
        .select([
            col("page").max().alias("total_pages"),
            col("response_time_ms").mean().alias("avg"),
        ])
        .collect()?;
    let total_pages = stats
        .column("total_pages")?
        .get(0)
        .context("Total pages")?
        .try_extract::<u64>()?;
    let avg_ms = stats
        .column("avg")?
        .get(0)
        .context("Mean")?
        .try_extract::<f64>()?;

    let latency = frame.column("response_time_ms")?;
    let len = latency.len();
    let at = |index: usize| -> anyhow::Result<u64> {
        Ok(latency
            .get(index)
            .with_context(|| format!("Sample {index}"))?
            .try_extract::<u64>()?)
    };

    let (query, pagination_type) = parse_scenario_label(scenario);

    Ok(SummaryRow {
        query,
        pagination_type,
        dataset_size: dataset_label.to_string(),
        total_pages,
        first_page_ms: at(0)?,
        last_page_ms: at(len - 1)?,
        avg_ms,
        median_ms: at(len / 2)?,
        p90_ms: at(positional_index(len, 0.90))?,
        p95_ms: at(positional_index(len, 0.95))?,
        p99_ms: at(positional_index(len, 0.99))?,
    })
}

/// One row per stored scenario and dataset size, grouped by scenario in catalog order.
///
/// Empty series are reported and left out rather than failing the whole report.
pub fn summarize_snapshots(
    catalog: &QueryCatalog,
    snapshots: &Snapshots,
) -> anyhow::Result<Vec<SummaryRow>> {
    let mut rows = Vec::new();
    for scenario in snapshots.scenario_keys_in(catalog) {
        for dataset_label in snapshots.labels() {
            let Some(series) = snapshots.series(dataset_label, scenario) else {
                continue;
            };

            match summarize_series(scenario, dataset_label, series) {
                Ok(row) => rows.push(row),
                Err(e) if e.is::<AggregateError>() => log::warn!("{e}"),
                Err(e) => {
                    return Err(e.context(format!(
                        "Failed to summarize {scenario} at dataset size {dataset_label}"
                    )))
                }
            }
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paging_bench_summary_model::{Sample, SeriesMap};
    use pretty_assertions::assert_eq;

    fn series(latencies: &[u64]) -> MetricSeries {
        latencies
            .iter()
            .enumerate()
            .map(|(i, ms)| Sample::new(i as u64 * 10 + 1, *ms))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn parses_label() {
        assert_eq!(
            parse_scenario_label("Popular Products (Cursor Pagination)"),
            ("Popular Products".to_string(), "Cursor".to_string())
        );
        assert_eq!(
            parse_scenario_label("Filter (by) Category (Offset Pagination)"),
            ("Filter (by) Category".to_string(), "Offset".to_string())
        );
        assert_eq!(
            parse_scenario_label("Plain"),
            ("Plain".to_string(), String::new())
        );
    }

    #[test]
    fn percentiles_use_recorded_order() -> anyhow::Result<()> {
        let row = summarize_series("Q (Cursor Pagination)", "10k", &series(&[100, 1, 50]))?;

        assert_eq!(row.median_ms, 1);
        assert_eq!(row.p90_ms, 50);
        assert_eq!(row.p95_ms, 50);
        assert_eq!(row.p99_ms, 50);
        assert_eq!(row.first_page_ms, 100);
        assert_eq!(row.last_page_ms, 50);
        assert_eq!(row.total_pages, 21);
        assert!((row.avg_ms - 151.0 / 3.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn single_sample() -> anyhow::Result<()> {
        let row = summarize_series("Q (Offset Pagination)", "1M", &series(&[7]))?;
        assert_eq!(
            row,
            SummaryRow {
                query: "Q".to_string(),
                pagination_type: "Offset".to_string(),
                dataset_size: "1M".to_string(),
                total_pages: 1,
                first_page_ms: 7,
                last_page_ms: 7,
                avg_ms: 7.0,
                median_ms: 7,
                p90_ms: 7,
                p95_ms: 7,
                p99_ms: 7,
            }
        );
        Ok(())
    }

    #[test]
    fn percentile_indices_on_long_series() -> anyhow::Result<()> {
        // Latency equals position so the index is visible
        let latencies = (0..200).collect::<Vec<u64>>();
        let row = summarize_series("Q (Cursor Pagination)", "10k", &series(&latencies))?;
        assert_eq!(row.median_ms, 100);
        assert_eq!(row.p90_ms, 180);
        assert_eq!(row.p95_ms, 190);
        assert_eq!(row.p99_ms, 198);
        Ok(())
    }

    #[test]
    fn rows_group_by_scenario_then_size() -> anyhow::Result<()> {
        let mut small = SeriesMap::new();
        small.insert("A (Cursor Pagination)".to_string(), series(&[1, 2]));
        small.insert("B (Cursor Pagination)".to_string(), series(&[3]));
        let mut large = SeriesMap::new();
        large.insert("A (Cursor Pagination)".to_string(), series(&[5, 6]));
        large.insert("B (Cursor Pagination)".to_string(), MetricSeries::new());

        let snapshots = Snapshots::from_series(vec![
            ("10k".to_string(), small),
            ("1M".to_string(), large),
        ]);
        let rows = summarize_snapshots(&QueryCatalog::new(), &snapshots)?;

        let keys = rows
            .iter()
            .map(|r| (r.query.as_str(), r.dataset_size.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![("A", "10k"), ("A", "1M"), ("B", "10k")]);
        Ok(())
    }

    #[test]
    fn rows_follow_catalog_order() -> anyhow::Result<()> {
        use paging_bench_summary_model::default_catalog;

        // Stored keys come back sorted by name, the catalog runs Popular Products first
        let mut stored = SeriesMap::new();
        stored.insert("Filter by Category (Cursor Pagination)".to_string(), series(&[2]));
        stored.insert("Popular Products (Offset Pagination)".to_string(), series(&[3]));
        stored.insert("Popular Products (Cursor Pagination)".to_string(), series(&[1]));

        let snapshots = Snapshots::from_series(vec![("10k".to_string(), stored)]);
        let rows = summarize_snapshots(&default_catalog(), &snapshots)?;

        let keys = rows
            .iter()
            .map(|r| (r.query.as_str(), r.pagination_type.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                ("Popular Products", "Cursor"),
                ("Popular Products", "Offset"),
                ("Filter by Category", "Cursor"),
            ]
        );
        Ok(())
    }
}
