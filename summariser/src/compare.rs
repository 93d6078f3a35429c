use itertools::Itertools;
use paging_bench_summary_model::{MetricSeries, QueryCatalog, Sample, DEFAULT_GROUP};

use crate::model::{AxisScale, Comparison, ComparisonSeries};
use crate::snapshots::Snapshots;

/// Series longer than this are thinned out after smoothing.
pub const MAX_POINTS: usize = 1500;

/// A group whose largest smoothed latency is at least this many times its smallest is drawn on a
/// log scale.
pub const LOG_SCALE_RATIO: f64 = 40.0;

/// Floor for the smallest latency when computing the log scale ratio.
const LOG_SCALE_FLOOR: f64 = 1e-3;

pub const PALETTE: [&str; 5] = ["#2E86AB", "#A23B72", "#F18F01", "#C73E1D", "#6A994E"];

/// A scenario at one dataset size, contributing one line to its group's comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub scenario: String,
    pub dataset_label: String,
}

/// Samples with a positive latency, ordered by page.
pub fn positive_samples(series: &MetricSeries) -> Vec<Sample> {
    series
        .samples()
        .iter()
        .filter(|sample| sample.response_time_ms > 0)
        .copied()
        .sorted_by_key(|sample| sample.page)
        .collect()
}

/// Map `n` samples evenly onto 0 to 100 by their position, ignoring the page indices.
pub fn progress_axis(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n)
            .map(|i| 100.0 * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

/// Longer series are smoothed harder.
pub fn smoothing_alpha(n: usize) -> f64 {
    if n < 10 {
        0.35
    } else if n < 100 {
        0.25
    } else {
        0.12
    }
}

/// Exponential moving average, starting from the first value.
pub fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(values.len());
    for value in values {
        let next = match smoothed.last() {
            None => *value,
            Some(previous) => alpha * value + (1.0 - alpha) * previous,
        };
        smoothed.push(next);
    }
    smoothed
}

/// Keep `max_points` evenly spaced points, always including the first and the last. Shorter input
/// is returned unchanged.
pub fn downsample(x: Vec<f64>, y: Vec<f64>, max_points: usize) -> (Vec<f64>, Vec<f64>) {
    let len = x.len().min(y.len());
    if len <= max_points || max_points < 2 {
        return (x, y);
    }

    let last = (len - 1) as f64;
    let step = last / (max_points - 1) as f64;
    (0..max_points)
        .map(|i| {
            // The final index is pinned so rounding can never drop the last point
            let index = if i == max_points - 1 {
                len - 1
            } else {
                (i as f64 * step) as usize
            };
            (x[index], y[index])
        })
        .unzip()
}

pub fn axis_scale(values: impl IntoIterator<Item = f64>) -> AxisScale {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
            (min.min(value), max.max(value))
        });
    if !max.is_finite() {
        return AxisScale::Linear;
    }

    if max / min.max(LOG_SCALE_FLOOR) >= LOG_SCALE_RATIO {
        AxisScale::Log
    } else {
        AxisScale::Linear
    }
}

/// File name safe identifier for a group name: lowercase, every run of other characters becomes
/// one underscore, no leading or trailing underscores.
pub fn slug(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|part| !part.is_empty())
        .join("_");

    if slug.is_empty() {
        "group".to_string()
    } else {
        slug
    }
}

/// The members of each group, in the order groups first appear in the catalog.
///
/// Each catalog scenario contributes one member per loaded dataset size. Stored scenarios that are
/// not in the catalog are put in the default group.
pub fn comparison_groups(
    catalog: &QueryCatalog,
    snapshots: &Snapshots,
) -> Vec<(String, Vec<GroupMember>)> {
    let catalog_labels = catalog
        .scenarios()
        .iter()
        .map(|scenario| (scenario.group.clone(), scenario.label()))
        .collect::<Vec<_>>();
    let uncatalogued = snapshots
        .scenario_keys()
        .into_iter()
        .filter(|key| !catalog_labels.iter().any(|(_, label)| label == key))
        .map(|key| (DEFAULT_GROUP.to_string(), key.to_string()))
        .collect::<Vec<_>>();

    let entries = catalog_labels
        .into_iter()
        .chain(uncatalogued)
        .collect::<Vec<_>>();
    let group_order = entries
        .iter()
        .map(|(group, _)| group.clone())
        .unique()
        .collect::<Vec<_>>();

    let mut grouped = entries
        .into_iter()
        .flat_map(|(group, scenario)| {
            snapshots
                .labels()
                .map(|dataset_label| {
                    (
                        group.clone(),
                        GroupMember {
                            scenario: scenario.clone(),
                            dataset_label: dataset_label.to_string(),
                        },
                    )
                })
                .collect::<Vec<_>>()
        })
        .into_group_map();

    group_order
        .into_iter()
        .filter_map(|group| {
            let members = grouped.remove(&group)?;
            Some((group, members))
        })
        .collect()
}

/// Build the comparison for one group. Members without usable samples are left out, and a group
/// with no usable members at all gives `None`.
pub fn compare_group(
    group: &str,
    members: &[GroupMember],
    snapshots: &Snapshots,
) -> Option<Comparison> {
    let mut series = Vec::new();
    for member in members {
        let Some(stored) = snapshots.series(&member.dataset_label, &member.scenario) else {
            continue;
        };

        let samples = positive_samples(stored);
        if samples.is_empty() {
            log::debug!(
                "No usable samples for {} at {}",
                member.scenario,
                member.dataset_label
            );
            continue;
        }

        let latencies = samples
            .iter()
            .map(|sample| sample.response_time_ms as f64)
            .collect::<Vec<_>>();
        let x = progress_axis(latencies.len());
        let y = smooth(&latencies, smoothing_alpha(latencies.len()));
        let (x, y) = downsample(x, y, MAX_POINTS);

        series.push(ComparisonSeries {
            label: format!("{} ({})", member.scenario, member.dataset_label),
            scenario: member.scenario.clone(),
            dataset_label: member.dataset_label.clone(),
            colour: PALETTE[series.len() % PALETTE.len()].to_string(),
            x,
            y,
        });
    }

    if series.is_empty() {
        log::info!("Nothing to compare for group {group}");
        return None;
    }

    let y_scale = axis_scale(series.iter().flat_map(|s| s.y.iter().copied()));

    Some(Comparison {
        group: group.to_string(),
        slug: slug(group),
        title: format!("Response Time Comparison - {group}"),
        x_axis_title: "Progress Through Results (%)".to_string(),
        y_axis_title: "Response Time (ms)".to_string(),
        y_scale,
        series,
    })
}

/// Comparisons for every group that has data.
pub fn build_comparisons(catalog: &QueryCatalog, snapshots: &Snapshots) -> Vec<Comparison> {
    comparison_groups(catalog, snapshots)
        .into_iter()
        .filter_map(|(group, members)| compare_group(&group, &members, snapshots))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use paging_bench_summary_model::{PaginationMode, QueryParams, SeriesMap, SortOrder};
    use pretty_assertions::assert_eq;

    #[test]
    fn constant_series_is_unchanged_by_smoothing() {
        for alpha in [0.12, 0.25, 0.35] {
            assert_eq!(smooth(&[7.0, 7.0, 7.0], alpha), vec![7.0, 7.0, 7.0]);
        }
    }

    #[test]
    fn smoothing_keeps_first_value_and_length() {
        let raw = [10.0, 40.0, 20.0, 5.0];
        let smoothed = smooth(&raw, 0.35);
        assert_eq!(smoothed.len(), raw.len());
        assert_eq!(smoothed[0], 10.0);
        assert!((smoothed[1] - (0.35 * 40.0 + 0.65 * 10.0)).abs() < 1e-9);
        assert!(smooth(&[], 0.2).is_empty());
    }

    #[test]
    fn alpha_by_length() {
        assert_eq!(smoothing_alpha(9), 0.35);
        assert_eq!(smoothing_alpha(10), 0.25);
        assert_eq!(smoothing_alpha(99), 0.25);
        assert_eq!(smoothing_alpha(100), 0.12);
    }

    #[test]
    fn progress_axis_spacing() {
        assert!(progress_axis(0).is_empty());
        assert_eq!(progress_axis(1), vec![0.0]);
        assert_eq!(progress_axis(5), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn downsample_keeps_ends() {
        let x = (0..4000).map(|i| i as f64).collect::<Vec<_>>();
        let y = x.iter().map(|v| v * 2.0).collect::<Vec<_>>();

        let (dx, dy) = downsample(x.clone(), y, MAX_POINTS);

        assert_eq!(dx.len(), MAX_POINTS);
        assert_eq!(dy.len(), MAX_POINTS);
        assert_eq!(dx[0], 0.0);
        assert_eq!(*dx.last().unwrap(), 3999.0);
        assert_eq!(*dy.last().unwrap(), 7998.0);
        assert!(dx.windows(2).all(|w| w[0] < w[1]));

        let (short, _) = downsample(vec![1.0, 2.0], vec![1.0, 2.0], MAX_POINTS);
        assert_eq!(short, vec![1.0, 2.0]);
    }

    #[test]
    fn filters_and_sorts_samples() {
        let series = MetricSeries::from(vec![
            Sample::new(5, 20),
            Sample::new(1, 0),
            Sample::new(3, 10),
        ]);
        assert_eq!(
            positive_samples(&series),
            vec![Sample::new(3, 10), Sample::new(5, 20)]
        );
    }

    #[test]
    fn log_scale_threshold() {
        assert_eq!(axis_scale([1.0, 39.0]), AxisScale::Linear);
        assert_eq!(axis_scale([1.0, 40.0]), AxisScale::Log);
        assert_eq!(axis_scale([0.0, 1.0]), AxisScale::Log);
        assert_eq!(axis_scale(Vec::new()), AxisScale::Linear);
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("Global Sorting"), "global_sorting");
        assert_eq!(slug("  Text -- Search!! "), "text_search");
        assert_eq!(slug("Price/Rating 2024"), "price_rating_2024");
        assert_eq!(slug("***"), "group");
        assert_eq!(slug(""), "group");
    }

    fn catalog() -> QueryCatalog {
        QueryCatalog::new()
            .with_query(
                "Cheap",
                "Sorting",
                &[PaginationMode::Cursor],
                QueryParams::sorted_by("price", SortOrder::Asc, 20),
            )
            .with_query(
                "Books",
                "Category",
                &[PaginationMode::Offset],
                QueryParams::sorted_by("price", SortOrder::Asc, 20).with_category("Books"),
            )
    }

    fn snapshots() -> Snapshots {
        let mut small = SeriesMap::new();
        small.insert(
            "Cheap (Cursor Pagination)".to_string(),
            MetricSeries::from(vec![Sample::new(1, 2), Sample::new(2, 4)]),
        );
        small.insert(
            "Legacy (Offset Pagination)".to_string(),
            MetricSeries::from(vec![Sample::new(1, 9)]),
        );
        let mut large = SeriesMap::new();
        large.insert(
            "Cheap (Cursor Pagination)".to_string(),
            MetricSeries::from(vec![Sample::new(1, 100), Sample::new(1000, 120)]),
        );
        Snapshots::from_series(vec![("10k".to_string(), small), ("1M".to_string(), large)])
    }

    #[test]
    fn groups_follow_catalog_order() {
        let groups = comparison_groups(&catalog(), &snapshots());

        let names = groups.iter().map(|(g, _)| g.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Sorting", "Category", DEFAULT_GROUP]);
        assert_eq!(
            groups[0].1,
            vec![
                GroupMember {
                    scenario: "Cheap (Cursor Pagination)".to_string(),
                    dataset_label: "10k".to_string(),
                },
                GroupMember {
                    scenario: "Cheap (Cursor Pagination)".to_string(),
                    dataset_label: "1M".to_string(),
                },
            ]
        );
    }

    #[test]
    fn comparisons_skip_groups_without_data() {
        let comparisons = build_comparisons(&catalog(), &snapshots());

        let groups = comparisons
            .iter()
            .map(|c| c.group.as_str())
            .collect::<Vec<_>>();
        assert_eq!(groups, vec!["Sorting", DEFAULT_GROUP]);

        let sorting = &comparisons[0];
        assert_eq!(sorting.slug, "sorting");
        assert_eq!(sorting.y_scale, AxisScale::Log);
        assert_eq!(sorting.series[0].label, "Cheap (Cursor Pagination) (10k)");
        assert_eq!(sorting.series[0].colour, PALETTE[0]);
        assert_eq!(sorting.series[1].colour, PALETTE[1]);
        assert_eq!(sorting.series[1].x, vec![0.0, 100.0]);
        assert_eq!(sorting.series[1].y[0], 100.0);
    }
}
