//! Summarise and compare the latency series recorded by the pagination benchmark across dataset
//! sizes.

mod aggregate;
mod cli;
mod compare;
pub mod model;
mod report;
mod runs;
mod snapshots;

pub use aggregate::{parse_scenario_label, summarize_series, summarize_snapshots, AggregateError};
pub use cli::SummariserCli;
pub use compare::{
    axis_scale, build_comparisons, compare_group, comparison_groups, downsample,
    positive_samples, progress_axis, slug, smooth, smoothing_alpha, GroupMember, LOG_SCALE_RATIO,
    MAX_POINTS, PALETTE,
};
pub use report::{
    comparison_path, render_table, write_comparison, write_summary_report, SUMMARY_REPORT_FILE,
};
pub use runs::{incomplete_scenarios, latest_runs, load_runs};
pub use snapshots::Snapshots;
