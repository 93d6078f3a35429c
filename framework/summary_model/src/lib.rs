//! The model shared by the benchmark runner and the summariser: the query catalog, recorded
//! series, the snapshot store and the run summary log.

mod catalog;
mod run_summary;
mod series;
mod store;

pub use catalog::{
    default_catalog, PaginationMode, QueryCatalog, QueryParams, Scenario, SearchType, SortOrder,
    DEFAULT_GROUP,
};
pub use run_summary::{
    append_run_summary, load_summary_runs, store_run_summary, RunSummary,
    ScenarioOutcome, ScenarioSummary,
};
pub use series::{MetricSeries, NonIncreasingPageError, Sample, SeriesMap};
pub use store::{
    merge_snapshot, FileSnapshotStore, InMemorySnapshotStore, ResultStore, SnapshotStore,
    StoreError,
};
