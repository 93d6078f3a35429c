mod api;
mod cli;
mod client;
mod config;
mod context;
mod count;
mod definition;
mod executor;
mod init;
mod monitor;
mod progress;
mod run;
mod sampler;
mod shutdown;
mod types;
mod walker;

pub mod prelude {
    pub use crate::api::{
        page_query_pairs, ApiError, CountResponse, Cursor, Endpoint, PagePosition, PageResponse,
        ProductRef, ProductsApi, SortValue, NO_LAST_ID,
    };
    pub use crate::cli::BenchCli;
    pub use crate::client::ProductsClient;
    pub use crate::config::{dataset_label, BenchConfig, DEFAULT_BASE_URL};
    pub use crate::context::{Reporter, RunnerContext};
    pub use crate::count::{resolve_count, PageCount};
    pub use crate::definition::BenchDefinitionBuilder;
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::run::{run, run_catalog};
    pub use crate::sampler::{SamplingPolicy, SEARCH_STRIDE, TARGET_POINTS};
    pub use crate::types::BenchResult;
    pub use crate::walker::{walk_scenario, WalkOutcome, WalkState};

    pub use paging_bench_core::prelude::*;
    pub use paging_bench_instruments::{InMemoryReporter, ReportCollector};
    pub use paging_bench_summary_model::*;
}
