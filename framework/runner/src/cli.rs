use crate::config::DEFAULT_BASE_URL;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(about, long_about = None)]
pub struct BenchCli {
    /// Base URL of the products endpoint. The count endpoint is `<base-url>/counts`.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// The number of products loaded into the service. This sets the sampling stride.
    #[arg(long)]
    pub dataset_size: u64,

    /// The label to store results under, such as `10k` or `1M`.
    ///
    /// Derived from the dataset size when not given.
    #[arg(long)]
    pub dataset_label: Option<String>,

    /// Directory holding the `response_times_<label>.json` snapshots.
    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    /// A TOML catalog to run instead of the built-in one.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Only run the named scenarios. Matches the query name, which selects both pagination modes,
    /// or the full label such as `Popular Products (Offset Pagination)`.
    ///
    /// You can specify multiple scenarios by using the flag multiple times.
    #[arg(long, short)]
    pub scenario: Vec<String>,

    /// Transport timeout for each request, in seconds. A timeout counts as a failed request.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[arg(long, default_value = "false")]
    pub no_progress: bool,

    /// File that a summary line for each run is appended to.
    #[arg(long, env = "RUN_SUMMARY_PATH", default_value = "run_summary.jsonl")]
    pub run_summary: PathBuf,
}
