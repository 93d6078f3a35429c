use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(about, long_about = None)]
pub struct SummariserCli {
    /// Directory holding the `response_times_<label>.json` snapshots.
    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    /// Dataset size labels to include, in the order they should be reported.
    ///
    /// You can specify multiple labels by using the flag multiple times.
    #[arg(long, default_values_t = ["10k".to_string(), "100k".to_string(), "1M".to_string()])]
    pub label: Vec<String>,

    /// The TOML catalog the benchmark was run with. Groups the comparisons.
    ///
    /// The built-in catalog is used when not given.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Print the summary table as markdown.
    #[arg(long, default_value = "false")]
    pub markdown: bool,

    /// Where to write the reports. Defaults to the results directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// The run summary log written by the benchmark. Scenarios that did not complete in the
    /// latest run for each dataset size are listed after the summary table.
    #[arg(long, env = "RUN_SUMMARY_PATH", default_value = "run_summary.jsonl")]
    pub run_summary: PathBuf,
}

impl SummariserCli {
    pub fn output_dir(&self) -> &PathBuf {
        self.output_dir.as_ref().unwrap_or(&self.results_dir)
    }
}
