use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;

/// How a scenario's walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// The walk reached the end of the result set.
    Completed,
    /// A page request failed part way through. Samples up to the failure were kept.
    Failed,
    /// The count request failed so no pages were requested.
    Skipped,
    /// The run was stopped before or during this scenario.
    Interrupted,
}

/// Per-scenario line of a [RunSummary].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    /// The scenario's display label, which is also its snapshot key
    pub label: String,
    pub outcome: ScenarioOutcome,
    /// Total pages as reported by the count endpoint, if it was reached
    pub total_pages: Option<u64>,
    pub pages_visited: u64,
    pub samples_recorded: usize,
}

/// Summary of a benchmark run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The unique run id
    ///
    /// Chosen by the runner. Unique for each run.
    pub run_id: String,
    /// The time the run started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// The number of rows in the service's dataset, as given to the runner
    pub dataset_size: u64,
    /// The label the run's series were stored under
    pub dataset_label: String,
    /// Base URL of the products endpoint
    pub base_url: String,
    /// One entry per scenario that the run attempted, in catalog order
    pub scenarios: Vec<ScenarioSummary>,
    /// The version of the runner that produced this summary
    pub version: String,
}

impl RunSummary {
    pub fn new(
        run_id: String,
        started_at: i64,
        dataset_size: u64,
        dataset_label: String,
        base_url: String,
        version: String,
    ) -> Self {
        Self {
            run_id,
            started_at,
            dataset_size,
            dataset_label,
            base_url,
            scenarios: Vec::new(),
            version,
        }
    }

    pub fn add_scenario(&mut self, scenario: ScenarioSummary) {
        self.scenarios.push(scenario);
    }

    pub fn count_outcome(&self, outcome: ScenarioOutcome) -> usize {
        self.scenarios
            .iter()
            .filter(|scenario| scenario.outcome == outcome)
            .count()
    }
}

/// Append the run summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_summary(run_summary: &RunSummary, path: &Path) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_summary(run_summary, &mut file)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Serialize the run summary to a writer
pub fn store_run_summary<W: Write>(run_summary: &RunSummary, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, run_summary)?;
    Ok(())
}

/// Load run summaries from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_run_summary].
pub fn load_summary_runs(path: &Path) -> anyhow::Result<Vec<RunSummary>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut runs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        runs.push(serde_json::from_str(&line)?);
    }
    Ok(runs)
}
