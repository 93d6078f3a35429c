use std::path::Path;

use anyhow::Context;
use paging_bench_summary_model::{load_summary_runs, RunSummary, ScenarioOutcome};

use crate::model::IncompleteRow;

/// Read the run summary log. A log that does not exist yet holds no runs.
pub fn load_runs(path: &Path) -> anyhow::Result<Vec<RunSummary>> {
    if !path.exists() {
        log::info!("No run summary at {}, not reporting run outcomes", path.display());
        return Ok(Vec::new());
    }

    load_summary_runs(path)
        .with_context(|| format!("Failed to read run summaries from {}", path.display()))
}

/// The most recent run for each label, in the order the labels are given. Later lines in the log
/// are newer runs.
pub fn latest_runs<'a>(runs: &'a [RunSummary], labels: &[String]) -> Vec<&'a RunSummary> {
    labels
        .iter()
        .filter_map(|label| runs.iter().rev().find(|run| run.dataset_label == *label))
        .collect()
}

/// Scenarios that did not complete in the given runs. Their stored series are partial, or left
/// over from an earlier run.
pub fn incomplete_scenarios(runs: &[&RunSummary]) -> Vec<IncompleteRow> {
    runs.iter()
        .flat_map(|run| {
            run.scenarios
                .iter()
                .filter(|scenario| scenario.outcome != ScenarioOutcome::Completed)
                .map(|scenario| IncompleteRow {
                    scenario: scenario.label.clone(),
                    dataset_size: run.dataset_label.clone(),
                    outcome: scenario.outcome,
                    pages_visited: scenario.pages_visited,
                    total_pages: scenario.total_pages,
                    run_id: run.run_id.clone(),
                })
        })
        .collect()
}
