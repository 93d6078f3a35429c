use std::sync::Arc;

use anyhow::Context;
use paging_bench_core::prelude::{ScenarioBailError, ShutdownSignalError};
use paging_bench_instruments::InMemoryReporter;
use paging_bench_summary_model::{
    append_run_summary, FileSnapshotStore, QueryCatalog, ResultStore, RunSummary,
    ScenarioOutcome, ScenarioSummary, SnapshotStore,
};

use crate::api::ProductsApi;
use crate::client::ProductsClient;
use crate::context::{Reporter, RunnerContext};
use crate::definition::BenchDefinitionBuilder;
use crate::executor::Executor;
use crate::monitor::start_monitor;
use crate::shutdown::start_shutdown_listener;
use crate::walker::{walk_scenario, WalkState};

/// Run a benchmark against the service over HTTP.
///
/// Series are merged into `response_times_<label>.json` in the results directory and a summary
/// line for the run is appended to the run summary file. Individual scenario failures are logged
/// and recorded in the returned [RunSummary] but do not fail the run.
pub fn run(definition: BenchDefinitionBuilder) -> anyhow::Result<RunSummary> {
    let definition = definition.build()?;

    log::info!(
        "Running benchmark {} with {} scenarios against {} (dataset size {}, stored as {})",
        definition.name,
        definition.catalog.len(),
        definition.config.products_url,
        definition.config.dataset_size,
        definition.config.dataset_label,
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime);
    let executor = Arc::new(Executor::new(runtime, shutdown_handle.clone()));
    let reporter: Arc<Reporter> = Arc::new(InMemoryReporter::new());
    let runner_context = RunnerContext::new(
        executor,
        definition.config,
        reporter,
        shutdown_handle.clone(),
    );

    // Report high CPU usage by the benchmark itself, which would inflate the measured latencies.
    start_monitor(shutdown_handle.new_listener())?;

    let client = ProductsClient::new(
        runner_context.executor().clone(),
        runner_context.config(),
    )?;
    let store = FileSnapshotStore::new(runner_context.config().results_dir.clone());

    let result = run_catalog(&runner_context, &client, store, &definition.catalog);
    runner_context.reporter().finalize();

    // Stops the monitor
    shutdown_handle.shutdown();

    let summary = result?;
    if let Err(e) = append_run_summary(&summary, &runner_context.config().run_summary_path) {
        log::error!("Failed to write run summary: {e:?}");
    }

    Ok(summary)
}

/// Walk every scenario in the catalog in order and persist the recorded series.
///
/// Scenarios run strictly one after another. Every scenario that was walked replaces its stored
/// series, even when the walk recorded nothing. A scenario skipped because its count failed keeps
/// the stored series. After a shutdown signal the remaining scenarios are marked as interrupted
/// and the series gathered so far are still persisted.
pub fn run_catalog<S: SnapshotStore>(
    ctx: &RunnerContext,
    api: &impl ProductsApi,
    store: S,
    catalog: &QueryCatalog,
) -> anyhow::Result<RunSummary> {
    let config = ctx.config();
    let mut result_store = ResultStore::open(store, &config.dataset_label)
        .context("Failed to load the existing results")?;

    let mut summary = RunSummary::new(
        nanoid::nanoid!(),
        chrono::Utc::now().timestamp(),
        config.dataset_size,
        config.dataset_label.clone(),
        config.products_url.to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );

    for scenario in catalog.scenarios() {
        let label = scenario.label();

        if ctx.shutdown_handle().is_shutdown() {
            log::info!("Not running {label}, the run is stopping");
            summary.add_scenario(ScenarioSummary {
                label,
                outcome: ScenarioOutcome::Interrupted,
                total_pages: None,
                pages_visited: 0,
                samples_recorded: 0,
            });
            continue;
        }

        log::info!("Running {label}");
        let scenario_summary = match walk_scenario(ctx, api, scenario) {
            Ok(outcome) => {
                let outcome_kind = match outcome.state {
                    WalkState::Done => ScenarioOutcome::Completed,
                    _ if outcome.interrupted => ScenarioOutcome::Interrupted,
                    _ => ScenarioOutcome::Failed,
                };
                let samples_recorded = outcome.series.len();

                log::info!(
                    "{label}: {outcome_kind:?} after {} of {} pages, {samples_recorded} samples recorded",
                    outcome.pages_visited,
                    outcome.page_count.total_pages,
                );

                if outcome.series.is_empty() {
                    log::warn!("{label}: no samples recorded, storing an empty series");
                }
                result_store.record_series(&label, outcome.series);

                ScenarioSummary {
                    label,
                    outcome: outcome_kind,
                    total_pages: Some(outcome.page_count.total_pages),
                    pages_visited: outcome.pages_visited,
                    samples_recorded,
                }
            }
            Err(e) => {
                let outcome = if e.is::<ShutdownSignalError>() {
                    log::warn!("{label}: interrupted while fetching the count");
                    ScenarioOutcome::Interrupted
                } else if let Some(bail) = e.downcast_ref::<ScenarioBailError>() {
                    log::warn!("Skipping {label}: {}", bail.reason());
                    ScenarioOutcome::Skipped
                } else {
                    log::error!("Skipping {label}: {e:?}");
                    ScenarioOutcome::Skipped
                };

                ScenarioSummary {
                    label,
                    outcome,
                    total_pages: None,
                    pages_visited: 0,
                    samples_recorded: 0,
                }
            }
        };

        summary.add_scenario(scenario_summary);
    }

    result_store
        .persist()
        .context("Failed to persist the results")?;

    log::info!(
        "Run {} finished: {} completed, {} failed, {} skipped, {} interrupted",
        summary.run_id,
        summary.count_outcome(ScenarioOutcome::Completed),
        summary.count_outcome(ScenarioOutcome::Failed),
        summary.count_outcome(ScenarioOutcome::Skipped),
        summary.count_outcome(ScenarioOutcome::Interrupted),
    );

    Ok(summary)
}
