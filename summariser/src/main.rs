use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use paging_bench_summariser::model::SummaryReport;
use paging_bench_summariser::{
    build_comparisons, incomplete_scenarios, latest_runs, load_runs, render_table,
    summarize_snapshots, write_comparison, write_summary_report, Snapshots, SummariserCli,
};
use paging_bench_summary_model::{default_catalog, FileSnapshotStore, QueryCatalog};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = SummariserCli::parse();

    let catalog = match &cli.catalog {
        Some(path) => QueryCatalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => default_catalog(),
    };

    let store = FileSnapshotStore::new(cli.results_dir.clone());
    log::debug!("Loading snapshots from {}", store.dir().display());
    let snapshots = Snapshots::load(&store, &cli.label)?;
    if snapshots.is_empty() {
        anyhow::bail!(
            "No results found in {} for dataset sizes {:?}",
            cli.results_dir.display(),
            cli.label
        );
    }

    let rows = summarize_snapshots(&catalog, &snapshots)?;
    println!("{}", render_table(&rows, cli.markdown));

    let runs = load_runs(&cli.run_summary)?;
    let incomplete = incomplete_scenarios(&latest_runs(&runs, &cli.label));
    if !incomplete.is_empty() {
        println!("\nScenarios that did not complete in the latest run:");
        println!("{}", render_table(&incomplete, cli.markdown));
    }

    let report = SummaryReport {
        generated_at: Utc::now().to_rfc3339(),
        dataset_labels: snapshots.labels().map(str::to_string).collect(),
        rows,
        incomplete,
    };
    write_summary_report(&report, cli.output_dir())?;

    let mut errors = Vec::new();
    for comparison in build_comparisons(&catalog, &snapshots) {
        if let Err(e) = write_comparison(&comparison, cli.output_dir()) {
            log::error!("Failed to write comparison for {}: {e:?}", comparison.group);
            errors.push(e);
        }
    }

    if !errors.is_empty() {
        anyhow::bail!("{} comparisons could not be written", errors.len());
    }

    Ok(())
}
