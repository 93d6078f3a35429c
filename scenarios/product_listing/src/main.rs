use paging_bench_runner::prelude::*;

fn main() -> BenchResult<()> {
    let builder = BenchDefinitionBuilder::new_with_init(env!("CARGO_PKG_NAME"))
        .with_catalog(default_catalog());

    let summary = run(builder)?;

    let unfinished = summary.scenarios.len() - summary.count_outcome(ScenarioOutcome::Completed);
    if unfinished > 0 {
        log::warn!(
            "{unfinished} of {} scenarios did not complete, see the log above",
            summary.scenarios.len()
        );
    }

    Ok(())
}
