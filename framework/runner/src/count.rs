use paging_bench_core::prelude::{ScenarioBailError, ShutdownSignalError};
use paging_bench_instruments::{report_operation, OperationRecord, ReportCollector};
use paging_bench_summary_model::Scenario;

use crate::api::ProductsApi;

/// The size of a scenario's result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCount {
    pub total_count: u64,
    pub total_pages: u64,
}

impl PageCount {
    pub fn from_total(total_count: u64, page_size: u32) -> Self {
        Self {
            total_count,
            total_pages: total_count.div_ceil(u64::from(page_size.max(1))),
        }
    }
}

/// Ask the service how many items match the scenario's filters.
///
/// The request is timed and reported as page 0 of the scenario. Any failure other than the
/// shutdown signal is turned into a [ScenarioBailError] so that the caller skips the scenario
/// without walking it.
pub fn resolve_count(
    api: &impl ProductsApi,
    reporter: &dyn ReportCollector,
    scenario: &Scenario,
) -> anyhow::Result<PageCount> {
    let label = scenario.label();

    let record = OperationRecord::new(label.clone(), 0);
    let response = api.count(&scenario.query);
    report_operation(reporter, record, &response);

    let response = match response {
        Ok(response) => response,
        Err(e) if e.is::<ShutdownSignalError>() => return Err(e),
        Err(e) => {
            log::error!("Failed to fetch the count for {label}: {e}");
            return Err(ScenarioBailError::new(label, e.to_string()).into());
        }
    };

    let total_count = match response.count {
        Some(count) if count >= 0 => count as u64,
        Some(count) => {
            log::warn!("Count endpoint returned {count} for {label}, treating it as empty");
            0
        }
        None => {
            log::warn!("Count endpoint returned no count for {label}, treating it as empty");
            0
        }
    };

    let page_count = PageCount::from_total(total_count, scenario.query.page_size);
    log::info!(
        "{label}: {} items in {} pages",
        page_count.total_count,
        page_count.total_pages
    );

    Ok(page_count)
}
