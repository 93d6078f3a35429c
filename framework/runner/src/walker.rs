use std::time::Duration;

use paging_bench_core::prelude::ShutdownSignalError;
use paging_bench_instruments::{report_operation, OperationRecord, SeriesRecorder};
use paging_bench_summary_model::{MetricSeries, PaginationMode, Scenario};

use crate::api::{Cursor, PagePosition, ProductsApi, SortValue, NO_LAST_ID};
use crate::context::RunnerContext;
use crate::count::{resolve_count, PageCount};
use crate::progress::ScenarioProgress;
use crate::sampler::SamplingPolicy;

/// Where a walk is. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Init,
    Requesting { page: u64 },
    AdvanceOffset { page: u64 },
    AdvanceCursor { page: u64 },
    Done,
    Failed,
}

impl WalkState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WalkState::Done | WalkState::Failed)
    }
}

/// The result of walking one scenario.
#[derive(Debug)]
pub struct WalkOutcome {
    /// Either [WalkState::Done] or [WalkState::Failed]
    pub state: WalkState,
    pub page_count: PageCount,
    /// Pages that came back with results
    pub pages_visited: u64,
    pub series: MetricSeries,
    /// Why the walk failed, if it did
    pub failure: Option<String>,
    /// The walk was cut short by the shutdown signal rather than by the service
    pub interrupted: bool,
}

fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Walk one scenario from the count request to the end of its result set.
///
/// Requests are issued one at a time, each waiting for the previous response. Returns an error
/// only when the walk never started: the count request failed (a
/// [paging_bench_core::prelude::ScenarioBailError]) or the run was shut down while it was in
/// flight. Once pages are being requested every failure ends the walk as [WalkState::Failed] and
/// the samples recorded so far are returned with it.
///
/// A page's latency is the transport's receive time when the [ProductsApi] measures it, and the
/// time the whole call took otherwise.
///
/// A cursor walk fails when two responses in a row return the same cursor, since the next
/// request would repeat the last one.
pub fn walk_scenario(
    ctx: &RunnerContext,
    api: &impl ProductsApi,
    scenario: &Scenario,
) -> anyhow::Result<WalkOutcome> {
    let label = scenario.label();
    let policy = SamplingPolicy::for_scenario(scenario, ctx.config().dataset_size);

    let page_count = resolve_count(api, ctx.reporter(), scenario)?;
    let total_pages = page_count.total_pages;
    log::debug!(
        "{label}: offset stride {}, record interval {}",
        policy.offset_stride(),
        policy.record_interval()
    );

    let progress = ScenarioProgress::start(&label, total_pages, ctx.config().no_progress);
    let mut cursor = Cursor::initial(&scenario.query);
    let mut recorder = SeriesRecorder::new(&label);
    let mut pages_visited = 0;
    let mut failure = None;
    let mut interrupted = false;
    let mut previous_position: Option<(i64, Option<SortValue>)> = None;

    let mut state = WalkState::Init;
    while !state.is_terminal() {
        state = match state {
            WalkState::Init => WalkState::Requesting { page: 1 },
            WalkState::Requesting { page } => {
                if ctx.shutdown_handle().is_shutdown() {
                    interrupted = true;
                    failure = Some(ShutdownSignalError::default().to_string());
                    WalkState::Failed
                } else {
                    let position = match scenario.mode {
                        PaginationMode::Offset => PagePosition::Offset {
                            page_number: page,
                            cursor: &cursor,
                        },
                        PaginationMode::Cursor => PagePosition::Cursor(&cursor),
                    };

                    let record = OperationRecord::new(label.clone(), page);
                    let response = api.page(&scenario.query, &position);
                    let record = report_operation(ctx.reporter(), record, &response);

                    match response {
                        Ok(response) => {
                            if response.count.is_none() {
                                log::warn!("{label}: page {page} has no count, treating the results as exhausted");
                            }
                            cursor.absorb(&response);

                            if cursor.remaining <= 0 {
                                log::debug!("{label}: results exhausted at page {page}");
                                WalkState::Done
                            } else {
                                pages_visited += 1;
                                progress.visited(page);

                                let response_time_ms = response
                                    .received_in
                                    .map(whole_millis)
                                    .or_else(|| record.duration_ms())
                                    .unwrap_or_default();
                                log::debug!(
                                    "{label}: page {page} returned {} items in {response_time_ms} ms",
                                    response.product_ids().len()
                                );
                                if policy.should_record(page, total_pages) {
                                    recorder.record(page, response_time_ms);
                                }

                                match scenario.mode {
                                    PaginationMode::Offset => WalkState::AdvanceOffset { page },
                                    PaginationMode::Cursor => WalkState::AdvanceCursor { page },
                                }
                            }
                        }
                        Err(e) => {
                            if e.is::<ShutdownSignalError>() {
                                log::warn!("{label}: interrupted at page {page}");
                                interrupted = true;
                            } else {
                                log::error!("{label}: page {page} failed, abandoning the walk: {e}");
                            }
                            failure = Some(e.to_string());
                            WalkState::Failed
                        }
                    }
                }
            }
            WalkState::AdvanceOffset { page } => match policy.next_offset_page(page, total_pages) {
                Some(next) => WalkState::Requesting { page: next },
                None => WalkState::Done,
            },
            WalkState::AdvanceCursor { page } => {
                let position = (cursor.last_id, cursor.sort_last_value.clone());
                if previous_position.as_ref() == Some(&position) {
                    log::error!(
                        "{label}: page {page} returned the same cursor as page {}, abandoning the walk",
                        page - 1
                    );
                    failure = Some(format!(
                        "Cursor did not advance after page {page} (last_id {})",
                        cursor.last_id
                    ));
                    WalkState::Failed
                } else {
                    if cursor.last_id == NO_LAST_ID {
                        log::warn!("{label}: page {page} returned no last_id, continuing from the start of the sort");
                    }
                    previous_position = Some(position);
                    WalkState::Requesting { page: page + 1 }
                }
            }
            WalkState::Done | WalkState::Failed => state,
        };
    }
    progress.finish();

    if recorder.dropped() > 0 {
        log::warn!("{label}: dropped {} out of order samples", recorder.dropped());
    }

    Ok(WalkOutcome {
        state,
        page_count,
        pages_visited,
        series: recorder.into_series(),
        failure,
        interrupted,
    })
}
