mod recorder;
mod report;

use std::time::{Duration, Instant};

pub use recorder::SeriesRecorder;
pub use report::{InMemoryReporter, ReportCollector};

/// Timing of a single request made on behalf of a scenario.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    /// The scenario label the request belongs to
    pub operation_id: String,
    /// Page index for page requests, 0 for the count request
    pub page: u64,
    started: Instant,
    elapsed: Option<Duration>,
    pub is_error: bool,
}

impl OperationRecord {
    /// Start timing now.
    pub fn new(operation_id: String, page: u64) -> Self {
        Self {
            operation_id,
            page,
            started: Instant::now(),
            elapsed: None,
            is_error: false,
        }
    }

    pub(crate) fn finish(&mut self, is_error: bool) {
        self.elapsed = Some(self.started.elapsed());
        self.is_error = is_error;
    }

    /// The time between [OperationRecord::new] and the response arriving. Not set until the
    /// record has been reported.
    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Whole milliseconds, truncated.
    pub fn duration_ms(&self) -> Option<u64> {
        self.elapsed
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Stop timing the request and hand the record to the reporter.
///
/// Returns the finished record so the caller can use the measured duration.
pub fn report_operation<T, E>(
    reporter: &dyn ReportCollector,
    mut operation_record: OperationRecord,
    response: &Result<T, E>,
) -> OperationRecord {
    operation_record.finish(response.is_err());
    log::trace!(
        "Operation {} page {} took {:?}, failed? {}",
        operation_record.operation_id,
        operation_record.page,
        operation_record.elapsed,
        operation_record.is_error,
    );
    reporter.add_operation(&operation_record);
    operation_record
}
