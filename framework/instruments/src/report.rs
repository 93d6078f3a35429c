mod in_memory_reporter;

use crate::OperationRecord;

pub use in_memory_reporter::InMemoryReporter;

pub trait ReportCollector {
    fn add_operation(&self, operation_record: &OperationRecord);

    /// Called once at the end of the run.
    fn finalize(&self);
}
