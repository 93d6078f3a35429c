mod operations_table;

use crate::report::in_memory_reporter::operations_table::OperationRow;
use crate::report::ReportCollector;
use crate::OperationRecord;
use parking_lot::Mutex;
use std::collections::HashMap;
use tabled::settings::Style;
use tabled::Table;

/// Keeps every request timing in memory and prints a per-scenario summary of the requests at the
/// end of the run. Errored requests count towards `requests` and `errors` but not the timings.
#[derive(Debug, Default)]
pub struct InMemoryReporter {
    operation_records: Mutex<Vec<OperationRecord>>,
}

impl InMemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_count(&self) -> usize {
        self.operation_records.lock().len()
    }

    pub(crate) fn summarize_operations(&self) -> Vec<OperationRow> {
        let records = self.operation_records.lock();

        let mut order = Vec::new();
        let grouped = records
            .iter()
            .fold(HashMap::new(), |mut acc: HashMap<&str, Vec<&OperationRecord>>, record| {
                acc.entry(record.operation_id.as_str())
                    .or_insert_with(|| {
                        order.push(record.operation_id.as_str());
                        Vec::new()
                    })
                    .push(record);
                acc
            });

        order
            .into_iter()
            .filter_map(|operation_id| {
                let operations = grouped.get(operation_id)?;
                let timings_micro = operations
                    .iter()
                    .filter(|op| !op.is_error)
                    .filter_map(|op| op.duration())
                    .map(|duration| duration.as_micros() as f64)
                    .collect::<Vec<_>>();
                let total_micro = timings_micro.iter().sum::<f64>();
                let (min_micro, max_micro) = if timings_micro.is_empty() {
                    (0.0, 0.0)
                } else {
                    (
                        timings_micro.iter().copied().fold(f64::INFINITY, f64::min),
                        timings_micro.iter().copied().fold(0.0, f64::max),
                    )
                };

                Some(OperationRow {
                    scenario: operation_id.to_string(),
                    requests: operations.len(),
                    errors: operations.iter().filter(|op| op.is_error).count(),
                    avg_time_ms: if timings_micro.is_empty() {
                        0.0
                    } else {
                        total_micro / timings_micro.len() as f64 / 1000.0
                    },
                    min_time_ms: min_micro / 1000.0,
                    max_time_ms: max_micro / 1000.0,
                    total_duration_ms: total_micro / 1000.0,
                })
            })
            .collect()
    }

    fn print_summary_of_operations(&self) {
        let rows = self.summarize_operations();
        if rows.is_empty() {
            return;
        }

        println!("\nSummary of requests");
        let mut table = Table::new(rows);
        table.with(Style::modern());

        println!("{table}");
    }
}

impl ReportCollector for InMemoryReporter {
    fn add_operation(&self, operation_record: &OperationRecord) {
        self.operation_records.lock().push(operation_record.clone());
    }

    fn finalize(&self) {
        self.print_summary_of_operations();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report_operation;

    #[test]
    fn rows_follow_first_seen_order_and_count_errors() {
        let reporter = InMemoryReporter::new();
        let ok: Result<(), ()> = Ok(());
        let failed: Result<(), ()> = Err(());

        for page in 1..=3 {
            report_operation(&reporter, OperationRecord::new("b".to_string(), page), &ok);
        }
        report_operation(&reporter, OperationRecord::new("a".to_string(), 1), &ok);
        report_operation(&reporter, OperationRecord::new("b".to_string(), 4), &failed);

        let rows = reporter.summarize_operations();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].scenario, "b");
        assert_eq!(rows[0].requests, 4);
        assert_eq!(rows[0].errors, 1);
        assert!(rows[0].min_time_ms <= rows[0].max_time_ms);
        assert_eq!(rows[1].scenario, "a");
        assert_eq!(rows[1].errors, 0);
    }

    #[test]
    fn all_errors_gives_zero_average() {
        let reporter = InMemoryReporter::new();
        let failed: Result<(), ()> = Err(());
        report_operation(&reporter, OperationRecord::new("x".to_string(), 0), &failed);

        let rows = reporter.summarize_operations();
        assert_eq!(rows[0].avg_time_ms, 0.0);
        assert_eq!(rows[0].total_duration_ms, 0.0);
    }
}
