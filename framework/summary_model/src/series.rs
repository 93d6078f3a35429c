use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recorded page latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// 1-based page index
    pub page: u64,
    pub response_time_ms: u64,
}

impl Sample {
    pub fn new(page: u64, response_time_ms: u64) -> Self {
        Self {
            page,
            response_time_ms,
        }
    }
}

/// The latency samples of one scenario, in the order they were recorded.
///
/// Page indices are strictly increasing. [MetricSeries::push] enforces this for series built
/// during a run; series read back from a snapshot are taken as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSeries(Vec<Sample>);

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Page {page} does not follow the last recorded page {last}")]
pub struct NonIncreasingPageError {
    pub last: u64,
    pub page: u64,
}

impl MetricSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) -> Result<(), NonIncreasingPageError> {
        if let Some(last) = self.0.last() {
            if sample.page <= last.page {
                return Err(NonIncreasingPageError {
                    last: last.page,
                    page: sample.page,
                });
            }
        }
        self.0.push(sample);
        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Sample>> for MetricSeries {
    fn from(samples: Vec<Sample>) -> Self {
        Self(samples)
    }
}

/// Scenario label to series, the content of one snapshot.
pub type SeriesMap = BTreeMap<String, MetricSeries>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rejects_repeated_or_earlier_pages() {
        let mut series = MetricSeries::new();
        series.push(Sample::new(1, 12)).unwrap();
        series.push(Sample::new(5, 10)).unwrap();

        assert_eq!(
            series.push(Sample::new(5, 10)),
            Err(NonIncreasingPageError { last: 5, page: 5 })
        );
        assert!(series.push(Sample::new(2, 10)).is_err());
        assert_eq!(series.len(), 2);
        assert_eq!(series.samples().last(), Some(&Sample::new(5, 10)));
    }

    #[test]
    fn serializes_as_plain_list() {
        let series = MetricSeries::from(vec![Sample::new(1, 4), Sample::new(2, 7)]);
        assert_eq!(
            serde_json::to_string(&series).unwrap(),
            r#"[{"page":1,"response_time_ms":4},{"page":2,"response_time_ms":7}]"#
        );
    }
}
