use paging_bench_summary_model::{MetricSeries, Sample};

/// Accumulates the accepted latency samples of one scenario during a walk.
///
/// Which pages are accepted is decided by the caller's sampling policy. The recorder only keeps
/// the series well formed: a sample that does not move the page index forward is dropped with a
/// warning instead of corrupting the series.
#[derive(Debug)]
pub struct SeriesRecorder {
    scenario: String,
    series: MetricSeries,
    dropped: usize,
}

impl SeriesRecorder {
    pub fn new(scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            series: MetricSeries::new(),
            dropped: 0,
        }
    }

    /// Append a sample. Returns whether it was kept.
    pub fn record(&mut self, page: u64, response_time_ms: u64) -> bool {
        match self.series.push(Sample::new(page, response_time_ms)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Dropping sample for {}: {e}", self.scenario);
                self.dropped += 1;
                false
            }
        }
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_series(self) -> MetricSeries {
        self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_increasing_pages_and_drops_the_rest() {
        let mut recorder = SeriesRecorder::new("q (Offset Pagination)");
        assert!(recorder.record(1, 30));
        assert!(recorder.record(11, 0));
        assert!(!recorder.record(11, 5));
        assert!(recorder.record(12, 9));

        assert_eq!(recorder.dropped(), 1);
        let pages = recorder
            .into_series()
            .samples()
            .iter()
            .map(|sample| sample.page)
            .collect::<Vec<_>>();
        assert_eq!(pages, vec![1, 11, 12]);
    }
}
