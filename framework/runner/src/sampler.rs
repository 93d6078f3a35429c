use paging_bench_summary_model::{PaginationMode, Scenario};

/// Fixed stride and interval used for search scenarios. Their result sets are far smaller than the
/// whole dataset so a stride derived from the dataset size would step past the last page at once.
pub const SEARCH_STRIDE: u64 = 10;

/// Target number of points per series. Both the offset stride and the cursor record interval are
/// derived from it.
pub const TARGET_POINTS: u64 = 1000;

/// Decides which pages a walk visits and which of the visited pages are recorded.
///
/// Offset walks skip ahead by [SamplingPolicy::offset_stride] and record every page they visit.
/// Cursor walks have to visit every page, so they bound the series size by recording only every
/// [SamplingPolicy::record_interval]th page instead. The first and last pages are always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    mode: PaginationMode,
    step: u64,
}

impl SamplingPolicy {
    pub fn new(mode: PaginationMode, dataset_size: u64, is_search: bool) -> Self {
        let step = if is_search {
            SEARCH_STRIDE
        } else {
            (dataset_size / TARGET_POINTS).max(1)
        };

        Self { mode, step }
    }

    pub fn for_scenario(scenario: &Scenario, dataset_size: u64) -> Self {
        Self::new(scenario.mode, dataset_size, scenario.query.is_search())
    }

    /// How many pages an offset walk moves forward after each request.
    pub fn offset_stride(&self) -> u64 {
        self.step
    }

    /// Every how many pages a cursor walk records a latency.
    pub fn record_interval(&self) -> u64 {
        self.step
    }

    /// Whether the latency of a visited page goes into the series.
    pub fn should_record(&self, page: u64, total_pages: u64) -> bool {
        match self.mode {
            PaginationMode::Offset => true,
            PaginationMode::Cursor => {
                page == 1 || page == total_pages || (page - 1) % self.record_interval() == 0
            }
        }
    }

    /// The next page an offset walk requests after `page`, or `None` once the last page has been
    /// visited. The stride is clamped so that the last page is always requested.
    pub fn next_offset_page(&self, page: u64, total_pages: u64) -> Option<u64> {
        if page >= total_pages {
            return None;
        }

        Some(page.saturating_add(self.offset_stride()).min(total_pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paging_bench_summary_model::{QueryParams, SearchType, SortOrder};
    use pretty_assertions::assert_eq;

    fn offset_pages(policy: &SamplingPolicy, total_pages: u64) -> Vec<u64> {
        let mut pages = vec![1];
        while let Some(next) = policy.next_offset_page(*pages.last().unwrap(), total_pages) {
            pages.push(next);
        }
        pages
    }

    #[test]
    fn million_rows_gives_stride_of_one_thousand() {
        let policy = SamplingPolicy::new(PaginationMode::Offset, 1_000_000, false);
        assert_eq!(policy.offset_stride(), 1000);

        let policy = SamplingPolicy::new(PaginationMode::Cursor, 1_000_000, false);
        assert_eq!(policy.record_interval(), 1000);
    }

    #[test]
    fn search_is_fixed_at_ten() {
        for size in [10, 10_000, 1_000_000, 50_000_000] {
            let policy = SamplingPolicy::new(PaginationMode::Offset, size, true);
            assert_eq!(policy.offset_stride(), 10);
            assert_eq!(policy.record_interval(), 10);
        }
    }

    #[test]
    fn small_dataset_steps_by_one() {
        let policy = SamplingPolicy::new(PaginationMode::Cursor, 999, false);
        assert_eq!(policy.record_interval(), 1);
        assert!((1..=50).all(|page| policy.should_record(page, 50)));
    }

    #[test]
    fn scenario_search_text_selects_search_step() {
        let scenario = Scenario {
            name: "Search".to_string(),
            group: "Text Search".to_string(),
            mode: PaginationMode::Offset,
            query: QueryParams::sorted_by("price", SortOrder::Asc, 20)
                .with_search("lamp", SearchType::Simple),
        };
        assert_eq!(
            SamplingPolicy::for_scenario(&scenario, 1_000_000).offset_stride(),
            SEARCH_STRIDE
        );
    }

    #[test]
    fn offset_walk_visits_first_and_last_page() {
        let policy = SamplingPolicy::new(PaginationMode::Offset, 10_000, false);
        assert_eq!(offset_pages(&policy, 25), vec![1, 11, 21, 25]);

        // A stride larger than the result set still lands on the last page
        let policy = SamplingPolicy::new(PaginationMode::Offset, 1_000_000, false);
        assert_eq!(offset_pages(&policy, 7), vec![1, 7]);

        assert_eq!(offset_pages(&policy, 1), vec![1]);
    }

    #[test]
    fn offset_records_every_visit() {
        let policy = SamplingPolicy::new(PaginationMode::Offset, 1_000_000, false);
        assert!(policy.should_record(1, 5000));
        assert!(policy.should_record(1001, 5000));
        assert!(policy.should_record(777, 5000));
    }

    #[test]
    fn cursor_records_boundaries_and_interval() {
        let policy = SamplingPolicy::new(PaginationMode::Cursor, 10_000, false);
        let recorded = (1..=25)
            .filter(|page| policy.should_record(*page, 25))
            .collect::<Vec<_>>();
        assert_eq!(recorded, vec![1, 11, 21, 25]);
    }
}
