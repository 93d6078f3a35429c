use itertools::Itertools;
use paging_bench_summary_model::{MetricSeries, QueryCatalog, SeriesMap, SnapshotStore};

/// The saved series of several dataset sizes, in the order the labels were asked for.
#[derive(Debug, Clone, Default)]
pub struct Snapshots {
    by_label: Vec<(String, SeriesMap)>,
}

impl Snapshots {
    /// Load the snapshot for each label. Labels that were never saved are left out.
    pub fn load(store: &impl SnapshotStore, labels: &[String]) -> anyhow::Result<Self> {
        let mut by_label = Vec::with_capacity(labels.len());
        for label in labels {
            let series = store.load(label)?;
            if series.is_empty() {
                log::info!("No results for dataset size {label}, leaving it out");
                continue;
            }

            log::debug!("Loaded {} series for dataset size {label}", series.len());
            by_label.push((label.clone(), series));
        }

        Ok(Self { by_label })
    }

    pub fn from_series(by_label: Vec<(String, SeriesMap)>) -> Self {
        Self { by_label }
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_label.iter().map(|(label, _)| label.as_str())
    }

    pub fn series(&self, dataset_label: &str, scenario: &str) -> Option<&MetricSeries> {
        self.by_label
            .iter()
            .find(|(label, _)| label == dataset_label)
            .and_then(|(_, series)| series.get(scenario))
    }

    /// Every stored scenario key, in order of first appearance across the labels.
    pub fn scenario_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        for (_, series) in &self.by_label {
            for key in series.keys() {
                if !keys.contains(&key.as_str()) {
                    keys.push(key.as_str());
                }
            }
        }
        keys
    }

    /// Every stored scenario key, ordered by position in the catalog. Keys the catalog does not
    /// know follow in order of first appearance.
    pub fn scenario_keys_in(&self, catalog: &QueryCatalog) -> Vec<&str> {
        let order = catalog
            .scenarios()
            .iter()
            .map(|scenario| scenario.label())
            .collect::<Vec<_>>();

        self.scenario_keys()
            .into_iter()
            .sorted_by_key(|key| {
                order
                    .iter()
                    .position(|label| label == key)
                    .unwrap_or(order.len())
            })
            .collect()
    }
}
