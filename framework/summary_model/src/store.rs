use crate::series::{MetricSeries, SeriesMap};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot {path} is not valid: {source}")]
    Serde {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to replace snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Where snapshots live. One snapshot per dataset size label.
pub trait SnapshotStore {
    /// Load the snapshot for `label`. A label that has never been saved loads as empty.
    fn load(&self, label: &str) -> Result<SeriesMap, StoreError>;

    /// Replace the snapshot for `label` with `series`.
    fn save(&self, label: &str, series: &SeriesMap) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self, label: &str) -> Result<SeriesMap, StoreError> {
        (**self).load(label)
    }

    fn save(&self, label: &str, series: &SeriesMap) -> Result<(), StoreError> {
        (**self).save(label, series)
    }
}

/// Snapshots as `response_times_<label>.json` files in a results directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("response_times_{label}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, label: &str) -> Result<SeriesMap, StoreError> {
        let path = self.path_for(label);
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No snapshot at {}, starting empty", path.display());
                return Ok(SeriesMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StoreError::Serde { path, source })
    }

    /// The snapshot is written to a temporary file next to the target and renamed over it, so a
    /// failed save leaves the previous snapshot intact.
    fn save(&self, label: &str, series: &SeriesMap) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(label);

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, series).map_err(|source| {
                StoreError::Serde {
                    path: path.clone(),
                    source,
                }
            })?;
            writer.flush()?;
        }
        temp.persist(&path)?;

        log::debug!("Saved {} series to {}", series.len(), path.display());
        Ok(())
    }
}

/// Snapshots held in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: Mutex<HashMap<String, SeriesMap>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(self, label: &str, series: SeriesMap) -> Self {
        self.snapshots.lock().insert(label.to_string(), series);
        self
    }

    pub fn snapshot(&self, label: &str) -> Option<SeriesMap> {
        self.snapshots.lock().get(label).cloned()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self, label: &str) -> Result<SeriesMap, StoreError> {
        Ok(self.snapshot(label).unwrap_or_default())
    }

    fn save(&self, label: &str, series: &SeriesMap) -> Result<(), StoreError> {
        self.snapshots
            .lock()
            .insert(label.to_string(), series.clone());
        Ok(())
    }
}

/// Overlay the series touched by a run onto a previously saved snapshot.
///
/// Touched keys replace the saved ones entirely; keys the run did not touch are kept unchanged.
pub fn merge_snapshot(mut existing: SeriesMap, touched: SeriesMap) -> SeriesMap {
    existing.extend(touched);
    existing
}

/// The result store for one dataset size label over the course of a run.
///
/// The saved snapshot is loaded when the store is opened so that a corrupt snapshot is reported
/// before any requests are made. Nothing is written until [ResultStore::persist].
pub struct ResultStore<S: SnapshotStore> {
    store: S,
    label: String,
    existing: SeriesMap,
    touched: SeriesMap,
}

impl<S: SnapshotStore> ResultStore<S> {
    pub fn open(store: S, label: &str) -> Result<Self, StoreError> {
        let existing = store.load(label)?;
        log::info!(
            "Loaded {} existing series for dataset size {label}",
            existing.len()
        );

        Ok(Self {
            store,
            label: label.to_string(),
            existing,
            touched: SeriesMap::new(),
        })
    }

    /// Replace the scenario's series for this run. An empty series still replaces the saved one.
    pub fn record_series(&mut self, scenario: &str, series: MetricSeries) {
        self.touched.insert(scenario.to_string(), series);
    }

    /// Merge the touched series into the loaded snapshot and save the result in one write.
    pub fn persist(self) -> Result<SeriesMap, StoreError> {
        let touched_count = self.touched.len();
        let merged = merge_snapshot(self.existing, self.touched);
        self.store.save(&self.label, &merged)?;
        log::info!(
            "Persisted {} series ({} from this run) for dataset size {}",
            merged.len(),
            touched_count,
            self.label
        );
        Ok(merged)
    }
}
