use std::sync::Arc;

use paging_bench_core::prelude::ShutdownHandle;
use paging_bench_instruments::ReportCollector;

use crate::config::BenchConfig;
use crate::executor::Executor;

pub type Reporter = dyn ReportCollector + Send + Sync;

/// Shared, read-only state for a run.
pub struct RunnerContext {
    executor: Arc<Executor>,
    config: BenchConfig,
    reporter: Arc<Reporter>,
    shutdown_handle: ShutdownHandle,
}

impl RunnerContext {
    pub fn new(
        executor: Arc<Executor>,
        config: BenchConfig,
        reporter: Arc<Reporter>,
        shutdown_handle: ShutdownHandle,
    ) -> Self {
        Self {
            executor,
            config,
            reporter,
            shutdown_handle,
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Reporter {
        self.reporter.as_ref()
    }

    pub fn shutdown_handle(&self) -> &ShutdownHandle {
        &self.shutdown_handle
    }

    /// Stop the run after the in-flight request. Scenarios that have not started are skipped, but
    /// the results gathered so far are still saved.
    pub fn force_stop(&self) {
        self.shutdown_handle.shutdown();
    }
}

impl std::fmt::Debug for RunnerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
