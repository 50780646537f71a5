//! The reload scheduler: periodic refresh cycles and snapshot publication.
//!
//! One cycle runs Loading → Building → Publishing and returns to Idle.
//! Failures during Loading or Building abandon the cycle: the previously
//! published snapshot remains authoritative and keeps serving unchanged,
//! and the failure is surfaced through the returned error, a WARN log,
//! and the `reload_cycles_total{outcome="failed"}` counter.
//!
//! Exactly one cycle is in flight at a time. [`ReloadScheduler::run_cycle`]
//! doubles as the explicit trigger: a call arriving while a cycle is
//! already running coalesces instead of starting a second one, and tests
//! drive cycles synchronously through it without the timer.

use super::SuggestionService;
use crate::index::SuggestionIndex;
use crate::models::BuildStats;
use crate::source::DatasetSource;
use crate::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// Timing configuration for the reload scheduler.
#[derive(Debug, Clone, Copy)]
pub struct ReloadConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Bound on a single dataset load.
    pub load_timeout: Duration,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(900),
            load_timeout: Duration::from_secs(30),
        }
    }
}

/// Phase of the reload state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    /// No cycle in flight.
    Idle,
    /// Invoking the dataset source.
    Loading,
    /// Building the next index from the loaded dataset.
    Building,
    /// Swapping the published snapshot.
    Publishing,
}

const IDLE: u8 = 0;
const LOADING: u8 = 1;
const BUILDING: u8 = 2;
const PUBLISHING: u8 = 3;

impl ReloadState {
    const fn from_u8(value: u8) -> Self {
        match value {
            LOADING => Self::Loading,
            BUILDING => Self::Building,
            PUBLISHING => Self::Publishing,
            _ => Self::Idle,
        }
    }
}

/// Result of one reload trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot was published.
    Published {
        /// Generation of the published snapshot.
        generation: u64,
        /// Build counters for the cycle.
        stats: BuildStats,
    },
    /// Another cycle was already in flight; this trigger was dropped.
    Coalesced,
}

/// Restores the scheduler to Idle when a cycle ends, including when the
/// cycle future is dropped mid-flight (task cancellation).
struct CycleGuard<'a> {
    state: &'a AtomicU8,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.state.store(IDLE, Ordering::Release);
    }
}

/// Drives periodic dataset refreshes and publishes the results.
///
/// The scheduler is the single writer of the published snapshot. It is
/// fully decoupled from readers: building happens on a task-local index
/// and publication is one atomic swap.
pub struct ReloadScheduler {
    source: Arc<dyn DatasetSource>,
    service: Arc<SuggestionService>,
    config: ReloadConfig,
    state: AtomicU8,
}

impl ReloadScheduler {
    /// Creates a scheduler over the given source and service.
    #[must_use]
    pub fn new(
        source: Arc<dyn DatasetSource>,
        service: Arc<SuggestionService>,
        config: ReloadConfig,
    ) -> Self {
        Self {
            source,
            service,
            config,
            state: AtomicU8::new(IDLE),
        }
    }

    /// Returns the current phase of the state machine.
    #[must_use]
    pub fn state(&self) -> ReloadState {
        ReloadState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Runs one reload cycle: load, build, publish.
    ///
    /// This is also the explicit trigger. If a cycle is already in flight
    /// the call returns [`CycleOutcome::Coalesced`] without doing any work.
    ///
    /// # Errors
    ///
    /// Returns the load, parse, or timeout error that abandoned the cycle.
    /// The previously published snapshot is untouched on every error path.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        if self
            .state
            .compare_exchange(IDLE, LOADING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(source = %self.source.describe(), "reload trigger coalesced");
            metrics::counter!("reload_cycles_total", "outcome" => "coalesced").increment(1);
            return Ok(CycleOutcome::Coalesced);
        }
        let _guard = CycleGuard { state: &self.state };

        let dataset = match tokio::time::timeout(self.config.load_timeout, self.source.load()).await
        {
            Ok(Ok(dataset)) => dataset,
            Ok(Err(e)) => return Err(fail_cycle(e)),
            Err(_) => {
                return Err(fail_cycle(Error::Timeout {
                    source: self.source.describe(),
                    elapsed_secs: self.config.load_timeout.as_secs(),
                }));
            }
        };

        self.state.store(BUILDING, Ordering::Release);
        let (index, stats) = SuggestionIndex::build(dataset);
        if stats.dropped > 0 {
            tracing::warn!(
                dropped = stats.dropped,
                source = %self.source.describe(),
                "dropped entries without a usable key"
            );
        }

        self.state.store(PUBLISHING, Ordering::Release);
        let generation = self.service.publish(index);

        tracing::info!(
            generation,
            indexed = stats.indexed,
            dropped = stats.dropped,
            replaced = stats.replaced,
            source = %self.source.describe(),
            "published new suggestion snapshot"
        );
        metrics::counter!("reload_cycles_total", "outcome" => "published").increment(1);
        metrics::gauge!("reload_entries_indexed").set(stats.indexed as f64);
        metrics::counter!("reload_entries_dropped_total").increment(stats.dropped as u64);

        Ok(CycleOutcome::Published { generation, stats })
    }

    /// Runs the periodic refresh loop.
    ///
    /// The first cycle starts immediately; after each cycle (successful or
    /// not) the loop sleeps for the configured interval, so the interval is
    /// measured from the end of one cycle to the start of the next and a
    /// slow source cannot starve future reloads.
    pub async fn run(&self) {
        loop {
            match self.run_cycle().await {
                Ok(CycleOutcome::Published { generation, stats }) => {
                    tracing::debug!(generation, indexed = stats.indexed, "reload cycle complete");
                }
                Ok(CycleOutcome::Coalesced) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "reload cycle failed; previous snapshot keeps serving");
                }
            }
            tokio::time::sleep(self.config.interval).await;
        }
    }

}

/// Counts an abandoned cycle and hands the error back for propagation.
fn fail_cycle(error: Error) -> Error {
    metrics::counter!("reload_cycles_total", "outcome" => "failed").increment(1);
    error
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::{RawDataset, RawEntry};
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use tokio_test::assert_ok;

    fn dataset(keys: &[&str]) -> RawDataset {
        keys.iter()
            .map(|k| RawEntry {
                key: Some((*k).to_string()),
                payload: Map::new(),
            })
            .collect()
    }

    /// Source that pops queued outcomes, one per load call.
    struct QueuedSource {
        outcomes: Mutex<Vec<Result<RawDataset>>>,
    }

    impl QueuedSource {
        fn new(outcomes: Vec<Result<RawDataset>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
            }
        }
    }

    #[async_trait]
    impl DatasetSource for QueuedSource {
        async fn load(&self) -> Result<RawDataset> {
            self.outcomes.lock().unwrap().remove(0)
        }

        fn describe(&self) -> String {
            "queued".to_string()
        }
    }

    /// Source that parks until released, for observing an in-flight cycle.
    struct BlockingSource {
        release: Notify,
    }

    #[async_trait]
    impl DatasetSource for BlockingSource {
        async fn load(&self) -> Result<RawDataset> {
            self.release.notified().await;
            Ok(dataset(&["apple"]))
        }

        fn describe(&self) -> String {
            "blocking".to_string()
        }
    }

    fn scheduler_with(
        source: Arc<dyn DatasetSource>,
        config: ReloadConfig,
    ) -> (ReloadScheduler, Arc<SuggestionService>) {
        let service = Arc::new(SuggestionService::new(10));
        let scheduler = ReloadScheduler::new(source, Arc::clone(&service), config);
        (scheduler, service)
    }

    #[tokio::test]
    async fn test_successful_cycle_publishes_next_generation() {
        let source = Arc::new(QueuedSource::new(vec![Ok(dataset(&["apple", "app"]))]));
        let (scheduler, service) = scheduler_with(source, ReloadConfig::default());

        let outcome = scheduler.run_cycle().await.unwrap();
        match outcome {
            CycleOutcome::Published { generation, stats } => {
                assert_eq!(generation, 1);
                assert_eq!(stats.indexed, 2);
            }
            CycleOutcome::Coalesced => unreachable!("no competing cycle"),
        }
        assert_eq!(service.suggest("app").len(), 2);
        assert_eq!(scheduler.state(), ReloadState::Idle);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_snapshot() {
        let source = Arc::new(QueuedSource::new(vec![
            Ok(dataset(&["apple"])),
            Err(Error::Load {
                source: "queued".to_string(),
                cause: "gone".to_string(),
            }),
        ]));
        let (scheduler, service) = scheduler_with(source, ReloadConfig::default());

        scheduler.run_cycle().await.unwrap();
        assert_eq!(service.generation(), 1);

        let err = scheduler.run_cycle().await.unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
        // Failure isolation: generation and data are unchanged.
        assert_eq!(service.generation(), 1);
        assert_eq!(service.suggest("app").len(), 1);
        assert_eq!(scheduler.state(), ReloadState::Idle);
    }

    #[tokio::test]
    async fn test_empty_dataset_publishes_empty_index() {
        let source = Arc::new(QueuedSource::new(vec![Ok(RawDataset::default())]));
        let (scheduler, service) = scheduler_with(source, ReloadConfig::default());

        tokio_test::assert_ok!(scheduler.run_cycle().await);
        assert_eq!(service.generation(), 1);
        assert!(service.suggest("anything").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_load_times_out_and_abandons_cycle() {
        struct HungSource;

        #[async_trait]
        impl DatasetSource for HungSource {
            async fn load(&self) -> Result<RawDataset> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(RawDataset::default())
            }

            fn describe(&self) -> String {
                "hung".to_string()
            }
        }

        let config = ReloadConfig {
            interval: Duration::from_secs(900),
            load_timeout: Duration::from_secs(5),
        };
        let (scheduler, service) = scheduler_with(Arc::new(HungSource), config);

        let err = scheduler.run_cycle().await.unwrap_err();
        assert!(matches!(err, Error::Timeout { elapsed_secs: 5, .. }));
        assert_eq!(service.generation(), 0);
        assert_eq!(scheduler.state(), ReloadState::Idle);
    }

    #[tokio::test]
    async fn test_trigger_during_in_flight_cycle_coalesces() {
        let source = Arc::new(BlockingSource {
            release: Notify::new(),
        });
        let service = Arc::new(SuggestionService::new(10));
        let scheduler = Arc::new(ReloadScheduler::new(
            Arc::clone(&source) as Arc<dyn DatasetSource>,
            Arc::clone(&service),
            ReloadConfig::default(),
        ));

        let running = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run_cycle().await })
        };

        // Wait for the first cycle to reach Loading.
        while scheduler.state() == ReloadState::Idle {
            tokio::task::yield_now().await;
        }

        let outcome = scheduler.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Coalesced);

        source.release.notify_one();
        let first = running.await.unwrap().unwrap();
        assert!(matches!(first, CycleOutcome::Published { generation: 1, .. }));
        assert_eq!(service.generation(), 1);
    }
}
