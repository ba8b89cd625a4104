use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use offbox_core::CacheKey;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::config::{OffloadConfig, OnTimeout};

#[cfg(feature = "metrics")]
use crate::metrics::{
    OFFLOAD_TASK_DURATION, OFFLOAD_TASKS_ACTIVE, OFFLOAD_TASKS_COMPLETED,
    OFFLOAD_TASKS_DEDUPLICATED, OFFLOAD_TASKS_SPAWNED, OFFLOAD_TASKS_TIMEOUT,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TaskKey {
    Write(u64),
    Revalidate(CacheKey),
}

impl TaskKey {
    fn kind(&self) -> &'static str {
        match self {
            Self::Write(_) => "cache_write",
            Self::Revalidate(_) => "revalidate",
        }
    }
}

#[derive(Debug)]
struct Tracked {
    id: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct Inner {
    config: OffloadConfig,
    tasks: DashMap<TaskKey, Tracked>,
    next_id: AtomicU64,
}

/// Runs background store writes and revalidations and keeps track of them
/// until they finish.
///
/// Cloning is cheap; all clones share the same task table.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    inner: Arc<Inner>,
}

impl OffloadManager {
    pub fn new(config: OffloadConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                tasks: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Spawns a store write.
    pub fn spawn_write<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.track(TaskKey::Write(id), id, task);
    }

    /// Spawns a background refresh of `key`.
    ///
    /// Returns `false` without spawning when deduplication is on and a
    /// refresh of the same key is still running.
    pub fn spawn_revalidation<F>(&self, key: CacheKey, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.track(TaskKey::Revalidate(key), id, task)
    }

    /// Whether a refresh of `key` is still running.
    pub fn is_revalidating(&self, key: &CacheKey) -> bool {
        self.inner
            .tasks
            .get(&TaskKey::Revalidate(key.clone()))
            .is_some_and(|tracked| !tracked.handle.is_finished())
    }

    /// Waits until every tracked task has finished, including tasks
    /// spawned while waiting.
    pub async fn wait_all(&self) {
        loop {
            self.inner
                .tasks
                .retain(|_, tracked| !tracked.handle.is_finished());
            if self.inner.tasks.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    // The entry guard is held across the spawn, so the task cannot reach
    // its own removal before its handle is in the table.
    fn track<F>(&self, key: TaskKey, id: u64, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let entry = self.inner.tasks.entry(key.clone());
        if let Entry::Occupied(running) = &entry
            && self.inner.config.deduplicate_revalidations
            && !running.get().handle.is_finished()
        {
            debug!(kind = key.kind(), "Revalidation already in flight");
            #[cfg(feature = "metrics")]
            metrics::counter!(*OFFLOAD_TASKS_DEDUPLICATED, "kind" => key.kind()).increment(1);
            return false;
        }

        #[cfg(feature = "metrics")]
        {
            metrics::counter!(*OFFLOAD_TASKS_SPAWNED, "kind" => key.kind()).increment(1);
            metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "kind" => key.kind()).increment(1.0);
        }

        let handle = self.run(key, id, task);
        entry.insert(Tracked { id, handle });
        true
    }

    fn run<F>(&self, key: TaskKey, id: u64, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let inner = self.inner.clone();
        let span = info_span!("offload_task", kind = key.kind(), id);

        tokio::spawn(
            async move {
                let start = Instant::now();
                let completed = match (inner.config.timeout, inner.config.on_timeout) {
                    (None, _) => {
                        task.await;
                        true
                    }
                    (Some(limit), OnTimeout::Cancel) => {
                        let finished = tokio::time::timeout(limit, task).await.is_ok();
                        if !finished {
                            warn!(limit_ms = limit.as_millis(), "Background task cancelled");
                        }
                        finished
                    }
                    (Some(limit), OnTimeout::Warn) => {
                        task.await;
                        let elapsed = start.elapsed();
                        if elapsed > limit {
                            warn!(
                                elapsed_ms = elapsed.as_millis(),
                                limit_ms = limit.as_millis(),
                                "Background task ran past its limit"
                            );
                        }
                        true
                    }
                };
                // A newer task may own the slot when deduplication is off.
                inner.tasks.remove_if(&key, |_, tracked| tracked.id == id);
                record_finish(start, key.kind(), completed);
            }
            .instrument(span),
        )
    }
}

#[cfg(feature = "metrics")]
fn record_finish(start: Instant, kind: &'static str, completed: bool) {
    let counter = if completed {
        *OFFLOAD_TASKS_COMPLETED
    } else {
        *OFFLOAD_TASKS_TIMEOUT
    };
    metrics::counter!(counter, "kind" => kind).increment(1);
    metrics::gauge!(*OFFLOAD_TASKS_ACTIVE, "kind" => kind).decrement(1.0);
    metrics::histogram!(*OFFLOAD_TASK_DURATION, "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

#[cfg(not(feature = "metrics"))]
fn record_finish(_start: Instant, _kind: &'static str, _completed: bool) {}

impl Default for OffloadManager {
    fn default() -> Self {
        Self::new(OffloadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use url::Url;

    use super::*;

    fn index_key() -> CacheKey {
        CacheKey::get(&Url::parse("https://app.example/index.html").unwrap())
    }

    #[tokio::test]
    async fn wait_all_drains_spawned_writes() {
        let manager = OffloadManager::default();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let done = done.clone();
            manager.spawn_write(async move {
                tokio::task::yield_now().await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }

        manager.wait_all().await;

        assert_eq!(done.load(Ordering::SeqCst), 5);
        assert!(manager.inner.tasks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn finished_writes_leave_the_table_without_wait_all() {
        let manager = OffloadManager::default();
        for _ in 0..2000 {
            manager.spawn_write(async {});
        }

        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while !manager.inner.tasks.is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;

        assert!(
            drained.is_ok(),
            "{} finished writes still tracked",
            manager.inner.tasks.len()
        );
    }

    #[tokio::test]
    async fn revalidations_are_deduplicated() {
        let manager = OffloadManager::default();
        let (release, gate) = tokio::sync::oneshot::channel::<()>();

        assert!(manager.spawn_revalidation(index_key(), async move {
            let _ = gate.await;
        }));
        assert!(manager.is_revalidating(&index_key()));
        assert!(!manager.spawn_revalidation(index_key(), async {}));

        let _ = release.send(());
        manager.wait_all().await;
        assert!(!manager.is_revalidating(&index_key()));
        assert!(manager.spawn_revalidation(index_key(), async {}));
        manager.wait_all().await;
    }

    #[tokio::test]
    async fn older_revalidation_keeps_the_newer_slot() {
        let manager = OffloadManager::new(OffloadConfig {
            deduplicate_revalidations: false,
            ..OffloadConfig::default()
        });
        let (release_first, first_gate) = tokio::sync::oneshot::channel::<()>();
        let (release_second, second_gate) = tokio::sync::oneshot::channel::<()>();

        assert!(manager.spawn_revalidation(index_key(), async move {
            let _ = first_gate.await;
        }));
        assert!(manager.spawn_revalidation(index_key(), async move {
            let _ = second_gate.await;
        }));

        let _ = release_first.send(());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(manager.is_revalidating(&index_key()));

        let _ = release_second.send(());
        manager.wait_all().await;
        assert!(!manager.is_revalidating(&index_key()));
    }

    #[tokio::test]
    async fn cancel_on_timeout_stops_slow_tasks() {
        let manager = OffloadManager::new(OffloadConfig {
            timeout: Some(Duration::from_millis(10)),
            ..OffloadConfig::default()
        });
        let done = Arc::new(AtomicUsize::new(0));
        let flag = done.clone();

        manager.spawn_write(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::timeout(Duration::from_secs(1), manager.wait_all())
            .await
            .unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn warn_on_timeout_lets_slow_tasks_finish() {
        let manager = OffloadManager::new(OffloadConfig {
            timeout: Some(Duration::from_millis(5)),
            on_timeout: OnTimeout::Warn,
            ..OffloadConfig::default()
        });
        let done = Arc::new(AtomicUsize::new(0));
        let flag = done.clone();

        manager.spawn_write(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });

        manager.wait_all().await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
