//! Background probes that wait for yesterday's snapshot to be published.
//!
//! A poll task is `idle → polling → idle`: it probes once right away, then once
//! per interval, and exits on the first successful read. There is no attempt
//! limit. The registry keeps at most one task per community.

use crate::core::naming::SnapshotLocator;
use crate::domain::model::{Community, Platform};
use crate::domain::ports::{Clock, SnapshotSource};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30 * 60);

struct PollTask {
    platform: Platform,
    handle: JoinHandle<()>,
}

pub struct PollerRegistry {
    source: Arc<dyn SnapshotSource>,
    locator: SnapshotLocator,
    clock: Arc<dyn Clock>,
    interval: Duration,
    tasks: Mutex<HashMap<Community, PollTask>>,
}

impl PollerRegistry {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        locator: SnapshotLocator,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            locator,
            clock,
            interval: interval.max(Duration::from_millis(1)),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<Community, PollTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts polling for `community`, replacing any task already running for it.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, platform: Platform, community: Community) {
        let handle = tokio::spawn(poll_until_published(
            Arc::clone(&self.source),
            self.locator.clone(),
            Arc::clone(&self.clock),
            platform,
            community.clone(),
            self.interval,
        ));

        if let Some(previous) = self.tasks().insert(community.clone(), PollTask { platform, handle }) {
            previous.handle.abort();
            tracing::debug!("[{}] Replaced {} poller", community, previous.platform);
        }
        tracing::info!("[{}] Started {} poller for yesterday's data", community, platform);
    }

    /// Aborts the task for `community`. Returns whether one was still running.
    pub fn cancel(&self, community: &Community) -> bool {
        match self.tasks().remove(community) {
            Some(task) => {
                let was_running = !task.handle.is_finished();
                task.handle.abort();
                if was_running {
                    tracing::info!("[{}] Cancelled {} poller", community, task.platform);
                }
                was_running
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (community, task) in self.tasks().drain() {
            task.handle.abort();
            tracing::debug!("[{}] Cancelled {} poller", community, task.platform);
        }
    }

    pub fn is_polling(&self, community: &Community) -> bool {
        self.tasks()
            .get(community)
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Platform of the running task for `community`, if any.
    pub fn polling_platform(&self, community: &Community) -> Option<Platform> {
        self.tasks()
            .get(community)
            .filter(|task| !task.handle.is_finished())
            .map(|task| task.platform)
    }

    pub fn active_count(&self) -> usize {
        self.tasks()
            .values()
            .filter(|task| !task.handle.is_finished())
            .count()
    }
}

impl Drop for PollerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn poll_until_published(
    source: Arc<dyn SnapshotSource>,
    locator: SnapshotLocator,
    clock: Arc<dyn Clock>,
    platform: Platform,
    community: Community,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        // Recomputed per attempt so a poller survives midnight.
        let path = locator.daily(platform, &community, clock.yesterday());
        tracing::info!("[{}] Polling attempt: checking for {}", community, path.file_name());

        match source.fetch(&path).await {
            Ok(_) => {
                tracing::info!(
                    "[{}] {} is now available, stopping poller",
                    community,
                    path.file_name()
                );
                return;
            }
            Err(e) => tracing::info!(
                "[{}] {} not available yet ({}), retrying in {:?}",
                community,
                path.file_name(),
                e,
                every
            ),
        }
    }
}
