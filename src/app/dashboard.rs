use crate::app::service::{DashboardService, DashboardView};
use crate::app::store::{reduce, Action, DashboardState, Effect};
use crate::config::toml_config::DashboardConfig;
use crate::core::poller::PollerRegistry;
use crate::domain::model::{Community, Platform, Selection};
use crate::domain::ports::{Clock, SnapshotSource};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub type ViewReceiver = watch::Receiver<Option<Arc<DashboardView>>>;

struct RefreshTask {
    selection: Selection,
    handle: JoinHandle<()>,
}

/// Owns the selection state and every timer started on its behalf.
///
/// The refresh task publishes a fresh `DashboardView` immediately and then
/// once per refresh interval. Each refresh task is tagged with a generation;
/// once a task is cancelled its views are dropped instead of published, even
/// if its load was already running when the selection changed.
pub struct Dashboard {
    state: DashboardState,
    service: DashboardService,
    pollers: PollerRegistry,
    clock: Arc<dyn Clock>,
    refresh_interval: Duration,
    refresh: Option<RefreshTask>,
    views: Arc<watch::Sender<Option<Arc<DashboardView>>>>,
    generation: Arc<AtomicU64>,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        config: &DashboardConfig,
        clock: Arc<dyn Clock>,
        initial: DashboardState,
    ) -> Self {
        let (views, _) = watch::channel(None);
        Self {
            pollers: PollerRegistry::new(
                Arc::clone(&source),
                config.locator(),
                Arc::clone(&clock),
                config.poll_interval(),
            ),
            service: DashboardService::from_config(source, config),
            clock,
            refresh_interval: config.refresh_interval().max(Duration::from_millis(1)),
            refresh: None,
            views: Arc::new(views),
            generation: Arc::new(AtomicU64::new(0)),
            state: initial,
        }
    }

    /// A dashboard opened on yesterday for the configured defaults.
    pub fn with_defaults(
        source: Arc<dyn SnapshotSource>,
        config: &DashboardConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let initial = DashboardState::initial(
            config.defaults.platform,
            config.default_community(),
            clock.today(),
        );
        Self::new(source, config, clock, initial)
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn subscribe(&self) -> ViewReceiver {
        self.views.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<DashboardView>> {
        self.views.borrow().clone()
    }

    pub fn pollers(&self) -> &PollerRegistry {
        &self.pollers
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    pub fn refreshing_selection(&self) -> Option<&Selection> {
        self.refresh.as_ref().map(|task| &task.selection)
    }

    /// Applies `action` and returns the effects that were carried out.
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let today = self.clock.today();
        tracing::debug!("Dispatching {:?}", action);
        let transition = reduce(&self.state, action, today);
        self.state = transition.state;
        for effect in &transition.effects {
            self.apply(effect);
        }
        transition.effects
    }

    pub fn mount(&mut self) -> Vec<Effect> {
        self.dispatch(Action::Mount)
    }

    pub fn select_platform(&mut self, platform: Platform) -> Vec<Effect> {
        self.dispatch(Action::SelectPlatform(platform))
    }

    pub fn select_community(&mut self, community: Community) -> Vec<Effect> {
        self.dispatch(Action::SelectCommunity(community))
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Vec<Effect> {
        self.dispatch(Action::SelectDate(date))
    }

    pub fn refresh(&mut self) -> Vec<Effect> {
        self.dispatch(Action::Refresh)
    }

    pub fn teardown(&mut self) -> Vec<Effect> {
        self.dispatch(Action::Teardown)
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::CancelRefresh => self.cancel_refresh(),
            Effect::StartRefresh(selection) => self.start_refresh(selection.clone()),
            Effect::CancelPoller(community) => {
                self.pollers.cancel(community);
            }
            Effect::StartPoller {
                community,
                platform,
            } => self.pollers.start(*platform, community.clone()),
        }
    }

    fn cancel_refresh(&mut self) {
        // Bumped under the channel lock: a load of the old selection that is
        // still in flight sees the new generation before it can publish.
        let generation = &self.generation;
        self.views.send_if_modified(|_| {
            generation.fetch_add(1, Ordering::SeqCst);
            false
        });
        if let Some(task) = self.refresh.take() {
            task.handle.abort();
            tracing::debug!(
                "[{}] Stopped {} refresh timer",
                task.selection.community,
                task.selection.platform
            );
        }
    }

    fn start_refresh(&mut self, selection: Selection) {
        self.cancel_refresh();
        tracing::info!(
            "[{}] Refreshing {} data for {} every {:?}",
            selection.community,
            selection.platform,
            selection.date,
            self.refresh_interval
        );
        let handle = tokio::spawn(refresh_loop(
            self.service.clone(),
            selection.clone(),
            Arc::clone(&self.clock),
            self.refresh_interval,
            Arc::clone(&self.views),
            Arc::clone(&self.generation),
            self.generation.load(Ordering::SeqCst),
        ));
        self.refresh = Some(RefreshTask { selection, handle });
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.cancel_refresh();
        self.pollers.cancel_all();
    }
}

async fn refresh_loop(
    service: DashboardService,
    selection: Selection,
    clock: Arc<dyn Clock>,
    every: Duration,
    views: Arc<watch::Sender<Option<Arc<DashboardView>>>>,
    generation: Arc<AtomicU64>,
    own_generation: u64,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let view = service.load(&selection, clock.today()).await;
        let published = views.send_if_modified(|current| {
            if generation.load(Ordering::SeqCst) != own_generation {
                return false;
            }
            *current = Some(Arc::new(view));
            true
        });
        if !published {
            tracing::debug!(
                "[{}] Dropped {} view for a cancelled refresh",
                selection.community,
                selection.platform
            );
            break;
        }
    }
}
