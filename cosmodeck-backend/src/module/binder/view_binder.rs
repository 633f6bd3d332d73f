///! View binder
///!
///! Owns the loading state of one screen section: issues its batch through
///! the `Loader` on activation, optionally re-polls on a fixed interval and
///! derives the view model from the latest state.
///!
///! Guarantees:
///! - refreshes and poll ticks share one in-flight guard, so requests for
///!   the same key never overlap
///! - a generation counter discards results of a batch that was superseded
///!   by `set_requests` or `deactivate`
///! - batches run in tasks owned by the binder: dropping a caller of
///!   `activate`/`refresh` does not stop the load or the polling, while
///!   `deactivate` and `set_requests` abort the batch in flight
///! - `deactivate` aborts the poll task; nothing is applied afterwards
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::state::{LoaderState, Snapshot};
use crate::module::loader::{Loader, ResourceRequest, ResourceResult};
use crate::module::sim::{Clock, SystemClock};

/// Pure derivation of what a section shows from its loader state
pub trait ViewModel: Send + Sync + 'static {
    /// Schema of each loaded resource
    type Data: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;
    /// Filter / sort choices
    type Selection: DeserializeOwned + Serialize + Clone + Default + Send + Sync + 'static;
    type Output: Serialize;

    /// Must be deterministic in its inputs and free of side effects
    fn derive(snapshot: &Snapshot<Self::Data>, selection: &Self::Selection) -> Self::Output;
}

struct Shared<V: ViewModel> {
    active: bool,
    generation: u64,
    requests: Vec<ResourceRequest>,
    states: HashMap<String, LoaderState<V::Data>>,
    selection: V::Selection,
}

struct Inner<V: ViewModel> {
    name: String,
    loader: Arc<Loader>,
    clock: Arc<dyn Clock>,
    poll_interval: Option<Duration>,
    shared: RwLock<Shared<V>>,
    in_flight: Arc<tokio::sync::Mutex<()>>,
    tasks: Mutex<Tasks>,
    version: watch::Sender<u64>,
}

#[derive(Default)]
struct Tasks {
    poll: Option<JoinHandle<()>>,
    batch: Option<AbortHandle>,
}

/// Cloneable handle; clones share the same state
pub struct ViewBinder<V: ViewModel> {
    inner: Arc<Inner<V>>,
}

impl<V: ViewModel> Clone for ViewBinder<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct ViewBinderBuilder<V: ViewModel> {
    name: String,
    loader: Arc<Loader>,
    clock: Arc<dyn Clock>,
    poll_interval: Option<Duration>,
    requests: Vec<ResourceRequest>,
    selection: V::Selection,
}

impl<V: ViewModel> ViewBinderBuilder<V> {
    pub fn request(mut self, request: ResourceRequest) -> Self {
        self.requests.push(request);
        self
    }

    pub fn requests(mut self, requests: Vec<ResourceRequest>) -> Self {
        self.requests = requests;
        self
    }

    /// Re-issue the batch every `interval` while active
    pub fn poll_every(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn selection(mut self, selection: V::Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn build(self) -> ViewBinder<V> {
        let (version, _) = watch::channel(0);
        ViewBinder {
            inner: Arc::new(Inner {
                name: self.name,
                loader: self.loader,
                clock: self.clock,
                poll_interval: self.poll_interval,
                shared: RwLock::new(Shared {
                    active: false,
                    generation: 0,
                    requests: self.requests,
                    states: HashMap::new(),
                    selection: self.selection,
                }),
                in_flight: Arc::new(tokio::sync::Mutex::new(())),
                tasks: Mutex::new(Tasks::default()),
                version,
            }),
        }
    }
}

impl<V: ViewModel> ViewBinder<V> {
    pub fn builder(name: impl Into<String>, loader: Arc<Loader>) -> ViewBinderBuilder<V> {
        ViewBinderBuilder {
            name: name.into(),
            loader,
            clock: Arc::new(SystemClock),
            poll_interval: None,
            requests: Vec::new(),
            selection: V::Selection::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.inner.poll_interval
    }

    pub fn is_active(&self) -> bool {
        self.read().active
    }

    /// Start polling if configured, then wait for the first load.
    /// Calling it on an active binder does nothing. Dropping the returned
    /// future early leaves the binder active: the first load and the polling
    /// carry on in their own tasks.
    pub async fn activate(&self) {
        {
            let mut shared = self.write();
            if shared.active {
                return;
            }
            shared.active = true;
            shared.generation += 1;
        }
        info!("View '{}' activated", self.inner.name);

        if let Some(period) = self.inner.poll_interval {
            let mut tasks = self.lock_tasks();
            if tasks.poll.is_none() {
                debug!("View '{}' polling every {:?}", self.inner.name, period);
                tasks.poll = Some(self.spawn_poller(period));
            }
        }

        self.refresh().await;
    }

    /// Re-issue the current batch now. Waits for a batch already in flight
    /// instead of overlapping it. Returns `false` when the binder is inactive
    /// or the result was superseded before it arrived.
    pub async fn refresh(&self) -> bool {
        let in_flight = self.inner.in_flight.clone().lock_owned().await;

        let Some((generation, requests)) = self.begin_batch() else {
            return false;
        };

        // The guard moves into the task, so the next batch waits for this one
        // even if our caller goes away
        let binder = self.clone();
        let batch = tokio::spawn(async move {
            let _in_flight = in_flight;
            let batch = binder.inner.loader.load_all::<V::Data>(&requests).await;
            binder.apply(generation, batch.results)
        });
        self.lock_tasks().batch = Some(batch.abort_handle());
        if self.read().generation != generation {
            batch.abort();
        }

        match batch.await {
            Ok(applied) => applied,
            Err(e) => {
                debug!("View '{}' batch (generation {}) stopped: {}", self.inner.name, generation, e);
                false
            }
        }
    }

    /// Stop polling and drop any result still in flight. State stays
    /// readable but is never updated again until the next `activate`.
    pub fn deactivate(&self) {
        {
            let mut shared = self.write();
            if !shared.active {
                return;
            }
            shared.active = false;
            shared.generation += 1;
        }
        let (poll, batch) = {
            let mut tasks = self.lock_tasks();
            (tasks.poll.take(), tasks.batch.take())
        };
        if let Some(handle) = poll {
            handle.abort();
        }
        if let Some(handle) = batch {
            handle.abort();
        }
        info!("View '{}' deactivated", self.inner.name);
    }

    /// Retarget the binder. States of keys no longer requested are dropped
    /// and a batch still in flight for the old targets is discarded.
    pub async fn set_requests(&self, requests: Vec<ResourceRequest>) {
        let active = {
            let mut shared = self.write();
            shared.generation += 1;
            shared.states.retain(|key, _| requests.iter().any(|r| &r.key == key));
            shared.requests = requests;
            shared.active
        };
        if let Some(stale) = self.lock_tasks().batch.take() {
            stale.abort();
        }
        self.notify();

        if active {
            self.refresh().await;
        }
    }

    pub fn requests(&self) -> Vec<ResourceRequest> {
        self.read().requests.clone()
    }

    pub fn set_selection(&self, selection: V::Selection) {
        self.write().selection = selection;
        self.notify();
    }

    pub fn selection(&self) -> V::Selection {
        self.read().selection.clone()
    }

    /// States of the current requests, in request order
    pub fn snapshot(&self) -> Snapshot<V::Data> {
        let shared = self.read();
        Snapshot {
            states: shared
                .requests
                .iter()
                .map(|r| (r.key.clone(), shared.states.get(&r.key).cloned().unwrap_or_default()))
                .collect(),
        }
    }

    /// View model for the stored selection
    pub fn view(&self) -> V::Output {
        let selection = self.selection();
        self.view_with(&selection)
    }

    pub fn view_with(&self, selection: &V::Selection) -> V::Output {
        V::derive(&self.snapshot(), selection)
    }

    /// Change notifications; the value is a counter bumped on every update
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }

    fn begin_batch(&self) -> Option<(u64, Vec<ResourceRequest>)> {
        let begun = {
            let mut shared = self.write();
            if !shared.active {
                return None;
            }
            let requests = shared.requests.clone();
            for request in &requests {
                shared.states.entry(request.key.clone()).or_default().begin();
            }
            (shared.generation, requests)
        };
        self.notify();
        Some(begun)
    }

    fn apply(&self, generation: u64, results: Vec<(String, ResourceResult<V::Data>)>) -> bool {
        {
            let mut shared = self.write();
            if !shared.active || shared.generation != generation {
                debug!(
                    "View '{}' discarding results of superseded batch (generation {})",
                    self.inner.name, generation
                );
                return false;
            }
            let now = self.inner.clock.now();
            for (key, result) in results {
                shared.states.entry(key).or_default().resolve(result, now);
            }
        }
        self.notify();
        true
    }

    fn spawn_poller(&self, period: Duration) -> JoinHandle<()> {
        let binder = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !binder.refresh().await {
                    debug!("View '{}' poll produced no update", binder.inner.name);
                }
            }
        })
    }

    fn notify(&self) {
        self.inner.version.send_modify(|v| *v += 1);
    }

    fn read(&self) -> RwLockReadGuard<'_, Shared<V>> {
        self.inner.shared.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Shared<V>> {
        self.inner.shared.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Tasks> {
        self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::binder::LoaderStatus;
    use crate::module::loader::{Backoff, ErrorKind, FallbackTable};
    use crate::module::sim::ManualClock;
    use crate::test_utils::{Reply, ScriptedFetcher};
    use chrono::{TimeZone, Utc};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Reading {
        value: u32,
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct MinValue {
        min: Option<u32>,
    }

    struct ReadingsView;

    impl ViewModel for ReadingsView {
        type Data = Reading;
        type Selection = MinValue;
        type Output = Vec<u32>;

        fn derive(snapshot: &Snapshot<Reading>, selection: &MinValue) -> Vec<u32> {
            snapshot
                .values()
                .map(|r| r.value)
                .filter(|v| selection.min.is_none_or(|min| *v >= min))
                .collect()
        }
    }

    fn loader(fetcher: &Arc<ScriptedFetcher>, fallbacks: FallbackTable) -> Arc<Loader> {
        Arc::new(
            Loader::new(fetcher.clone(), Arc::new(fallbacks))
                .with_backoff(Backoff::fixed(Duration::from_millis(300))),
        )
    }

    fn request(key: &str) -> ResourceRequest {
        ResourceRequest::new(key, format!("http://test/{}", key)).with_retries(0)
    }

    fn url(key: &str) -> String {
        format!("http://test/{}", key)
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_activate_loads_and_derives() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(&url("a"), vec![Reply::json(json!({"value": 5}))]);
        fetcher.script(&url("b"), vec![Reply::json(json!({"value": 1}))]);

        let binder = ViewBinder::<ReadingsView>::builder("readings", loader(&fetcher, FallbackTable::empty()))
            .request(request("a"))
            .request(request("b"))
            .build();
        assert_eq!(binder.snapshot().get("a").map(|s| s.status), Some(LoaderStatus::Idle));

        binder.activate().await;
        let snapshot = binder.snapshot();
        assert!(snapshot.states.iter().all(|(_, s)| s.status == LoaderStatus::Loaded));
        assert_eq!(binder.view(), vec![5, 1]);
        assert_eq!(binder.view_with(&MinValue { min: Some(2) }), vec![5]);

        binder.set_selection(MinValue { min: Some(3) });
        assert_eq!(binder.view(), vec![5]);
        binder.deactivate();
    }

    #[tokio::test]
    async fn test_refresh_requires_activation() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(&url("a"), vec![Reply::json(json!({"value": 5}))]);
        let binder = ViewBinder::<ReadingsView>::builder("readings", loader(&fetcher, FallbackTable::empty()))
            .request(request("a"))
            .build();

        assert!(!binder.refresh().await);
        assert_eq!(fetcher.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_with_fallback_is_loaded() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(&url("a"), vec![Reply::status(503)]);
        let fallbacks = FallbackTable::builder().insert_value("a", json!({"value": 9})).build();
        let binder = ViewBinder::<ReadingsView>::builder("readings", loader(&fetcher, fallbacks))
            .request(request("a"))
            .build();

        binder.activate().await;
        let state = binder.snapshot().get("a").cloned().unwrap();
        assert_eq!(state.status, LoaderStatus::Loaded);
        assert!(state.result.as_ref().unwrap().is_fallback());
        assert_eq!(binder.view(), vec![9]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_reflects_latest_result() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(
            &url("iss-position"),
            vec![
                Reply::json(json!({"value": 1})),
                Reply::status(503),
                Reply::json(json!({"value": 3})),
            ],
        );
        let binder = ViewBinder::<ReadingsView>::builder("iss", loader(&fetcher, FallbackTable::empty()))
            .request(request("iss-position"))
            .poll_every(Duration::from_secs(30))
            .clock(Arc::new(ManualClock::ticking(start(), chrono::Duration::seconds(30))))
            .build();

        binder.activate().await;
        let first = binder.snapshot().get("iss-position").cloned().unwrap();
        assert_eq!(first.status, LoaderStatus::Loaded);
        assert_eq!(first.value(), Some(&Reading { value: 1 }));
        assert_eq!(fetcher.calls(&url("iss-position")), 1);

        tokio::time::sleep(Duration::from_millis(30_001)).await;
        let second = binder.snapshot().get("iss-position").cloned().unwrap();
        assert_eq!(second.status, LoaderStatus::Error);
        assert_eq!(
            second.result.as_ref().and_then(|r| r.reason().cloned()),
            Some(ErrorKind::Http { status: 503 })
        );
        assert_eq!(fetcher.calls(&url("iss-position")), 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        let third = binder.snapshot().get("iss-position").cloned().unwrap();
        assert_eq!(third.value(), Some(&Reading { value: 3 }));
        assert_eq!(fetcher.calls(&url("iss-position")), 3);
        assert!(first.last_updated < second.last_updated);
        assert!(second.last_updated < third.last_updated);

        binder.deactivate();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fetcher.calls(&url("iss-position")), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_update_after_deactivation() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(
            &url("slow"),
            vec![Reply::json(json!({"value": 1})).after(Duration::from_secs(1))],
        );
        let binder = ViewBinder::<ReadingsView>::builder("slow", loader(&fetcher, FallbackTable::empty()))
            .request(request("slow"))
            .poll_every(Duration::from_secs(30))
            .build();

        let activating = {
            let binder = binder.clone();
            tokio::spawn(async move { binder.activate().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(binder.snapshot().is_loading());

        let mut updates = binder.subscribe();
        updates.borrow_and_update();
        binder.deactivate();

        tokio::time::sleep(Duration::from_secs(5)).await;
        activating.await.unwrap();

        assert!(!updates.has_changed().unwrap());
        let state = binder.snapshot().get("slow").cloned().unwrap();
        assert_eq!(state.status, LoaderStatus::Loading);
        assert!(state.result.is_none());
        assert!(!binder.is_active());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fetcher.calls(&url("slow")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_activation_keeps_loading_and_polling() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(
            &url("iss-position"),
            vec![
                Reply::json(json!({"value": 1})).after(Duration::from_secs(5)),
                Reply::json(json!({"value": 2})),
            ],
        );
        let binder = ViewBinder::<ReadingsView>::builder("iss", loader(&fetcher, FallbackTable::empty()))
            .request(request("iss-position"))
            .poll_every(Duration::from_secs(30))
            .build();

        // Caller gives up before the first response arrives
        assert!(tokio::time::timeout(Duration::from_secs(1), binder.activate()).await.is_err());
        assert!(binder.is_active());
        binder.activate().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(binder.view(), vec![1]);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert!(fetcher.calls(&url("iss-position")) >= 10);
        let state = binder.snapshot().get("iss-position").cloned().unwrap();
        assert_eq!(state.status, LoaderStatus::Loaded);
        assert_eq!(binder.view(), vec![2]);
        binder.deactivate();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reactivation_does_not_wait_for_cancelled_fetch() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(
            &url("apod"),
            vec![
                Reply::json(json!({"value": 1})).after(Duration::from_secs(8)),
                Reply::json(json!({"value": 2})),
            ],
        );
        let binder = ViewBinder::<ReadingsView>::builder("apod", loader(&fetcher, FallbackTable::empty()))
            .request(request("apod"))
            .build();

        let activating = {
            let binder = binder.clone();
            tokio::spawn(async move { binder.activate().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        binder.deactivate();

        let started = Instant::now();
        binder.activate().await;
        assert!(started.elapsed() < Duration::from_secs(1), "waited {:?}", started.elapsed());
        assert_eq!(binder.view(), vec![2]);
        assert_eq!(fetcher.calls(&url("apod")), 2);

        activating.await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(binder.view(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retarget_discards_stale_response() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(
            &url("epic-date:2024-05-01"),
            vec![Reply::json(json!({"value": 1})).after(Duration::from_secs(1))],
        );
        fetcher.script(&url("epic-date:2024-05-02"), vec![Reply::json(json!({"value": 2}))]);
        let binder = ViewBinder::<ReadingsView>::builder("epic", loader(&fetcher, FallbackTable::empty()))
            .request(request("epic-date:2024-05-01"))
            .build();

        let activating = {
            let binder = binder.clone();
            tokio::spawn(async move { binder.activate().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        binder.set_requests(vec![request("epic-date:2024-05-02")]).await;
        activating.await.unwrap();

        let snapshot = binder.snapshot();
        assert!(snapshot.get("epic-date:2024-05-01").is_none());
        assert_eq!(binder.view(), vec![2]);
        assert_eq!(fetcher.calls(&url("epic-date:2024-05-01")), 1);
        assert_eq!(fetcher.calls(&url("epic-date:2024-05-02")), 1);
    }

    #[tokio::test]
    async fn test_repeated_refresh_is_idempotent() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        fetcher.script(&url("apod"), vec![Reply::json(json!({"value": 7}))]);
        let binder = ViewBinder::<ReadingsView>::builder("apod", loader(&fetcher, FallbackTable::empty()))
            .request(request("apod"))
            .clock(Arc::new(ManualClock::new(start())))
            .build();

        binder.activate().await;
        let mut previous = binder.snapshot().get("apod").cloned().unwrap();
        for _ in 0..3 {
            assert!(binder.refresh().await);
            let current = binder.snapshot().get("apod").cloned().unwrap();
            assert_eq!(current.value(), previous.value());
            assert!(current.result.as_ref().unwrap().is_success());
            assert!(current.last_updated > previous.last_updated);
            previous = current;
        }
        assert_eq!(fetcher.calls(&url("apod")), 4);
    }
}
