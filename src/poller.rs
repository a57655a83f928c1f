//! Periodically looks up who else in the group has finished the quiz.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::models::QuizResponse;
use crate::session::Identity;
use crate::store::ResponseStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_secs(3);

const FETCH_ERROR: &str = "Error fetching matches. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between reads of the group.
    pub interval: Duration,
    /// Results are held back until this long after the poller started.
    pub min_display: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            min_display: DEFAULT_MIN_DISPLAY,
        }
    }
}

/// What the waiting screen should show.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchState {
    Loading,
    /// Everyone else in the group who has finished. May be empty.
    Ready(Vec<QuizResponse>),
    /// Polling stopped after a failed read.
    Failed(String),
}

/// Drop everyone named `user_name` and order the rest by name.
pub fn filter_matches<I>(responses: I, user_name: &str) -> Vec<QuizResponse>
where
    I: IntoIterator<Item = QuizResponse>,
{
    let mut matches: Vec<QuizResponse> = responses
        .into_iter()
        .filter(|response| response.user_name != user_name)
        .collect();
    matches.sort_by(|a, b| a.user_name.cmp(&b.user_name));
    matches
}

/// A running poller. Dropping the handle cancels it.
pub struct PollHandle {
    state: watch::Receiver<MatchState>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn state(&self) -> MatchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MatchState> {
        self.state.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub struct MatchPoller;

impl MatchPoller {
    /// Start polling `store` for the group of `identity`.
    ///
    /// The first read is issued immediately. Reads run one at a time, so a
    /// slow read pushes the next one back instead of overlapping it.
    pub fn spawn<S: ResponseStore>(store: S, identity: Identity, config: PollConfig) -> PollHandle {
        let (tx, rx) = watch::channel(MatchState::Loading);
        let task = tokio::spawn(poll_loop(store, identity, config, tx));

        PollHandle { state: rx, task }
    }
}

async fn poll_loop<S: ResponseStore>(
    store: S,
    identity: Identity,
    config: PollConfig,
    tx: watch::Sender<MatchState>,
) {
    let reveal_at = Instant::now() + config.min_display;
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(group = identity.group_code(), "polling for matches");

    loop {
        ticker.tick().await;

        match store.read_group(identity.group_code()).await {
            Ok(group) => {
                let matches = filter_matches(group.into_values(), identity.user_name());
                debug!(count = matches.len(), "found matches");

                sleep_until(reveal_at).await;
                if tx.send(MatchState::Ready(matches)).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "error fetching matches");
                let _ = tx.send(MatchState::Failed(FETCH_ERROR.to_string()));
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::store::{GroupResponses, MemoryStore, StoreError};

    fn response(user: &str) -> QuizResponse {
        QuizResponse {
            user_name: user.to_string(),
            group_code: "team".to_string(),
            responses: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    async fn seeded(users: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for user in users {
            store.write("team", user, &response(user)).await.unwrap();
        }
        store
    }

    fn alice() -> Identity {
        Identity::new("alice", "team").unwrap()
    }

    fn names(state: &MatchState) -> Vec<String> {
        match state {
            MatchState::Ready(matches) => matches.iter().map(|m| m.user_name.clone()).collect(),
            other => panic!("expected matches, got {:?}", other),
        }
    }

    #[derive(Clone)]
    struct CountingStore {
        inner: MemoryStore,
        reads: Arc<AtomicUsize>,
    }

    impl ResponseStore for CountingStore {
        async fn write(
            &self,
            group_code: &str,
            user_name: &str,
            response: &QuizResponse,
        ) -> Result<(), StoreError> {
            self.inner.write(group_code, user_name, response).await
        }

        async fn read_group(&self, group_code: &str) -> Result<GroupResponses, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_group(group_code).await
        }
    }

    #[test]
    fn test_filter_excludes_self() {
        let matches = filter_matches(
            vec![response("carol"), response("alice"), response("bob")],
            "alice",
        );
        let names: Vec<_> = matches.iter().map(|m| m.user_name.as_str()).collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_held_until_min_display() {
        let store = seeded(&["alice", "bob"]).await;
        let handle = MatchPoller::spawn(store, alice(), PollConfig::default());
        let mut rx = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(handle.state(), MatchState::Loading);

        rx.changed().await.unwrap();
        assert_eq!(names(&rx.borrow()), vec!["bob"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_group_is_not_an_error() {
        let handle = MatchPoller::spawn(MemoryStore::new(), alice(), PollConfig::default());
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), MatchState::Ready(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_own_response_only_is_no_matches() {
        let store = seeded(&["alice"]).await;
        let handle = MatchPoller::spawn(store, alice(), PollConfig::default());
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), MatchState::Ready(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_picks_up_late_finishers() {
        let store = seeded(&["alice"]).await;
        let handle = MatchPoller::spawn(store.clone(), alice(), PollConfig::default());
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        assert!(names(&rx.borrow()).is_empty());

        store.write("team", "dave", &response("dave")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(names(&rx.borrow()), vec!["dave"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_failure_is_terminal() {
        let store = MemoryStore::new();
        store.fail_with(Some(500)).await;
        let handle = MatchPoller::spawn(store, alice(), PollConfig::default());
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), MatchState::Failed(FETCH_ERROR.to_string()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_once_per_interval_until_stopped() {
        let reads = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            inner: seeded(&["alice", "bob"]).await,
            reads: Arc::clone(&reads),
        };
        let handle = MatchPoller::spawn(store, alice(), PollConfig::default());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(reads.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(reads.load(Ordering::SeqCst), 3);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(reads.load(Ordering::SeqCst), 3);
        assert!(handle.is_finished());
    }
}
