//! Guestbook synchronizer
//!
//! Client-side state machine between a guest and a `GuestbookStore`:
//! - Holds the established session and the RSVP form
//! - Runs one live subscription and keeps the latest snapshot, re-sorted
//! - Gates submit and delete on session readiness and ownership
//! - Applies the "show more" display limit

use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::form::GuestForm;
use super::pagination::{DisplayLimit, DEFAULT_INITIAL_LIMIT, DEFAULT_LIMIT_STEP};
use super::status::{Status, SyncError};
use crate::identity::{IdentityService, SessionContext, SessionIdentity};
use crate::store::{sort_for_display, Attendance, GuestbookEntry, GuestbookStore};

/// Retry policy for a failed live subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Consecutive failures retried before the feed gives up; 0 disables
    pub max_reconnects: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl ReconnectPolicy {
    /// No automatic retries
    pub fn none() -> Self {
        Self {
            max_reconnects: 0,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Synchronizer configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub initial_limit: usize,
    pub limit_step: usize,
    pub reconnect: ReconnectPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            initial_limit: DEFAULT_INITIAL_LIMIT,
            limit_step: DEFAULT_LIMIT_STEP,
            reconnect: ReconnectPolicy::none(),
        }
    }
}

/// Latest state of the live feed
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    /// Last snapshot received, in display order
    pub entries: Arc<Vec<GuestbookEntry>>,
    pub snapshots_received: u64,
    pub connected: bool,
    /// Set when the subscription failed; cleared by the next snapshot
    pub error: Option<String>,
}

/// One entry as rendered
#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    pub id: String,
    pub author_name: String,
    pub attendance: Attendance,
    pub attendance_label: &'static str,
    pub message: String,
    pub submitted_label: String,
    /// Only the creating session sees a delete control
    pub deletable: bool,
}

impl EntryView {
    fn new(entry: &GuestbookEntry, session: &SessionContext) -> Self {
        Self {
            id: entry.id.clone(),
            author_name: entry.author_name.clone(),
            attendance: entry.attendance,
            attendance_label: entry.attendance.label(),
            message: entry.message.clone(),
            submitted_label: entry.submitted_label(),
            deletable: session.owns(entry),
        }
    }
}

/// The guestbook synchronizer
pub struct GuestbookSynchronizer {
    store: Arc<dyn GuestbookStore>,
    session: SessionContext,
    form: GuestForm,
    status: Status,
    limit: DisplayLimit,
    pending_delete: Option<String>,
    feed_tx: Arc<watch::Sender<FeedState>>,
    feed_rx: watch::Receiver<FeedState>,
    feed_task: Option<JoinHandle<()>>,
    config: SyncConfig,
}

impl GuestbookSynchronizer {
    pub fn new(store: Arc<dyn GuestbookStore>, session: SessionContext, config: SyncConfig) -> Self {
        let (feed_tx, feed_rx) = watch::channel(FeedState::default());
        Self {
            store,
            session,
            form: GuestForm::new(),
            status: Status::Idle,
            limit: DisplayLimit::new(config.initial_limit, config.limit_step),
            pending_delete: None,
            feed_tx: Arc::new(feed_tx),
            feed_rx,
            feed_task: None,
            config,
        }
    }

    /// Replace the form, e.g. with one prefilled from the invitation link
    pub fn with_form(mut self, form: GuestForm) -> Self {
        self.form = form;
        self
    }

    /// Establish the session through `service`; degrades to a local identity
    /// when the service fails
    pub async fn establish_session(
        &mut self,
        service: &dyn IdentityService,
        cached: Option<&SessionIdentity>,
    ) -> &SessionContext {
        self.session = SessionContext::establish(service, cached).await;
        if self.status == Status::NotReady {
            self.status = Status::Idle;
        }
        &self.session
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }

    /// Open the live subscription. No-op when already running.
    pub fn start(&mut self) -> Result<(), SyncError> {
        if !self.session.is_ready() {
            self.status = Status::NotReady;
            return Err(SyncError::NotReady);
        }
        if let Some(task) = &self.feed_task {
            if !task.is_finished() {
                return Ok(());
            }
        }

        let store = self.store.clone();
        let tx = self.feed_tx.clone();
        let policy = self.config.reconnect;
        self.feed_task = Some(tokio::spawn(run_feed(store, tx, policy)));
        tracing::debug!("Guestbook feed started");
        Ok(())
    }

    /// Tear down the live subscription
    pub fn stop(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
            self.feed_tx.send_modify(|state| state.connected = false);
        }
    }

    /// Latest feed state
    pub fn feed(&self) -> FeedState {
        self.feed_rx.borrow().clone()
    }

    /// Wait for the next feed update
    pub async fn changed(&mut self) -> bool {
        self.feed_rx.changed().await.is_ok()
    }

    /// Wait until `predicate` holds for the current entries
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> FeedState
    where
        F: FnMut(&[GuestbookEntry]) -> bool,
    {
        loop {
            {
                let state = self.feed_rx.borrow_and_update();
                if predicate(&state.entries) {
                    return state.clone();
                }
            }
            if self.feed_rx.changed().await.is_err() {
                return self.feed();
            }
        }
    }

    /// Full list of the last snapshot, in display order
    pub fn entries(&self) -> Arc<Vec<GuestbookEntry>> {
        self.feed_rx.borrow().entries.clone()
    }

    /// Entries within the display limit, ready to render
    pub fn visible_entries(&self) -> Vec<EntryView> {
        let state = self.feed_rx.borrow();
        self.limit
            .visible(&state.entries)
            .iter()
            .map(|entry| EntryView::new(entry, &self.session))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.feed_rx.borrow().entries.len()
    }

    pub fn has_more(&self) -> bool {
        self.limit.has_more(self.total())
    }

    /// Reveal up to one more step; returns how many entries became visible
    pub fn show_more(&mut self) -> usize {
        let total = self.total();
        self.limit.show_more(total)
    }

    pub fn show_less(&mut self) {
        self.limit.show_less();
    }

    pub fn display_limit(&self) -> &DisplayLimit {
        &self.limit
    }

    pub fn form(&self) -> &GuestForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut GuestForm {
        &mut self.form
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Page-level banner for a degraded session or a dead feed
    pub fn banner(&self) -> Option<String> {
        if let Some(error) = &self.feed_rx.borrow().error {
            return Some(format!("Live updates stopped: {}. Reload to try again.", error));
        }
        if self.session.is_degraded() {
            let reason = self.session.error().unwrap_or("unknown error");
            return Some(format!(
                "Could not reach the identity service ({}); using a temporary identity.",
                reason
            ));
        }
        None
    }

    /// Validate and send the form. Nothing reaches the store unless every
    /// field passes. The form is cleared only on success.
    pub async fn submit(&mut self) -> Result<String, SyncError> {
        let Some(identity) = self.session.identity().cloned() else {
            self.status = Status::NotReady;
            return Err(SyncError::NotReady);
        };

        let entry = match self.form.to_new_entry(&identity) {
            Ok(entry) => entry,
            Err(e) => {
                self.status = Status::Invalid(e.clone());
                return Err(e.into());
            }
        };

        match self.store.create_entry(entry).await {
            Ok(id) => {
                tracing::info!(entry_id = %id, "Guestbook entry submitted");
                self.form.clear();
                self.status = Status::Sent;
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Guestbook submit failed");
                self.status = Status::SendFailed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Whether the current session may delete `entry`
    pub fn can_delete(&self, entry: &GuestbookEntry) -> bool {
        self.session.owns(entry)
    }

    /// First step of a delete: checks ownership and asks for confirmation
    pub fn request_delete(&mut self, id: &str) -> Result<(), SyncError> {
        if !self.session.is_ready() {
            self.status = Status::NotReady;
            return Err(SyncError::NotReady);
        }

        let owned = {
            let state = self.feed_rx.borrow();
            let entry = state
                .entries
                .iter()
                .find(|e| e.id == id)
                .ok_or_else(|| SyncError::UnknownEntry(id.to_string()))?;
            self.session.owns(entry)
        };
        if !owned {
            return Err(SyncError::NotOwner(id.to_string()));
        }

        self.pending_delete = Some(id.to_string());
        self.status = Status::ConfirmDelete { id: id.to_string() };
        Ok(())
    }

    /// The entry awaiting confirmation, if any
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        if self.pending_delete.take().is_some() {
            self.status = Status::Idle;
        }
    }

    /// Second step of a delete: issues it to the store
    pub async fn confirm_delete(&mut self) -> Result<(), SyncError> {
        let id = self
            .pending_delete
            .take()
            .ok_or(SyncError::NothingToConfirm)?;
        let Some(identity) = self.session.identity().cloned() else {
            self.status = Status::NotReady;
            return Err(SyncError::NotReady);
        };

        match self.store.delete_entry(&id, &identity).await {
            Ok(()) => {
                tracing::info!(entry_id = %id, "Guestbook entry deleted");
                self.status = Status::Deleted;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(entry_id = %id, error = %e, "Guestbook delete failed");
                self.status = Status::DeleteFailed(e.to_string());
                Err(e.into())
            }
        }
    }
}

impl Drop for GuestbookSynchronizer {
    fn drop(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
        }
    }
}

async fn run_feed(
    store: Arc<dyn GuestbookStore>,
    tx: Arc<watch::Sender<FeedState>>,
    policy: ReconnectPolicy,
) {
    let mut attempt: u32 = 0;

    loop {
        let failure = match store.subscribe().await {
            Ok(mut snapshots) => loop {
                match snapshots.next().await {
                    Some(Ok(mut entries)) => {
                        attempt = 0;
                        sort_for_display(&mut entries);
                        tx.send_modify(|state| {
                            state.entries = Arc::new(entries);
                            state.snapshots_received += 1;
                            state.connected = true;
                            state.error = None;
                        });
                    }
                    Some(Err(e)) => break e.to_string(),
                    None => break "live feed closed".to_string(),
                }
            },
            Err(e) => e.to_string(),
        };

        tracing::warn!(error = %failure, attempt, "Guestbook feed failed");
        tx.send_modify(|state| {
            state.connected = false;
            state.error = Some(failure);
        });

        if attempt >= policy.max_reconnects {
            return;
        }
        attempt += 1;
        tokio::time::sleep(policy.backoff(attempt)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityError, IdentityService};
    use crate::store::{
        EntryStore, NewEntry, SnapshotStream, StoreError, StoreResult, ValidationError,
    };
    use async_trait::async_trait;
    use futures_util::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(2);

    /// Wraps a store and counts writes
    struct CountingStore {
        inner: EntryStore,
        creates: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: EntryStore::in_memory(),
                creates: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GuestbookStore for CountingStore {
        async fn create_entry(&self, entry: NewEntry) -> StoreResult<String> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.inner.create_entry(entry).await
        }

        async fn delete_entry(&self, id: &str, requester: &SessionIdentity) -> StoreResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_entry(id, requester).await
        }

        async fn list_entries(&self) -> StoreResult<Vec<GuestbookEntry>> {
            self.inner.list_entries().await
        }

        async fn subscribe(&self) -> StoreResult<SnapshotStream> {
            self.inner.subscribe().await
        }
    }

    /// Subscription that fails `failures` times before delegating
    struct FlakyFeed {
        inner: EntryStore,
        failures: AtomicUsize,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl GuestbookStore for FlakyFeed {
        async fn create_entry(&self, entry: NewEntry) -> StoreResult<String> {
            self.inner.create_entry(entry).await
        }

        async fn delete_entry(&self, id: &str, requester: &SessionIdentity) -> StoreResult<()> {
            self.inner.delete_entry(id, requester).await
        }

        async fn list_entries(&self) -> StoreResult<Vec<GuestbookEntry>> {
            self.inner.list_entries().await
        }

        async fn subscribe(&self) -> StoreResult<SnapshotStream> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                let failed = stream::once(async {
                    Err(StoreError::Unavailable("permission denied".to_string()))
                });
                return Ok(failed.boxed());
            }
            self.inner.subscribe().await
        }
    }

    struct DownService;

    #[async_trait]
    impl IdentityService for DownService {
        async fn establish_anonymous_session(
            &self,
            _existing: Option<&SessionIdentity>,
        ) -> Result<SessionIdentity, IdentityError> {
            Err(IdentityError::Unavailable("offline".to_string()))
        }
    }

    fn ready(store: Arc<dyn GuestbookStore>, who: &str) -> GuestbookSynchronizer {
        GuestbookSynchronizer::new(
            store,
            SessionContext::issued(SessionIdentity::new(who)),
            SyncConfig::default(),
        )
    }

    fn fill(sync: &mut GuestbookSynchronizer, name: &str, message: &str) {
        sync.form_mut().set_name(name);
        sync.form_mut().set_attendance(Attendance::Attending);
        sync.form_mut().set_message(message);
    }

    async fn seed(store: &dyn GuestbookStore, owner: &str, count: usize) {
        for i in 0..count {
            store
                .create_entry(NewEntry::new(
                    format!("Guest {}", i),
                    Attendance::Attending,
                    "Selamat",
                    SessionIdentity::new(owner),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_not_ready_blocks_everything() {
        let store = CountingStore::new();
        let mut sync =
            GuestbookSynchronizer::new(store.clone(), SessionContext::pending(), SyncConfig::default());

        assert!(matches!(sync.start(), Err(SyncError::NotReady)));
        fill(&mut sync, "Ani", "Hi");
        assert!(matches!(sync.submit().await, Err(SyncError::NotReady)));
        assert_eq!(sync.status(), &Status::NotReady);
        assert_eq!(store.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_submit_issues_no_request() {
        let cases = [
            ("", Some(Attendance::Attending), "Hi", ValidationError::MissingName),
            ("Ani", None, "Hi", ValidationError::MissingAttendance),
            ("Ani", Some(Attendance::Attending), "   ", ValidationError::MissingMessage),
        ];

        for (name, attendance, message, expected) in cases {
            let store = CountingStore::new();
            let mut sync = ready(store.clone(), "me");

            sync.form_mut().set_name(name);
            if let Some(attendance) = attendance {
                sync.form_mut().set_attendance(attendance);
            }
            sync.form_mut().set_message(message);
            let result = sync.submit().await;

            match result {
                Err(SyncError::Invalid(e)) => assert_eq!(e, expected),
                other => panic!("Expected {:?}, got {:?}", expected, other),
            }
            assert!(sync.status().is_error());
            assert_eq!(store.creates.load(Ordering::SeqCst), 0, "{:?}", expected);
            assert_eq!(sync.form().name(), name);
            assert_eq!(sync.form().message(), message);
        }
    }

    #[tokio::test]
    async fn test_submit_clears_form_and_feed_shows_entry() {
        let store = CountingStore::new();
        let mut sync = ready(store.clone(), "me");
        sync.start().unwrap();

        fill(&mut sync, "Ani", "Selamat menempuh hidup baru");
        let id = sync.submit().await.unwrap();

        assert_eq!(sync.status(), &Status::Sent);
        assert!(sync.form().name().is_empty());
        assert!(sync.form().message().is_empty());
        assert!(sync.form().attendance().is_none());

        let feed = timeout(WAIT, sync.wait_for(|e| e.iter().any(|x| x.id == id)))
            .await
            .unwrap();
        assert!(feed.connected);

        let views = sync.visible_entries();
        assert_eq!(views.len(), 1);
        assert!(views[0].deletable);
        assert_eq!(views[0].attendance_label, "Attending");
    }

    #[tokio::test]
    async fn test_locked_name_kept_after_submit() {
        let store = CountingStore::new();
        let mut sync = ready(store, "me").with_form(GuestForm::prefilled("Budi Santoso"));

        sync.form_mut().set_attendance(Attendance::NotAttending);
        sync.form_mut().set_message("Maaf");
        sync.submit().await.unwrap();

        assert_eq!(sync.form().name(), "Budi Santoso");
        assert!(sync.form().message().is_empty());
    }

    #[tokio::test]
    async fn test_two_sessions_see_each_other() {
        let store: Arc<dyn GuestbookStore> = Arc::new(EntryStore::in_memory());
        let mut alice = ready(store.clone(), "alice");
        let mut bob = ready(store.clone(), "bob");
        alice.start().unwrap();
        bob.start().unwrap();

        fill(&mut alice, "Alice", "Hello from Alice");
        let id = alice.submit().await.unwrap();

        timeout(WAIT, bob.wait_for(|e| e.iter().any(|x| x.id == id)))
            .await
            .unwrap();
        let views = bob.visible_entries();
        assert_eq!(views[0].author_name, "Alice");
        assert!(!views[0].deletable);
    }

    #[tokio::test]
    async fn test_delete_flow_requires_confirmation() {
        let store = CountingStore::new();
        let mut sync = ready(store.clone(), "me");
        sync.start().unwrap();

        fill(&mut sync, "Ani", "Hi");
        let id = sync.submit().await.unwrap();
        timeout(WAIT, sync.wait_for(|e| !e.is_empty())).await.unwrap();

        sync.request_delete(&id).unwrap();
        assert_eq!(sync.pending_delete(), Some(id.as_str()));
        sync.cancel_delete();
        assert!(sync.pending_delete().is_none());
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);

        sync.request_delete(&id).unwrap();
        sync.confirm_delete().await.unwrap();
        assert_eq!(sync.status(), &Status::Deleted);
        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);

        timeout(WAIT, sync.wait_for(|e| e.is_empty())).await.unwrap();
        assert!(matches!(
            sync.confirm_delete().await,
            Err(SyncError::NothingToConfirm)
        ));
    }

    #[tokio::test]
    async fn test_cannot_request_delete_of_foreign_entry() {
        let store = CountingStore::new();
        seed(store.as_ref(), "someone-else", 1).await;
        let mut sync = ready(store.clone(), "me");
        sync.start().unwrap();
        timeout(WAIT, sync.wait_for(|e| e.len() == 1)).await.unwrap();

        let id = sync.entries()[0].id.clone();
        assert!(!sync.can_delete(&sync.entries()[0]));
        assert!(matches!(
            sync.request_delete(&id),
            Err(SyncError::NotOwner(_))
        ));
        assert!(matches!(
            sync.request_delete("nope"),
            Err(SyncError::UnknownEntry(_))
        ));
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pagination_over_live_list() {
        let store = CountingStore::new();
        seed(store.as_ref(), "host", 12).await;
        let mut sync = ready(store, "me");
        sync.start().unwrap();
        timeout(WAIT, sync.wait_for(|e| e.len() == 12)).await.unwrap();

        assert_eq!(sync.visible_entries().len(), 5);
        assert!(sync.has_more());
        assert_eq!(sync.show_more(), 5);
        assert_eq!(sync.visible_entries().len(), 10);
        assert_eq!(sync.show_more(), 2);
        assert_eq!(sync.visible_entries().len(), 12);
        assert!(!sync.has_more());
        sync.show_less();
        assert_eq!(sync.visible_entries().len(), 5);
    }

    #[tokio::test]
    async fn test_degraded_session_still_writes() {
        let store = CountingStore::new();
        let mut sync =
            GuestbookSynchronizer::new(store.clone(), SessionContext::pending(), SyncConfig::default());
        sync.establish_session(&DownService, None).await;

        assert!(sync.is_ready());
        assert!(sync.banner().unwrap().contains("offline"));

        fill(&mut sync, "Ani", "Hi");
        sync.submit().await.unwrap();
        assert_eq!(store.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_feed_error_without_reconnect() {
        let store = Arc::new(FlakyFeed {
            inner: EntryStore::in_memory(),
            failures: AtomicUsize::new(1),
            attempts: AtomicUsize::new(0),
        });
        let mut sync = ready(store.clone(), "me");
        sync.start().unwrap();

        timeout(WAIT, async {
            while sync.feed().error.is_none() {
                if !sync.changed().await {
                    break;
                }
            }
        })
        .await
        .unwrap();

        assert!(sync.banner().unwrap().contains("permission denied"));
        assert!(!sync.feed().connected);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_feed_reconnects_with_policy() {
        let store = Arc::new(FlakyFeed {
            inner: EntryStore::in_memory(),
            failures: AtomicUsize::new(2),
            attempts: AtomicUsize::new(0),
        });
        seed(&store.inner, "host", 1).await;

        let config = SyncConfig {
            reconnect: ReconnectPolicy {
                max_reconnects: 3,
                initial_backoff_ms: 5,
                max_backoff_ms: 20,
            },
            ..Default::default()
        };
        let mut sync = GuestbookSynchronizer::new(
            store.clone(),
            SessionContext::issued(SessionIdentity::new("me")),
            config,
        );
        sync.start().unwrap();

        let feed = timeout(WAIT, sync.wait_for(|e| e.len() == 1)).await.unwrap();
        assert!(feed.error.is_none());
        assert!(sync.banner().is_none());
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = ReconnectPolicy {
            max_reconnects: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 1000,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
        assert_eq!(policy.backoff(5), Duration::from_millis(1000));
    }
}
