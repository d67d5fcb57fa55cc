//! Session lifecycle: create, look up, end, reap idle

use super::{ChatSession, SessionSettings};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

/// Shared handle to one session; a turn holds the lock for its duration
pub type SessionHandle = Arc<Mutex<ChatSession>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No active session, reload the page")]
    NotFound,
    #[error("A reply is still being generated, please wait")]
    Busy,
}

/// Take exclusive use of a session, or fail at once if another request holds it
pub fn try_acquire(session: &SessionHandle) -> Result<OwnedMutexGuard<ChatSession>, SessionError> {
    session
        .clone()
        .try_lock_owned()
        .map_err(|_| SessionError::Busy)
}

struct Entry {
    session: SessionHandle,
    last_active: Instant,
}

/// All live sessions, keyed by the id stored in the browser cookie
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    defaults: SessionSettings,
}

impl SessionStore {
    pub fn new(defaults: SessionSettings) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            defaults,
        }
    }

    /// Settings every new session starts with
    pub fn defaults(&self) -> &SessionSettings {
        &self.defaults
    }

    /// Start a new session with default settings
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(ChatSession::new(self.defaults.clone())));
        self.sessions.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_active: Instant::now(),
            },
        );
        tracing::info!(session_id = %id, "Session started");
        (id, session)
    }

    /// Look up a live session and mark it active
    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_active = Instant::now();
        Some(entry.session.clone())
    }

    /// Live session for a cookie id
    pub async fn require(&self, id: Option<Uuid>) -> Result<SessionHandle, SessionError> {
        let id = id.ok_or(SessionError::NotFound)?;
        self.get(&id).await.ok_or(SessionError::NotFound)
    }

    /// Existing session for `id`, or a fresh one. The flag is true when created.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SessionHandle, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(&id).await {
                return (id, session, false);
            }
        }
        let (id, session) = self.create().await;
        (id, session, true)
    }

    /// Tear a session down. Returns false if it did not exist.
    pub async fn end(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session ended");
        }
        removed
    }

    /// Drop sessions unused for at least `max_idle`; busy sessions are kept
    pub async fn reap_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let idle = entry.last_active.elapsed() >= max_idle;
            let busy = entry.session.try_lock().is_err();
            if idle && !busy {
                tracing::debug!(session_id = %id, "Reaping idle session");
                return false;
            }
            true
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Periodically reap idle sessions until the store is dropped
    pub fn spawn_reaper(self: &Arc<Self>, max_idle: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::downgrade(self);
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let reaped = store.reap_idle(max_idle).await;
                if reaped > 0 {
                    let remaining = store.len().await;
                    tracing::info!(reaped, remaining, "Reaped idle sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatModel;

    fn store() -> SessionStore {
        SessionStore::new(SessionSettings::with_model(ChatModel::Gpt4))
    }

    #[tokio::test]
    async fn test_create_uses_defaults() {
        let store = store();
        let (_, session) = store.create().await;
        assert_eq!(session.lock().await.settings.model, ChatModel::Gpt4);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_live_session() {
        let store = store();
        let (id, first, created) = store.get_or_create(None).await;
        assert!(created);
        let (same_id, again, created) = store.get_or_create(Some(id)).await;
        assert!(!created);
        assert_eq!(same_id, id);
        assert!(Arc::ptr_eq(&first, &again));
    }

    #[tokio::test]
    async fn test_unknown_id_gets_new_session() {
        let store = store();
        let stale = Uuid::new_v4();
        let (id, _, created) = store.get_or_create(Some(stale)).await;
        assert!(created);
        assert_ne!(id, stale);
    }

    #[tokio::test]
    async fn test_end_removes_session() {
        let store = store();
        let (id, _) = store.create().await;
        assert!(store.end(&id).await);
        assert!(!store.end(&id).await);
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_require_needs_live_id() {
        let store = store();
        assert_eq!(store.require(None).await.unwrap_err(), SessionError::NotFound);
        assert_eq!(
            store.require(Some(Uuid::new_v4())).await.unwrap_err(),
            SessionError::NotFound
        );
        let (id, _) = store.create().await;
        assert!(store.require(Some(id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_second_acquire_is_busy() {
        let store = store();
        let (_, session) = store.create().await;
        let guard = try_acquire(&session).unwrap();
        assert_eq!(try_acquire(&session).unwrap_err(), SessionError::Busy);
        drop(guard);
        assert!(try_acquire(&session).is_ok());
    }

    #[tokio::test]
    async fn test_reap_skips_busy_sessions() {
        let store = store();
        let (_, idle) = store.create().await;
        let (busy_id, busy) = store.create().await;
        drop(idle);

        let guard = busy.lock().await;
        assert_eq!(store.reap_idle(Duration::ZERO).await, 1);
        drop(guard);

        assert!(store.get(&busy_id).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_recent_sessions_survive_reap() {
        let store = store();
        store.create().await;
        assert_eq!(store.reap_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_runs_until_store_dropped() {
        let store = Arc::new(store());
        let (stale_id, _) = store.create().await;
        // Checks every 2s
        let reaper = store.spawn_reaper(Duration::from_secs(8));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let (fresh_id, _) = store.create().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(store.get(&stale_id).await.is_none());
        assert!(store.get(&fresh_id).await.is_some());
        assert_eq!(store.len().await, 1);
        assert!(!reaper.is_finished());

        drop(store);
        tokio::time::timeout(Duration::from_secs(10), reaper)
            .await
            .expect("reaper should stop once the store is gone")
            .unwrap();
    }
}
