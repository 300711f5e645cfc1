//! In-memory session registry
//!
//! Thread-safe mapping from client identity to session using DashMap.
//! Entries live until the process exits unless idle eviction is enabled.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, info};

use crate::session::Session;

/// Shortest period the cleanup task will tick at
const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Shared handle to one client's session
pub type SessionHandle = Arc<RwLock<Session>>;

/// Registry of conversation sessions keyed by client identity
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for `identity`, creating an empty one if needed.
    ///
    /// Creation happens under the map's shard lock, so concurrent first
    /// requests for one identity all receive the same handle.
    pub fn get_or_create(&self, identity: &str) -> SessionHandle {
        if let Some(existing) = self.sessions.get(identity) {
            return Arc::clone(existing.value());
        }

        let entry = self.sessions.entry(identity.to_string()).or_insert_with(|| {
            info!("Creating new session for client: {}", identity);
            Arc::new(RwLock::new(Session::new(identity)))
        });
        Arc::clone(entry.value())
    }

    /// Get a session if it exists
    pub fn get(&self, identity: &str) -> Option<SessionHandle> {
        self.sessions.get(identity).map(|s| Arc::clone(s.value()))
    }

    /// Get session count
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove sessions not updated within `timeout`. Returns the number removed.
    ///
    /// Sessions whose lock is held at the time of the sweep are in use and kept.
    pub fn evict_idle(&self, timeout: Duration) -> usize {
        let Ok(timeout) = chrono::Duration::from_std(timeout) else {
            return 0;
        };
        let now = chrono::Utc::now();

        let before = self.sessions.len();
        self.sessions.retain(|identity, handle| match handle.try_read() {
            Ok(session) if now - session.updated_at > timeout => {
                info!("Evicted idle session for client: {}", identity);
                false
            }
            _ => true,
        });
        before.saturating_sub(self.sessions.len())
    }

    /// Start a background task that periodically evicts idle sessions
    ///
    /// `every` is raised to one second if shorter.
    pub fn start_cleanup_task(&self, idle_timeout: Duration, every: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        let every = every.max(MIN_CLEANUP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = interval(every);
            loop {
                ticker.tick().await;
                let removed = registry.evict_idle(idle_timeout);
                debug!("Session cleanup removed {} session(s), {} remaining", removed, registry.len());
            }
        })
    }
}
