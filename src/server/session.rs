// Session management for concurrent HTTP clients

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use uuid::Uuid;

use crate::analysis::ClassificationResult;
use crate::conversation::ChatMessage;

const CLEANUP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Maximum session limit reached ({active}/{max})")]
    LimitReached { active: usize, max: usize },

    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Per-session state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Unique session identifier
    pub id: String,
    /// Latest conversation transcript seen for this session
    pub messages: Vec<ChatMessage>,
    /// Most recent classification, if the session was analyzed
    pub last_analysis: Option<ClassificationResult>,
    /// Last activity timestamp
    pub last_activity: DateTime<Utc>,
    /// Session creation time
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            last_analysis: None,
            last_activity: now,
            created_at: now,
        }
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_expired(&self, timeout_minutes: u64) -> bool {
        let elapsed = Utc::now().signed_duration_since(self.last_activity);
        elapsed.num_minutes() >= timeout_minutes as i64
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Concurrent session manager using DashMap
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionState>>,
    max_sessions: usize,
    timeout_minutes: u64,
}

impl SessionManager {
    /// Create a new session manager.
    ///
    /// Inside a tokio runtime this also starts the background task that
    /// purges expired sessions once a minute.
    pub fn new(max_sessions: usize, timeout_minutes: u64) -> Self {
        let manager = Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
            timeout_minutes,
        };

        if tokio::runtime::Handle::try_current().is_ok() {
            manager.start_cleanup_task();
        }

        manager
    }

    /// Get an existing session or create a new one.
    ///
    /// An unknown `session_id` is not an error: a fresh session is created.
    pub fn get_or_create(&self, session_id: Option<&str>) -> Result<SessionState, SessionError> {
        if let Some(id) = session_id {
            if let Some(mut session) = self.sessions.get_mut(id) {
                session.touch();
                return Ok(session.clone());
            }
        }

        if self.sessions.len() >= self.max_sessions {
            return Err(SessionError::LimitReached {
                active: self.sessions.len(),
                max: self.max_sessions,
            });
        }

        let session = SessionState::new();
        self.sessions.insert(session.id.clone(), session.clone());

        tracing::info!(session_id = %session.id, "Created new session");
        Ok(session)
    }

    /// Look up a session without creating one
    pub fn get(&self, session_id: &str) -> Option<SessionState> {
        self.sessions.get(session_id).map(|entry| entry.clone())
    }

    /// Edit a stored session in place and mark it active.
    ///
    /// Only the fields `f` touches change, so concurrent requests on the
    /// same session do not overwrite each other's results.
    pub fn modify<F>(&self, session_id: &str, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut SessionState),
    {
        match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                f(&mut entry);
                entry.touch();
                Ok(())
            }
            None => Err(SessionError::NotFound(session_id.to_string())),
        }
    }

    pub fn delete(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Remove expired sessions now, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        purge_expired(&self.sessions, self.timeout_minutes)
    }

    fn start_cleanup_task(&self) {
        let sessions = Arc::clone(&self.sessions);
        let timeout_minutes = self.timeout_minutes;

        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

            loop {
                interval.tick().await;
                purge_expired(&sessions, timeout_minutes);
            }
        });
    }
}

fn purge_expired(sessions: &DashMap<String, SessionState>, timeout_minutes: u64) -> usize {
    let expired: Vec<String> = sessions
        .iter()
        .filter(|entry| entry.value().is_expired(timeout_minutes))
        .map(|entry| entry.key().clone())
        .collect();

    let mut removed = 0;
    for session_id in expired {
        if sessions.remove(&session_id).is_some() {
            removed += 1;
            tracing::debug!(session_id = %session_id, "Removed expired session");
        }
    }

    if removed > 0 {
        tracing::info!(
            removed,
            active = sessions.len(),
            "Cleaned up expired sessions"
        );
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_creation() {
        let manager = SessionManager::new(10, 30);

        let session1 = manager.get_or_create(None).unwrap();
        let session2 = manager.get_or_create(None).unwrap();

        assert_eq!(manager.active_count(), 2);
        assert_ne!(session1.id, session2.id);
    }

    #[tokio::test]
    async fn test_session_retrieval() {
        let manager = SessionManager::new(10, 30);

        let session1 = manager.get_or_create(None).unwrap();
        let session2 = manager.get_or_create(Some(session1.id.as_str())).unwrap();

        assert_eq!(session1.id, session2.id);
        assert_eq!(manager.active_count(), 1);
        assert!(manager.get("no-such-session").is_none());
    }

    #[tokio::test]
    async fn test_session_limit() {
        let manager = SessionManager::new(2, 30);

        manager.get_or_create(None).unwrap();
        manager.get_or_create(None).unwrap();

        assert_eq!(
            manager.get_or_create(None).unwrap_err(),
            SessionError::LimitReached { active: 2, max: 2 }
        );
    }

    #[tokio::test]
    async fn test_modify_stores_messages() {
        let manager = SessionManager::new(10, 30);

        let session = manager.get_or_create(None).unwrap();
        manager
            .modify(&session.id, |s| s.messages.push(ChatMessage::user("hello")))
            .unwrap();

        let stored = manager.get(&session.id).unwrap();
        assert_eq!(stored.messages.len(), 1);

        manager.delete(&session.id);
        assert_eq!(
            manager.modify(&session.id, |_| {}),
            Err(SessionError::NotFound(session.id.clone()))
        );
    }

    #[tokio::test]
    async fn test_modify_keeps_untouched_fields() {
        let manager = SessionManager::new(10, 30);
        let session = manager.get_or_create(None).unwrap();

        // A stale copy taken before another request stored its analysis
        let stale = manager.get(&session.id).unwrap();
        let analysis = crate::analysis::classify(&crate::analysis::ConversationInput::new("happy", 2));
        manager
            .modify(&session.id, |s| s.last_analysis = Some(analysis.clone()))
            .unwrap();

        let mut messages = stale.messages;
        messages.push(ChatMessage::assistant("reply"));
        manager.modify(&session.id, |s| s.messages = messages).unwrap();

        let stored = manager.get(&session.id).unwrap();
        assert_eq!(stored.messages.len(), 1);
        assert_eq!(stored.last_analysis, Some(analysis));
    }

    #[tokio::test]
    async fn test_session_deletion() {
        let manager = SessionManager::new(10, 30);

        let session = manager.get_or_create(None).unwrap();
        assert!(manager.delete(&session.id));
        assert_eq!(manager.active_count(), 0);
        assert!(!manager.delete(&session.id));
    }

    #[test]
    fn test_expired_sessions_are_purged() {
        // Outside a runtime: no background task, cleanup runs on demand
        let manager = SessionManager::new(10, 30);

        let stale = manager.get_or_create(None).unwrap();
        manager.sessions.get_mut(&stale.id).unwrap().last_activity =
            Utc::now() - chrono::Duration::minutes(45);
        manager.get_or_create(None).unwrap();

        assert_eq!(manager.cleanup_expired(), 1);
        assert_eq!(manager.active_count(), 1);
    }
}
