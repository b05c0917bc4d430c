use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use super::report::ChatReport;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Snapshot of a live session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub report: ChatReport,
    pub history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

impl Session {
    /// The last `max_turns` exchanges, each exchange being one user and one assistant turn.
    pub fn recent_history(&self, max_turns: usize) -> &[ChatTurn] {
        let keep = max_turns * 2;
        let start = self.history.len().saturating_sub(keep);
        &self.history[start..]
    }
}

/// Conversation memory keyed by opaque session ids.
pub trait SessionStore: Send + Sync {
    fn create(&self, report: ChatReport) -> String;

    /// Live session, refreshing its last-used time. Expired sessions are dropped.
    fn get(&self, id: &str) -> Option<Session>;

    /// Returns false when the session is unknown or expired.
    fn append_turn(&self, id: &str, role: Role, content: &str) -> bool;
}

/// Process-local store. Idle sessions expire after the TTL; expired entries are swept on
/// every `create` and dropped lazily on access.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: TimeDelta,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn len(&self) -> usize {
        self.with_sessions(|sessions| sessions.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_sessions<T>(&self, f: impl FnOnce(&mut HashMap<String, Session>) -> T) -> T {
        let mut guard = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("session store mutex poisoned; recovering");
                poisoned.into_inner()
            }
        };
        f(&mut guard)
    }

    fn expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_used > self.ttl
    }

    fn create_at(&self, report: ChatReport, now: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        self.with_sessions(|sessions| {
            sessions.insert(
                id.clone(),
                Session {
                    report,
                    history: Vec::new(),
                    created_at: now,
                    last_used: now,
                },
            );
            let before = sessions.len();
            sessions.retain(|_, session| !self.expired(session, now));
            debug!(
                evicted = before - sessions.len(),
                live = sessions.len(),
                "chat session created"
            );
        });
        id
    }

    fn touch_at(&self, id: &str, now: DateTime<Utc>) -> Option<Session> {
        self.with_sessions(|sessions| {
            let expired = self.expired(sessions.get(id)?, now);
            if expired {
                sessions.remove(id);
                debug!(session = id, "chat session expired");
                return None;
            }
            let session = sessions.get_mut(id)?;
            session.last_used = now;
            Some(session.clone())
        })
    }

    fn append_at(&self, id: &str, role: Role, content: &str, now: DateTime<Utc>) -> bool {
        if self.touch_at(id, now).is_none() {
            return false;
        }
        self.with_sessions(|sessions| match sessions.get_mut(id) {
            Some(session) => {
                session.history.push(ChatTurn {
                    role,
                    content: content.to_string(),
                });
                true
            }
            None => false,
        })
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, report: ChatReport) -> String {
        self.create_at(report, Utc::now())
    }

    fn get(&self, id: &str) -> Option<Session> {
        self.touch_at(id, Utc::now())
    }

    fn append_turn(&self, id: &str, role: Role, content: &str) -> bool {
        self.append_at(id, role, content, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::audit::report::early_fallback_report;

    fn report() -> ChatReport {
        ChatReport::Audit(early_fallback_report())
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(seconds)
    }

    #[test]
    fn sessions_live_until_idle_past_ttl() {
        let store = InMemorySessionStore::new(Duration::from_secs(100));
        let id = store.create_at(report(), at(0));

        assert!(store.touch_at(&id, at(90)).is_some());
        // Access refreshed the clock.
        assert!(store.touch_at(&id, at(180)).is_some());
        assert!(store.touch_at(&id, at(281)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn create_sweeps_expired_sessions() {
        let store = InMemorySessionStore::new(Duration::from_secs(100));
        let stale = store.create_at(report(), at(0));
        let fresh = store.create_at(report(), at(500));

        assert_eq!(store.len(), 1);
        assert!(store.touch_at(&stale, at(500)).is_none());
        assert!(store.touch_at(&fresh, at(500)).is_some());
    }

    #[test]
    fn turns_append_in_order_and_history_is_windowed() {
        let store = InMemorySessionStore::default();
        let id = store.create(report());
        for index in 0..8 {
            assert!(store.append_turn(&id, Role::User, &format!("q{index}")));
            assert!(store.append_turn(&id, Role::Assistant, &format!("a{index}")));
        }

        let session = store.get(&id).expect("session is live");
        assert_eq!(session.history.len(), 16);
        let recent = session.recent_history(6);
        assert_eq!(recent.len(), 12);
        assert_eq!(recent[0].content, "q2");
        assert_eq!(recent[11].role, Role::Assistant);
    }

    #[test]
    fn unknown_sessions_are_rejected() {
        let store = InMemorySessionStore::default();
        assert!(store.get("missing").is_none());
        assert!(!store.append_turn("missing", Role::User, "hello"));
    }
}
