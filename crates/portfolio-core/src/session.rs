//! Session store: owns one `ConversationBuffer` per session id.
//!
//! Core logic only talks to the `SessionStore` trait. `InMemorySessionStore` keeps
//! buffers in a `DashMap`; the entry guard is the per-session exclusion scope.
//! Expiry slides: a session lives `ttl` past its last activity.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::conversation::{ConversationBuffer, ConversationTurn};

/// Default idle lifetime of a session (2 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random id (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accepts only canonical UUID text so cookie contents cannot pick arbitrary keys.
    pub fn parse(raw: &str) -> Option<Self> {
        uuid::Uuid::parse_str(raw)
            .ok()
            .map(|u| Self(u.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyed storage of conversation buffers. Object-safe so the gateway can hold
/// `Arc<dyn SessionStore>` and swap backends.
pub trait SessionStore: Send + Sync {
    /// Get-or-create the session's buffer and run `f` on it under the session's
    /// exclusion scope. Refreshes last activity.
    fn update(&self, id: &SessionId, f: &mut dyn FnMut(&mut ConversationBuffer));

    /// Current turns; empty for unknown sessions. Does not create a session.
    fn snapshot(&self, id: &SessionId) -> Vec<ConversationTurn>;

    /// Reset the session's buffer to empty. Unknown sessions are left alone.
    fn clear(&self, id: &SessionId);

    /// Drop sessions idle past their TTL; returns how many were removed.
    fn purge_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct SessionSlot {
    buffer: ConversationBuffer,
    last_seen: Instant,
}

pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, SessionSlot>,
    max_turns: usize,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(max_turns: usize, ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_turns,
            ttl,
        }
    }

    fn purge_before(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions
            .retain(|_, slot| now.saturating_duration_since(slot.last_seen) < ttl);
        before.saturating_sub(self.sessions.len())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(crate::conversation::MAX_TURNS, DEFAULT_SESSION_TTL)
    }
}

impl SessionStore for InMemorySessionStore {
    fn update(&self, id: &SessionId, f: &mut dyn FnMut(&mut ConversationBuffer)) {
        let now = Instant::now();
        let mut slot = self.sessions.entry(id.clone()).or_insert_with(|| SessionSlot {
            buffer: ConversationBuffer::new(self.max_turns),
            last_seen: now,
        });
        // An idle-expired slot not yet swept starts over.
        if now.saturating_duration_since(slot.last_seen) >= self.ttl {
            slot.buffer.clear();
        }
        slot.last_seen = now;
        f(&mut slot.buffer);
    }

    fn snapshot(&self, id: &SessionId) -> Vec<ConversationTurn> {
        match self.sessions.get(id) {
            Some(slot) if slot.last_seen.elapsed() < self.ttl => slot.buffer.snapshot(),
            _ => Vec::new(),
        }
    }

    fn clear(&self, id: &SessionId) {
        if let Some(mut slot) = self.sessions.get_mut(id) {
            slot.buffer.clear();
            slot.last_seen = Instant::now();
        }
    }

    fn purge_expired(&self) -> usize {
        self.purge_before(Instant::now())
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}
