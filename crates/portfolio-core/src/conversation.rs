//! Conversation Buffer: bounded, chronological log of chat turns owned by one session.
//!
//! Appends go to the back; once the cap is exceeded the oldest turns are evicted
//! from the front, so the buffer always holds the most recent `capacity` turns.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default cap: five user/assistant exchanges.
pub const MAX_TURNS: usize = 10;

/// Originator of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message exchanged in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl Default for ConversationBuffer {
    fn default() -> Self {
        Self::new(MAX_TURNS)
    }
}

impl ConversationBuffer {
    /// Empty buffer holding at most `capacity` turns (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Push to the back, then evict from the front until within the cap.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Owned copy of the turns in chronological order.
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Remove the newest turn if it equals `turn`. Used to undo a user turn whose
    /// upstream call failed. A turn evicted by that append is not restored.
    pub fn retract_last(&mut self, turn: &ConversationTurn) -> bool {
        if self.turns.back() == Some(turn) {
            self.turns.pop_back();
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
