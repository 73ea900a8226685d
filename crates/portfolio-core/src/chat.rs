//! Chat Gateway: runs a single chat turn against a session's conversation buffer.
//!
//! Order of operations per turn:
//! 1. reject blank input without touching the buffer;
//! 2. append the user turn and snapshot the buffer in one exclusion scope;
//! 3. send `[system, ...snapshot]` upstream (the only await; no lock is held);
//! 4. on success append the assistant reply, on failure apply the `FailurePolicy`.

use std::sync::Arc;

use crate::config::FailurePolicy;
use crate::conversation::ConversationTurn;
use crate::error::ChatError;
use crate::prompt::SystemPrompt;
use crate::session::{SessionId, SessionStore};
use crate::upstream::{ChatMessage, CompletionClient};

#[derive(Clone)]
pub struct ChatGateway {
    prompt: Arc<SystemPrompt>,
    sessions: Arc<dyn SessionStore>,
    client: Arc<dyn CompletionClient>,
    failure_policy: FailurePolicy,
}

impl ChatGateway {
    pub fn new(
        prompt: Arc<SystemPrompt>,
        sessions: Arc<dyn SessionStore>,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            prompt,
            sessions,
            client,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn system_prompt(&self) -> &SystemPrompt {
        &self.prompt
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub async fn handle_turn(
        &self,
        session: &SessionId,
        user_text: &str,
    ) -> Result<String, ChatError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        let user_turn = ConversationTurn::user(text);
        let mut history = Vec::new();
        self.sessions.update(session, &mut |buf| {
            buf.append(user_turn.clone());
            history = buf.snapshot();
        });

        tracing::info!(
            session = %session,
            history_len = history.len(),
            "chat turn accepted"
        );

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.prompt.as_str()));
        messages.extend(history.into_iter().map(ChatMessage::from));

        match self.client.complete(messages).await {
            Ok(reply) => {
                tracing::debug!(
                    session = %session,
                    reply_len = reply.len(),
                    "upstream reply received"
                );
                let assistant = ConversationTurn::assistant(reply.as_str());
                self.sessions.update(session, &mut |buf| buf.append(assistant.clone()));
                Ok(reply)
            }
            Err(err) => {
                match &err {
                    ChatError::Unknown(detail) => {
                        tracing::warn!(session = %session, detail = %detail, "chat turn failed")
                    }
                    other => tracing::warn!(session = %session, error = %other, "chat turn failed"),
                }
                if self.failure_policy == FailurePolicy::Rollback {
                    let mut retracted = false;
                    self.sessions.update(session, &mut |buf| {
                        retracted = buf.retract_last(&user_turn);
                    });
                    tracing::debug!(session = %session, retracted, "rolled back user turn");
                }
                Err(err)
            }
        }
    }

    pub fn clear(&self, session: &SessionId) {
        self.sessions.clear(session);
        tracing::info!(session = %session, "chat cleared");
    }

    pub fn history(&self, session: &SessionId) -> Vec<ConversationTurn> {
        self.sessions.snapshot(session)
    }
}
