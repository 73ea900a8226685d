//! Portfolio chatbot core library.
//!
//! Serves a static portfolio record and runs chat turns against an upstream
//! completion API with a per-session, bounded conversation history.

pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod portfolio;
pub mod prompt;
pub mod session;
pub mod upstream;

pub use chat::ChatGateway;
pub use config::{ChatConfig, FailurePolicy};
pub use conversation::{ConversationBuffer, ConversationTurn, Role, MAX_TURNS};
pub use error::{ChatError, ConfigError};
pub use portfolio::{ExampleResponse, PortfolioRecord, PortfolioStore};
pub use prompt::SystemPrompt;
pub use session::{InMemorySessionStore, SessionId, SessionStore, DEFAULT_SESSION_TTL};
pub use upstream::{ChatMessage, CompletionClient, OpenRouterClient};
