pub mod config;
pub mod constants;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod session;

// Re-export key types
pub use config::Settings;
pub use conversation::{export_markdown, render_markdown, ConversationLog, Exchange, LogMeta, PromptGroup};
pub use error::ChatmarkError;
pub use llm::{LlmClient, LlmResponse, Message, ProviderId, Role, Usage};
pub use session::{generate_session_id, ChatSession, SessionSnapshot, UsageTotals};
