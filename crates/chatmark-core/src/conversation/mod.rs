mod log;
mod export;

pub use log::{ConversationLog, Exchange, LogMeta, PromptGroup};
pub use export::{export_markdown, format_timestamp, render_markdown, transcript_file_name};
