use crate::constants::export::{TIMESTAMP_FORMAT, TITLE};
use crate::conversation::ConversationLog;
use crate::error::{ChatmarkError, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// `<yyyymmdd_HHMMSS>_<session_id>.md`. The session id is used as-is.
pub fn transcript_file_name(now: &DateTime<Local>, session_id: &str) -> String {
    format!("{}_{}.md", format_timestamp(now), session_id)
}

/// Render the whole log as a Markdown transcript.
pub fn render_markdown(log: &ConversationLog) -> String {
    let meta = log.meta();
    let mut out = String::new();

    out.push_str(&format!("{TITLE}\n\n"));
    out.push_str(&format!("**Model**: {}\n\n", meta.model_name));
    out.push_str(&format!("**Temperature**: {}\n\n", meta.temperature));

    for (i, group) in log.prompt_groups().iter().enumerate() {
        out.push_str(&format!("## Prompt {}\n", i + 1));
        out.push_str(&format!("{}\n\n", group.system_prompt));
        for exchange in &group.exchanges {
            out.push_str("### User Message\n");
            out.push_str(&format!(
                "**Time**: {}\n\n",
                format_timestamp(&exchange.user_message_time)
            ));
            out.push_str(&format!("{}\n\n", exchange.user_message));
            out.push_str("### Bot Response\n");
            out.push_str(&format!(
                "**Time**: {}\n\n",
                format_timestamp(&exchange.bot_response_time)
            ));
            out.push_str(&format!("{}\n\n", exchange.bot_response));
            out.push_str("---\n\n");
        }
    }

    out
}

/// Write the transcript to `output_directory`, creating it if needed, and
/// return the path of the new file.
///
/// Two exports with the same session id inside the same second share a
/// file name; the later one wins.
pub fn export_markdown(
    log: &ConversationLog,
    output_directory: &Path,
    session_id: &str,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(output_directory)
        .map_err(|e| ChatmarkError::export(output_directory, e))?;

    let path = output_directory.join(transcript_file_name(&now, session_id));
    // Only a fully written file ever carries the transcript name
    let tmp_path = path.with_extension("md.tmp");
    fs::write(&tmp_path, render_markdown(log)).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ChatmarkError::export(&tmp_path, e)
    })?;
    fs::rename(&tmp_path, &path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        ChatmarkError::export(&path, e)
    })?;

    tracing::info!(
        path = %path.display(),
        groups = log.prompt_groups().len(),
        exchanges = log.exchange_count(),
        "chat history exported"
    );
    Ok(path)
}
