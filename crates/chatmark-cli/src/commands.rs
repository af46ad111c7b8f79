/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Set the system prompt for the next messages.
    SetSystemPrompt(String),
    /// Show the active system prompt.
    ShowSystemPrompt,
    /// Export the transcript to Markdown.
    Export,
    /// Remove the last exchange from the session.
    Undo,
    /// Forget every exchange in the session.
    Clear,
    /// Use a different session id for exports.
    SetSessionId(String),
    /// Show the session id.
    ShowSessionId,
    /// Show status (model, tokens, session).
    ShowStatus,
    /// Quit the application.
    Quit,
    /// Not a command - treat as regular input.
    NotACommand,
}

impl CommandResult {
    /// Whether carrying out the command changes the session. These wait
    /// until a pending reply has been recorded; the rest run right away.
    pub fn changes_session(&self) -> bool {
        matches!(
            self,
            Self::SetSystemPrompt(_)
                | Self::Export
                | Self::Undo
                | Self::Clear
                | Self::SetSessionId(_)
        )
    }
}

pub const COMMANDS: &[&str] = &[
    "/help",
    "/system",
    "/system-clear",
    "/save",
    "/export",
    "/undo",
    "/clear",
    "/session",
    "/status",
    "/version",
    "/quit",
    "/exit",
];

pub fn handle_command(input: &str) -> CommandResult {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,

        "/system" => {
            if arg.is_empty() {
                CommandResult::ShowSystemPrompt
            } else {
                CommandResult::SetSystemPrompt(arg.to_string())
            }
        }
        "/system-clear" => CommandResult::SetSystemPrompt(String::new()),

        "/save" | "/export" => CommandResult::Export,
        "/undo" => CommandResult::Undo,
        "/clear" => CommandResult::Clear,

        "/session" => {
            if arg.is_empty() {
                CommandResult::ShowSessionId
            } else {
                CommandResult::SetSessionId(arg.to_string())
            }
        }
        "/status" => CommandResult::ShowStatus,
        "/version" => CommandResult::Message(format!("chatmark v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

/// Complete a partially typed command. An exact name wins over longer
/// commands sharing its prefix; otherwise exactly one command must match.
pub fn complete_command(input: &str) -> Option<String> {
    if input.contains(' ') {
        return None;
    }
    if COMMANDS.contains(&input) {
        return Some(format!("{input} "));
    }
    let mut matches = COMMANDS.iter().filter(|c| c.starts_with(input));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(format!("{first} "))
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ chatmark Commands ────────────────────────────────────────────╮

  CONVERSATION
    /system <text>            Set the system prompt for next messages
    /system                   Show the active system prompt
    /system-clear             Use an empty system prompt
    /undo                     Delete the last exchange        (Ctrl+Z)
    /clear                    Delete every exchange           (Ctrl+L)

  TRANSCRIPT
    /save, /export            Save chat history as Markdown   (Ctrl+S)
    /session <id>             Use another session id in file names
    /session                  Show the session id

  OTHER
    /status                   Show model, tokens and session
    /help, /h                 Show this help message
    /version                  Show version information
    /exit, /quit, /q          Quit the application            (Ctrl+C)

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
