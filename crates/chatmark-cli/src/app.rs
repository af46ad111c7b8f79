use anyhow::Result;
use chatmark_core::{generate_session_id, ChatSession, SessionSnapshot, Settings, UsageTotals};
use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Terminal,
};
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::cli::SessionOptions;
use crate::commands::{self, CommandResult};
use crate::input::{InputHistory, InputLine};
use crate::theme::Theme;

// ── Session setup ───────────────────────────────────────────────────────

pub fn build_session(settings: &Settings, options: &SessionOptions) -> Result<ChatSession> {
    let client = settings.build_llm_client()?;
    let mut session = ChatSession::new(client)
        .with_system_prompt(options.system_prompt.clone())
        .with_output_dir(settings.output_dir());
    if let Some(ref id) = options.session_id {
        session = session.with_session_id(id.clone());
    }
    Ok(session)
}

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(
    settings: &Settings,
    options: &SessionOptions,
    prompt: &str,
    export: bool,
) -> Result<()> {
    let mut session = build_session(settings, options)?;
    let reply = session.send(prompt).await?;
    println!("{reply}");

    if export {
        eprintln!("{}", session.export()?);
    }
    Ok(())
}

// ── Session worker ──────────────────────────────────────────────────────

/// Requests from the UI loop to the task that owns the session.
enum SessionCommand {
    Send(String),
    SetSystemPrompt(String),
    SetSessionId(String),
    Undo,
    Clear,
    Export,
}

enum SessionEvent {
    /// The pending message got its reply and was recorded.
    Replied(SessionSnapshot),
    /// The pending message failed; nothing was recorded.
    Failed(String),
    Updated(SessionSnapshot),
    Notice(String),
    Error(String),
}

async fn run_session_worker(
    mut session: ChatSession,
    mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    while let Some(command) = commands.recv().await {
        let replies = match command {
            SessionCommand::Send(text) => match session.send(text).await {
                Ok(_) => vec![SessionEvent::Replied(session.snapshot())],
                Err(e) => {
                    tracing::warn!("Completion failed: {e}");
                    vec![SessionEvent::Failed(e.to_string())]
                }
            },
            SessionCommand::SetSystemPrompt(prompt) => {
                session.set_system_prompt(prompt);
                vec![SessionEvent::Updated(session.snapshot())]
            }
            SessionCommand::SetSessionId(id) => {
                session.set_session_id(id);
                vec![SessionEvent::Updated(session.snapshot())]
            }
            SessionCommand::Undo => match session.undo_last_exchange() {
                Some(_) => vec![
                    SessionEvent::Updated(session.snapshot()),
                    SessionEvent::Notice("Deleted the last exchange.".into()),
                ],
                None => vec![SessionEvent::Notice("Nothing to undo.".into())],
            },
            SessionCommand::Clear => {
                session.clear_session();
                vec![SessionEvent::Updated(session.snapshot())]
            }
            SessionCommand::Export => match session.export() {
                Ok(msg) => vec![SessionEvent::Notice(msg)],
                Err(e) => {
                    tracing::warn!("Export failed: {e}");
                    vec![SessionEvent::Error(format!("Export failed: {e}"))]
                }
            },
        };

        for event in replies {
            if events.send(event).is_err() {
                return;
            }
        }
    }
}

// ── Interactive TUI ─────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
enum NoticeKind {
    Info,
    Error,
}

/// A line from the app itself, shown after the exchange it followed.
#[derive(Clone)]
struct Notice {
    after: usize,
    kind: NoticeKind,
    text: String,
}

struct AppState {
    // Input
    input: InputLine,
    history: InputHistory,

    // Chat
    snapshot: SessionSnapshot,
    notices: Vec<Notice>,
    /// Message sent to the worker and still waiting for its reply.
    pending: Option<String>,
    scroll_offset: usize,

    // Status
    status_text: String,
    provider_name: String,
    model_name: String,
    temperature: f32,
    output_dir: PathBuf,

    // Display
    should_quit: bool,
    theme: Theme,

    session_tx: Option<mpsc::UnboundedSender<SessionCommand>>,
}

impl AppState {
    fn new(settings: &Settings, snapshot: SessionSnapshot) -> Self {
        let provider_name = settings.llm.provider.name().to_string();
        let banner = format!(
            "chatmark v{} | {} | {}\n\
             Type a message and press Enter. Ctrl+C to quit. /help for commands.",
            env!("CARGO_PKG_VERSION"),
            provider_name,
            settings.llm.model
        );

        Self {
            input: InputLine::new(),
            history: InputHistory::new(),

            snapshot,
            notices: vec![Notice {
                after: 0,
                kind: NoticeKind::Info,
                text: banner,
            }],
            pending: None,
            scroll_offset: 0,

            status_text: "Ready".into(),
            provider_name,
            model_name: settings.llm.model.clone(),
            temperature: settings.llm.temperature,
            output_dir: settings.output_dir(),

            should_quit: false,
            theme: Theme::by_name(&settings.ui.theme),

            session_tx: None,
        }
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Info, text.into());
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Error, text.into());
    }

    fn push_notice(&mut self, kind: NoticeKind, text: String) {
        self.notices.push(Notice {
            after: self.snapshot.exchange_count(),
            kind,
            text,
        });
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        // Will be resolved on next draw
        self.scroll_offset = usize::MAX;
    }

    fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Hand a command to the session worker. Returns false, after telling
    /// the user why, when there is no worker to take it.
    fn dispatch(&mut self, command: SessionCommand) -> bool {
        let sent = match self.session_tx {
            Some(ref tx) => tx.send(command).is_ok(),
            None => false,
        };
        if !sent {
            let reason = if self.session_tx.is_some() {
                "The session stopped. Restart chatmark to keep chatting."
            } else {
                "No model is connected. Set the API key and restart chatmark."
            };
            self.notify_error(reason);
            self.status_text = "Offline".into();
        }
        sent
    }
}

pub async fn run_tui(settings: Settings, options: SessionOptions) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let (session_tx, session_rx) = mpsc::unbounded_channel::<SessionCommand>();

    let mut state = match build_session(&settings, &options) {
        Ok(session) => {
            let mut state = AppState::new(&settings, session.snapshot());
            tokio::spawn(run_session_worker(session, session_rx, event_tx));
            state.session_tx = Some(session_tx);
            state
        }
        Err(e) => {
            tracing::warn!("No LLM client: {e}");
            let snapshot = SessionSnapshot {
                session_id: options.session_id.clone().unwrap_or_else(generate_session_id),
                system_prompt: options.system_prompt.clone(),
                prompt_groups: Vec::new(),
                usage: UsageTotals::default(),
            };
            let mut state = AppState::new(&settings, snapshot);
            state.notify_error(format!(
                "LLM not available: {e}\n\
                 Set your API key or pick another provider with --provider (openai, claude)."
            ));
            state.status_text = "Offline".into();
            state
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut state, &mut event_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    event_rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, state))?;

        // Process session events (non-blocking)
        while let Ok(session_event) = event_rx.try_recv() {
            handle_session_event(state, session_event);
        }

        // Handle keyboard input with timeout
        if event::poll(std::time::Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(state, key);
                }
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

fn draw_ui(f: &mut ratatui::Frame, state: &mut AppState) {
    let theme = &state.theme;

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // chat
            Constraint::Length(3), // input
            Constraint::Length(1), // status
        ])
        .split(f.area());
    let chat_area = main_chunks[0];

    let chat_lines = build_chat_lines(
        &state.snapshot,
        &state.notices,
        state.pending.as_deref(),
        theme,
    );
    let total_lines = chat_lines.len();

    // Calculate visible height (area height - 2 for borders)
    let visible_height = chat_area.height.saturating_sub(2) as usize;

    if state.scroll_offset == usize::MAX {
        state.scroll_offset = total_lines.saturating_sub(visible_height);
    }

    let max_scroll = total_lines.saturating_sub(visible_height);
    if state.scroll_offset > max_scroll {
        state.scroll_offset = max_scroll;
    }

    let chat = Paragraph::new(Text::from(chat_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" chatmark ")
                .border_style(Style::default().fg(theme.border)),
        )
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset as u16, 0));
    f.render_widget(chat, chat_area);

    if total_lines > visible_height {
        let mut scrollbar_state = ScrollbarState::new(max_scroll).position(state.scroll_offset);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("^"))
                .end_symbol(Some("v")),
            chat_area,
            &mut scrollbar_state,
        );
    }

    draw_input(f, main_chunks[1], state, theme);
    draw_status_bar(f, main_chunks[2], state, theme);
}

#[derive(Clone, Copy)]
enum Speaker {
    User,
    Assistant,
}

fn render_message_lines(
    speaker: Speaker,
    content: &str,
    time: Option<DateTime<Local>>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    let (prefix, color) = match speaker {
        Speaker::User => ("You > ", theme.user),
        Speaker::Assistant => ("AI > ", theme.assistant),
    };
    let stamp = time
        .map(|t| t.format("%H:%M ").to_string())
        .unwrap_or_else(|| "      ".into());
    let indent = " ".repeat(stamp.chars().count() + prefix.len());

    // Only replies get code-block detection
    let detect_code = matches!(speaker, Speaker::Assistant);
    let mut in_code_block = false;

    let mut raw_lines: Vec<&str> = content.lines().collect();
    if raw_lines.is_empty() {
        raw_lines.push("");
    }

    for (i, raw_line) in raw_lines.into_iter().enumerate() {
        let mut spans = if i == 0 {
            vec![
                Span::styled(stamp.clone(), Style::default().fg(theme.dim)),
                Span::styled(
                    prefix,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ]
        } else {
            vec![Span::raw(indent.clone())]
        };

        if detect_code && raw_line.starts_with("```") {
            in_code_block = !in_code_block;
            spans.push(Span::styled(
                raw_line.to_string(),
                Style::default().fg(theme.dim),
            ));
        } else if in_code_block {
            spans.push(Span::styled(
                raw_line.to_string(),
                Style::default().fg(theme.code),
            ));
        } else {
            spans.push(Span::styled(raw_line.to_string(), Style::default().fg(color)));
        }
        lines.push(Line::from(spans));
    }

    lines
}

fn push_notices(lines: &mut Vec<Line<'static>>, notices: &[&Notice], theme: &Theme) {
    for notice in notices {
        let color = match notice.kind {
            NoticeKind::Info => theme.notice,
            NoticeKind::Error => theme.error,
        };
        for raw_line in notice.text.lines() {
            lines.push(Line::from(Span::styled(
                raw_line.to_string(),
                Style::default().fg(color),
            )));
        }
        lines.push(Line::raw(""));
    }
}

fn group_header(number: usize, system_prompt: &str, theme: &Theme) -> Line<'static> {
    let label = if system_prompt.is_empty() {
        "(no system prompt)".to_string()
    } else {
        preview(system_prompt, 72)
    };
    Line::from(vec![
        Span::styled(
            format!("── Prompt {number} "),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(label, Style::default().fg(theme.dim)),
    ])
}

fn build_chat_lines(
    snapshot: &SessionSnapshot,
    notices: &[Notice],
    pending: Option<&str>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let total = snapshot.exchange_count();

    // Notices recorded past the end (e.g. before an undo) go last
    let mut slots: Vec<Vec<&Notice>> = vec![Vec::new(); total + 1];
    for notice in notices {
        slots[notice.after.min(total)].push(notice);
    }

    let mut chat_lines: Vec<Line<'static>> = Vec::new();
    push_notices(&mut chat_lines, &slots[0], theme);

    let mut shown = 0;
    for (i, group) in snapshot.prompt_groups.iter().enumerate() {
        chat_lines.push(group_header(i + 1, &group.system_prompt, theme));
        chat_lines.push(Line::raw(""));

        for exchange in &group.exchanges {
            chat_lines.extend(render_message_lines(
                Speaker::User,
                &exchange.user_message,
                Some(exchange.user_message_time),
                theme,
            ));
            chat_lines.extend(render_message_lines(
                Speaker::Assistant,
                &exchange.bot_response,
                Some(exchange.bot_response_time),
                theme,
            ));
            chat_lines.push(Line::raw(""));

            shown += 1;
            push_notices(&mut chat_lines, &slots[shown], theme);
        }
    }

    if let Some(text) = pending {
        chat_lines.extend(render_message_lines(Speaker::User, text, None, theme));
        chat_lines.push(Line::from(Span::styled(
            "  Thinking...",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::DIM),
        )));
    }

    chat_lines
}

fn draw_input(f: &mut ratatui::Frame, area: Rect, state: &AppState, theme: &Theme) {
    let is_command = state.input.text().starts_with('/');

    let title = if state.is_busy() {
        " Input (waiting for reply...) "
    } else if is_command {
        " Command "
    } else {
        " Input "
    };

    // Keep the cursor in view on long lines
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible, cursor_col) = state.input.visible_window(inner_width);

    let border: Color = if is_command { theme.accent } else { theme.border };
    let input = Paragraph::new(visible)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(border)),
        )
        .style(Style::default().fg(theme.text));
    f.render_widget(input, area);

    let cursor_x = area.x + 1 + cursor_col as u16;
    let max_x = area.x + area.width.saturating_sub(2);
    f.set_cursor_position((cursor_x.min(max_x), area.y + 1));
}

fn draw_status_bar(f: &mut ratatui::Frame, area: Rect, state: &AppState, theme: &Theme) {
    let usage = state.snapshot.usage;
    let tokens_str = if usage.total_input_tokens > 0 || usage.total_output_tokens > 0 {
        format!(
            "| {}in/{}out ",
            format_tokens(usage.total_input_tokens),
            format_tokens(usage.total_output_tokens),
        )
    } else {
        String::new()
    };

    let system_str = if state.snapshot.system_prompt.is_empty() {
        String::new()
    } else {
        format!("| sys: {} ", preview(&state.snapshot.system_prompt, 24))
    };

    let session_prefix: String = state.snapshot.session_id.chars().take(8).collect();

    let status_spans = vec![
        Span::styled(
            format!(" {} ", state.provider_name),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("| {} ", state.model_name),
            Style::default().fg(theme.accent),
        ),
        Span::styled(
            format!("| t={} ", state.temperature),
            Style::default().fg(theme.dim),
        ),
        Span::styled(
            format!("| {session_prefix} "),
            Style::default().fg(theme.dim),
        ),
        Span::styled(system_str, Style::default().fg(theme.notice)),
        Span::styled(tokens_str, Style::default().fg(theme.dim)),
        Span::styled("| ", Style::default().fg(theme.dim)),
        Span::styled(
            state.status_text.clone(),
            Style::default().fg(if state.status_text.starts_with("Error") {
                theme.error
            } else {
                theme.ok
            }),
        ),
    ];
    f.render_widget(Paragraph::new(Line::from(status_spans)), area);
}

fn handle_session_event(state: &mut AppState, event: SessionEvent) {
    match event {
        SessionEvent::Replied(snapshot) => {
            state.pending = None;
            state.snapshot = snapshot;
            state.status_text = "Ready".into();
            state.scroll_to_bottom();
        }
        SessionEvent::Failed(e) => {
            // Give the message back so it can be resent
            if let Some(text) = state.pending.take() {
                if state.input.is_empty() {
                    state.input.set(text);
                }
            }
            state.notify_error(format!("Error: {e}"));
            state.status_text = "Error".into();
        }
        SessionEvent::Updated(snapshot) => {
            state.snapshot = snapshot;
            state.scroll_to_bottom();
        }
        SessionEvent::Notice(text) => {
            state.notify(text);
        }
        SessionEvent::Error(text) => {
            state.notify_error(text);
            state.status_text = "Error".into();
        }
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) {
    match (key.modifiers, key.code) {
        // Quit
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            state.should_quit = true;
        }

        (KeyModifiers::CONTROL, KeyCode::Char('l')) => clear_chat(state),
        (KeyModifiers::CONTROL, KeyCode::Char('z')) => undo_last(state),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            state.dispatch(SessionCommand::Export);
        }

        // Submit input
        (_, KeyCode::Enter) => submit(state),

        // Input editing
        (_, KeyCode::Backspace) => state.input.backspace(),
        (_, KeyCode::Delete) => state.input.delete(),
        (_, KeyCode::Left) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                state.input.word_left();
            } else {
                state.input.left();
            }
        }
        (_, KeyCode::Right) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                state.input.word_right();
            } else {
                state.input.right();
            }
        }
        (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => state.input.home(),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => state.input.end(),

        // Scroll (Shift+arrows, must come before bare arrows)
        (KeyModifiers::SHIFT, KeyCode::Up) => {
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
        }
        (KeyModifiers::SHIFT, KeyCode::Down) => {
            state.scroll_offset = state.scroll_offset.saturating_add(1);
        }
        (_, KeyCode::PageUp) => {
            state.scroll_offset = state.scroll_offset.saturating_sub(20);
        }
        (_, KeyCode::PageDown) => {
            state.scroll_offset = state.scroll_offset.saturating_add(20);
        }

        // History navigation
        (_, KeyCode::Up) => {
            if let Some(entry) = state.history.older() {
                let entry = entry.to_string();
                state.input.set(entry);
            }
        }
        (_, KeyCode::Down) => {
            if let Some(entry) = state.history.newer() {
                let entry = entry.to_string();
                state.input.set(entry);
            }
        }

        (KeyModifiers::CONTROL, KeyCode::Char('u')) => state.input.kill_to_start(),
        (KeyModifiers::CONTROL, KeyCode::Char('k')) => state.input.kill_to_end(),
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => state.input.delete_word_back(),

        // Clipboard paste (Ctrl+V)
        (KeyModifiers::CONTROL, KeyCode::Char('v')) => match arboard::Clipboard::new() {
            Ok(mut cb) => {
                if let Ok(text) = cb.get_text() {
                    state.input.insert_str(&text);
                }
            }
            Err(e) => tracing::warn!("Clipboard unavailable: {e}"),
        },

        // Tab completion for commands
        (_, KeyCode::Tab) => {
            if state.input.text().starts_with('/') {
                if let Some(completion) = commands::complete_command(state.input.text()) {
                    state.input.set(completion);
                }
            }
        }

        // Regular character input
        (modifiers, KeyCode::Char(c)) if !modifiers.contains(KeyModifiers::CONTROL) => {
            state.input.insert(c);
        }

        _ => {}
    }
}

fn submit(state: &mut AppState) {
    if state.input.is_empty() {
        return;
    }

    if state.input.text().starts_with('/') {
        let result = commands::handle_command(state.input.text());
        // Keep the command in the box so it can be sent once the reply lands
        if state.is_busy() && result.changes_session() {
            state.status_text = "Waiting for reply...".into();
            return;
        }
        let input = state.input.take();
        state.history.push(input);
        handle_command_result(state, result);
        return;
    }
    if state.is_busy() {
        return;
    }

    let input = state.input.take();
    state.history.push(input.clone());
    if input.trim().is_empty() {
        return;
    }

    if state.dispatch(SessionCommand::Send(input.clone())) {
        state.pending = Some(input);
        state.status_text = "Sending...".into();
        state.scroll_to_bottom();
    }
}

fn undo_last(state: &mut AppState) {
    if state.is_busy() {
        state.status_text = "Waiting for reply...".into();
        return;
    }
    state.dispatch(SessionCommand::Undo);
}

fn clear_chat(state: &mut AppState) {
    if state.is_busy() {
        state.status_text = "Waiting for reply...".into();
        return;
    }
    if state.dispatch(SessionCommand::Clear) {
        state.notices.clear();
        state.notices.push(Notice {
            after: 0,
            kind: NoticeKind::Info,
            text: "Chat cleared.".into(),
        });
        state.scroll_offset = 0;
    }
}

fn handle_command_result(state: &mut AppState, result: CommandResult) {
    match result {
        CommandResult::Message(msg) => {
            state.notify(msg);
        }
        CommandResult::SetSystemPrompt(prompt) => {
            let confirmation = if prompt.is_empty() {
                "System prompt cleared.".to_string()
            } else {
                format!("System prompt set: {}", preview(&prompt, 80))
            };
            if state.dispatch(SessionCommand::SetSystemPrompt(prompt)) {
                state.notify(confirmation);
            }
        }
        CommandResult::ShowSystemPrompt => {
            let msg = if state.snapshot.system_prompt.is_empty() {
                "No system prompt is set.".to_string()
            } else {
                format!("System prompt: {}", state.snapshot.system_prompt)
            };
            state.notify(msg);
        }
        CommandResult::Export => {
            state.dispatch(SessionCommand::Export);
        }
        CommandResult::Undo => undo_last(state),
        CommandResult::Clear => clear_chat(state),
        CommandResult::SetSessionId(id) => {
            let confirmation = format!("Session id set to {id}.");
            if state.dispatch(SessionCommand::SetSessionId(id)) {
                state.notify(confirmation);
            }
        }
        CommandResult::ShowSessionId => {
            let msg = format!("Session id: {}", state.snapshot.session_id);
            state.notify(msg);
        }
        CommandResult::ShowStatus => {
            let msg = status_report(state);
            state.notify(msg);
        }
        CommandResult::Quit => {
            state.should_quit = true;
        }
        CommandResult::NotACommand => {}
    }
}

fn status_report(state: &AppState) -> String {
    let usage = state.snapshot.usage;
    format!(
        "Provider: {}\n\
         Model: {} (temperature {})\n\
         Session: {}\n\
         Exchanges: {} in {} prompt group(s)\n\
         Tokens: {} in / {} out over {} request(s)\n\
         Export directory: {}",
        state.provider_name,
        state.model_name,
        state.temperature,
        state.snapshot.session_id,
        state.snapshot.exchange_count(),
        state.snapshot.prompt_groups.len(),
        usage.total_input_tokens,
        usage.total_output_tokens,
        usage.request_count,
        state.output_dir.display(),
    )
}

// ── Helper functions ────────────────────────────────────────────────────

/// First line of `text`, cut to `max` chars.
fn preview(text: &str, max: usize) -> String {
    let first = text.lines().next().unwrap_or("");
    let mut out: String = first.chars().take(max).collect();
    if first.chars().count() > max || text.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
}

fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_500), "1.5k");
        assert_eq!(format_tokens(2_000_000), "2.0M");
    }

    #[test]
    fn test_preview_cuts_on_chars() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("안녕하세요", 2), "안녕...");
        assert_eq!(preview("one\ntwo", 10), "one...");
    }
}
