use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use tokio::sync::mpsc;
use tracing::debug;

use horizonte_advisor::{build_prompt, offline_reply, parse_response, render_plain};
use horizonte_catalog::Catalog;
use horizonte_core::Router;

use crate::chat_worker::{self, ChatEvent, ChatRequest};
use crate::config::Config;
use crate::llm::{ChatTurn, LlmConfig};
use crate::report::{format_decision, route_tag};

#[derive(Clone, Debug, PartialEq)]
enum Role {
    User,
    Assistant,
    /// Route tags and status lines; never sent to the model.
    System,
}

#[derive(Clone, Debug)]
struct Msg {
    role: Role,
    content: String,
    /// False until the reply completes.
    answered: bool,
}

impl Msg {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into(), answered: true }
    }

    fn placeholder() -> Self {
        Self { role: Role::Assistant, content: "…".to_string(), answered: false }
    }
}

/// Marks a superseded reply so it stays on screen but out of the model context.
fn cancel_slot(messages: &mut [Msg], slot: usize) {
    if let Some(m) = messages.get_mut(slot) {
        m.answered = false;
        m.content.push_str(" [cancelled]");
    }
}

struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    fn open_today() -> Result<Self> {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let path = crate::state::chat_dir()?.join(format!("{today}.md"));
        Ok(Self { path })
    }

    fn append(&mut self, role: &str, msg: &str) -> Result<()> {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(
            f,
            "- {} [{}] {}",
            chrono::Utc::now().to_rfc3339(),
            role,
            msg.replace('\n', " ")
        )?;
        Ok(())
    }
}

/// A request whose answer is still arriving.
struct Pending {
    request_id: u64,
    /// Index of the assistant placeholder in `messages`.
    slot: usize,
    raw: String,
}

struct Session<'a> {
    router: &'a Router,
    catalog: &'a Catalog,
    max_turns: usize,
    worker: Option<mpsc::UnboundedSender<ChatRequest>>,
    model_label: String,
    messages: Vec<Msg>,
    input: String,
    show_help: bool,
    pending: Option<Pending>,
    next_id: u64,
    log: ChatLog,
}

pub fn run_chat(handle: tokio::runtime::Handle, cfg: &Config, router: &Router, catalog: &Catalog) -> Result<()> {
    let (events_tx, events_rx) = std::sync::mpsc::channel::<ChatEvent>();

    let (worker, model_label) = match LlmConfig::resolve(cfg)? {
        Some(llm_cfg) => {
            let (req_tx, req_rx) = mpsc::unbounded_channel::<ChatRequest>();
            let label = format!("{:?} {}", llm_cfg.provider, llm_cfg.model).to_lowercase();
            handle.spawn(chat_worker::run_worker(llm_cfg, cfg.chat.stream, req_rx, events_tx));
            (Some(req_tx), label)
        }
        None => (None, "offline (no API key)".to_string()),
    };

    let mut session = Session {
        router,
        catalog,
        max_turns: cfg.chat.max_turns_context,
        worker,
        model_label,
        messages: vec![Msg::new(
            Role::Assistant,
            "Hi, I'm Horizonte. Ask me about a construction plan, a renovation or an EVN connection.",
        )],
        input: String::new(),
        show_help: true,
        pending: None,
        next_id: 1,
        log: ChatLog::open_today()?,
    };
    session.log.append("system", "session_start")?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = chat_loop(&mut terminal, &mut session, &events_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn chat_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    s: &mut Session<'_>,
    events: &std::sync::mpsc::Receiver<ChatEvent>,
) -> Result<()> {
    loop {
        loop {
            match events.try_recv() {
                Ok(ev) => s.on_event(ev)?,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        terminal.draw(|f| draw(f, s))?;

        if !event::poll(std::time::Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Esc => break,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
            KeyCode::F(1) => s.show_help = !s.show_help,
            KeyCode::Enter => {
                let trimmed = s.input.trim().to_string();
                s.input.clear();
                if !trimmed.is_empty() {
                    s.submit(&trimmed)?;
                }
            }
            KeyCode::Backspace => {
                s.input.pop();
            }
            KeyCode::Char(c) => s.input.push(c),
            _ => {}
        }
    }

    Ok(())
}

fn draw(f: &mut Frame<'_>, s: &Session<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    let splash = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            "Horizonte",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!(">_ {}", s.model_label), Style::default().fg(Color::Cyan))),
        Line::from(Span::styled("type /help or F1 for shortcuts", Style::default().fg(Color::Gray))),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(splash, chunks[0]);

    let mut lines: Vec<Line> = Vec::new();
    if s.show_help {
        lines.push(Line::from(Span::styled(
            "Shortcuts: Enter=send, Esc=quit, F1=help",
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::raw("Commands: /help /status /route <text> /clear"));
        lines.push(Line::raw(""));
    }

    for m in &s.messages {
        let (tag, color) = match m.role {
            Role::User => ("you", Color::Cyan),
            Role::Assistant => ("horizonte", Color::Magenta),
            Role::System => ("route", Color::Gray),
        };
        lines.push(Line::from(Span::styled(format!("{tag}: "), Style::default().fg(color))));
        lines.extend(m.content.lines().map(|l| Line::raw(l.to_string())));
        lines.push(Line::raw(""));
    }

    // Keep the newest lines in view.
    let height = chunks[1].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(height).min(u16::MAX as usize) as u16;

    let history = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("conversation"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(history, chunks[1]);

    let input = Paragraph::new(s.input.as_str())
        .block(Block::default().borders(Borders::ALL).title("message"))
        .style(Style::default().fg(Color::White));
    f.render_widget(input, chunks[2]);
}

impl Session<'_> {
    fn submit(&mut self, text: &str) -> Result<()> {
        self.log.append("user", text)?;

        if let Some(reply) = handle_slash(text, self) {
            self.log.append("system", &reply)?;
            self.messages.push(Msg::new(Role::System, reply));
            return Ok(());
        }

        let decision = self.router.route(text);
        let tag = route_tag(&decision);
        self.log.append("route", &tag)?;

        let turns = to_llm_turns(&self.messages, self.max_turns, text);
        self.messages.push(Msg::new(Role::System, tag));
        self.messages.push(Msg::new(Role::User, text));

        let Some(worker) = &self.worker else {
            let reply = offline_reply(&decision);
            self.log.append("assistant", &reply)?;
            self.messages.push(Msg::new(Role::Assistant, reply));
            return Ok(());
        };

        let pair = build_prompt(&decision, text, self.catalog);
        let request_id = self.next_id;
        self.next_id += 1;

        if let Some(prev) = self.pending.take() {
            cancel_slot(&mut self.messages, prev.slot);
        }

        self.messages.push(Msg::placeholder());
        self.pending = Some(Pending { request_id, slot: self.messages.len() - 1, raw: String::new() });

        debug!(request_id, "sending chat request");
        worker
            .send(ChatRequest { request_id, system: pair.system, turns })
            .context("chat worker stopped")?;
        Ok(())
    }

    fn on_event(&mut self, ev: ChatEvent) -> Result<()> {
        let id = match &ev {
            ChatEvent::Started { request_id }
            | ChatEvent::Delta { request_id, .. }
            | ChatEvent::Completed { request_id }
            | ChatEvent::Error { request_id, .. } => *request_id,
        };
        let Some(p) = self.pending.as_mut().filter(|p| p.request_id == id) else {
            return Ok(());
        };

        match ev {
            ChatEvent::Started { .. } => {}
            ChatEvent::Delta { text, .. } => {
                p.raw.push_str(&text);
                self.messages[p.slot].content = p.raw.clone();
            }
            ChatEvent::Completed { .. } => {
                let reply = render_plain(&parse_response(&p.raw));
                self.messages[p.slot].content = reply.clone();
                self.messages[p.slot].answered = true;
                self.pending = None;
                self.log.append("assistant", &reply)?;
            }
            ChatEvent::Error { message, .. } => {
                self.messages[p.slot].content = format!("error: {message}");
                self.pending = None;
                self.log.append("error", &message)?;
            }
        }
        Ok(())
    }
}

fn handle_slash(input: &str, s: &mut Session<'_>) -> Option<String> {
    let cmd = input.trim();
    if !cmd.starts_with('/') {
        return None;
    }
    let (name, arg) = cmd.split_once(char::is_whitespace).unwrap_or((cmd, ""));

    let reply = match name {
        "/help" => "Commands:\n\
- /help\n\
- /status\n\
- /route <text> (show how a message would be routed)\n\
- /clear (forget the conversation)\n\
\nShortcuts: Enter=send, Esc=quit, F1=toggle help"
            .to_string(),
        "/status" => format!(
            "Model: {}\nSignal profiles: {}\nCatalog: {} industries, {} companies\nLog: {}",
            s.model_label,
            s.router.table().len(),
            s.catalog.industries.len(),
            s.catalog.companies.len(),
            s.log.path.display()
        ),
        "/route" if arg.trim().is_empty() => "Usage: /route <text>".to_string(),
        "/route" => format_decision(&s.router.route(arg)),
        "/clear" => {
            s.messages.clear();
            s.pending = None;
            "Conversation cleared.".to_string()
        }
        _ => "Unknown command. Try /help".to_string(),
    };
    Some(reply)
}

/// Recent user/assistant turns plus the new message. Route tags and
/// replies that never completed are left out.
fn to_llm_turns(messages: &[Msg], max_turns: usize, pending_user: &str) -> Vec<ChatTurn> {
    let history: Vec<ChatTurn> = messages
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(ChatTurn::user(m.content.clone())),
            Role::Assistant if m.answered => Some(ChatTurn::assistant(m.content.clone())),
            _ => None,
        })
        .collect();

    let start = history.len().saturating_sub(max_turns);
    history[start..]
        .iter()
        .cloned()
        .chain(std::iter::once(ChatTurn::user(pending_user)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_llm_turns_skips_route_tags_and_caps_history() {
        let messages = vec![
            Msg::new(Role::Assistant, "Hi"),
            Msg::new(Role::System, "SINGLE GREETING (0.90)"),
            Msg::new(Role::User, "Hello"),
            Msg::new(Role::Assistant, "Tung!"),
            Msg::placeholder(),
        ];
        let turns = to_llm_turns(&messages, 2, "ndertim shtepi");
        let roles: Vec<(&str, &str)> = turns.iter().map(|t| (t.role.as_str(), t.content.as_str())).collect();
        assert_eq!(roles, vec![("user", "Hello"), ("assistant", "Tung!"), ("user", "ndertim shtepi")]);

        assert_eq!(to_llm_turns(&messages, 0, "x"), vec![ChatTurn::user("x")]);
    }

    #[test]
    fn test_cancelled_reply_is_not_sent_as_assistant_turn() {
        let mut messages = vec![Msg::new(Role::User, "ndertim shtepi"), Msg::placeholder()];
        messages[1].content = "Plani fill".to_string();
        cancel_slot(&mut messages, 1);
        assert_eq!(messages[1].content, "Plani fill [cancelled]");

        messages.push(Msg::new(Role::User, "evn lidhje"));
        let mut untouched = Msg::placeholder();
        untouched.content = "gabim".to_string();
        messages.push(untouched);

        let turns = to_llm_turns(&messages, 10, "sa kushton");
        assert_eq!(
            turns,
            vec![ChatTurn::user("ndertim shtepi"), ChatTurn::user("evn lidhje"), ChatTurn::user("sa kushton")]
        );

        cancel_slot(&mut messages, 99);
    }
}
