//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the dashboard,
//! and translates terminal events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (a reply is pending): draws every ~120ms so the typing
//!   indicator moves.
//! - **Idle**: sleeps up to 500ms and only redraws on events, resizes, or
//!   actions from background tasks.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

mod component;
mod components;
mod event;
mod ui;

use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use ratatui::layout::{Position, Rect};

use crate::backend::ResponseBackend;
use crate::core::action::{Action, Effect, update};
use crate::core::message::{Attachment, MessageId};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    Composer, ComposerEvent, ConversationEvent, ConversationListState, MessageListState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Sidebar search and conversation navigation
    Sidebar,
    /// Text editing in the composer. Esc switches to Thread.
    Composer,
    /// Message selection with arrow keys. Typing switches back to Composer.
    Thread,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub conversation_list: ConversationListState,
    pub message_list: MessageListState,
    pub composer: Composer,
    pub focus: Focus,
    /// Frame counter for the typing indicator
    pub typing_frame: usize,
    // Areas from the last draw, for mouse hit-testing
    pub sidebar_area: Rect,
    pub thread_area: Rect,
}

impl TuiState {
    pub fn new(app: &App) -> Self {
        Self {
            conversation_list: ConversationListState::new(app.conversations.clone(), Local::now()),
            message_list: MessageListState::new(),
            composer: Composer::new(),
            focus: Focus::Composer, // User expects to type immediately
            typing_frame: 0,
            sidebar_area: Rect::default(),
            thread_area: Rect::default(),
        }
    }

    fn focus_composer(&mut self) {
        self.focus = Focus::Composer;
        self.message_list.selected_index = None;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(mut app: App) -> std::io::Result<()> {
    let mut tui = TuiState::new(&app);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Could not enable terminal modes: {}", e);
            None
        }
    };

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        let animating = app.in_flight() > 0;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.typing_frame = (start_time.elapsed().as_millis() / 400) as usize;
            terminal.draw(|f| ui::draw_dashboard(f, &app, &mut tui, Local::now()))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(120)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain every pending event before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let effect = dispatch(&mut app, &mut tui, event);
            if perform(effect, &app, &tx) {
                break 'main;
            }
        }

        // Results from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if perform(effect, &app, &tx) {
                break 'main;
            }
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

/// Route one terminal event to the focused component and apply what it
/// emits to the app. Returns the effect the loop has to carry out.
pub fn dispatch(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> Effect {
    match event {
        TuiEvent::Resize => Effect::None,
        TuiEvent::ForceQuit => update(app, Action::Quit),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            Effect::None
        }
        TuiEvent::MouseClick(column, row) => dispatch_click(app, tui, column, row),
        TuiEvent::FocusNext => {
            match tui.focus {
                Focus::Sidebar => tui.focus_composer(),
                Focus::Composer if !tui.sidebar_area.is_empty() => tui.focus = Focus::Sidebar,
                Focus::Composer => {}
                Focus::Thread => tui.focus_composer(),
            }
            Effect::None
        }
        _ => match tui.focus {
            Focus::Sidebar => sidebar_event(app, tui, &event),
            Focus::Composer => composer_event(app, tui, &event),
            Focus::Thread => thread_event(app, tui, &event),
        },
    }
}

fn sidebar_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    match tui.conversation_list.handle_event(event) {
        Some(ConversationEvent::Selected(conversation)) => {
            update(app, Action::SelectConversation(conversation))
        }
        Some(ConversationEvent::QueryChanged) | None => Effect::None,
    }
}

fn composer_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    if matches!(event, TuiEvent::Escape) {
        tui.focus = Focus::Thread;
        tui.message_list.select_previous(app.thread.len());
        return Effect::None;
    }
    match tui.composer.handle_event(event) {
        Some(ComposerEvent::Submit(text)) => update(app, Action::Submit(text)),
        Some(ComposerEvent::Changed) | None => Effect::None,
    }
}

fn thread_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Effect {
    match event {
        TuiEvent::CursorUp => {
            tui.message_list.select_previous(app.thread.len());
            Effect::None
        }
        TuiEvent::CursorDown => {
            tui.message_list.select_next(app.thread.len());
            Effect::None
        }
        TuiEvent::Submit | TuiEvent::InputChar('d') => match selected_message(app, tui) {
            Some(id) => update(app, Action::DownloadAttachment(id)),
            None => Effect::None,
        },
        TuiEvent::Escape => {
            tui.focus_composer();
            Effect::None
        }
        // Typing returns to the composer and keeps the keystroke
        TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
            tui.focus_composer();
            tui.composer.handle_event(event);
            Effect::None
        }
        _ => Effect::None,
    }
}

fn dispatch_click(app: &mut App, tui: &mut TuiState, column: u16, row: u16) -> Effect {
    let position = Position::new(column, row);
    if tui.sidebar_area.contains(position) {
        tui.focus = Focus::Sidebar;
        tui.message_list.selected_index = None;
        return sidebar_event(app, tui, &TuiEvent::MouseClick(column, row));
    }
    if tui.composer.hits_send_button(column, row) {
        tui.focus_composer();
        return composer_event(app, tui, &TuiEvent::MouseClick(column, row));
    }
    if tui.thread_area.contains(position) {
        if let Some(idx) = tui.message_list.hit_test(row, tui.thread_area) {
            tui.focus = Focus::Thread;
            tui.message_list.selected_index = Some(idx);
        }
        return Effect::None;
    }
    tui.focus_composer();
    Effect::None
}

fn selected_message(app: &App, tui: &TuiState) -> Option<MessageId> {
    let idx = tui.message_list.selected_index?;
    app.thread.messages().get(idx).map(|m| m.id)
}

/// Carry out an effect. Returns true when the app should exit.
fn perform(effect: Effect, app: &App, tx: &mpsc::Sender<Action>) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnRequest { placeholder, text } => {
            spawn_request(app.backend.clone(), placeholder, text, tx.clone());
            false
        }
        Effect::SpawnDownload(attachment) => {
            spawn_download(
                app.backend.clone(),
                attachment,
                app.download_dir.clone(),
                tx.clone(),
            );
            false
        }
    }
}

fn spawn_request(
    backend: Arc<dyn ResponseBackend>,
    placeholder: MessageId,
    text: String,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning {} request for {:?}", backend.name(), placeholder);
    tokio::spawn(async move {
        let started = Instant::now();
        let action = match backend.request_response(&text).await {
            Ok(reply) => {
                debug!(
                    "Reply for {:?} after {}ms ({} bytes)",
                    placeholder,
                    started.elapsed().as_millis(),
                    reply.content.len()
                );
                Action::ResponseReceived { placeholder, reply }
            }
            Err(e) => Action::ResponseFailed {
                placeholder,
                error: e.to_string(),
            },
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver reply for {:?}: receiver dropped", placeholder);
        }
    });
}

fn spawn_download(
    backend: Arc<dyn ResponseBackend>,
    attachment: Attachment,
    dest_dir: PathBuf,
    tx: mpsc::Sender<Action>,
) {
    info!("Downloading {} from {}", attachment.name, attachment.url);
    tokio::spawn(async move {
        let result = backend
            .download(&attachment, &dest_dir)
            .await
            .map_err(|e| e.to_string());
        if tx.send(Action::DownloadFinished(result)).is_err() {
            warn!("Failed to report download of {}: receiver dropped", attachment.name);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Origin;
    use crate::test_support::{ScriptedBackend, test_app};

    fn type_text(app: &mut App, tui: &mut TuiState, text: &str) {
        for c in text.chars() {
            dispatch(app, tui, TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn enter_in_composer_submits() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        type_text(&mut app, &mut tui, "hi");
        let effect = dispatch(&mut app, &mut tui, TuiEvent::Submit);
        assert!(matches!(effect, Effect::SpawnRequest { ref text, .. } if text == "hi"));
        assert_eq!(app.thread.len(), 3);
        assert!(tui.composer.text().is_empty());
    }

    #[test]
    fn blank_composer_submit_does_nothing() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        type_text(&mut app, &mut tui, "   ");
        assert_eq!(dispatch(&mut app, &mut tui, TuiEvent::Submit), Effect::None);
        assert_eq!(app.thread.len(), 1);
    }

    #[test]
    fn escape_enters_thread_and_typing_returns() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        dispatch(&mut app, &mut tui, TuiEvent::Escape);
        assert_eq!(tui.focus, Focus::Thread);
        assert_eq!(tui.message_list.selected_index, Some(0));

        dispatch(&mut app, &mut tui, TuiEvent::InputChar('x'));
        assert_eq!(tui.focus, Focus::Composer);
        assert_eq!(tui.message_list.selected_index, None);
        assert_eq!(tui.composer.text(), "x");
    }

    #[test]
    fn download_key_without_attachment_is_noop() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        dispatch(&mut app, &mut tui, TuiEvent::Escape);
        assert_eq!(
            dispatch(&mut app, &mut tui, TuiEvent::InputChar('d')),
            Effect::None
        );
        assert_eq!(app.thread.messages()[0].origin, Origin::Assistant);
    }

    #[test]
    fn tab_without_sidebar_stays_in_composer() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        dispatch(&mut app, &mut tui, TuiEvent::FocusNext);
        assert_eq!(tui.focus, Focus::Composer);
    }

    #[test]
    fn sidebar_enter_selects_conversation() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        tui.sidebar_area = Rect::new(0, 0, 34, 20);
        dispatch(&mut app, &mut tui, TuiEvent::FocusNext);
        assert_eq!(tui.focus, Focus::Sidebar);

        dispatch(&mut app, &mut tui, TuiEvent::CursorDown);
        dispatch(&mut app, &mut tui, TuiEvent::Submit);
        assert_eq!(app.selected.as_ref().map(|c| c.name.as_str()), Some("Mom"));
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = test_app();
        let mut tui = TuiState::new(&app);
        assert_eq!(dispatch(&mut app, &mut tui, TuiEvent::ForceQuit), Effect::Quit);
    }

    #[tokio::test]
    async fn spawned_request_reports_reply() {
        let (tx, rx) = mpsc::channel();
        let backend = Arc::new(ScriptedBackend {
            reply: Some("echo: {message}".to_string()),
        });
        spawn_request(backend, MessageId(7), "ping".to_string(), tx);

        let action = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();
        match action {
            Action::ResponseReceived { placeholder, reply } => {
                assert_eq!(placeholder, MessageId(7));
                assert_eq!(reply.content, "echo: ping");
            }
            other => panic!("expected ResponseReceived, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn spawned_request_reports_failure() {
        let (tx, rx) = mpsc::channel();
        spawn_request(
            Arc::new(ScriptedBackend { reply: None }),
            MessageId(3),
            "ping".to_string(),
            tx,
        );

        let action = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            action,
            Action::ResponseFailed { placeholder: MessageId(3), .. }
        ));
    }

    #[tokio::test]
    async fn spawned_download_reports_path() {
        let (tx, rx) = mpsc::channel();
        let attachment = Attachment {
            url: "http://localhost/files/report.pdf".to_string(),
            name: "../report.pdf".to_string(),
            file_type: Some("pdf".to_string()),
        };
        spawn_download(
            Arc::new(ScriptedBackend { reply: None }),
            attachment,
            PathBuf::from("/tmp/parley"),
            tx,
        );

        let action = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();
        match action {
            Action::DownloadFinished(Ok(path)) => {
                assert_eq!(path, PathBuf::from("/tmp/parley/report.pdf"))
            }
            other => panic!("expected finished download, got {other:?}"),
        }
    }
}
