use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::chat_header::HEADER_HEIGHT;
use crate::tui::components::{ChatHeader, ConversationList, MessageList};
use crate::tui::{Focus, TuiState};

/// Sidebar width on wide terminals.
const SIDEBAR_WIDTH: u16 = 34;
/// Below this width the sidebar is hidden and the chat takes the full frame.
const MIN_WIDTH_FOR_SIDEBAR: u16 = 70;

/// Split the frame into sidebar and chat column.
pub fn dashboard_layout(area: Rect) -> (Rect, Rect) {
    if area.width < MIN_WIDTH_FOR_SIDEBAR {
        return (Rect { width: 0, ..area }, area);
    }
    let [sidebar, chat] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(area);
    (sidebar, chat)
}

/// Draw the whole dashboard and record component areas for hit-testing.
pub fn draw_dashboard(frame: &mut Frame, app: &App, tui: &mut TuiState, now: DateTime<Local>) {
    let (sidebar_area, chat_area) = dashboard_layout(frame.area());
    tui.sidebar_area = sidebar_area;

    if !sidebar_area.is_empty() {
        ConversationList {
            state: &mut tui.conversation_list,
            selected: app.selected.as_ref().map(|c| c.id),
            focused: tui.focus == Focus::Sidebar,
            now,
        }
        .render(frame, sidebar_area);
    }

    let composer_height = tui.composer.calculate_height(chat_area.width);
    let [header_area, thread_area, composer_area] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(composer_height),
    ])
    .areas(chat_area);
    tui.thread_area = thread_area;

    ChatHeader {
        selected: app.selected.as_ref().map(|c| c.name.as_str()),
        in_flight: app.in_flight(),
        status_message: &app.status_message,
    }
    .render(frame, header_area);

    MessageList::new(&mut tui.message_list, app.thread.messages(), tui.typing_frame)
        .render(frame, thread_area);

    tui.composer.focused = tui.focus == Focus::Composer;
    tui.composer.render(frame, composer_area);
}
