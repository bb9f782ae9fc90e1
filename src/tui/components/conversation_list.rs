//! # Conversation List Component
//!
//! Sidebar listing conversations with a search field.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ConversationListState` lives in `TuiState` (query, highlight, scroll)
//! - `ConversationList` is created each frame with borrowed state and the
//!   dashboard's current selection as a prop
//!
//! The list never changes the selection itself. Enter or a click emits
//! `ConversationEvent::Selected` and the dashboard decides.

use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::conversation::{
    AVATAR_PALETTE_SIZE, ConversationId, ConversationSummary, avatar_slot, filter_conversations,
    format_relative_time, initials_of, sample_conversations,
};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::badge::Badge;
use crate::tui::event::TuiEvent;

pub const SIDEBAR_TITLE: &str = "Messages";
const SEARCH_PLACEHOLDER: &str = "Search";
/// Columns taken by the search icon and its gap
const SEARCH_ICON_WIDTH: usize = 2;
/// Columns of the query repeated in the "No Results" message
const MAX_QUERY_ECHO: usize = 40;
/// Rows per conversation entry
const ITEM_HEIGHT: u16 = 2;

const AVATAR_PALETTE: [Color; AVATAR_PALETTE_SIZE] = [
    Color::Red,
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::LightRed,
    Color::LightBlue,
];

/// Events emitted by the conversation list.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    Selected(ConversationSummary),
    /// Search query edited
    QueryChanged,
}

/// Persistent sidebar state.
pub struct ConversationListState {
    conversations: Vec<ConversationSummary>,
    pub query: String,
    /// Index into the filtered list
    highlighted: usize,
    list_state: ListState,
    /// Where entries were drawn on the last render, for click hit-testing
    items_area: Rect,
}

impl ConversationListState {
    /// An empty `conversations` falls back to the demo list.
    pub fn new(conversations: Vec<ConversationSummary>, now: DateTime<Local>) -> Self {
        let conversations = if conversations.is_empty() {
            sample_conversations(now)
        } else {
            conversations
        };
        Self {
            conversations,
            query: String::new(),
            highlighted: 0,
            list_state: ListState::default(),
            items_area: Rect::default(),
        }
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    /// Conversations matching the current query.
    pub fn visible(&self) -> Vec<&ConversationSummary> {
        filter_conversations(&self.conversations, &self.query)
    }

    pub fn highlighted(&self) -> Option<&ConversationSummary> {
        self.visible().get(self.highlighted).copied()
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.highlighted = 0;
        *self.list_state.offset_mut() = 0;
    }

    fn edit_query(&mut self, edit: impl FnOnce(&mut String)) -> Option<ConversationEvent> {
        let mut query = std::mem::take(&mut self.query);
        edit(&mut query);
        self.set_query(&query);
        Some(ConversationEvent::QueryChanged)
    }

    fn move_highlight(&mut self, down: bool) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        self.highlighted = if down {
            (self.highlighted + 1).min(len - 1)
        } else {
            self.highlighted.saturating_sub(1)
        };
    }

    /// Filtered index of the entry drawn at a screen cell.
    pub fn index_at(&self, column: u16, row: u16) -> Option<usize> {
        if !self.items_area.contains(Position::new(column, row)) {
            return None;
        }
        let idx = self.list_state.offset() + usize::from((row - self.items_area.y) / ITEM_HEIGHT);
        (idx < self.visible().len()).then_some(idx)
    }

    fn select_index(&mut self, idx: usize) -> Option<ConversationEvent> {
        let chosen = self.visible().get(idx).map(|c| (*c).clone())?;
        self.highlighted = idx;
        Some(ConversationEvent::Selected(chosen))
    }
}

impl EventHandler for ConversationListState {
    type Event = ConversationEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar('\n') => None,
            TuiEvent::InputChar(c) => self.edit_query(|q| q.push(*c)),
            TuiEvent::Paste(text) => {
                let line: String = text.chars().filter(|c| !c.is_control()).collect();
                self.edit_query(|q| q.push_str(&line))
            }
            TuiEvent::Backspace if !self.query.is_empty() => self.edit_query(|q| {
                q.pop();
            }),
            TuiEvent::Escape if !self.query.is_empty() => self.edit_query(String::clear),
            TuiEvent::CursorUp => {
                self.move_highlight(false);
                None
            }
            TuiEvent::CursorDown => {
                self.move_highlight(true);
                None
            }
            TuiEvent::Submit => self.select_index(self.highlighted),
            TuiEvent::MouseClick(column, row) => {
                let idx = self.index_at(*column, *row)?;
                self.select_index(idx)
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for the sidebar.
pub struct ConversationList<'a> {
    pub state: &'a mut ConversationListState,
    /// The dashboard's selection (Prop)
    pub selected: Option<ConversationId>,
    /// Keyboard focus (Prop)
    pub focused: bool,
    /// Reference time for relative timestamps (Prop)
    pub now: DateTime<Local>,
}

impl ConversationList<'_> {
    fn search_line(&self) -> Line<'static> {
        let icon = Span::styled("⌕ ", Style::default().fg(Color::Gray));
        if self.state.query.is_empty() {
            Line::from(vec![
                icon,
                Span::styled(SEARCH_PLACEHOLDER, Style::default().add_modifier(Modifier::DIM)),
            ])
        } else {
            Line::from(vec![icon, Span::raw(self.state.query.clone())])
        }
    }

    fn item(&self, conversation: &ConversationSummary, width: u16, highlighted: bool) -> ListItem<'static> {
        let width = usize::from(width);
        let unread = conversation.has_unread();
        let emphasis = if unread {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let marker = if self.selected == Some(conversation.id) {
            Span::styled("▌", Style::default().fg(Color::Cyan))
        } else {
            Span::raw(" ")
        };
        let avatar = Span::styled(
            format!("{:^4}", initials_of(&conversation.name)),
            Style::default()
                .fg(Color::White)
                .bg(AVATAR_PALETTE[avatar_slot(&conversation.name)])
                .add_modifier(Modifier::BOLD),
        );
        let presence = if conversation.online {
            Span::styled("●", Style::default().fg(Color::Green))
        } else {
            Span::raw(" ")
        };
        // marker + avatar + presence + gap
        let lead = 1 + 4 + 1 + 1;

        let time = format_relative_time(conversation.timestamp, self.now);
        let name_room = width.saturating_sub(lead + time.width() + 1);
        let name = truncate_to_width(&conversation.name, name_room);
        let name_pad = " ".repeat(name_room.saturating_sub(name.width()) + 1);
        let top = Line::from(vec![
            marker.clone(),
            avatar,
            presence,
            Span::raw(" "),
            Span::styled(name, emphasis),
            Span::raw(name_pad),
            Span::styled(time, Style::default().fg(Color::Gray)),
        ]);

        let badge = conversation.unread_label();
        let badge_width = badge
            .as_deref()
            .map(|label| usize::from(Badge::new(label).width()) + 1)
            .unwrap_or(0);
        let preview_room = width.saturating_sub(lead + badge_width);
        let preview = truncate_to_width(conversation.preview(), preview_room);
        let preview_pad = " ".repeat(preview_room.saturating_sub(preview.width()));
        let preview_style = if unread {
            emphasis
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut bottom = vec![
            marker,
            Span::raw(" ".repeat(lead - 1)),
            Span::styled(preview, preview_style),
            Span::raw(preview_pad),
        ];
        if let Some(label) = badge.as_deref() {
            bottom.push(Span::raw(" "));
            bottom.push(Badge::new(label).span());
        }

        let item = ListItem::new(Text::from(vec![top, Line::from(bottom)]));
        if highlighted {
            item.style(Style::default().add_modifier(Modifier::REVERSED))
        } else {
            item
        }
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let (title, detail) = if self.state.query.is_empty() {
            ("No Messages".to_string(), "Your conversations will appear here".to_string())
        } else {
            (
                "No Results".to_string(),
                format!(
                    "No conversations found for \"{}\"",
                    truncate_to_width(&self.state.query, MAX_QUERY_ECHO)
                ),
            )
        };
        let empty = Paragraph::new(vec![
            Line::default(),
            Line::styled(title, Style::default().add_modifier(Modifier::BOLD)).centered(),
            Line::styled(detail, Style::default().fg(Color::Gray)).centered(),
        ])
        .wrap(ratatui::widgets::Wrap { trim: true });
        frame.render_widget(empty, area);
    }
}

impl Component for ConversationList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().add_modifier(Modifier::DIM));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [title_area, search_area, _, list_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!(" {SIDEBAR_TITLE}"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            title_area,
        );
        frame.render_widget(Paragraph::new(self.search_line()), search_area);
        if self.focused {
            frame.set_cursor_position((
                search_cursor_x(search_area, &self.state.query),
                search_area.y,
            ));
        }

        self.state.items_area = list_area;
        let visible = self.state.visible();
        let count = visible.len();

        if visible.is_empty() {
            self.render_empty(frame, list_area);
        } else {
            let highlighted = self.state.highlighted.min(count - 1);
            let items: Vec<ListItem> = visible
                .iter()
                .enumerate()
                .map(|(i, c)| self.item(c, list_area.width, self.focused && i == highlighted))
                .collect();
            self.state.highlighted = highlighted;
            self.state.list_state.select(Some(highlighted));
            frame.render_stateful_widget(List::new(items), list_area, &mut self.state.list_state);
        }

        let footer = format!(" {count} conversation{}", if count == 1 { "" } else { "s" });
        frame.render_widget(
            Paragraph::new(Line::styled(footer, Style::default().fg(Color::Gray))),
            footer_area,
        );
    }
}

/// Column of the search cursor, kept inside `area` however long the query.
fn search_cursor_x(area: Rect, query: &str) -> u16 {
    let last = area.right().saturating_sub(1);
    let offset = SEARCH_ICON_WIDTH.saturating_add(query.width());
    let x = usize::from(area.x).saturating_add(offset);
    u16::try_from(x).unwrap_or(u16::MAX).min(last)
}

/// Cut `text` to at most `max` display columns, ending in `…` when shortened.
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 9, 27, 15, 7, 0).unwrap()
    }

    fn sample_state() -> ConversationListState {
        ConversationListState::new(Vec::new(), now())
    }

    fn render(state: &mut ConversationListState, focused: bool) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(36, 16)).unwrap();
        terminal
            .draw(|f| {
                ConversationList {
                    state: &mut *state,
                    selected: Some(ConversationId(1)),
                    focused,
                    now: now(),
                }
                .render(f, f.area());
            })
            .unwrap();
        terminal
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn type_query(state: &mut ConversationListState, text: &str) {
        for c in text.chars() {
            state.handle_event(&TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn empty_input_falls_back_to_samples() {
        let state = sample_state();
        assert_eq!(state.conversations().len(), 4);
        assert_eq!(state.conversations()[0].name, "Sarah Wilson");
    }

    #[test]
    fn typing_filters_case_insensitively() {
        let mut state = sample_state();
        type_query(&mut state, "SARAH");
        let names: Vec<_> = state.visible().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Sarah Wilson"]);

        state.handle_event(&TuiEvent::Escape);
        assert!(state.query.is_empty());
        assert_eq!(state.visible().len(), 4);
    }

    #[test]
    fn enter_reports_highlighted_without_changing_list() {
        let mut state = sample_state();
        state.handle_event(&TuiEvent::CursorDown);
        let event = state.handle_event(&TuiEvent::Submit);
        match event {
            Some(ConversationEvent::Selected(c)) => assert_eq!(c.name, "Mom"),
            other => panic!("expected selection, got {other:?}"),
        }
        assert_eq!(state.visible().len(), 4);
    }

    #[test]
    fn highlight_stays_in_bounds() {
        let mut state = sample_state();
        for _ in 0..10 {
            state.handle_event(&TuiEvent::CursorDown);
        }
        assert_eq!(state.highlighted().map(|c| c.name.as_str()), Some("John Smith"));
        state.handle_event(&TuiEvent::CursorUp);
        assert_eq!(state.highlighted().map(|c| c.name.as_str()), Some("Work Team"));
    }

    #[test]
    fn renders_entries_and_footer() {
        let mut state = sample_state();
        let terminal = render(&mut state, false);
        let text = screen_text(&terminal);
        assert!(text.contains(SIDEBAR_TITLE));
        assert!(text.contains("SW"));
        assert!(text.contains("Yesterday"));
        assert!(text.contains("4 conversations"));
    }

    #[test]
    fn renders_no_results_for_unmatched_query() {
        let mut state = sample_state();
        type_query(&mut state, "zz");
        let text = screen_text(&render(&mut state, true));
        assert!(text.contains("No Results"));
        assert!(text.contains("0 conversations"));
    }

    #[test]
    fn click_selects_entry() {
        let mut state = sample_state();
        let _ = render(&mut state, true);
        let area = state.items_area;
        let event = state.handle_event(&TuiEvent::MouseClick(area.x + 3, area.y + ITEM_HEIGHT));
        match event {
            Some(ConversationEvent::Selected(c)) => assert_eq!(c.name, "Mom"),
            other => panic!("expected selection, got {other:?}"),
        }
        assert_eq!(
            state.handle_event(&TuiEvent::MouseClick(area.x, area.bottom() + 1)),
            None
        );
    }

    #[test]
    fn search_cursor_stays_in_field() {
        let area = Rect::new(0, 1, 33, 1);
        assert_eq!(search_cursor_x(area, ""), 2);
        assert_eq!(search_cursor_x(area, "sarah"), 7);
        assert_eq!(search_cursor_x(area, &"x".repeat(100)), 32);
        assert_eq!(search_cursor_x(area, &"x".repeat(70_000)), 32);
    }

    #[test]
    fn long_pasted_query_renders() {
        let mut state = sample_state();
        state.handle_event(&TuiEvent::Paste("x".repeat(65534)));
        let text = screen_text(&render(&mut state, true));
        assert!(text.contains("No Results"));
    }

    #[test]
    fn truncation_marks_cut_text() {
        assert_eq!(truncate_to_width("Sarah Wilson", 20), "Sarah Wilson");
        assert_eq!(truncate_to_width("Sarah Wilson", 6), "Sarah…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
