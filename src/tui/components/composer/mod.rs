//! # Composer Component
//!
//! Multi-line message input with a send button.
//!
//! ## Responsibilities
//!
//! - Capture and edit text (insert, paste, backspace, delete, cursor motion)
//! - Enforce the character limit
//! - Emit `Submit` with the buffer on Enter, or on a click on the send button
//! - Render a placeholder while empty and a character counter while not
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. Whether the composer has
//! keyboard focus is a prop set by the parent before each render.

mod layout;

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::button::{Button, ButtonSize, ButtonVariant};
use crate::tui::event::TuiEvent;

use layout::{
    BUTTON_GAP, HORIZONTAL_OVERHEAD, MAX_VISIBLE_ROWS, VERTICAL_OVERHEAD, layout_rows, locate,
    next_char_boundary, offset_at_column, prev_char_boundary,
};

/// Maximum message length, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;
pub const PLACEHOLDER: &str = "Message AI Assistant...";
const SEND_LABEL: &str = "Send";

/// High-level events emitted by the Composer
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    /// Non-blank text submitted; the buffer has been cleared
    Submit(String),
    /// Buffer or cursor changed
    Changed,
}

pub struct Composer {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary
    cursor: usize,
    /// First visible row when the content exceeds `MAX_VISIBLE_ROWS`
    scroll_row: usize,
    /// Text column width from the last render, used for vertical motion
    last_text_width: u16,
    /// Where the send button was drawn on the last render
    send_area: Rect,
    /// Keyboard focus (Prop)
    pub focused: bool,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll_row: 0,
            last_text_width: 60,
            send_area: Rect::default(),
            focused: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    /// The send button is only active for non-blank text.
    pub fn can_send(&self) -> bool {
        !self.buffer.trim().is_empty()
    }

    fn send_button(&self) -> Button<'static> {
        Button::new(SEND_LABEL)
            .variant(ButtonVariant::Default)
            .size(ButtonSize::Sm)
            .disabled(!self.can_send())
    }

    /// Width available for text inside a composer of `area_width` columns.
    fn text_width(&self, area_width: u16) -> u16 {
        area_width
            .saturating_sub(HORIZONTAL_OVERHEAD)
            .saturating_sub(self.send_button().width() + BUTTON_GAP)
    }

    /// Height needed for the current buffer, between one and
    /// `MAX_VISIBLE_ROWS` rows of text plus borders.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = layout_rows(&self.buffer, self.text_width(area_width)).len() as u16;
        rows.min(MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    /// Whether a screen cell lies on the send button drawn last frame.
    pub fn hits_send_button(&self, column: u16, row: u16) -> bool {
        self.send_area.contains(Position::new(column, row))
    }

    /// Take the buffer if it holds anything besides whitespace.
    pub fn submit(&mut self) -> Option<ComposerEvent> {
        if !self.can_send() {
            return None;
        }
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.scroll_row = 0;
        Some(ComposerEvent::Submit(text))
    }

    /// Insert as much of `text` as fits under the character limit.
    fn insert(&mut self, text: &str) -> Option<ComposerEvent> {
        let room = MAX_MESSAGE_CHARS.saturating_sub(self.char_count());
        let accepted: String = text.chars().take(room).collect();
        if accepted.is_empty() {
            return None;
        }
        self.buffer.insert_str(self.cursor, &accepted);
        self.cursor += accepted.len();
        Some(ComposerEvent::Changed)
    }

    fn move_to(&mut self, pos: usize) -> Option<ComposerEvent> {
        (pos != self.cursor).then(|| {
            self.cursor = pos;
            ComposerEvent::Changed
        })
    }

    fn move_vertically(&mut self, down: bool) -> Option<ComposerEvent> {
        let rows = layout_rows(&self.buffer, self.last_text_width);
        let (row, col) = locate(&self.buffer, &rows, self.cursor);
        let target = if down {
            row + 1
        } else {
            row.checked_sub(1)?
        };
        let target_row = *rows.get(target)?;
        self.move_to(offset_at_column(&self.buffer, target_row, col))
    }

    /// Keep the cursor row inside the visible window.
    fn follow_cursor(&mut self, cursor_row: usize, row_count: usize) {
        let visible = usize::from(MAX_VISIBLE_ROWS);
        if row_count <= visible {
            self.scroll_row = 0;
        } else if cursor_row < self.scroll_row {
            self.scroll_row = cursor_row;
        } else if cursor_row >= self.scroll_row + visible {
            self.scroll_row = cursor_row + 1 - visible;
        }
    }
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let text_width = self.text_width(area.width);
        self.last_text_width = text_width;

        let rows = layout_rows(&self.buffer, text_width);
        let (cursor_row, cursor_col) = locate(&self.buffer, &rows, self.cursor);
        self.follow_cursor(cursor_row, rows.len());

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1));
        if !self.buffer.is_empty() {
            block = block.title_bottom(
                Line::from(format!("{}/{}", self.char_count(), MAX_MESSAGE_CHARS))
                    .right_aligned(),
            );
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text_area = Rect {
            width: text_width.min(inner.width),
            ..inner
        };
        let body = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(Style::default().add_modifier(Modifier::DIM))
        } else {
            let lines: Vec<Line> = rows
                .iter()
                .skip(self.scroll_row)
                .take(usize::from(MAX_VISIBLE_ROWS))
                .map(|row| Line::from(self.buffer[row.start..row.end].to_string()))
                .collect();
            Paragraph::new(lines)
        };
        frame.render_widget(body, text_area);

        let button = self.send_button();
        let button_width = button.width().min(inner.width);
        self.send_area = Rect {
            x: inner.right().saturating_sub(button_width),
            y: inner.bottom().saturating_sub(1),
            width: button_width,
            height: inner.height.min(1),
        };
        frame.render_widget(button, self.send_area);

        if self.focused && inner.height > 0 {
            let visible_row = cursor_row.saturating_sub(self.scroll_row) as u16;
            frame.set_cursor_position((
                text_area.x + cursor_col.min(text_area.width),
                text_area.y + visible_row.min(inner.height - 1),
            ));
        }
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => self.insert(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(text) => self.insert(text),
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(ComposerEvent::Changed)
            }
            TuiEvent::Delete => {
                if self.cursor >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                Some(ComposerEvent::Changed)
            }
            TuiEvent::CursorLeft => self.move_to(prev_char_boundary(&self.buffer, self.cursor)),
            TuiEvent::CursorRight => self.move_to(next_char_boundary(&self.buffer, self.cursor)),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                self.move_to(line_start)
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                self.move_to(line_end)
            }
            TuiEvent::CursorUp => self.move_vertically(false),
            TuiEvent::CursorDown => self.move_vertically(true),
            TuiEvent::Submit => self.submit(),
            TuiEvent::MouseClick(column, row) if self.hits_send_button(*column, *row) => {
                self.submit()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> Composer {
        let mut composer = Composer::new();
        for c in text.chars() {
            composer.handle_event(&TuiEvent::InputChar(c));
        }
        composer
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

    #[test]
    fn typing_and_backspace_edit_at_cursor() {
        let mut composer = typed("ac");
        composer.handle_event(&TuiEvent::CursorLeft);
        composer.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(composer.text(), "abc");
        composer.handle_event(&TuiEvent::Backspace);
        assert_eq!(composer.text(), "ac");
        composer.handle_event(&TuiEvent::Delete);
        assert_eq!(composer.text(), "a");
    }

    #[test]
    fn submit_takes_buffer() {
        let mut composer = typed("hello");
        assert_eq!(
            composer.handle_event(&TuiEvent::Submit),
            Some(ComposerEvent::Submit("hello".into()))
        );
        assert!(composer.text().is_empty());
        assert!(!composer.can_send());
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut composer = typed("  \n ");
        assert_eq!(composer.handle_event(&TuiEvent::Submit), None);
        assert_eq!(composer.text(), "  \n ");
    }

    #[test]
    fn input_stops_at_limit() {
        let mut composer = Composer::new();
        composer.handle_event(&TuiEvent::Paste("x".repeat(MAX_MESSAGE_CHARS - 2)));
        composer.handle_event(&TuiEvent::Paste("abcdef".into()));
        assert_eq!(composer.char_count(), MAX_MESSAGE_CHARS);
        assert!(composer.text().ends_with("ab"));
        assert_eq!(composer.handle_event(&TuiEvent::InputChar('z')), None);
    }

    #[test]
    fn home_end_follow_logical_lines() {
        let mut composer = typed("one\ntwo");
        composer.handle_event(&TuiEvent::CursorHome);
        composer.handle_event(&TuiEvent::InputChar('>'));
        assert_eq!(composer.text(), "one\n>two");
        composer.handle_event(&TuiEvent::CursorUp);
        composer.handle_event(&TuiEvent::CursorEnd);
        composer.handle_event(&TuiEvent::InputChar('!'));
        assert_eq!(composer.text(), "one!\n>two");
    }

    #[test]
    fn height_grows_then_caps() {
        let composer = Composer::new();
        assert_eq!(composer.calculate_height(40), 3);
        let tall = typed("a\nb\nc\nd\ne\nf\ng");
        assert_eq!(tall.calculate_height(40), MAX_VISIBLE_ROWS + VERTICAL_OVERHEAD);
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let mut terminal = Terminal::new(TestBackend::new(50, 3)).unwrap();
        let mut composer = Composer::new();
        terminal.draw(|f| composer.render(f, f.area())).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains(PLACEHOLDER));
        assert!(text.contains(SEND_LABEL));
    }

    #[test]
    fn click_on_send_submits() {
        let mut terminal = Terminal::new(TestBackend::new(50, 3)).unwrap();
        let mut composer = typed("hi");
        terminal.draw(|f| composer.render(f, f.area())).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("2/2000"));

        let Rect { x, y, .. } = composer.send_area;
        assert_eq!(
            composer.handle_event(&TuiEvent::MouseClick(x, y)),
            Some(ComposerEvent::Submit("hi".into()))
        );
        assert_eq!(composer.handle_event(&TuiEvent::MouseClick(0, 0)), None);
    }
}
