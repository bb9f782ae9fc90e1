//! # ChatHeader Component
//!
//! Top bar of the chat column: assistant identity, the conversation the
//! sidebar has selected, and transient status.
//!
//! Stateless. Every field is a prop copied out of `App` for the frame:
//!
//! ```rust,ignore
//! ChatHeader {
//!     selected: app.selected.as_ref().map(|c| c.name.as_str()),
//!     in_flight: app.in_flight(),
//!     status_message: &app.status_message,
//! }
//! .render(frame, header_area);
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::component::Component;

pub const ASSISTANT_AVATAR: &str = "AI";
pub const ASSISTANT_NAME: &str = "AI Assistant";
pub const ASSISTANT_STATUS: &str = "Online • Always here to help";

/// Two text rows plus the bottom rule.
pub const HEADER_HEIGHT: u16 = 3;

pub struct ChatHeader<'a> {
    /// Display name of the selected conversation
    pub selected: Option<&'a str>,
    /// Requests still awaiting a reply
    pub in_flight: usize,
    pub status_message: &'a str,
}

impl ChatHeader<'_> {
    fn identity_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(
                format!(" {ASSISTANT_AVATAR} "),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(ASSISTANT_NAME, Style::default().add_modifier(Modifier::BOLD)),
        ];
        if let Some(name) = self.selected {
            spans.push(Span::styled(
                format!("  · {name}"),
                Style::default().fg(Color::Gray),
            ));
        }
        Line::from(spans)
    }

    fn status_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::styled(ASSISTANT_STATUS, Style::default().fg(Color::Gray)),
        ];
        if self.in_flight > 0 {
            spans.push(Span::styled(
                format!(" | {} awaiting reply", self.in_flight),
                Style::default().fg(Color::Yellow),
            ));
        }
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }
        Line::from(spans)
    }
}

impl Component for ChatHeader<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().add_modifier(Modifier::DIM));
        let header = Paragraph::new(vec![self.identity_line(), self.status_line()]).block(block);
        frame.render_widget(header, area);
    }
}
