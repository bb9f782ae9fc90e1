//! # Badge
//!
//! Small static label: unread counts, file-type tags.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadgeVariant {
    #[default]
    Default,
    Outline,
}

#[derive(Debug, Clone, Copy)]
pub struct Badge<'a> {
    pub label: &'a str,
    pub variant: BadgeVariant,
}

impl<'a> Badge<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            variant: BadgeVariant::Default,
        }
    }

    pub fn variant(mut self, variant: BadgeVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn text(&self) -> String {
        match self.variant {
            BadgeVariant::Default => format!(" {} ", self.label),
            BadgeVariant::Outline => format!("({})", self.label),
        }
    }

    pub fn width(&self) -> u16 {
        self.text().width() as u16
    }

    pub fn style(&self) -> Style {
        match self.variant {
            BadgeVariant::Default => Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            BadgeVariant::Outline => Style::default().fg(Color::Gray),
        }
    }

    /// As a span, for embedding in a `Line`.
    pub fn span(&self) -> Span<'static> {
        Span::styled(self.text(), self.style())
    }
}

impl Widget for Badge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        buf.set_span(area.x, area.y, &self.span(), area.width);
    }
}
