//! # Button
//!
//! Stateless, style-parameterized label. The caller decides what activation
//! means (keyboard shortcut, click hit-test); `Button` only renders and
//! reports whether it is currently interactive.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

/// Glyph shown in front of the label while `loading` is set.
const LOADING_GLYPH: &str = "⠋";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Default,
    Destructive,
    Outline,
    Secondary,
    Ghost,
    Link,
    Success,
    Warning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    Sm,
    #[default]
    Default,
    Lg,
    Xl,
    /// Label only, no padding.
    Icon,
}

impl ButtonSize {
    fn padding(self) -> usize {
        match self {
            ButtonSize::Icon => 0,
            ButtonSize::Sm => 1,
            ButtonSize::Default => 2,
            ButtonSize::Lg => 3,
            ButtonSize::Xl => 4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Button<'a> {
    pub label: &'a str,
    pub variant: ButtonVariant,
    pub size: ButtonSize,
    pub loading: bool,
    pub disabled: bool,
}

impl<'a> Button<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            variant: ButtonVariant::default(),
            size: ButtonSize::default(),
            loading: false,
            disabled: false,
        }
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Loading implies disabled.
    pub fn is_interactive(&self) -> bool {
        !self.disabled && !self.loading
    }

    /// The exact text drawn, padding and decorations included.
    pub fn text(&self) -> String {
        let label = if self.loading {
            format!("{LOADING_GLYPH} {}", self.label)
        } else {
            self.label.to_string()
        };
        let pad = " ".repeat(self.size.padding());
        match self.variant {
            ButtonVariant::Outline => format!("[{pad}{label}{pad}]"),
            _ => format!("{pad}{label}{pad}"),
        }
    }

    /// Columns needed to draw the button.
    pub fn width(&self) -> u16 {
        self.text().width() as u16
    }

    pub fn style(&self) -> Style {
        let base = match self.variant {
            ButtonVariant::Default => Style::default().fg(Color::White).bg(Color::Blue),
            ButtonVariant::Destructive => Style::default().fg(Color::White).bg(Color::Red),
            ButtonVariant::Outline => Style::default().fg(Color::White),
            ButtonVariant::Secondary => Style::default().fg(Color::Black).bg(Color::Gray),
            ButtonVariant::Ghost => Style::default().fg(Color::Gray),
            ButtonVariant::Link => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            ButtonVariant::Success => Style::default().fg(Color::White).bg(Color::Green),
            ButtonVariant::Warning => Style::default().fg(Color::Black).bg(Color::Yellow),
        };
        let sized = match self.size {
            ButtonSize::Lg | ButtonSize::Xl => base.add_modifier(Modifier::BOLD),
            _ => base,
        };
        if self.is_interactive() {
            sized
        } else {
            sized.add_modifier(Modifier::DIM)
        }
    }
}

impl Widget for Button<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let span = Span::styled(self.text(), self.style());
        buf.set_span(area.x, area.y, &span, area.width);
    }
}
