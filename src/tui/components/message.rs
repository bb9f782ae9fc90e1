use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::core::message::{
    BACKEND_ERROR_TEXT, Body, Message, NO_CONTENT_TEXT, QuotedContent,
};
use crate::tui::component::Component;
use crate::tui::components::badge::{Badge, BadgeVariant};
use crate::tui::components::button::{Button, ButtonSize, ButtonVariant};

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Bar drawn in front of every line of a quoted block.
const QUOTE_BAR: &str = "▌ ";
/// Columns taken by [`QUOTE_BAR`].
const QUOTE_INDENT: u16 = 2;
/// Drawn between consecutive quoted blocks.
const QUOTE_CONNECTOR: &str = "•";

const ACCENT: Color = Color::Blue;

/// A stateless component that renders one chat message as a bordered bubble.
///
/// Created fresh each frame by `MessageList`. Height prediction and
/// rendering share [`body_lines`], so the scroll layout always matches what
/// gets drawn.
///
/// Body presentation depends on the message state:
/// - pending placeholder: animated typing dots
/// - quoted reply: each segment behind a bar, joined by a connector
/// - otherwise: a plain paragraph
///
/// Attachments add a row with the file name, a type badge and a
/// `Download` button.
#[derive(Clone, Copy)]
pub struct MessageBubble<'a> {
    pub message: &'a Message,
    /// Whether this message is selected in message-selection mode
    pub is_selected: bool,
    /// Animation frame for the typing indicator
    pub typing_frame: usize,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message, is_selected: bool, typing_frame: usize) -> Self {
        Self {
            message,
            is_selected,
            typing_frame,
        }
    }

    /// Rows needed to draw `message` at `width`, borders included.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for borders + padding; still occupy a row
            return 1;
        }
        let lines = body_lines(message, content_width, 0, false);
        // Scroll canvases are u16-sized; longer replies clip at the bottom
        u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }
}

fn wrap(text: &str, width: u16) -> Vec<String> {
    let options = textwrap::Options::new(width.max(1) as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

fn typing_dots(frame: usize) -> Line<'static> {
    let active = frame % 3;
    let spans: Vec<Span<'static>> = (0..3)
        .flat_map(|i| {
            let style = if i == active {
                Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled("●", style), Span::raw(" ")]
        })
        .collect();
    Line::from(spans)
}

fn quoted_lines(segments: &[&str], width: u16) -> Vec<Line<'static>> {
    let bar = Style::default().fg(ACCENT);
    let inner = width.saturating_sub(QUOTE_INDENT);
    let mut lines = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            lines.push(Line::styled(QUOTE_CONNECTOR, bar).centered());
        }
        for text in wrap(segment, inner) {
            lines.push(Line::from(vec![Span::styled(QUOTE_BAR, bar), Span::raw(text)]));
        }
    }
    lines
}

fn plain_lines(text: &str, width: u16) -> Vec<Line<'static>> {
    wrap(text, width).into_iter().map(Line::from).collect()
}

fn attachment_line(message: &Message, is_selected: bool) -> Option<Line<'static>> {
    let attachment = message.attachment.as_ref()?;
    let mut spans = vec![
        Span::styled("▤ ", Style::default().fg(Color::Gray)),
        Span::styled(
            attachment.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    if let Some(file_type) = attachment.file_type.as_deref() {
        spans.push(Badge::new(file_type).variant(BadgeVariant::Outline).span());
        spans.push(Span::raw(" "));
    }
    let variant = if is_selected {
        ButtonVariant::Default
    } else {
        ButtonVariant::Outline
    };
    let button = Button::new("Download").variant(variant).size(ButtonSize::Sm);
    spans.push(Span::styled(button.text(), button.style()));
    Some(Line::from(spans))
}

/// The pre-wrapped content lines of a bubble at the given inner width.
pub fn body_lines(
    message: &Message,
    width: u16,
    typing_frame: usize,
    is_selected: bool,
) -> Vec<Line<'static>> {
    let mut lines = match message.body() {
        Body::Typing => vec![typing_dots(typing_frame)],
        Body::Plain(text) => plain_lines(text, width),
        Body::Quoted(QuotedContent::Empty) => vec![Line::styled(
            NO_CONTENT_TEXT,
            Style::default().add_modifier(Modifier::ITALIC),
        )],
        Body::Quoted(QuotedContent::Paragraph(text)) => plain_lines(text, width),
        Body::Quoted(QuotedContent::Quotes(segments)) => quoted_lines(&segments, width),
    };
    if let Some(row) = attachment_line(message, is_selected) {
        lines.push(row);
    }
    lines
}

fn base_style(message: &Message) -> Style {
    if message.is_user() {
        Style::default().fg(Color::Cyan)
    } else if message.content == BACKEND_ERROR_TEXT {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

impl Widget for MessageBubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = base_style(self.message);
        let border_style = if self.is_selected {
            Style::default().fg(Color::Yellow)
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let (title, time) = if self.message.is_user() {
            (
                Line::from("You").right_aligned(),
                Line::from(self.message.time_label()).right_aligned(),
            )
        } else {
            (Line::from("AI"), Line::from(self.message.time_label()))
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title)
            .title_bottom(time)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let lines = body_lines(
            self.message,
            inner_area.width,
            self.typing_frame,
            self.is_selected,
        );
        Paragraph::new(lines).style(style).render(inner_area, buf);
    }
}

impl Component for MessageBubble<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{Attachment, MessageId, Origin, ReplyKind};
    use chrono::Local;

    fn make_message(content: &str, kind: ReplyKind) -> Message {
        Message {
            id: MessageId(1),
            content: content.to_string(),
            origin: Origin::Assistant,
            timestamp: Local::now(),
            pending: false,
            attachment: None,
            kind,
        }
    }

    fn quoted() -> ReplyKind {
        ReplyKind {
            is_message: true,
            is_summarize: false,
        }
    }

    fn render_text(message: &Message, width: u16) -> String {
        let height = MessageBubble::calculate_height(message, width);
        let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
        MessageBubble::new(message, false, 0).render(buf.area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn single_line_height_includes_borders() {
        let msg = make_message("Hello", ReplyKind::default());
        assert_eq!(MessageBubble::calculate_height(&msg, 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn zero_width_returns_minimum() {
        let msg = make_message("Hello", ReplyKind::default());
        assert_eq!(MessageBubble::calculate_height(&msg, 0), 1);
        assert_eq!(
            MessageBubble::calculate_height(&msg, HORIZONTAL_OVERHEAD),
            1
        );
    }

    #[test]
    fn wraps_at_width_boundary() {
        let msg = make_message("Hello world", ReplyKind::default());
        // content width 5 → "Hello" | "world"
        assert_eq!(
            MessageBubble::calculate_height(&msg, 5 + HORIZONTAL_OVERHEAD),
            2 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn huge_reply_height_saturates() {
        let near_limit = format!("{}a", "a\n".repeat(65533));
        let msg = make_message(&near_limit, ReplyKind::default());
        assert_eq!(MessageBubble::calculate_height(&msg, 40), u16::MAX);

        let msg = make_message(&"a\n".repeat(70_000), ReplyKind::default());
        assert_eq!(MessageBubble::calculate_height(&msg, 40), u16::MAX);
    }

    #[test]
    fn pending_is_one_row_of_dots() {
        let mut msg = make_message("", ReplyKind::default());
        msg.pending = true;
        assert_eq!(MessageBubble::calculate_height(&msg, 40), 1 + VERTICAL_OVERHEAD);
        assert!(render_text(&msg, 40).contains('●'));
    }

    #[test]
    fn quoted_segments_get_connectors() {
        let msg = make_message("A\n\n\nB\n\n\nC", quoted());
        // 3 segment lines + 2 connectors
        assert_eq!(MessageBubble::calculate_height(&msg, 40), 5 + VERTICAL_OVERHEAD);
        let text = render_text(&msg, 40);
        assert_eq!(text.matches(QUOTE_CONNECTOR).count(), 2);
        assert_eq!(text.matches('▌').count(), 3);
    }

    #[test]
    fn quoted_without_delimiter_is_plain() {
        let msg = make_message("Hello", quoted());
        let text = render_text(&msg, 40);
        assert!(text.contains("Hello"));
        assert!(!text.contains('▌'));
    }

    #[test]
    fn empty_quoted_shows_placeholder() {
        let msg = make_message("", quoted());
        assert!(render_text(&msg, 40).contains(NO_CONTENT_TEXT));
    }

    #[test]
    fn attachment_row_adds_download_button() {
        let mut msg = make_message("I found a file: notes.pdf", ReplyKind::default());
        let without = MessageBubble::calculate_height(&msg, 60);
        msg.attachment = Some(Attachment {
            url: "http://h/notes.pdf".into(),
            name: "notes.pdf".into(),
            file_type: Some("pdf".into()),
        });
        assert_eq!(MessageBubble::calculate_height(&msg, 60), without + 1);

        let text = render_text(&msg, 60);
        assert!(text.contains("Download"));
        assert!(text.contains("(pdf)"));
    }

    #[test]
    fn user_and_assistant_styles_differ() {
        let mut msg = make_message("x", ReplyKind::default());
        assert_eq!(base_style(&msg).fg, Some(Color::Green));
        msg.origin = Origin::User;
        assert_eq!(base_style(&msg).fg, Some(Color::Cyan));
        msg.origin = Origin::Assistant;
        msg.content = BACKEND_ERROR_TEXT.into();
        assert_eq!(base_style(&msg).fg, Some(Color::Red));
    }

    #[test]
    fn titles_name_the_author() {
        let msg = make_message("hi", ReplyKind::default());
        assert!(render_text(&msg, 30).contains("AI"));
        let mut user = msg.clone();
        user.origin = Origin::User;
        assert!(render_text(&user, 30).contains("You"));
    }
}
