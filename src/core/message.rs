//! # Messages
//!
//! A [`Message`] is one entry in the thread. User messages are final the
//! moment they are created. Assistant messages usually start life as a
//! pending placeholder and get resolved in place once the backend answers.

use chrono::{DateTime, Local};

/// Content shown in place of an assistant reply when the backend call fails.
pub const BACKEND_ERROR_TEXT: &str = "Error: Could not reach AI backend.";
/// Shown by the quoted renderer when there is nothing to render.
pub const NO_CONTENT_TEXT: &str = "No content available";
/// Separator between quoted blocks in a structured reply.
pub const QUOTE_DELIMITER: &str = "\n\n\n";

/// Identifier of a message, unique within one [`Thread`](crate::core::thread::Thread).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
}

/// A file the backend attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub name: String,
    /// MIME-like tag such as `"pdf"`.
    pub file_type: Option<String>,
}

/// Response-kind flags returned by the backend. Either one switches the
/// reply to quoted-segment rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyKind {
    pub is_message: bool,
    pub is_summarize: bool,
}

impl ReplyKind {
    pub fn is_quoted(&self) -> bool {
        self.is_message || self.is_summarize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub origin: Origin,
    pub timestamp: DateTime<Local>,
    /// True while the message is a placeholder for an in-flight request.
    pub pending: bool,
    pub attachment: Option<Attachment>,
    pub kind: ReplyKind,
}

/// How the body of a message should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body<'a> {
    /// Placeholder still waiting for the backend.
    Typing,
    /// Ordinary paragraph.
    Plain(&'a str),
    /// Structured reply split into quoted blocks.
    Quoted(QuotedContent<'a>),
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }

    pub fn body(&self) -> Body<'_> {
        if self.pending {
            Body::Typing
        } else if self.kind.is_quoted() {
            Body::Quoted(quote_segments(&self.content))
        } else {
            Body::Plain(&self.content)
        }
    }

    /// Wall-clock label shown under the bubble, e.g. `3:07 PM`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%-I:%M %p").to_string()
    }
}

/// Result of splitting a reply on [`QUOTE_DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotedContent<'a> {
    /// Input was empty; render [`NO_CONTENT_TEXT`].
    Empty,
    /// Zero or one non-blank segment; render the original text as-is.
    Paragraph(&'a str),
    /// Two or more segments, each trimmed.
    Quotes(Vec<&'a str>),
}

/// Split `text` into quoted segments.
///
/// Blank segments are dropped. When fewer than two remain the whole input is
/// returned untouched as a single paragraph.
pub fn quote_segments(text: &str) -> QuotedContent<'_> {
    if text.is_empty() {
        return QuotedContent::Empty;
    }

    let items: Vec<&str> = text
        .split(QUOTE_DELIMITER)
        .filter(|item| !item.trim().is_empty())
        .map(str::trim)
        .collect();

    if items.len() <= 1 {
        QuotedContent::Paragraph(text)
    } else {
        QuotedContent::Quotes(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str, pending: bool, kind: ReplyKind) -> Message {
        Message {
            id: MessageId(1),
            content: content.to_string(),
            origin: Origin::Assistant,
            timestamp: Local::now(),
            pending,
            attachment: None,
            kind,
        }
    }

    #[test]
    fn splits_on_triple_newline() {
        assert_eq!(
            quote_segments("A\n\n\nB\n\n\nC"),
            QuotedContent::Quotes(vec!["A", "B", "C"])
        );
    }

    #[test]
    fn no_delimiter_is_single_paragraph() {
        let text = "Just one line\n\nwith a double break";
        assert_eq!(quote_segments(text), QuotedContent::Paragraph(text));
    }

    #[test]
    fn blank_segments_are_dropped() {
        // Only one real segment survives, so the raw text is kept
        let text = "\n\n\n  \n\n\nOnly this\n\n\n";
        assert_eq!(quote_segments(text), QuotedContent::Paragraph(text));
    }

    #[test]
    fn segments_are_trimmed() {
        assert_eq!(
            quote_segments("  first \n\n\n\tsecond\n"),
            QuotedContent::Quotes(vec!["first", "second"])
        );
    }

    #[test]
    fn empty_text_has_no_content() {
        assert_eq!(quote_segments(""), QuotedContent::Empty);
    }

    #[test]
    fn pending_message_renders_typing() {
        let msg = message("", true, ReplyKind::default());
        assert_eq!(msg.body(), Body::Typing);
    }

    #[test]
    fn either_flag_selects_quoted_body() {
        let summarize = ReplyKind {
            is_message: false,
            is_summarize: true,
        };
        let msg = message("Hello", false, summarize);
        assert_eq!(
            msg.body(),
            Body::Quoted(QuotedContent::Paragraph("Hello"))
        );

        let plain = message("Hello", false, ReplyKind::default());
        assert_eq!(plain.body(), Body::Plain("Hello"));
    }
}
