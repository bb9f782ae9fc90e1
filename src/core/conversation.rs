//! # Conversations
//!
//! Read-only conversation summaries shown in the sidebar, plus the pure
//! helpers the sidebar needs: search filtering, relative timestamps, and
//! avatar initials.

use chrono::{DateTime, Duration, Local};

/// Number of distinct avatar colours the sidebar cycles through.
pub const AVATAR_PALETTE_SIZE: usize = 8;
/// Unread counts above this are shown as `99+`.
const MAX_UNREAD_SHOWN: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub name: String,
    pub last_message: Option<String>,
    pub timestamp: DateTime<Local>,
    pub unread_count: u32,
    pub online: bool,
}

impl ConversationSummary {
    /// Case-insensitive substring match against name and preview.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .last_message
                .as_deref()
                .is_some_and(|preview| preview.to_lowercase().contains(&needle))
    }

    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }

    /// Text for the unread badge, or `None` when there is nothing unread.
    pub fn unread_label(&self) -> Option<String> {
        match self.unread_count {
            0 => None,
            n if n > MAX_UNREAD_SHOWN => Some(format!("{MAX_UNREAD_SHOWN}+")),
            n => Some(n.to_string()),
        }
    }

    pub fn preview(&self) -> &str {
        self.last_message.as_deref().unwrap_or("No messages yet")
    }
}

/// Conversations matching `query`, in their original order.
pub fn filter_conversations<'a>(
    conversations: &'a [ConversationSummary],
    query: &str,
) -> Vec<&'a ConversationSummary> {
    conversations.iter().filter(|c| c.matches(query)).collect()
}

/// Formats `timestamp` relative to `now`:
/// same day → `3:07 PM`, one day → `Yesterday`, under a week → `Tue`,
/// otherwise `Sep 27`. Days are whole 24h periods; future times count as today.
pub fn format_relative_time(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let days = (now - timestamp).num_days().max(0);
    match days {
        0 => timestamp.format("%-I:%M %p").to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => timestamp.format("%a").to_string(),
        _ => timestamp.format("%b %-d").to_string(),
    }
}

/// First letter of each whitespace-separated word, uppercased, at most two.
pub fn initials_of(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// Stable palette slot for a name's avatar.
pub fn avatar_slot(name: &str) -> usize {
    name.chars().count() % AVATAR_PALETTE_SIZE
}

/// Demo conversations used when no real ones are supplied.
pub fn sample_conversations(now: DateTime<Local>) -> Vec<ConversationSummary> {
    let entry = |id, name: &str, preview: &str, ago: Duration, unread, online| {
        ConversationSummary {
            id: ConversationId(id),
            name: name.to_string(),
            last_message: Some(preview.to_string()),
            timestamp: now - ago,
            unread_count: unread,
            online,
        }
    };
    vec![
        entry(
            1,
            "Sarah Wilson",
            "Hey! Are we still on for dinner tonight?",
            Duration::minutes(5),
            2,
            true,
        ),
        entry(
            2,
            "Mom",
            "Don't forget to call grandma on her birthday!",
            Duration::hours(1),
            0,
            false,
        ),
        entry(
            3,
            "Work Team",
            "Meeting moved to 3 PM tomorrow",
            Duration::hours(2),
            1,
            true,
        ),
        entry(
            4,
            "John Smith",
            "Thanks for the help with the project!",
            Duration::days(1),
            0,
            false,
        ),
    ]
}
