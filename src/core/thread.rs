//! # Message Thread
//!
//! Append-only log of messages plus the placeholder protocol:
//!
//! ```text
//! idle ──submit──▶ pending (placeholder) ──reply──▶ resolved
//!                                        └──error──▶ failed
//! ```
//!
//! Each placeholder gets its own [`MessageId`], so several requests may be
//! in flight at once and each resolves only its own slot.

use chrono::Local;
use log::{debug, warn};

use crate::backend::AssistantReply;
use crate::core::message::{BACKEND_ERROR_TEXT, Message, MessageId, Origin, ReplyKind};

#[derive(Debug, Clone, Default)]
pub struct Thread {
    messages: Vec<Message>,
    next_id: u64,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a thread that opens with an assistant greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        let mut thread = Self::new();
        if !greeting.trim().is_empty() {
            thread.push(greeting.to_string(), Origin::Assistant, false);
        }
        thread
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Number of placeholders still waiting on the backend.
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }

    pub fn push_user(&mut self, text: String) -> MessageId {
        self.push(text, Origin::User, false)
    }

    /// Appends an empty pending assistant message.
    pub fn push_placeholder(&mut self) -> MessageId {
        self.push(String::new(), Origin::Assistant, true)
    }

    /// Replaces placeholder `id` with the backend's reply.
    ///
    /// Returns false if `id` is unknown or already resolved.
    pub fn resolve(&mut self, id: MessageId, reply: AssistantReply) -> bool {
        let Some(msg) = self.pending_mut(id) else {
            warn!("Reply for unknown or settled placeholder {:?}", id);
            return false;
        };
        msg.content = reply.content;
        msg.timestamp = reply.timestamp;
        msg.attachment = reply.attachment;
        msg.kind = reply.kind;
        msg.pending = false;
        debug!("Resolved placeholder {:?}", id);
        true
    }

    /// Marks placeholder `id` as failed. Its content becomes
    /// [`BACKEND_ERROR_TEXT`]; the timestamp stays at submit time.
    pub fn fail(&mut self, id: MessageId) -> bool {
        let Some(msg) = self.pending_mut(id) else {
            warn!("Failure for unknown or settled placeholder {:?}", id);
            return false;
        };
        msg.content = BACKEND_ERROR_TEXT.to_string();
        msg.kind = ReplyKind::default();
        msg.pending = false;
        true
    }

    fn pending_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id && m.pending)
    }

    fn push(&mut self, content: String, origin: Origin, pending: bool) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.messages.push(Message {
            id,
            content,
            origin,
            timestamp: Local::now(),
            pending,
            attachment: None,
            kind: ReplyKind::default(),
        });
        id
    }
}
