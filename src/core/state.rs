//! # Application State
//!
//! Core business state for Parley. Presentation state (scroll offsets, the
//! composer buffer, the sidebar search query) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ResponseBackend>          // AI backend client
//! ├── thread: Thread                             // the message log
//! ├── conversations: Vec<ConversationSummary>    // sidebar data (read-only)
//! ├── selected: Option<ConversationSummary>      // dashboard selection
//! ├── status_message: String                     // header status text
//! └── download_dir: PathBuf                      // where attachments go
//! ```
//!
//! The thread and the selection are independent: choosing a conversation
//! does not scope or reset the log.

use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::ResponseBackend;
use crate::core::config::{DEFAULT_GREETING, ResolvedConfig};
use crate::core::conversation::{ConversationId, ConversationSummary};
use crate::core::thread::Thread;

pub struct App {
    pub backend: Arc<dyn ResponseBackend>,
    pub thread: Thread,
    pub conversations: Vec<ConversationSummary>,
    pub selected: Option<ConversationSummary>,
    pub status_message: String,
    pub download_dir: PathBuf,
}

impl App {
    /// New app with the default greeting. The first conversation, if any,
    /// starts selected.
    pub fn new(backend: Arc<dyn ResponseBackend>, conversations: Vec<ConversationSummary>) -> Self {
        let selected = conversations.first().cloned();
        Self {
            backend,
            thread: Thread::with_greeting(DEFAULT_GREETING),
            conversations,
            selected,
            status_message: String::new(),
            download_dir: PathBuf::from("."),
        }
    }

    pub fn from_config(backend: Arc<dyn ResponseBackend>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(backend, config.conversations.clone());
        app.thread = Thread::with_greeting(&config.greeting);
        app.download_dir = config.download_dir.clone();
        app
    }

    /// Requests still waiting on the backend.
    pub fn in_flight(&self) -> usize {
        self.thread.pending_count()
    }

    pub fn is_selected(&self, id: ConversationId) -> bool {
        self.selected.as_ref().is_some_and(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::sample_conversations;
    use crate::core::message::Origin;
    use crate::test_support::{NoopBackend, test_app};
    use chrono::Local;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.thread.len(), 1);
        assert_eq!(app.thread.messages()[0].origin, Origin::Assistant);
        assert_eq!(app.thread.messages()[0].content, DEFAULT_GREETING);
        assert_eq!(app.in_flight(), 0);
        assert!(app.selected.is_none());
    }

    #[test]
    fn test_first_conversation_starts_selected() {
        let convs = sample_conversations(Local::now());
        let first = convs[0].id;
        let app = App::new(Arc::new(NoopBackend), convs);
        assert!(app.is_selected(first));
        assert!(!app.is_selected(ConversationId(99)));
    }

    #[test]
    fn test_from_config_uses_greeting_and_download_dir() {
        let config = ResolvedConfig {
            endpoint: "http://localhost/api".into(),
            greeting: "Yo.".into(),
            log_file: PathBuf::from("x.log"),
            download_dir: PathBuf::from("/tmp/dl"),
            conversations: Vec::new(),
        };
        let app = App::from_config(Arc::new(NoopBackend), &config);
        assert_eq!(app.thread.messages()[0].content, "Yo.");
        assert_eq!(app.download_dir, PathBuf::from("/tmp/dl"));
    }
}
