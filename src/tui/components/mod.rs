//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as struct fields:
//! - `ChatHeader`: assistant identity, selection, in-flight count, status
//! - `MessageBubble`: one message of the thread
//! - `Button`, `Badge`: shared controls, rendered as plain widgets
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state and emit events:
//! - `Composer`: message input with send button
//! - `MessageList`: scrollable thread with message selection
//! - `ConversationList`: sidebar with search
//!
//! Stateful components split into a persistent `*State` (kept in `TuiState`)
//! and a transient wrapper built each frame with borrowed state and props.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── badge.rs
//! ├── button.rs
//! ├── chat_header.rs
//! ├── composer/
//! ├── conversation_list.rs
//! ├── message.rs
//! └── message_list.rs
//! ```

pub mod badge;
pub mod button;
pub mod chat_header;
pub mod composer;
pub mod conversation_list;
pub mod message;
pub mod message_list;

pub use chat_header::ChatHeader;
pub use composer::{Composer, ComposerEvent};
pub use conversation_list::{ConversationEvent, ConversationList, ConversationListState};
pub use message_list::{MessageList, MessageListState};
