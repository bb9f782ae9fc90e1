//! # Actions
//!
//! Everything that can happen in Parley becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ResponseReceived { .. }`.
//!
//! `update()` applies an action to the state and returns an [`Effect`]
//! describing any I/O the caller has to start. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  State' + Effect
//! ```

use std::path::PathBuf;

use log::{debug, info, warn};

use crate::backend::AssistantReply;
use crate::core::conversation::ConversationSummary;
use crate::core::message::{Attachment, MessageId};
use crate::core::state::App;

#[derive(Debug)]
pub enum Action {
    /// User sent the composer contents.
    Submit(String),
    /// Backend answered the request behind `placeholder`.
    ResponseReceived {
        placeholder: MessageId,
        reply: AssistantReply,
    },
    /// Backend call behind `placeholder` failed.
    ResponseFailed {
        placeholder: MessageId,
        error: String,
    },
    /// User picked a conversation in the sidebar.
    SelectConversation(ConversationSummary),
    /// User asked to save the attachment on a message.
    DownloadAttachment(MessageId),
    /// A download task finished.
    DownloadFinished(Result<PathBuf, String>),
    Quit,
}

/// Side effects the event loop performs after `update()`.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    /// Call the backend with `text`; report back against `placeholder`.
    SpawnRequest { placeholder: MessageId, text: String },
    /// Save an attachment to the download directory.
    SpawnDownload(Attachment),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            if text.trim().is_empty() {
                debug!("Ignoring empty submit");
                return Effect::None;
            }
            app.thread.push_user(text.clone());
            let placeholder = app.thread.push_placeholder();
            info!(
                "Submitted message ({} bytes), placeholder {:?}",
                text.len(),
                placeholder
            );
            Effect::SpawnRequest { placeholder, text }
        }
        Action::ResponseReceived { placeholder, reply } => {
            app.thread.resolve(placeholder, reply);
            Effect::None
        }
        Action::ResponseFailed { placeholder, error } => {
            warn!("Backend request for {:?} failed: {}", placeholder, error);
            app.thread.fail(placeholder);
            Effect::None
        }
        Action::SelectConversation(conversation) => {
            info!(
                "Selected conversation {:?} ({})",
                conversation.id, conversation.name
            );
            app.selected = Some(conversation);
            Effect::None
        }
        Action::DownloadAttachment(id) => {
            match app.thread.get(id).and_then(|m| m.attachment.clone()) {
                Some(attachment) => {
                    app.status_message = format!("Downloading {}...", attachment.name);
                    Effect::SpawnDownload(attachment)
                }
                None => {
                    debug!("Message {:?} has no attachment", id);
                    Effect::None
                }
            }
        }
        Action::DownloadFinished(result) => {
            app.status_message = match result {
                Ok(path) => format!("Saved {}", path.display()),
                Err(e) => format!("Download failed: {e}"),
            };
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}
