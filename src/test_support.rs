//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;

use crate::backend::client::safe_file_name;
use crate::backend::{AssistantReply, BackendError, ResponseBackend};
use crate::core::message::{Attachment, ReplyKind};
use crate::core::state::App;

/// A backend that never answers anything useful. For tests that only
/// exercise state transitions.
pub struct NoopBackend;

#[async_trait]
impl ResponseBackend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    async fn request_response(&self, _message: &str) -> Result<AssistantReply, BackendError> {
        Err(BackendError::Config("noop backend".to_string()))
    }

    async fn download(
        &self,
        _attachment: &Attachment,
        _dest_dir: &Path,
    ) -> Result<PathBuf, BackendError> {
        Err(BackendError::Config("noop backend".to_string()))
    }
}

/// A backend with one canned outcome: `Some(text)` replies with `text`,
/// `None` fails as if the server were unreachable. Downloads report the
/// path they would have written without touching the disk.
pub struct ScriptedBackend {
    pub reply: Option<String>,
}

#[async_trait]
impl ResponseBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn request_response(&self, message: &str) -> Result<AssistantReply, BackendError> {
        match &self.reply {
            Some(text) => Ok(AssistantReply {
                content: text.replace("{message}", message),
                timestamp: Local::now(),
                attachment: None,
                kind: ReplyKind::default(),
            }),
            None => Err(BackendError::Network("connection refused".to_string())),
        }
    }

    async fn download(
        &self,
        attachment: &Attachment,
        dest_dir: &Path,
    ) -> Result<PathBuf, BackendError> {
        Ok(dest_dir.join(safe_file_name(&attachment.name)))
    }
}

/// Creates a test App with a NoopBackend, the default greeting, and no
/// configured conversations.
pub fn test_app() -> App {
    App::new(Arc::new(NoopBackend), Vec::new())
}
