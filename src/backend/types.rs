//! Wire types for the AI backend endpoint.
//!
//! The response is read leniently: the body must be JSON, but every field is
//! optional and a field of the wrong type is treated as missing.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::BackendError;
use crate::core::message::{Attachment, ReplyKind};

/// Content used when the backend sends no (or empty) `content`.
pub const NO_CONTENT_RECEIVED: &str = "No content received";

#[derive(Serialize, Debug)]
pub struct AiRequest<'a> {
    pub message: &'a str,
}

/// `timestamp` as sent by the backend: epoch milliseconds or an ISO-8601 string.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(f64),
    Text(String),
}

impl WireTimestamp {
    /// Interpret as local time. Offset-less ISO strings are read as local
    /// time; zero and non-finite millisecond values count as absent.
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            WireTimestamp::Millis(ms) if ms.is_finite() && *ms != 0.0 => {
                Local.timestamp_millis_opt(*ms as i64).single()
            }
            WireTimestamp::Millis(_) => None,
            WireTimestamp::Text(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|ts| ts.with_timezone(&Local))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .and_then(|naive| naive.and_local_timezone(Local).earliest())
                }),
        }
    }
}

/// Explicit record of the optional response fields.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AiResponse {
    pub content: Option<String>,
    pub timestamp: Option<WireTimestamp>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub is_message: Option<bool>,
    pub is_summarize: Option<bool>,
}

impl AiResponse {
    /// Parse a response body. Only non-JSON input is an error.
    pub fn parse(body: &str) -> Result<Self, BackendError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let flag = |key: &str| value.get(key).and_then(Value::as_bool);
        let timestamp = value
            .get("timestamp")
            .and_then(|v| serde_json::from_value::<WireTimestamp>(v.clone()).ok());

        Self {
            content: text("content"),
            timestamp,
            file_url: text("file_url"),
            file_name: text("file_name"),
            file_type: text("file_type"),
            is_message: flag("is_message"),
            is_summarize: flag("is_summarize"),
        }
    }

    /// Fill in defaults and produce the reply the thread stores.
    /// `call_time` stands in for a missing or unreadable timestamp.
    pub fn into_reply(self, call_time: DateTime<Local>) -> AssistantReply {
        let timestamp = self
            .timestamp
            .as_ref()
            .and_then(WireTimestamp::to_local)
            .unwrap_or(call_time);

        let attachment = match (self.file_url, self.file_name) {
            (Some(url), Some(name)) if !url.is_empty() && !name.is_empty() => Some(Attachment {
                url,
                name,
                file_type: self.file_type,
            }),
            _ => None,
        };

        AssistantReply {
            content: self
                .content
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| NO_CONTENT_RECEIVED.to_string()),
            timestamp,
            attachment,
            kind: ReplyKind {
                is_message: self.is_message == Some(true),
                is_summarize: self.is_summarize == Some(true),
            },
        }
    }
}

/// A backend answer with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub timestamp: DateTime<Local>,
    pub attachment: Option<Attachment>,
    pub kind: ReplyKind,
}
