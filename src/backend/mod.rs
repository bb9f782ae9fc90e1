pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpBackend, ResponseBackend};
pub use error::BackendError;
pub use types::{AiRequest, AiResponse, AssistantReply, WireTimestamp};
