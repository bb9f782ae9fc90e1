use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use reqwest::Url;
use tokio::io::AsyncWriteExt;

use crate::backend::{AiRequest, AiResponse, AssistantReply, BackendError};
use crate::core::message::Attachment;

/// File name used when an attachment's name has no usable final component.
const FALLBACK_FILE_NAME: &str = "download";

#[async_trait]
pub trait ResponseBackend: Send + Sync {
    /// Returns the name of the backend (for logs).
    fn name(&self) -> &str;

    /// Sends one user message and waits for the assistant reply.
    async fn request_response(&self, message: &str) -> Result<AssistantReply, BackendError>;

    /// Saves `attachment` into `dest_dir`, returning the written path.
    async fn download(
        &self,
        attachment: &Attachment,
        dest_dir: &Path,
    ) -> Result<PathBuf, BackendError>;
}

/// Backend reached over a single JSON `POST`.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    pub fn new(endpoint: &str) -> Result<Self, BackendError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| BackendError::Config(format!("invalid endpoint {endpoint:?}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl ResponseBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn request_response(&self, message: &str) -> Result<AssistantReply, BackendError> {
        let call_time = Local::now();
        debug!("POST {} ({} bytes)", self.endpoint, message.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&AiRequest { message })
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let payload = AiResponse::parse(&body)?;
        debug!("Backend payload: {:?}", payload);

        let mut reply = payload.into_reply(call_time);
        if let Some(attachment) = reply.attachment.as_mut() {
            attachment.url = resolve_file_url(&self.endpoint, &attachment.url);
        }
        Ok(reply)
    }

    async fn download(
        &self,
        attachment: &Attachment,
        dest_dir: &Path,
    ) -> Result<PathBuf, BackendError> {
        let url = resolve_file_url(&self.endpoint, &attachment.url);
        info!("Downloading {} from {}", attachment.name, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: format!("GET {url}"),
            });
        }

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(BackendError::Io)?;
        let path = dest_dir.join(safe_file_name(&attachment.name));
        let written = save_stream(Box::pin(response.bytes_stream()), &path).await?;

        info!("Saved {} bytes to {}", written, path.display());
        Ok(path)
    }
}

/// Write `chunks` to `path`. Data goes to a `.part` sibling that is renamed
/// into place only once the stream ends cleanly; on failure it is removed and
/// any existing file at `path` is left untouched.
async fn save_stream<S, B, E>(mut chunks: S, path: &Path) -> Result<usize, BackendError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let part = part_path(path);
    match write_chunks(&mut chunks, &part).await {
        Ok(written) => {
            tokio::fs::rename(&part, path)
                .await
                .map_err(BackendError::Io)?;
            Ok(written)
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&part).await {
                warn!("Could not remove partial download {}: {}", part.display(), rm);
            }
            Err(e)
        }
    }
}

async fn write_chunks<S, B, E>(chunks: &mut S, part: &Path) -> Result<usize, BackendError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: fmt::Display,
{
    let mut file = tokio::fs::File::create(part)
        .await
        .map_err(BackendError::Io)?;
    let mut written = 0usize;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| BackendError::Network(e.to_string()))?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await.map_err(BackendError::Io)?;
        written += bytes.len();
    }
    file.flush().await.map_err(BackendError::Io)?;
    Ok(written)
}

/// `notes.pdf` → `notes.pdf.part`
fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Absolute URLs pass through; relative ones resolve against the endpoint.
pub fn resolve_file_url(endpoint: &Url, raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => url.to_string(),
        Err(_) => endpoint
            .join(raw)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

/// Keep only the final path component so a download cannot escape its directory.
pub fn safe_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if last.is_empty() || last == "." || last == ".." {
        FALLBACK_FILE_NAME.to_string()
    } else {
        last.to_string()
    }
}
