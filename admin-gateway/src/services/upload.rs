//! Admin file uploads with client-side validation and progress reporting.
//!
//! Progress is published on a `watch` channel so any number of observers can
//! follow it, and dropping the [`UploadHandle`] cancels the transfer.

use crate::config::UploadSettings;
use crate::error::GatewayError;
use crate::models::operation::{OperationKind, OperationResult};
use crate::services::operations::AdminOperations;
use crate::services::routes::upload_endpoint;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.sent.min(self.total) * 100) / self.total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.sent >= self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejected {
    #[error("File is empty")]
    Empty,

    #[error("File is too large: {size} bytes (limit {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("File type '{0}' is not allowed")]
    UnsupportedType(String),

    #[error("File name is missing")]
    MissingName,
}

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl From<&UploadSettings> for UploadPolicy {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            max_size_bytes: settings.max_size_bytes,
            allowed_content_types: settings.allowed_content_types.clone(),
        }
    }
}

impl UploadPolicy {
    pub fn validate(&self, file: &FileUpload) -> Result<(), UploadRejected> {
        if file.file_name.trim().is_empty() {
            return Err(UploadRejected::MissingName);
        }
        if file.data.is_empty() {
            return Err(UploadRejected::Empty);
        }
        if file.size() > self.max_size_bytes {
            return Err(UploadRejected::TooLarge {
                size: file.size(),
                max: self.max_size_bytes,
            });
        }

        // Parameters such as `; charset=utf-8` don't affect the check.
        let essence = file
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
        {
            return Err(UploadRejected::UnsupportedType(file.content_type.clone()));
        }

        Ok(())
    }
}

/// An upload in progress. Nothing is sent until [`UploadHandle::finish`] is
/// awaited.
pub struct UploadHandle {
    progress: watch::Receiver<UploadProgress>,
    task: BoxFuture<'static, OperationResult<Value>>,
}

impl UploadHandle {
    pub fn progress(&self) -> watch::Receiver<UploadProgress> {
        self.progress.clone()
    }

    pub async fn finish(self) -> OperationResult<Value> {
        self.task.await
    }
}

impl AdminOperations {
    /// Upload a file to the content store.
    ///
    /// Permission is checked first, then the file is validated against the
    /// configured policy; rejected files never reach the backend.
    pub fn upload_file(&self, file: FileUpload) -> UploadHandle {
        let (tx, rx) = watch::channel(UploadProgress {
            sent: 0,
            total: file.size(),
        });
        let ops = self.clone();

        let task = async move {
            let policy = UploadPolicy::from(&ops.settings.upload);
            let request = ops.request_for(OperationKind::ManageContent);
            let client = &ops.client;

            ops.gateway
                .execute(request, |session| async move {
                    policy
                        .validate(&file)
                        .map_err(|e| GatewayError::Rejected(e.to_string()))?;

                    tracing::info!(
                        file_name = %file.file_name,
                        content_type = %file.content_type,
                        size = file.size(),
                        "Uploading file"
                    );

                    let FileUpload {
                        file_name,
                        content_type,
                        data,
                    } = file;
                    let body = reqwest::Body::wrap_stream(progress_stream(data, tx));

                    client
                        .upload(&upload_endpoint(), &session, &file_name, &content_type, body)
                        .await
                })
                .await
        };

        UploadHandle {
            progress: rx,
            task: task.boxed(),
        }
    }
}

/// Split `data` into chunks, publishing the running byte count as each one
/// is handed to the transport.
fn progress_stream(
    data: Vec<u8>,
    tx: watch::Sender<UploadProgress>,
) -> impl futures::Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let total = data.len() as u64;
    let chunks: Vec<Vec<u8>> = data.chunks(UPLOAD_CHUNK_SIZE).map(|c| c.to_vec()).collect();
    let mut sent = 0u64;

    futures::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        tx.send_replace(UploadProgress { sent, total });
        Ok(chunk)
    }))
}
