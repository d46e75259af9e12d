//! Data carried between the session, the presentation layer and the backend.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Largest upload the front end accepts (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Author of a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A suggested question with its pre-computed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub answer: String,
}

impl Question {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A contract selected for upload. The bytes are opaque to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    /// Sent as the part's MIME type when present.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Wraps in-memory PDF bytes.
    pub fn pdf(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: Some("application/pdf".into()),
            bytes: bytes.into(),
        }
    }

    /// Reads and validates a contract from disk.
    ///
    /// # Errors
    /// - [`ClientError::Io`] if the file cannot be read
    /// - [`ClientError::InvalidFile`] if it is not a `.pdf` or exceeds [`MAX_UPLOAD_BYTES`]
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let len = tokio::fs::metadata(path).await?.len();
        check_upload(&file_name, usize::try_from(len).unwrap_or(usize::MAX))?;

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::pdf(file_name, bytes))
    }
}

/// Applies the upload rules: `.pdf` extension, at most [`MAX_UPLOAD_BYTES`].
pub fn check_upload(file_name: &str, len: usize) -> Result<(), ClientError> {
    let is_pdf = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ClientError::InvalidFile {
            name: file_name.to_string(),
            reason: "only .pdf files are accepted",
        });
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(ClientError::InvalidFile {
            name: file_name.to_string(),
            reason: "file is larger than 10 MiB",
        });
    }
    Ok(())
}

/// Body of `POST /chat-contract/`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub messages: &'a [Message],
    pub pdf_text: &'a str,
}

/// Reply of `POST /chat-contract/`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub message: String,
}

/// Reply of `POST /generate-questions/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeneratedQuestions {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub pdf_text: String,
}
