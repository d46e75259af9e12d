//! Contract backend client.
//!
//! Two endpoints, both non-streaming:
//! - POST {api_base}/chat-contract/        JSON `{ messages, pdf_text }` → `{ message }`
//! - POST {api_base}/generate-questions/   multipart `file` → `{ questions, pdf_text }`

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::{
    config::SessionConfig,
    error::ClientError,
    models::{ChatRequest, ChatResponse, GeneratedQuestions, Message, UploadedFile},
};

/// The two calls a session makes. Implemented over HTTP by [`HttpBackend`].
#[async_trait]
pub trait ContractBackend: Send + Sync {
    /// Sends the whole conversation plus the contract text; returns the full answer.
    async fn chat(&self, messages: &[Message], pdf_text: &str) -> Result<String, ClientError>;

    /// Uploads a contract; returns the generated questions and the extracted text.
    async fn generate_questions(
        &self,
        file: &UploadedFile,
    ) -> Result<GeneratedQuestions, ClientError>;
}

/// `reqwest`-based [`ContractBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    chat_url: String,
    questions_url: String,
}

impl HttpBackend {
    /// # Errors
    /// - [`ClientError::Config`] if the base URL is not http/https
    /// - [`ClientError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: &SessionConfig) -> Result<Self, ClientError> {
        cfg.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }

        let backend = Self {
            client: builder.build()?,
            chat_url: cfg.chat_url(),
            questions_url: cfg.questions_url(),
        };

        info!(
            chat_url = %backend.chat_url,
            questions_url = %backend.questions_url,
            timeout = ?cfg.request_timeout,
            "HttpBackend initialized"
        );
        Ok(backend)
    }
}

#[async_trait]
impl ContractBackend for HttpBackend {
    async fn chat(&self, messages: &[Message], pdf_text: &str) -> Result<String, ClientError> {
        let started = Instant::now();
        debug!(
            messages = messages.len(),
            pdf_text_len = pdf_text.len(),
            "POST {}", self.chat_url
        );

        let resp = self
            .client
            .post(&self.chat_url)
            .json(&ChatRequest { messages, pdf_text })
            .send()
            .await?;

        let out: ChatResponse = decode(resp, &self.chat_url, "`message`").await?;

        info!(
            latency_ms = started.elapsed().as_millis(),
            answer_len = out.message.len(),
            "chat answer received"
        );
        Ok(out.message)
    }

    async fn generate_questions(
        &self,
        file: &UploadedFile,
    ) -> Result<GeneratedQuestions, ClientError> {
        let started = Instant::now();
        debug!(
            file = %file.file_name,
            bytes = file.bytes.len(),
            "POST {}", self.questions_url
        );

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime) = &file.content_type {
            part = part.mime_str(mime)?;
        }
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(&self.questions_url)
            .multipart(form)
            .send()
            .await?;

        let out: GeneratedQuestions =
            decode(resp, &self.questions_url, "`questions` and `pdf_text`").await?;

        info!(
            latency_ms = started.elapsed().as_millis(),
            questions = out.questions.len(),
            pdf_text_len = out.pdf_text.len(),
            "questions generated"
        );
        Ok(out)
    }
}

/// Maps non-2xx to [`ClientError::HttpStatus`] and bad JSON to [`ClientError::Decode`].
async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    url: &str,
    expected: &str,
) -> Result<T, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let snippet = make_snippet(&text);
        error!(%status, %url, %snippet, "contract backend returned non-success status");
        return Err(ClientError::HttpStatus {
            status,
            url: url.to_string(),
            snippet,
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        error!(error = %e, %url, "failed to decode contract backend response");
        ClientError::Decode(format!("serde error: {e}; expected {expected}"))
    })
}

fn make_snippet(text: &str) -> String {
    const MAX: usize = 240;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_is_trimmed_and_capped() {
        assert_eq!(make_snippet("  short body \n"), "short body");

        let long = "é".repeat(300);
        let snippet = make_snippet(&long);
        assert_eq!(snippet.chars().count(), 241);
        assert!(snippet.ends_with('…'));
    }
}
