//! Contract chat session.
//!
//! A user uploads a PDF contract, gets suggested questions revealed one at a
//! time, and chats with the backend about the document. Answers arrive whole
//! and are revealed character by character to look like a live stream.
//!
//! Public API: [`ChatSession`] over any [`ContractBackend`] ([`HttpBackend`]
//! in production), observed through [`ChatSession::snapshot`] and the
//! [`SessionEvent`] stream.
//!
//! # Example
//! ```no_run
//! # use chat_session::{ChatSession, SessionConfig, UploadedFile};
//! # #[tokio::main] async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = ChatSession::from_config(&SessionConfig::new("http://127.0.0.1:8000"))?;
//!
//! session.submit_file(UploadedFile::from_path("lease.pdf").await?).await?;
//! session.set_input("When can the tenant terminate?").await;
//! session.send_message().await?;
//!
//! println!("{:#?}", session.snapshot().await.messages);
//! # Ok(()) }
//! ```

mod backend;
mod config;
mod conversation;
mod error;
mod events;
mod models;
mod questions;
mod reveal;
mod session;

pub use backend::{ContractBackend, HttpBackend};
pub use config::{RevealPacing, SessionConfig};
pub use conversation::{ConversationState, StreamStart, StreamStep};
pub use error::{ClientError, ConfigError, SessionError};
pub use events::SessionEvent;
pub use models::{
    GeneratedQuestions, MAX_UPLOAD_BYTES, Message, Question, Role, UploadedFile, check_upload,
};
pub use questions::{QuestionPipeline, QuestionStep, UiMode};
pub use reveal::{Generation, GenerationCounter, RevealOutcome, RevealState, TextReveal};
pub use session::{ChatSession, SessionSnapshot};
