//! The chat session: wires Conversation State and the Question Pipeline to a
//! [`ContractBackend`] and drives the timed reveal sequences.
//!
//! All state sits behind one async mutex that is never held across a backend
//! call or a reveal delay. Each reveal step re-checks its generation token
//! under the lock, so a superseded sequence can never write into state that
//! belongs to a newer one.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, instrument};

use crate::{
    backend::{ContractBackend, HttpBackend},
    config::{RevealPacing, SessionConfig},
    conversation::{ConversationState, StreamStep},
    error::{ClientError, SessionError},
    events::SessionEvent,
    models::{Message, Question, UploadedFile},
    questions::{QuestionPipeline, QuestionStep, UiMode},
    reveal::{Generation, RevealOutcome, RevealState},
};

/// Everything a view needs to render the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub input: String,
    pub is_loading: bool,
    pub is_streaming: bool,
    pub mode: UiMode,
    pub file_name: Option<String>,
    pub pdf_text: String,
    pub generated_questions: Vec<Question>,
    pub revealed_questions: Vec<Question>,
    pub questions_pending: bool,
    pub question_reveal: RevealState,
}

#[derive(Debug, Default)]
struct SessionState {
    conversation: ConversationState,
    questions: QuestionPipeline,
}

struct Inner<B> {
    backend: B,
    pacing: RevealPacing,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

/// Cheaply cloneable handle; clones share the same session.
pub struct ChatSession<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for ChatSession<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ChatSession<HttpBackend> {
    /// Session over the HTTP backend described by `cfg`.
    pub fn from_config(cfg: &SessionConfig) -> Result<Self, ClientError> {
        let backend = HttpBackend::new(cfg)?;
        Ok(Self::new(backend, cfg.pacing, cfg.event_capacity))
    }
}

impl<B: ContractBackend> ChatSession<B> {
    pub fn new(backend: B, pacing: RevealPacing, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                backend,
                pacing,
                state: Mutex::new(SessionState::default()),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let st = self.inner.state.lock().await;
        let (conv, q) = (&st.conversation, &st.questions);
        SessionSnapshot {
            messages: conv.messages().to_vec(),
            input: conv.input().to_string(),
            is_loading: conv.is_loading(),
            is_streaming: conv.is_streaming(),
            mode: q.mode(),
            file_name: q.file().map(|f| f.file_name.clone()),
            pdf_text: q.pdf_text().to_string(),
            generated_questions: q.generated().to_vec(),
            revealed_questions: q.revealed().to_vec(),
            questions_pending: q.questions_pending(),
            question_reveal: q.reveal_state(),
        }
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.inner.state.lock().await.conversation.set_input(text);
    }

    /// Sends the input buffer as a user message and streams the backend's answer.
    ///
    /// Resolves once the answer is fully revealed (or superseded).
    ///
    /// # Errors
    /// - [`SessionError::EmptyInput`] if the buffer is blank; nothing is sent
    /// - [`SessionError::Client`] if the backend call fails; the user entry stays,
    ///   loading is cleared and [`SessionEvent::ChatFailed`] is emitted
    #[instrument(name = "send_message", skip_all)]
    pub async fn send_message(&self) -> Result<RevealOutcome, SessionError> {
        let (history, pdf_text, epoch) = {
            let mut st = self.inner.state.lock().await;
            let text = st.conversation.input().to_string();
            st.conversation.append_user_message(&text)?;
            st.conversation.begin_request();
            (
                st.conversation.messages().to_vec(),
                st.questions.pdf_text().to_string(),
                st.conversation.epoch(),
            )
        };
        self.emit(SessionEvent::ScrollToTop);
        self.emit(SessionEvent::LoadingChanged(true));

        let result = self.inner.backend.chat(&history, &pdf_text).await;

        let current = {
            let mut st = self.inner.state.lock().await;
            st.conversation.end_request();
            st.conversation.is_current_epoch(epoch)
        };
        self.emit(SessionEvent::LoadingChanged(false));

        match result {
            Ok(answer) if current => Ok(self.stream_answer(answer).await),
            Ok(_) => {
                debug!("dropping chat answer for a conversation that was reset");
                Ok(RevealOutcome::Superseded)
            }
            Err(e) => {
                error!(error = %e, "Error fetching chat completion");
                self.emit(SessionEvent::ChatFailed {
                    reason: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Appends the suggested question as a user entry and streams its
    /// pre-computed answer. No backend call is made and the input buffer is
    /// left untouched.
    #[instrument(name = "click_question", skip_all)]
    pub async fn click_question(&self, question: &Question) -> RevealOutcome {
        self.inner
            .state
            .lock()
            .await
            .conversation
            .append_question(&question.question);
        self.emit(SessionEvent::ScrollToTop);
        self.stream_answer(question.answer.clone()).await
    }

    /// Uploads a contract, stores the generated questions and reveals them
    /// one per interval.
    ///
    /// Resolves once every question is revealed, or with
    /// [`RevealOutcome::Superseded`] if a newer upload or a reset took over.
    ///
    /// # Errors
    /// - [`SessionError::NoQuestions`] if the backend produced an empty list
    /// - [`SessionError::Client`] on transport, status or decode failures
    ///
    /// In both cases the previous contract, questions and UI mode are kept and
    /// [`SessionEvent::UploadFailed`] is emitted.
    #[instrument(name = "submit_file", skip_all, fields(file = %file.file_name))]
    pub async fn submit_file(&self, file: UploadedFile) -> Result<RevealOutcome, SessionError> {
        let ticket = {
            let mut st = self.inner.state.lock().await;
            st.conversation.begin_request();
            st.questions.begin_upload()
        };
        self.emit(SessionEvent::LoadingChanged(true));

        let result = self.inner.backend.generate_questions(&file).await;

        let accepted = {
            let mut st = self.inner.state.lock().await;
            st.conversation.end_request();
            if !st.questions.is_latest_upload(ticket) {
                None
            } else {
                Some(result.map_err(SessionError::from).and_then(|generated| {
                    let total = generated.questions.len();
                    st.questions
                        .accept(file, generated)
                        .map(|generation| (generation, total))
                }))
            }
        };
        self.emit(SessionEvent::LoadingChanged(false));

        match accepted {
            None => {
                debug!("dropping upload result superseded by a newer upload");
                Ok(RevealOutcome::Superseded)
            }
            Some(Ok((generation, total))) => {
                info!(total, "questions generated");
                self.emit(SessionEvent::QuestionsReady { total });
                Ok(self.reveal_questions(generation).await)
            }
            Some(Err(e)) => {
                match &e {
                    SessionError::NoQuestions => error!("No questions generated"),
                    other => error!(error = %other, "Error uploading contract"),
                }
                self.emit(SessionEvent::UploadFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Clears the conversation and the contract. Running reveals stop on
    /// their next step and in-flight replies are dropped.
    pub async fn reset(&self) {
        {
            let mut st = self.inner.state.lock().await;
            st.conversation.reset();
            st.questions.reset();
        }
        info!("session reset");
        self.emit(SessionEvent::ScrollToTop);
    }

    /* --------------------- Internals --------------------- */

    async fn stream_answer(&self, answer: String) -> RevealOutcome {
        let start = self.inner.state.lock().await.conversation.begin_stream(answer);

        if let Some(index) = start.flushed {
            debug!(index, "completing superseded answer");
            let content = self.message_content(index).await;
            self.emit(SessionEvent::MessageRevealed { index, content });
            self.emit(SessionEvent::StreamFinished { index });
        }
        self.emit(SessionEvent::ScrollToTop);

        if !start.pending {
            self.emit(SessionEvent::StreamFinished { index: start.index });
            return RevealOutcome::Completed;
        }

        loop {
            tokio::time::sleep(self.inner.pacing.char_delay).await;

            let mut st = self.inner.state.lock().await;
            let step = st.conversation.advance_stream(start.generation);
            match step {
                StreamStep::Superseded => {
                    debug!(index = start.index, "answer stream superseded");
                    return RevealOutcome::Superseded;
                }
                StreamStep::Revealed { index, done } => {
                    let content = st.conversation.messages()[index].content.clone();
                    drop(st);
                    self.emit(SessionEvent::MessageRevealed { index, content });
                    self.emit(SessionEvent::ScrollToTop);
                    if done {
                        self.emit(SessionEvent::StreamFinished { index });
                        return RevealOutcome::Completed;
                    }
                }
            }
        }
    }

    async fn reveal_questions(&self, generation: Generation) -> RevealOutcome {
        loop {
            tokio::time::sleep(self.inner.pacing.question_delay).await;

            let step = self
                .inner
                .state
                .lock()
                .await
                .questions
                .reveal_next(generation);
            match step {
                QuestionStep::Superseded => {
                    debug!("question reveal superseded");
                    return RevealOutcome::Superseded;
                }
                QuestionStep::Revealed {
                    index,
                    question,
                    done,
                } => {
                    self.emit(SessionEvent::QuestionRevealed { index, question });
                    if done {
                        self.emit(SessionEvent::QuestionsFinished { total: index + 1 });
                        return RevealOutcome::Completed;
                    }
                }
            }
        }
    }

    async fn message_content(&self, index: usize) -> String {
        self.inner
            .state
            .lock()
            .await
            .conversation
            .messages()
            .get(index)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn emit(&self, event: SessionEvent) {
        // Err only means nobody is subscribed.
        let _ = self.inner.events.send(event);
    }
}
