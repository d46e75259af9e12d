//! Question Pipeline: the uploaded contract, the questions generated for it,
//! and the prefix of those questions revealed so far.

use crate::{
    error::SessionError,
    models::{GeneratedQuestions, Question, UploadedFile},
    reveal::{Generation, GenerationCounter, RevealState},
};

/// Which panel the presentation shows next to the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Upload panel; no contract has produced questions yet.
    #[default]
    Upload,
    /// Suggested-questions panel.
    QuestionsShown,
}

/// One reveal step of the question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionStep {
    Revealed {
        index: usize,
        question: Question,
        done: bool,
    },
    Superseded,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionPipeline {
    file: Option<UploadedFile>,
    pdf_text: String,
    generated: Vec<Question>,
    revealed: Vec<Question>,
    mode: UiMode,
    state: RevealState,
    uploads: GenerationCounter,
    reveals: GenerationCounter,
}

impl QuestionPipeline {
    /// Registers an outgoing upload. Only the most recent upload may be accepted.
    pub fn begin_upload(&mut self) -> Generation {
        self.uploads.bump()
    }

    pub fn is_latest_upload(&self, ticket: Generation) -> bool {
        self.uploads.is_current(ticket)
    }

    /// Stores the backend result for `file` and starts a new reveal sequence.
    ///
    /// # Errors
    /// [`SessionError::NoQuestions`] if the list is empty; nothing changes.
    pub fn accept(
        &mut self,
        file: UploadedFile,
        generated: GeneratedQuestions,
    ) -> Result<Generation, SessionError> {
        if generated.questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }

        self.file = Some(file);
        self.pdf_text = generated.pdf_text;
        self.generated = generated.questions;
        self.revealed.clear();
        self.mode = UiMode::QuestionsShown;
        self.state = RevealState::Streaming;
        Ok(self.reveals.bump())
    }

    /// Copies the next generated question into the revealed list, if
    /// `generation` still owns the reveal.
    pub fn reveal_next(&mut self, generation: Generation) -> QuestionStep {
        if !self.reveals.is_current(generation) || self.state == RevealState::Idle {
            return QuestionStep::Superseded;
        }

        let index = self.revealed.len();
        let Some(question) = self.generated.get(index).cloned() else {
            self.state = RevealState::Idle;
            return QuestionStep::Superseded;
        };
        self.revealed.push(question.clone());

        let done = self.revealed.len() == self.generated.len();
        if done {
            self.state = RevealState::Idle;
        }
        QuestionStep::Revealed {
            index,
            question,
            done,
        }
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn pdf_text(&self) -> &str {
        &self.pdf_text
    }

    pub fn generated(&self) -> &[Question] {
        &self.generated
    }

    pub fn revealed(&self) -> &[Question] {
        &self.revealed
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn reveal_state(&self) -> RevealState {
        self.state
    }

    /// More questions are still to be revealed.
    pub fn questions_pending(&self) -> bool {
        self.revealed.len() < self.generated.len()
    }

    /// Forgets the contract and stops any reveal or pending upload.
    pub fn reset(&mut self) {
        self.file = None;
        self.pdf_text.clear();
        self.generated.clear();
        self.revealed.clear();
        self.mode = UiMode::Upload;
        self.state = RevealState::Idle;
        self.uploads.bump();
        self.reveals.bump();
    }
}
