//! Conversation State: the ordered message list, the input buffer, and the
//! loading/streaming flags.
//!
//! At most one assistant answer streams at a time. Starting a new one first
//! completes the previous message to its full text, then bumps the chat
//! generation so the previous reveal task stops on its next step.

use crate::{
    error::SessionError,
    models::{Message, Role},
    reveal::{Generation, GenerationCounter, RevealState, TextReveal},
};

#[derive(Debug, Clone)]
struct ActiveStream {
    index: usize,
    reveal: TextReveal,
    generation: Generation,
}

/// Result of [`ConversationState::begin_stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStart {
    /// Index of the new assistant entry.
    pub index: usize,
    pub generation: Generation,
    /// `false` when the answer was empty and nothing is left to reveal.
    pub pending: bool,
    /// Entry of a superseded stream that was completed to its full text.
    pub flushed: Option<usize>,
}

/// One reveal step of the active stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStep {
    Revealed { index: usize, done: bool },
    Superseded,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    input: String,
    pending_requests: usize,
    active: Option<ActiveStream>,
    generation: GenerationCounter,
    epoch: GenerationCounter,
}

impl ConversationState {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Adds a user entry and clears the input buffer.
    ///
    /// # Errors
    /// [`SessionError::EmptyInput`] if `text` is empty or whitespace; nothing changes.
    pub fn append_user_message(&mut self, text: &str) -> Result<usize, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }
        self.messages.push(Message::user(text));
        self.input.clear();
        Ok(self.messages.len() - 1)
    }

    /// Adds a suggested question as a user entry. The input buffer is left as typed.
    pub fn append_question(&mut self, question: &str) -> usize {
        self.messages.push(Message::user(question));
        self.messages.len() - 1
    }

    /// Adds an empty assistant entry and returns its index.
    pub fn append_assistant_placeholder(&mut self) -> usize {
        self.messages.push(Message::assistant(String::new()));
        self.messages.len() - 1
    }

    /// Appends a placeholder and makes `answer` the active stream.
    pub fn begin_stream(&mut self, answer: impl Into<String>) -> StreamStart {
        let flushed = self.finish_active();
        let index = self.append_assistant_placeholder();
        let generation = self.generation.bump();
        let reveal = TextReveal::new(answer);
        let pending = !reveal.is_complete();

        if pending {
            self.active = Some(ActiveStream {
                index,
                reveal,
                generation,
            });
        }

        StreamStart {
            index,
            generation,
            pending,
            flushed,
        }
    }

    /// Reveals one more character of the active stream, if `generation` still owns it.
    pub fn advance_stream(&mut self, generation: Generation) -> StreamStep {
        if !self.generation.is_current(generation) {
            return StreamStep::Superseded;
        }
        let Some(active) = self.active.as_mut() else {
            return StreamStep::Superseded;
        };

        let index = active.index;
        if let Some(prefix) = active.reveal.step() {
            self.messages[index].content.clear();
            self.messages[index].content.push_str(prefix);
        }
        let done = active.reveal.is_complete();
        if done {
            self.active = None;
        }
        StreamStep::Revealed { index, done }
    }

    /// Completes the active stream immediately. Returns the entry it wrote to.
    pub fn finish_active(&mut self) -> Option<usize> {
        let active = self.active.take()?;
        let message = &mut self.messages[active.index];
        debug_assert_eq!(message.role, Role::Assistant);
        message.content = active.reveal.full().to_string();
        Some(active.index)
    }

    pub fn stream_state(&self) -> RevealState {
        if self.active.is_some() {
            RevealState::Streaming
        } else {
            RevealState::Idle
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.stream_state() == RevealState::Streaming
    }

    pub fn begin_request(&mut self) {
        self.pending_requests += 1;
    }

    pub fn end_request(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
    }

    pub fn is_loading(&self) -> bool {
        self.pending_requests > 0
    }

    /// Token that changes only on [`ConversationState::reset`]. Requests
    /// capture it so a reply arriving after a reset is dropped.
    pub fn epoch(&self) -> Generation {
        self.epoch.current()
    }

    pub fn is_current_epoch(&self, epoch: Generation) -> bool {
        self.epoch.is_current(epoch)
    }

    /// Drops every message and stops the active stream without completing it.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.active = None;
        self.generation.bump();
        self.epoch.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(conv: &mut ConversationState, generation: Generation) -> Vec<String> {
        let mut seen = Vec::new();
        loop {
            match conv.advance_stream(generation) {
                StreamStep::Revealed { index, done } => {
                    seen.push(conv.messages()[index].content.clone());
                    if done {
                        return seen;
                    }
                }
                StreamStep::Superseded => return seen,
            }
        }
    }

    #[test]
    fn user_message_clears_input_and_rejects_blank() {
        let mut conv = ConversationState::default();
        conv.set_input("   ");
        assert!(matches!(
            conv.append_user_message("   "),
            Err(SessionError::EmptyInput)
        ));
        assert!(conv.messages().is_empty());
        assert_eq!(conv.input(), "   ");

        conv.set_input(" Hello ");
        assert_eq!(conv.append_user_message(" Hello ").unwrap(), 0);
        assert_eq!(conv.messages(), &[Message::user(" Hello ")]);
        assert_eq!(conv.input(), "");
    }

    #[test]
    fn question_entry_keeps_input_and_accepts_blank_text() {
        let mut conv = ConversationState::default();
        conv.set_input("draft");

        assert_eq!(conv.append_question("Q1"), 0);
        assert_eq!(conv.append_question(""), 1);
        assert_eq!(conv.messages(), &[Message::user("Q1"), Message::user("")]);
        assert_eq!(conv.input(), "draft");
    }

    #[test]
    fn stream_reveals_prefixes_then_goes_idle() {
        let mut conv = ConversationState::default();
        let start = conv.begin_stream("Hi!");
        assert!(start.pending);
        assert!(conv.is_streaming());
        assert_eq!(conv.messages()[start.index], Message::assistant(""));

        let seen = drain(&mut conv, start.generation);
        assert_eq!(seen, ["H", "Hi", "Hi!"]);
        assert!(!conv.is_streaming());
        assert_eq!(conv.messages()[start.index].content, "Hi!");
    }

    #[test]
    fn empty_answer_never_streams() {
        let mut conv = ConversationState::default();
        let start = conv.begin_stream("");
        assert!(!start.pending);
        assert!(!conv.is_streaming());
        assert_eq!(conv.messages(), &[Message::assistant("")]);
    }

    #[test]
    fn new_stream_completes_and_supersedes_the_old_one() {
        let mut conv = ConversationState::default();
        let first = conv.begin_stream("first answer");
        conv.advance_stream(first.generation);

        let second = conv.begin_stream("second");
        assert_eq!(second.flushed, Some(first.index));
        assert_eq!(conv.messages()[first.index].content, "first answer");
        assert_eq!(
            conv.advance_stream(first.generation),
            StreamStep::Superseded
        );

        let seen = drain(&mut conv, second.generation);
        assert_eq!(seen.last().map(String::as_str), Some("second"));
        assert_eq!(conv.messages()[first.index].content, "first answer");
    }

    #[test]
    fn reset_stops_streams_and_changes_epoch() {
        let mut conv = ConversationState::default();
        let epoch = conv.epoch();
        let start = conv.begin_stream("abc");
        conv.reset();

        assert!(conv.messages().is_empty());
        assert!(!conv.is_current_epoch(epoch));
        assert_eq!(
            conv.advance_stream(start.generation),
            StreamStep::Superseded
        );
    }

    #[test]
    fn loading_counts_overlapping_requests() {
        let mut conv = ConversationState::default();
        conv.begin_request();
        conv.begin_request();
        conv.end_request();
        assert!(conv.is_loading());
        conv.end_request();
        conv.end_request();
        assert!(!conv.is_loading());
    }
}
