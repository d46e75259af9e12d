use crate::models::Question;

/// Notifications for the presentation layer, delivered over a broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The message list changed; keep the newest entry visible by scrolling to the top.
    ScrollToTop,
    LoadingChanged(bool),
    /// The streaming entry now shows `content`.
    MessageRevealed { index: usize, content: String },
    StreamFinished { index: usize },
    /// An upload produced `total` questions and the panel switched to questions mode.
    QuestionsReady { total: usize },
    QuestionRevealed { index: usize, question: Question },
    QuestionsFinished { total: usize },
    UploadFailed { reason: String },
    ChatFailed { reason: String },
}
