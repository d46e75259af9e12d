//! Building blocks of the simulated streaming: the two-state machine, the
//! generation tokens that keep stale reveal tasks from writing, and a cursor
//! that exposes a complete string one character at a time.

/// Whether a target is currently being revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    #[default]
    Idle,
    Streaming,
}

/// How a reveal sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Everything was revealed by this sequence.
    Completed,
    /// A newer sequence (or a reset) took over the target; this one stopped
    /// without writing again.
    Superseded,
}

/// Identifies one reveal sequence (or one in-flight request) for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

/// Monotonic source of [`Generation`] tokens.
#[derive(Debug, Default, Clone)]
pub struct GenerationCounter {
    current: u64,
}

impl GenerationCounter {
    pub fn current(&self) -> Generation {
        Generation(self.current)
    }

    /// Invalidates every token handed out so far and returns a fresh one.
    pub fn bump(&mut self) -> Generation {
        self.current += 1;
        Generation(self.current)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.current
    }
}

/// Character cursor over a complete response.
///
/// Every prefix it yields ends on a UTF-8 boundary and is one character
/// longer than the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextReveal {
    text: String,
    shown: usize,
}

impl TextReveal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shown: 0,
        }
    }

    /// Reveals one more character and returns the new prefix, or `None` once
    /// the whole text is visible.
    pub fn step(&mut self) -> Option<&str> {
        let next = self.text[self.shown..].chars().next()?;
        self.shown += next.len_utf8();
        Some(&self.text[..self.shown])
    }

    pub fn revealed(&self) -> &str {
        &self.text[..self.shown]
    }

    pub fn full(&self) -> &str {
        &self.text
    }

    pub fn is_complete(&self) -> bool {
        self.shown == self.text.len()
    }

    pub fn state(&self) -> RevealState {
        if self.is_complete() {
            RevealState::Idle
        } else {
            RevealState::Streaming
        }
    }
}
