use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Conversation context for one interview. Each interview owns its own
/// history and hands it to the generator by reference.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    entries: Vec<HistoryEntry>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interviewer(&mut self, text: impl Into<String>) {
        self.push(Speaker::Interviewer, text.into());
    }

    pub fn candidate(&mut self, text: impl Into<String>) {
        self.push(Speaker::Candidate, text.into());
    }

    fn push(&mut self, speaker: Speaker, text: String) {
        self.entries.push(HistoryEntry { speaker, text });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
