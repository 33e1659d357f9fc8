//! Question generation: the external call that proposes the next
//! follow-up, and the narrow parser for its `QUESTION:` / `EVALUATION:` reply.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::interview::history::{HistoryEntry, Speaker};
use crate::interview::prompts::INTERVIEWER_SYSTEM_TEMPLATE;
use crate::llm_client::{ChatMessage, LlmClient, LlmError};

const QUESTION_MARKER: &str = "QUESTION:";
const EVALUATION_MARKER: &str = "EVALUATION:";

/// The external question-generation call. Returns the generator's raw reply.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate_next(
        &self,
        role: &str,
        history: &[HistoryEntry],
        candidate_input: &str,
    ) -> Result<String, LlmError>;
}

/// Generator backed by the chat-completion client.
pub struct LlmQuestionGenerator(pub LlmClient);

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate_next(
        &self,
        role: &str,
        history: &[HistoryEntry],
        candidate_input: &str,
    ) -> Result<String, LlmError> {
        let system = INTERVIEWER_SYSTEM_TEMPLATE.replace("{role}", role);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(&system));
        messages.extend(history.iter().map(|entry| match entry.speaker {
            Speaker::Interviewer => ChatMessage::assistant(&entry.text),
            Speaker::Candidate => ChatMessage::user(&entry.text),
        }));
        messages.push(ChatMessage::user(candidate_input));

        self.0.chat(&messages).await
    }
}

/// Parsed generator reply. Missing or empty markers are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorReply {
    pub question: Option<String>,
    pub evaluation: Option<String>,
}

/// Takes the first `QUESTION:` line and the first `EVALUATION:` line.
/// Markers are case-sensitive; indentation before a marker is ignored.
pub fn parse_generator_reply(text: &str) -> GeneratorReply {
    let mut question: Option<&str> = None;
    let mut evaluation: Option<&str> = None;

    for line in text.lines().map(str::trim_start) {
        if let Some(rest) = line.strip_prefix(QUESTION_MARKER) {
            question.get_or_insert(rest);
        } else if let Some(rest) = line.strip_prefix(EVALUATION_MARKER) {
            evaluation.get_or_insert(rest);
        }
    }

    GeneratorReply {
        question: question.and_then(non_empty),
        evaluation: evaluation.and_then(non_empty),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Generator replaying scripted replies in order; `None` simulates a failed call.
    pub(crate) struct ScriptedGenerator {
        replies: Mutex<VecDeque<Option<String>>>,
        pub seen_history_lens: Mutex<Vec<usize>>,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
                seen_history_lens: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QuestionGenerator for ScriptedGenerator {
        async fn generate_next(
            &self,
            _role: &str,
            history: &[HistoryEntry],
            _candidate_input: &str,
        ) -> Result<String, LlmError> {
            self.seen_history_lens.lock().unwrap().push(history.len());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .flatten()
                .ok_or(LlmError::EmptyContent)
        }
    }

    #[test]
    fn test_parses_both_markers() {
        let reply = parse_generator_reply(
            "QUESTION: How does dropout prevent overfitting?\nEVALUATION: Initial question",
        );
        assert_eq!(
            reply.question.as_deref(),
            Some("How does dropout prevent overfitting?")
        );
        assert_eq!(reply.evaluation.as_deref(), Some("Initial question"));
    }

    #[test]
    fn test_indented_markers_and_surrounding_text() {
        let text = "Sure, here you go.\n  QUESTION:   What is a transformer?   \n  EVALUATION: Shallow.\nThanks";
        let reply = parse_generator_reply(text);
        assert_eq!(reply.question.as_deref(), Some("What is a transformer?"));
        assert_eq!(reply.evaluation.as_deref(), Some("Shallow."));
    }

    #[test]
    fn test_first_marker_wins() {
        let text = "QUESTION: First question here?\nQUESTION: Second question here?";
        let reply = parse_generator_reply(text);
        assert_eq!(reply.question.as_deref(), Some("First question here?"));
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let reply = parse_generator_reply("question: lower case?\nEvaluation: nope");
        assert_eq!(reply, GeneratorReply::default());
    }

    #[test]
    fn test_missing_markers_yield_none() {
        let reply = parse_generator_reply("I think the candidate did well.");
        assert!(reply.question.is_none());
        assert!(reply.evaluation.is_none());
    }

    #[test]
    fn test_empty_marker_value_is_none() {
        let reply = parse_generator_reply("QUESTION:    \nEVALUATION: ok");
        assert!(reply.question.is_none());
        assert_eq!(reply.evaluation.as_deref(), Some("ok"));
    }

    #[test]
    fn test_marker_must_start_the_line() {
        let reply = parse_generator_reply("Next QUESTION: hidden?");
        assert!(reply.question.is_none());
    }
}
