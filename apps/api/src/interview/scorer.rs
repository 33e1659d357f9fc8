//! Answer scoring: turns the grader's free text into a 1-5 score.
//!
//! Grading never fails the interview: a blank answer scores 1 without a call,
//! and any grader error or unparseable reply falls back to a neutral 3.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::interview::prompts::{GRADER_PROMPT_TEMPLATE, GRADER_SYSTEM};
use crate::interview::session::{MAX_SCORE, MIN_SCORE};
use crate::llm_client::{ChatMessage, LlmClient, LlmError};

/// Score given to blank answers.
pub const BLANK_ANSWER_SCORE: u8 = 1;
/// Score used whenever the grader cannot be trusted ("adequate").
pub const FALLBACK_SCORE: u8 = 3;

/// The external grading call. Returns the grader's raw reply.
#[async_trait]
pub trait AnswerGrader: Send + Sync {
    async fn grade(&self, answer: &str) -> Result<String, LlmError>;
}

/// Grader backed by the chat-completion client.
pub struct LlmAnswerGrader(pub LlmClient);

#[async_trait]
impl AnswerGrader for LlmAnswerGrader {
    async fn grade(&self, answer: &str) -> Result<String, LlmError> {
        let prompt = GRADER_PROMPT_TEMPLATE.replace("{answer}", answer);
        let messages = [ChatMessage::system(GRADER_SYSTEM), ChatMessage::user(&prompt)];
        self.0.chat(&messages).await
    }
}

/// Where a score came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ScoreSource {
    Grader,
    BlankAnswer,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub score: u8,
    #[serde(flatten)]
    pub source: ScoreSource,
}

impl ScoreOutcome {
    fn fallback(reason: String) -> Self {
        Self {
            score: FALLBACK_SCORE,
            source: ScoreSource::Fallback { reason },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ScoreSource::Fallback { .. })
    }
}

/// Scores one answer. Never returns an error; failures are reported on the outcome.
pub async fn score_answer(grader: &dyn AnswerGrader, answer: &str) -> ScoreOutcome {
    if answer.trim().is_empty() {
        return ScoreOutcome {
            score: BLANK_ANSWER_SCORE,
            source: ScoreSource::BlankAnswer,
        };
    }

    let reply = match grader.grade(answer).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Answer grading failed, using fallback score: {e}");
            return ScoreOutcome::fallback(format!("grader call failed: {e}"));
        }
    };

    match parse_score(&reply) {
        Some(score) => ScoreOutcome {
            score,
            source: ScoreSource::Grader,
        },
        None => {
            warn!("Grader reply had no SCORE marker, using fallback score");
            ScoreOutcome::fallback("grader reply had no SCORE marker".to_string())
        }
    }
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"SCORE:\s*(\d+)").expect("score pattern is valid"))
}

/// Extracts `SCORE: <n>` from grader output, clamped to 1-5.
pub fn parse_score(reply: &str) -> Option<u8> {
    let digits = score_pattern().captures(reply)?.get(1)?.as_str();
    // Digit runs too long for u64 are still "very large"
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(value.clamp(MIN_SCORE as u64, MAX_SCORE as u64) as u8)
}
