//! Interview session: the append-only record of answered prompts.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::interview::error::InterviewError;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Scores at or above this mark a strength.
pub const STRONG_SCORE: u8 = 4;
/// Scores at or below this mark a concern.
pub const WEAK_SCORE: u8 = 2;

/// One answered prompt (base question or follow-up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    pub answer: String,
    pub score: u8,
    pub dimension: Option<String>,
}

impl Turn {
    /// High- or low-scoring turns are worth quoting in the report.
    pub fn is_notable(&self) -> bool {
        is_notable_score(self.score)
    }
}

pub fn is_notable_score(score: u8) -> bool {
    score >= STRONG_SCORE || score <= WEAK_SCORE
}

#[derive(Debug, Clone)]
pub struct InterviewSession {
    role: String,
    candidate_name: String,
    start_time: DateTime<Utc>,
    turns: Vec<Turn>,
    dimension_scores: IndexMap<String, Vec<u8>>,
    /// Indices into `turns`.
    notable_quotes: Vec<usize>,
    completed: bool,
}

impl InterviewSession {
    pub fn new(role: impl Into<String>, candidate_name: &str) -> Self {
        Self::started_at(role, candidate_name, Utc::now())
    }

    pub fn started_at(
        role: impl Into<String>,
        candidate_name: &str,
        start_time: DateTime<Utc>,
    ) -> Self {
        let candidate_name = match candidate_name.trim() {
            "" => "Anonymous".to_string(),
            name => name.to_string(),
        };
        Self {
            role: role.into(),
            candidate_name,
            start_time,
            turns: Vec::new(),
            dimension_scores: IndexMap::new(),
            notable_quotes: Vec::new(),
            completed: false,
        }
    }

    /// The only mutation path. Rejects out-of-range scores and turns recorded
    /// after completion; nothing is stored when a turn is rejected.
    pub fn add_turn(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        score: u8,
        dimension: Option<&str>,
    ) -> Result<(), InterviewError> {
        if self.is_complete() {
            return Err(InterviewError::SessionComplete);
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(InterviewError::ScoreOutOfRange(score));
        }

        if let Some(dimension) = dimension {
            self.dimension_scores
                .entry(dimension.to_string())
                .or_default()
                .push(score);
        }

        let turn = Turn {
            question: question.into(),
            answer: answer.into(),
            score,
            dimension: dimension.map(str::to_string),
        };
        if turn.is_notable() {
            self.notable_quotes.push(self.turns.len());
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Marks the session read-only. Calling it again is a no-op.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Whole minutes elapsed since the session started.
    pub fn duration_minutes(&self) -> u64 {
        self.duration_minutes_at(Utc::now())
    }

    pub fn duration_minutes_at(&self, now: DateTime<Utc>) -> u64 {
        let seconds = (now - self.start_time).num_seconds().max(0);
        (seconds / 60) as u64
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn scores(&self) -> impl Iterator<Item = u8> + '_ {
        self.turns.iter().map(|t| t.score)
    }

    /// Per-dimension scores in the order dimensions were first seen.
    pub fn dimension_scores(&self) -> &IndexMap<String, Vec<u8>> {
        &self.dimension_scores
    }

    /// Notable turns in the order they were recorded.
    pub fn notable_quotes(&self) -> impl Iterator<Item = &Turn> + '_ {
        self.notable_quotes.iter().map(|&idx| &self.turns[idx])
    }
}
