//! Report synthesis: a pure snapshot of a session's turns.
//!
//! `synthesize_at` is deterministic for a given session and clock reading;
//! only `generated_at` and the candidate summary's date/time/duration
//! depend on the clock.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::interview::session::{
    InterviewSession, Turn, MAX_SCORE, MIN_SCORE, STRONG_SCORE, WEAK_SCORE,
};

const MAX_HIGHLIGHTS: usize = 3;
const MAX_NOTABLE_QUOTES: usize = 5;
const TITLE_QUESTION_CHARS: usize = 50;
const EVIDENCE_ANSWER_CHARS: usize = 150;

/// Hiring recommendation derived from the unweighted average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Hire")]
    StrongHire,
    #[serde(rename = "Hire")]
    Hire,
    #[serde(rename = "No Hire")]
    NoHire,
    #[serde(rename = "Strong No Hire")]
    StrongNoHire,
}

impl Recommendation {
    pub fn from_average(average: f64) -> Self {
        if average >= 4.0 {
            Recommendation::StrongHire
        } else if average >= 3.0 {
            Recommendation::Hire
        } else if average >= 2.0 {
            Recommendation::NoHire
        } else {
            Recommendation::StrongNoHire
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::StrongHire => "Strong Hire",
            Recommendation::Hire => "Hire",
            Recommendation::NoHire => "No Hire",
            Recommendation::StrongNoHire => "Strong No Hire",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub name: String,
    pub position: String,
    pub date: String,
    pub time: String,
    pub duration_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    pub average_score: f64,
    pub count: usize,
    pub justification: String,
}

/// A key strength or area of concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub title: String,
    pub evidence: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotableQuote {
    pub question: String,
    pub quote: String,
    pub score: u8,
    pub significance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub highest_score: u8,
    pub lowest_score: u8,
    /// Counts for scores 1 through 5; every key is always present.
    pub score_distribution: BTreeMap<u8, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub candidate_summary: CandidateSummary,
    pub overall_recommendation: Recommendation,
    pub average_score: f64,
    pub dimension_scores: IndexMap<String, DimensionSummary>,
    pub key_strengths: Vec<Highlight>,
    pub areas_of_concern: Vec<Highlight>,
    pub notable_quotes: Vec<NotableQuote>,
    pub transcript: Vec<Turn>,
    pub total_turns: usize,
    pub summary_statistics: SummaryStatistics,
    pub generated_at: DateTime<Utc>,
}

pub fn synthesize(session: &InterviewSession) -> Report {
    synthesize_at(session, Utc::now())
}

pub fn synthesize_at(session: &InterviewSession, now: DateTime<Utc>) -> Report {
    let scores: Vec<u8> = session.scores().collect();
    let average = mean(&scores);

    let dimension_scores = session
        .dimension_scores()
        .iter()
        .map(|(dimension, scores)| {
            let summary = DimensionSummary {
                average_score: round2(mean(scores)),
                count: scores.len(),
                justification: format!(
                    "Based on {} question(s) in this dimension",
                    scores.len()
                ),
            };
            (dimension.clone(), summary)
        })
        .collect();

    let key_strengths = session
        .turns()
        .iter()
        .filter(|t| t.score >= STRONG_SCORE)
        .take(MAX_HIGHLIGHTS)
        .map(|t| highlight("Strong", t))
        .collect();

    let areas_of_concern = session
        .turns()
        .iter()
        .filter(|t| t.score <= WEAK_SCORE)
        .take(MAX_HIGHLIGHTS)
        .map(|t| highlight("Weak", t))
        .collect();

    let notable_quotes = session
        .notable_quotes()
        .take(MAX_NOTABLE_QUOTES)
        .map(|t| NotableQuote {
            question: t.question.clone(),
            quote: t.answer.clone(),
            score: t.score,
            significance: if t.score >= STRONG_SCORE {
                "Strong response".to_string()
            } else {
                "Needs improvement".to_string()
            },
        })
        .collect();

    Report {
        candidate_summary: CandidateSummary {
            name: session.candidate_name().to_string(),
            position: session.role().to_string(),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            duration_minutes: session.duration_minutes_at(now),
        },
        overall_recommendation: Recommendation::from_average(average),
        average_score: round2(average),
        dimension_scores,
        key_strengths,
        areas_of_concern,
        notable_quotes,
        transcript: session.turns().to_vec(),
        total_turns: session.turns().len(),
        summary_statistics: SummaryStatistics {
            highest_score: scores.iter().copied().max().unwrap_or(0),
            lowest_score: scores.iter().copied().min().unwrap_or(0),
            score_distribution: score_distribution(&scores),
        },
        generated_at: now,
    }
}

/// Histogram over 1-5. Scores outside that range are left out.
pub fn score_distribution(scores: &[u8]) -> BTreeMap<u8, usize> {
    let mut distribution: BTreeMap<u8, usize> = (MIN_SCORE..=MAX_SCORE).map(|s| (s, 0)).collect();
    for score in scores {
        if let Some(count) = distribution.get_mut(score) {
            *count += 1;
        }
    }
    distribution
}

/// Download name for an exported report, e.g. `interview_report_Ada_Lovelace_20260101_093000.json`.
pub fn report_filename(report: &Report) -> String {
    let name: String = report
        .candidate_summary
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!(
        "interview_report_{}_{}.json",
        name,
        report.generated_at.format("%Y%m%d_%H%M%S")
    )
}

fn highlight(label: &str, turn: &Turn) -> Highlight {
    Highlight {
        title: format!(
            "{label} Answer to '{}...'",
            truncate_chars(&turn.question, TITLE_QUESTION_CHARS)
        ),
        evidence: format!("{}...", truncate_chars(&turn.answer, EVIDENCE_ANSWER_CHARS)),
        score: turn.score,
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Empty input averages to 0.
fn mean(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    f64::from(total) / scores.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
