use std::sync::Arc;

use crate::interview::generator::QuestionGenerator;
use crate::interview::registry::InterviewRegistry;
use crate::interview::scorer::AnswerGrader;
use crate::interview::template::Template;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub interviews: InterviewRegistry,
    /// Loaded once at startup and never modified.
    pub template: Arc<Template>,
    /// Pluggable generator. Default: LlmQuestionGenerator.
    pub generator: Arc<dyn QuestionGenerator>,
    /// Pluggable grader. Default: LlmAnswerGrader.
    pub grader: Arc<dyn AnswerGrader>,
    /// Used when a start request does not choose its own limit.
    pub default_max_followups: u32,
}
