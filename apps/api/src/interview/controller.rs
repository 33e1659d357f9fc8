//! Follow-up controller: decides after each answer whether to dig deeper
//! on the current base question or move on to the next one.
//!
//! The controller never calls the generator or the grader. It is fed their
//! results and only applies the branching policy:
//!
//! ```text
//! AwaitingAnswer --accept_answer--> Scoring --answer_scored--> DecidingNext
//! DecidingNext --decide_next--> AwaitingAnswer (follow-up or next base question)
//!                           \--> Complete (template exhausted)
//! any non-terminal --end--> Complete
//! ```

use serde::{Deserialize, Serialize};

use crate::interview::error::InterviewError;
use crate::interview::template::{BaseQuestion, Template};

/// Follow-ups this short (after trimming) are treated as no follow-up at all.
pub const MIN_FOLLOWUP_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    AwaitingAnswer,
    Scoring,
    DecidingNext,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Base,
    FollowUp,
}

/// The prompt the candidate is currently expected to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePrompt {
    pub question: String,
    pub section: String,
    pub kind: PromptKind,
}

impl ActivePrompt {
    fn base(question: &BaseQuestion) -> Self {
        Self {
            question: question.text.clone(),
            section: question.section.clone(),
            kind: PromptKind::Base,
        }
    }
}

/// Result of `decide_next`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextStep {
    FollowUp { prompt: ActivePrompt },
    Advance { prompt: ActivePrompt },
    Complete,
}

#[derive(Debug, Clone)]
pub struct FollowUpController {
    questions: Vec<BaseQuestion>,
    cursor: usize,
    max_followups: u32,
    followup_count: u32,
    active: Option<ActivePrompt>,
    state: ControllerState,
}

impl FollowUpController {
    /// Refuses to start against a template with nothing to ask.
    pub fn new(template: &Template, max_followups: u32) -> Result<Self, InterviewError> {
        template.validate()?;
        let questions = template.base_questions();
        let active = questions.first().map(ActivePrompt::base);

        Ok(Self {
            questions,
            cursor: 0,
            max_followups,
            followup_count: 0,
            active,
            state: ControllerState::AwaitingAnswer,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == ControllerState::Complete
    }

    /// `None` once the interview is complete.
    pub fn active_prompt(&self) -> Option<&ActivePrompt> {
        self.active.as_ref()
    }

    pub fn followup_count(&self) -> u32 {
        self.followup_count
    }

    pub fn max_followups(&self) -> u32 {
        self.max_followups
    }

    /// `(base questions finished, total base questions)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.questions.len())
    }

    /// The prompt an answer would be accepted for. Does not change state.
    pub fn awaiting_prompt(&self) -> Result<&ActivePrompt, InterviewError> {
        self.expect_state(ControllerState::AwaitingAnswer, "accept an answer")?;
        self.active.as_ref().ok_or(InterviewError::SessionComplete)
    }

    /// `AwaitingAnswer -> Scoring`. Returns the prompt being answered.
    pub fn accept_answer(&mut self) -> Result<ActivePrompt, InterviewError> {
        let prompt = self.awaiting_prompt()?.clone();
        self.state = ControllerState::Scoring;
        Ok(prompt)
    }

    /// `Scoring -> DecidingNext`.
    pub fn answer_scored(&mut self) -> Result<(), InterviewError> {
        self.expect_state(ControllerState::Scoring, "record a score")?;
        self.state = ControllerState::DecidingNext;
        Ok(())
    }

    /// Applies the follow-up policy to the generator's suggestion.
    pub fn decide_next(&mut self, follow_up: Option<&str>) -> Result<NextStep, InterviewError> {
        self.expect_state(ControllerState::DecidingNext, "decide the next prompt")?;

        if let Some(question) = follow_up.filter(|q| is_usable_followup(q)) {
            if self.followup_count < self.max_followups {
                let section = self.questions[self.cursor].section.clone();
                let prompt = ActivePrompt {
                    question: question.trim().to_string(),
                    section,
                    kind: PromptKind::FollowUp,
                };
                self.followup_count += 1;
                self.active = Some(prompt.clone());
                self.state = ControllerState::AwaitingAnswer;
                return Ok(NextStep::FollowUp { prompt });
            }
        }

        self.followup_count = 0;
        self.cursor += 1;

        match self.questions.get(self.cursor) {
            Some(next) => {
                let prompt = ActivePrompt::base(next);
                self.active = Some(prompt.clone());
                self.state = ControllerState::AwaitingAnswer;
                Ok(NextStep::Advance { prompt })
            }
            None => {
                self.finish();
                Ok(NextStep::Complete)
            }
        }
    }

    /// Ends the interview early. Accepted from any state; already-complete is a no-op.
    pub fn end(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.state = ControllerState::Complete;
        self.active = None;
    }

    fn expect_state(
        &self,
        expected: ControllerState,
        operation: &'static str,
    ) -> Result<(), InterviewError> {
        match self.state {
            s if s == expected => Ok(()),
            ControllerState::Complete => Err(InterviewError::SessionComplete),
            state => Err(InterviewError::InvalidTransition { operation, state }),
        }
    }
}

/// Blank or very short generator output is not worth asking.
pub fn is_usable_followup(question: &str) -> bool {
    question.trim().chars().count() > MIN_FOLLOWUP_CHARS
}
