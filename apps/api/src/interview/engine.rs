//! Interview: one candidate's session, follow-up controller and
//! conversation history, driven one answer at a time.
//!
//! An answer goes through three steps. The prompt and context are copied
//! out, the generator and grader are called with no lock held, and the
//! result is applied in one synchronous step. Until that last step nothing
//! in the interview changes, so a dropped request leaves it as it was.
//! External failures never abort the interview: a failed generator call
//! means "no follow-up", a failed grade means score 3.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::interview::controller::{
    ActivePrompt, ControllerState, FollowUpController, NextStep, PromptKind,
};
use crate::interview::error::InterviewError;
use crate::interview::generator::{parse_generator_reply, GeneratorReply, QuestionGenerator};
use crate::interview::history::{ConversationHistory, HistoryEntry, Speaker};
use crate::interview::report::{synthesize, Report};
use crate::interview::scorer::{score_answer, AnswerGrader, ScoreOutcome};
use crate::interview::session::{InterviewSession, Turn};
use crate::interview::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub turn: Turn,
    pub scoring: ScoreOutcome,
    /// The generator's `EVALUATION:` line, when it produced one.
    pub evaluation: Option<String>,
    pub next: NextStep,
    pub progress: Progress,
}

/// Read-only snapshot for clients polling an interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewStatus {
    pub id: Uuid,
    pub role: String,
    pub candidate_name: String,
    pub state: ControllerState,
    pub active_prompt: Option<ActivePrompt>,
    pub followup_count: u32,
    pub max_followups: u32,
    pub progress: Progress,
    pub turns_recorded: usize,
    /// An answer has been submitted and its generator/grader calls are running.
    pub answer_in_progress: bool,
    pub started_at: DateTime<Utc>,
}

/// The single outstanding-answer slot of one interview. Freed on drop.
#[derive(Debug)]
struct AnswerSlot(Arc<AtomicBool>);

impl AnswerSlot {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for AnswerSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// What the external calls need, copied out of the interview.
struct PendingAnswer {
    interview_id: Uuid,
    prompt: ActivePrompt,
    role: String,
    context: Vec<HistoryEntry>,
    slot: AnswerSlot,
}

/// External call results, ready to be applied.
struct GradedAnswer {
    prompt: ActivePrompt,
    answer: String,
    raw_reply: Option<String>,
    scoring: ScoreOutcome,
    _slot: AnswerSlot,
}

impl PendingAnswer {
    async fn grade(
        self,
        answer: &str,
        generator: &dyn QuestionGenerator,
        grader: &dyn AnswerGrader,
    ) -> GradedAnswer {
        let raw_reply = match generator
            .generate_next(&self.role, &self.context, answer)
            .await
        {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(
                    "Interview {}: question generation failed, advancing: {e}",
                    self.interview_id
                );
                None
            }
        };

        let scoring = score_answer(grader, answer).await;

        GradedAnswer {
            prompt: self.prompt,
            answer: answer.to_string(),
            raw_reply,
            scoring,
            _slot: self.slot,
        }
    }
}

/// Records the candidate's answer to the active prompt and moves the
/// interview forward.
///
/// The interview lock is held only while copying the prompt out and while
/// applying the result, never across the generator or grader call. At most
/// one answer per interview is outstanding (`AnswerInProgress` otherwise).
/// If the interview is ended while the calls run, the answer is discarded
/// and `SessionComplete` is returned.
pub async fn submit_answer(
    interview: &Mutex<Interview>,
    answer: &str,
    generator: &dyn QuestionGenerator,
    grader: &dyn AnswerGrader,
) -> Result<TurnOutcome, InterviewError> {
    let pending = interview.lock().await.begin_answer()?;
    let graded = pending.grade(answer, generator, grader).await;
    interview.lock().await.apply_answer(graded)
}

#[derive(Debug)]
pub struct Interview {
    id: Uuid,
    session: InterviewSession,
    controller: FollowUpController,
    history: ConversationHistory,
    answer_slot: Arc<AtomicBool>,
    last_activity: Instant,
}

impl Interview {
    /// Validates the template before anything is recorded.
    pub fn start(
        template: &Template,
        candidate_name: &str,
        max_followups: u32,
    ) -> Result<Self, InterviewError> {
        let controller = FollowUpController::new(template, max_followups)?;
        let session = InterviewSession::new(template.role.clone(), candidate_name);
        let id = Uuid::new_v4();

        info!(
            "Interview {id} started: {} for {} ({} questions, max {max_followups} follow-ups)",
            session.role(),
            session.candidate_name(),
            template.total_questions()
        );

        Ok(Self {
            id,
            session,
            controller,
            history: ConversationHistory::new(),
            answer_slot: Arc::new(AtomicBool::new(false)),
            last_activity: Instant::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_complete(&self) -> bool {
        self.controller.is_complete()
    }

    pub fn answer_in_progress(&self) -> bool {
        self.answer_slot.load(Ordering::Acquire)
    }

    /// Time since the interview was started, answered or ended.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    #[cfg(test)]
    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    #[cfg(test)]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    fn begin_answer(&self) -> Result<PendingAnswer, InterviewError> {
        let prompt = self.controller.awaiting_prompt()?.clone();
        let slot = AnswerSlot::claim(&self.answer_slot).ok_or(InterviewError::AnswerInProgress)?;

        // The generator sees the base question it is following up on
        let mut context = self.history.entries().to_vec();
        if prompt.kind == PromptKind::Base {
            context.push(HistoryEntry {
                speaker: Speaker::Interviewer,
                text: prompt.question.clone(),
            });
        }

        Ok(PendingAnswer {
            interview_id: self.id,
            prompt,
            role: self.session.role().to_string(),
            context,
            slot,
        })
    }

    fn apply_answer(&mut self, graded: GradedAnswer) -> Result<TurnOutcome, InterviewError> {
        let GradedAnswer {
            prompt,
            answer,
            raw_reply,
            scoring,
            _slot,
        } = graded;

        if self.is_complete() {
            info!(
                "Interview {}: answer arrived after the interview ended, discarding",
                self.id
            );
            return Err(InterviewError::SessionComplete);
        }
        self.controller.accept_answer()?;

        // Follow-ups are already in the history as the generator's own reply
        if prompt.kind == PromptKind::Base {
            self.history.interviewer(prompt.question.as_str());
        }
        self.history.candidate(answer.as_str());
        let reply = match raw_reply {
            Some(text) => {
                let parsed = parse_generator_reply(&text);
                self.history.interviewer(text);
                parsed
            }
            None => GeneratorReply::default(),
        };

        self.session.add_turn(
            prompt.question.as_str(),
            answer.as_str(),
            scoring.score,
            Some(prompt.section.as_str()),
        )?;
        self.controller.answer_scored()?;
        let next = self.controller.decide_next(reply.question.as_deref())?;
        self.last_activity = Instant::now();

        debug!(
            "Interview {} recorded turn {} (score {}, fallback: {})",
            self.id,
            self.session.turns().len(),
            scoring.score,
            scoring.is_fallback()
        );

        if self.is_complete() {
            self.session.complete();
            info!(
                "Interview {} complete after {} turns ({} min)",
                self.id,
                self.session.turns().len(),
                self.session.duration_minutes()
            );
        }

        Ok(TurnOutcome {
            turn: Turn {
                question: prompt.question,
                answer,
                score: scoring.score,
                dimension: Some(prompt.section),
            },
            scoring,
            evaluation: reply.evaluation,
            next,
            progress: self.progress(),
        })
    }

    /// Ends the interview early. Recorded turns are kept.
    pub fn end(&mut self) {
        if !self.is_complete() {
            info!(
                "Interview {} ended early with {} turns",
                self.id,
                self.session.turns().len()
            );
        }
        self.controller.end();
        self.session.complete();
        self.last_activity = Instant::now();
    }

    pub fn report(&self) -> Report {
        synthesize(&self.session)
    }

    pub fn status(&self) -> InterviewStatus {
        InterviewStatus {
            id: self.id,
            role: self.session.role().to_string(),
            candidate_name: self.session.candidate_name().to_string(),
            state: self.controller.state(),
            active_prompt: self.controller.active_prompt().cloned(),
            followup_count: self.controller.followup_count(),
            max_followups: self.controller.max_followups(),
            progress: self.progress(),
            turns_recorded: self.session.turns().len(),
            answer_in_progress: self.answer_in_progress(),
            started_at: self.session.start_time(),
        }
    }

    fn progress(&self) -> Progress {
        let (answered, total) = self.controller.progress();
        Progress { answered, total }
    }
}
