use thiserror::Error;

use crate::interview::controller::ControllerState;
use crate::interview::template::TemplateError;

/// Errors raised by the interview core. Every variant is a caller-side
/// problem: external-call failures never surface here.
#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("Invalid interview template: {0}")]
    Template(#[from] TemplateError),

    #[error("Score {0} is outside the 1-5 range")]
    ScoreOutOfRange(u8),

    #[error("Interview is complete; no further turns may be recorded")]
    SessionComplete,

    #[error("An answer for this interview is already being processed")]
    AnswerInProgress,

    #[error("Cannot {operation} while the interview is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: ControllerState,
    },
}
