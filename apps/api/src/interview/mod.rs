//! Interview core: template → follow-up controller → session → report.
//! External LLM calls enter only through the QuestionGenerator and
//! AnswerGrader traits; everything else here is pure and synchronous.

pub mod controller;
pub mod engine;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod history;
pub mod prompts;
pub mod registry;
pub mod report;
pub mod scorer;
pub mod session;
pub mod template;

pub use error::InterviewError;
