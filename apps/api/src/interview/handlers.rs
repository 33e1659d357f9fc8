//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::MAX_FOLLOWUPS_LIMIT;
use crate::errors::AppError;
use crate::interview::engine::{submit_answer, Interview, InterviewStatus, TurnOutcome};
use crate::interview::registry::SharedInterview;
use crate::interview::report::{report_filename, Report};
use crate::interview::template::Template;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StartInterviewRequest {
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub max_followups: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub template: Template,
    pub total_questions: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/template
pub async fn handle_get_template(State(state): State<AppState>) -> Json<TemplateResponse> {
    Json(TemplateResponse {
        template: state.template.as_ref().clone(),
        total_questions: state.template.total_questions(),
    })
}

/// POST /api/v1/interviews
///
/// Starts an interview against the loaded template and returns its first prompt.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewStatus>), AppError> {
    let max_followups = request
        .max_followups
        .unwrap_or(state.default_max_followups);
    if max_followups > MAX_FOLLOWUPS_LIMIT {
        return Err(AppError::Validation(format!(
            "max_followups must be between 0 and {MAX_FOLLOWUPS_LIMIT}"
        )));
    }

    let candidate_name = request.candidate_name.unwrap_or_default();
    let interview = Interview::start(&state.template, &candidate_name, max_followups)?;
    let status = interview.status();
    state.interviews.insert(interview).await;

    Ok((StatusCode::CREATED, Json(status)))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewStatus>, AppError> {
    let interview = find_interview(&state, id).await?;
    let status = interview.lock().await.status();
    Ok(Json(status))
}

/// POST /api/v1/interviews/:id/answers
///
/// Answers the active prompt. 409 once the interview is complete or while
/// another answer to it is still being processed.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let interview = find_interview(&state, id).await?;
    let outcome = submit_answer(
        &interview,
        &request.answer,
        state.generator.as_ref(),
        state.grader.as_ref(),
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/interviews/:id/end
///
/// Ends the interview (early or not) and returns the final report.
pub async fn handle_end_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    let interview = find_interview(&state, id).await?;
    let mut interview = interview.lock().await;
    interview.end();
    Ok(Json(interview.report()))
}

/// GET /api/v1/interviews/:id/report
///
/// Report as a JSON download. An in-progress interview reports what it has so far.
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let interview = find_interview(&state, id).await?;
    let report = interview.lock().await.report();
    let disposition = format!("attachment; filename=\"{}\"", report_filename(&report));
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(report)))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.interviews.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

async fn find_interview(state: &AppState, id: Uuid) -> Result<SharedInterview, AppError> {
    state.interviews.get(id).await.ok_or_else(|| not_found(id))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Interview {id} not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::interview::controller::{ControllerState, NextStep};
    use crate::interview::generator::tests::ScriptedGenerator;
    use crate::interview::registry::InterviewRegistry;
    use crate::interview::report::Recommendation;
    use crate::interview::scorer::tests::FixedGrader;
    use crate::interview::template::tests::sample_template;
    use crate::routes::build_router;

    const NO_FOLLOW_UP: &str = "QUESTION:\nEVALUATION: Fine";

    fn server(replies: Vec<Option<&str>>, grade: &str) -> TestServer {
        let state = AppState {
            interviews: InterviewRegistry::new(),
            template: Arc::new(sample_template()),
            generator: Arc::new(ScriptedGenerator::new(replies)),
            grader: Arc::new(FixedGrader::replying(grade)),
            default_max_followups: 1,
        };
        TestServer::new(build_router(state)).unwrap()
    }

    async fn start(server: &TestServer) -> InterviewStatus {
        let response = server
            .post("/api/v1/interviews")
            .json(&json!({ "candidate_name": "Ada Lovelace" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<InterviewStatus>()
    }

    #[tokio::test]
    async fn test_get_template() {
        let server = server(vec![], "SCORE: 3");
        let response = server.get("/api/v1/template").await;
        response.assert_status_ok();
        let body: TemplateResponse = response.json();
        assert_eq!(body.total_questions, 3);
        assert_eq!(body.template.role, "AI Engineer");
    }

    #[tokio::test]
    async fn test_start_interview_returns_first_prompt() {
        let server = server(vec![], "SCORE: 3");
        let status = start(&server).await;
        assert_eq!(status.candidate_name, "Ada Lovelace");
        assert_eq!(status.state, ControllerState::AwaitingAnswer);
        assert_eq!(status.max_followups, 1);
        assert_eq!(
            status.active_prompt.unwrap().question,
            "Explain the bias-variance tradeoff."
        );

        let fetched = server.get(&format!("/api/v1/interviews/{}", status.id)).await;
        fetched.assert_status_ok();
        assert_eq!(fetched.json::<InterviewStatus>().id, status.id);
    }

    #[tokio::test]
    async fn test_start_rejects_too_many_followups() {
        let server = server(vec![], "SCORE: 3");
        let response = server
            .post("/api/v1/interviews")
            .json(&json!({ "max_followups": 4 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_full_interview_over_http() {
        let server = server(vec![Some(NO_FOLLOW_UP); 3], "SCORE: 4 REASON: clear");
        let status = start(&server).await;
        let answers_url = format!("/api/v1/interviews/{}/answers", status.id);

        for i in 0..3 {
            let response = server
                .post(&answers_url)
                .json(&json!({ "answer": format!("answer {i}") }))
                .await;
            response.assert_status_ok();
            let outcome: TurnOutcome = response.json();
            assert_eq!(outcome.turn.score, 4);
            if i == 2 {
                assert_eq!(outcome.next, NextStep::Complete);
            }
        }

        let rejected = server
            .post(&answers_url)
            .json(&json!({ "answer": "too late" }))
            .await;
        rejected.assert_status(StatusCode::CONFLICT);

        let report = server
            .get(&format!("/api/v1/interviews/{}/report", status.id))
            .await;
        report.assert_status_ok();
        let disposition = report.header("content-disposition");
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"interview_report_Ada_Lovelace_"));
        let body: Report = report.json();
        assert_eq!(body.total_turns, 3);
        assert_eq!(body.overall_recommendation, Recommendation::StrongHire);
    }

    #[tokio::test]
    async fn test_end_interview_early_returns_report() {
        let server = server(vec![Some(NO_FOLLOW_UP)], "SCORE: 2");
        let status = start(&server).await;

        server
            .post(&format!("/api/v1/interviews/{}/answers", status.id))
            .json(&json!({ "answer": "partial answer" }))
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("/api/v1/interviews/{}/end", status.id))
            .await;
        response.assert_status_ok();
        let report: Report = response.json();
        assert_eq!(report.total_turns, 1);
        assert_eq!(report.overall_recommendation, Recommendation::NoHire);

        let after = server.get(&format!("/api/v1/interviews/{}", status.id)).await;
        assert_eq!(after.json::<InterviewStatus>().state, ControllerState::Complete);
    }

    #[tokio::test]
    async fn test_unknown_interview_is_not_found() {
        let server = server(vec![], "SCORE: 3");
        let id = Uuid::new_v4();
        server
            .get(&format!("/api/v1/interviews/{id}"))
            .await
            .assert_status_not_found();
        server
            .post(&format!("/api/v1/interviews/{id}/answers"))
            .json(&json!({ "answer": "hello" }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_delete_discards_interview() {
        let server = server(vec![], "SCORE: 3");
        let status = start(&server).await;
        let url = format!("/api/v1/interviews/{}", status.id);

        server.delete(&url).await.assert_status(StatusCode::NO_CONTENT);
        server.get(&url).await.assert_status_not_found();
        server.delete(&url).await.assert_status_not_found();
    }
}
