//! Question routes
//!
//! - GET /questions - every stored question, answer keys backfilled
//! - POST /questions - interactive create
//! - DELETE /questions/:id - idempotent delete
//! - DELETE /clear-database - delete everything (confirmation required)
//! - DELETE /clear-questions - filtered delete (confirmation required when
//!   the filter is empty)

use bytes::Bytes;
use hyper::body::Body;
use hyper::header::HeaderMap;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::common::{
    json_response, no_content, parse_json, parse_optional_json, read_body, require_auth,
    BoxError, CONFIRM_WIPE_HEADER,
};
use crate::questions::{normalize_submission, CreateQuestionRequest, TagsInput};
use crate::server::{AppState, BoxBody};
use crate::store::QuestionFilter;
use crate::types::{AdminError, Result};

/// Body of the delete-many routes
#[derive(Debug, Default, Deserialize)]
pub struct ClearRequest {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub exam: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    /// Wipe confirmation phrase, alternative to the header
    #[serde(default)]
    pub confirm: Option<String>,
}

impl ClearRequest {
    fn filter(&self) -> QuestionFilter {
        QuestionFilter {
            subject: self.subject.clone(),
            exam: self.exam.clone(),
            difficulty: self.difficulty.clone(),
            tags: self.tags.clone().map(TagsInput::into_tags).unwrap_or_default(),
        }
        .normalized()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub message: String,
    pub deleted_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<QuestionFilter>,
}

/// Reject a delete-everything request that lacks the configured phrase
fn check_wipe_confirmation(state: &AppState, headers: &HeaderMap, body: &ClearRequest) -> Result<()> {
    let expected = state.args.wipe_confirmation.as_str();
    let from_header = headers
        .get(CONFIRM_WIPE_HEADER)
        .and_then(|v| v.to_str().ok());

    if from_header == Some(expected) || body.confirm.as_deref() == Some(expected) {
        return Ok(());
    }

    warn!("Refusing to delete all questions without confirmation");
    Err(AdminError::ConfirmationRequired(format!(
        "Send '{}' in the X-Confirm-Wipe header or the 'confirm' field to delete all questions",
        expected
    )))
}

/// Handle GET /questions
pub async fn list_questions<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>> {
    require_auth(state, req.headers())?;

    let mut questions = state.questions.list_all().await?;
    for question in &mut questions {
        question.backfill_answer_key();
    }

    Ok(json_response(StatusCode::OK, &questions))
}

/// Handle POST /questions
pub async fn create_question<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    require_auth(state, req.headers())?;

    let body = read_body(req.into_body(), state.args.max_body_bytes).await?;
    let submission: CreateQuestionRequest = parse_json(&body)?;
    let outcome = normalize_submission(submission)?;

    if outcome.is_degraded() {
        warn!(reasons = ?outcome.reasons(), "Creating question without a resolved answer");
    }

    let question = state.questions.insert_one(outcome.into_question()).await?;
    info!(id = ?question.id, "Question created");

    Ok(json_response(StatusCode::CREATED, &question))
}

/// Handle DELETE /questions/:id
pub async fn delete_question<B>(state: &AppState, req: Request<B>, id: &str) -> Result<Response<BoxBody>> {
    require_auth(state, req.headers())?;

    let deleted = state.questions.delete_by_id(id).await?;
    info!(id, deleted, "Delete question");

    Ok(no_content())
}

/// Handle DELETE /clear-database
pub async fn clear_database<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    require_auth(state, req.headers())?;

    let (parts, body) = req.into_parts();
    let body: ClearRequest = parse_optional_json(&read_body(body, state.args.max_body_bytes).await?)?;
    check_wipe_confirmation(state, &parts.headers, &body)?;

    let deleted = state.questions.delete_all().await?;
    warn!(deleted, "Cleared question collection");

    Ok(json_response(
        StatusCode::OK,
        &ClearResponse {
            message: format!("Successfully cleared database. Deleted {} questions.", deleted),
            deleted_count: deleted,
            filter: None,
        },
    ))
}

/// Handle DELETE /clear-questions
pub async fn clear_questions<B>(state: &AppState, req: Request<B>) -> Result<Response<BoxBody>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    require_auth(state, req.headers())?;

    let (parts, body) = req.into_parts();
    let body: ClearRequest = parse_optional_json(&read_body(body, state.args.max_body_bytes).await?)?;
    let filter = body.filter();

    if filter.is_empty() {
        check_wipe_confirmation(state, &parts.headers, &body)?;
    }

    let deleted = state.questions.delete_matching(&filter).await?;
    info!(deleted, filter = ?filter, "Cleared questions by filter");

    let filter_json = serde_json::to_string(&filter).unwrap_or_else(|_| "{}".to_string());
    Ok(json_response(
        StatusCode::OK,
        &ClearResponse {
            message: format!(
                "Successfully cleared questions with filter: {}. Deleted {} questions.",
                filter_json, deleted
            ),
            deleted_count: deleted,
            filter: Some(filter),
        },
    ))
}
