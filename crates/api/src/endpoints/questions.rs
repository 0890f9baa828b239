//! Question endpoints: serving, browsing, creation, and voting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wyr_common::{AppError, AppResult};
use wyr_core::{
    Choice, CreateQuestionInput, NextQuestion, Pagination, QuestionDetail, VoteResults,
};
use wyr_db::entities::question::Category;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
};

/// A question as served over the API.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub prompt: String,
    pub category: Category,
    pub sensitive_content: bool,
    pub score: i32,
    pub votes: i64,
    pub created_at: String,
    pub responses: Vec<ResponseBody>,
    pub author: Option<AuthorBody>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub id: String,
    pub text: String,
    pub order: i16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorBody {
    pub username: String,
}

impl From<QuestionDetail> for QuestionResponse {
    fn from(detail: QuestionDetail) -> Self {
        Self {
            id: detail.question.id,
            prompt: detail.question.prompt,
            category: detail.question.category,
            sensitive_content: detail.question.sensitive_content,
            score: detail.question.score,
            votes: detail.votes,
            created_at: detail.question.created_at.to_rfc3339(),
            responses: detail
                .responses
                .into_iter()
                .map(|r| ResponseBody {
                    id: r.id,
                    text: r.text,
                    order: r.order,
                })
                .collect(),
            author: detail
                .author_username
                .map(|username| AuthorBody { username }),
        }
    }
}

#[derive(Serialize)]
pub struct NoQuestionsResponse {
    pub message: &'static str,
}

/// Serve a question the caller has not voted on.
///
/// Both "all seen" and "nothing exists" come back as a 200 message
/// body, so the client can tell "done for now" from a failure.
async fn random_unseen(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    match state.question_service.next_unseen(maybe_user.as_ref()).await? {
        NextQuestion::Ready(detail) => Ok(Json(QuestionResponse::from(*detail)).into_response()),
        NextQuestion::Exhausted | NextQuestion::Empty => Ok(Json(NoQuestionsResponse {
            message: "No more questions available",
        })
        .into_response()),
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationBody {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<Pagination> for PaginationBody {
    fn from(p: Pagination) -> Self {
        Self {
            current_page: p.current_page,
            total_pages: p.total_pages,
            total_count: p.total_count,
            has_next: p.has_next,
            has_prev: p.has_prev,
        }
    }
}

#[derive(Serialize)]
pub struct QuestionPageResponse {
    pub questions: Vec<QuestionResponse>,
    pub pagination: PaginationBody,
}

/// Browse one category, highest score first.
async fn by_category(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<QuestionPageResponse>> {
    let category = Category::from_str_loose(&category)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {category}")))?;

    let sensitive = maybe_user
        .as_ref()
        .map_or(Some(false), |u| u.content_preference.sensitive_filter());

    let page = state
        .question_service
        .list_by_category(
            category,
            sensitive,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(10),
        )
        .await?;

    Ok(Json(QuestionPageResponse {
        questions: page.questions.into_iter().map(Into::into).collect(),
        pagination: page.pagination.into(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub prompt: String,
    pub option_a: String,
    pub option_b: String,
    pub category: Option<String>,
    pub sensitive_content: Option<bool>,
}

/// Create a question with its two options.
async fn create_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateQuestionRequest>,
) -> AppResult<(StatusCode, Json<QuestionResponse>)> {
    let category = match req.category {
        Some(raw) => Some(
            Category::from_str_loose(&raw)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown category: {raw}")))?,
        ),
        None => None,
    };

    let detail = state
        .question_service
        .create(
            &user,
            CreateQuestionInput {
                prompt: req.prompt,
                option_a: req.option_a,
                option_b: req.option_b,
                category,
                sensitive_content: req.sensitive_content,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail.into())))
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub choice: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResultsBody {
    pub total_votes: u64,
    pub a_votes: u64,
    pub b_votes: u64,
    pub a_percentage: i64,
    pub b_percentage: i64,
}

impl From<VoteResults> for VoteResultsBody {
    fn from(r: VoteResults) -> Self {
        Self {
            total_votes: r.total_votes,
            a_votes: r.a_votes,
            b_votes: r.b_votes,
            a_percentage: r.a_percentage,
            b_percentage: r.b_percentage,
        }
    }
}

#[derive(Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub results: VoteResultsBody,
}

/// Record a vote and return updated tallies.
///
/// The choice arrives as a plain string so an out-of-range letter is a
/// 400, not a body-deserialization rejection.
async fn vote(
    MaybeAuthUser(maybe_user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<VoteResponse>> {
    let choice = Choice::parse(&req.choice).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid choice: {}; expected A or B", req.choice))
    })?;

    let results = state
        .vote_service
        .cast(&id, choice, maybe_user.as_ref())
        .await?;

    Ok(Json(VoteResponse {
        success: true,
        results: results.into(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_question))
        .route("/random-unseen", get(random_unseen))
        .route("/category/{category}", get(by_category))
        .route("/{id}/vote", post(vote))
}
