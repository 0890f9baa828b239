//! Profile and settings endpoints.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use wyr_common::{AppError, AppResult};
use wyr_core::{ProfileStats, RecentQuestion};
use wyr_db::entities::user::ContentPreference;

use crate::{extractors::AuthUser, middleware::AppState};

use super::questions::ResponseBody;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: ProfileUserBody,
    pub stats: ProfileStatsBody,
    pub recent_questions: Vec<RecentQuestionBody>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUserBody {
    pub id: String,
    pub username: String,
    pub joined_at: String,
    pub content_preference: ContentPreference,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatsBody {
    pub questions_created: u64,
    pub votes_count: u64,
    pub points_earned: u64,
    pub rank: i64,
}

impl From<ProfileStats> for ProfileStatsBody {
    fn from(s: ProfileStats) -> Self {
        Self {
            questions_created: s.questions_created,
            votes_count: s.votes_cast,
            points_earned: s.points_earned,
            rank: s.rank,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuestionBody {
    pub id: String,
    pub prompt: String,
    pub category: wyr_db::entities::question::Category,
    pub sensitive_content: bool,
    pub votes: i64,
    pub created_at: String,
    pub responses: Vec<ResponseBody>,
}

impl From<RecentQuestion> for RecentQuestionBody {
    fn from(q: RecentQuestion) -> Self {
        Self {
            id: q.id,
            prompt: q.prompt,
            category: q.category,
            sensitive_content: q.sensitive_content,
            votes: q.votes,
            created_at: q.created_at.to_rfc3339(),
            responses: q
                .responses
                .into_iter()
                .map(|r| ResponseBody {
                    id: r.id,
                    text: r.text,
                    order: r.order,
                })
                .collect(),
        }
    }
}

/// Identity, activity counters, and the ten newest authored questions.
async fn profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.profile(&user).await?;

    Ok(Json(ProfileResponse {
        user: ProfileUserBody {
            id: profile.user.id,
            username: profile.user.username,
            joined_at: profile.user.joined_at.to_rfc3339(),
            content_preference: profile.user.content_preference,
        },
        stats: profile.stats.into(),
        recent_questions: profile
            .recent_questions
            .into_iter()
            .map(Into::into)
            .collect(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPreferenceResponse {
    pub content_preference: ContentPreference,
}

async fn get_sensitive_content(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ContentPreferenceResponse>> {
    let content_preference = state.user_service.content_preference(&user.id).await?;
    Ok(Json(ContentPreferenceResponse { content_preference }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetContentPreferenceRequest {
    pub content_preference: String,
}

/// Update the content preference.
///
/// The value arrives as a plain string so an unknown value is a 400,
/// not a body-deserialization rejection.
async fn set_sensitive_content(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SetContentPreferenceRequest>,
) -> AppResult<Json<ContentPreferenceResponse>> {
    let preference = match req.content_preference.as_str() {
        "ALL" => ContentPreference::All,
        "SAFE_ONLY" => ContentPreference::SafeOnly,
        "ADULT_ONLY" => ContentPreference::AdultOnly,
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown content preference: {other}"
            )));
        }
    };

    let content_preference = state
        .user_service
        .set_content_preference(&user.id, preference)
        .await?;

    Ok(Json(ContentPreferenceResponse { content_preference }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route(
            "/sensitive-content",
            get(get_sensitive_content).post(set_sensitive_content),
        )
}
