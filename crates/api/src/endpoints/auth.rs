//! Authentication endpoints.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use wyr_common::AppResult;
use wyr_core::CreateUserInput;
use wyr_db::entities::user;

use crate::middleware::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Session response with the bearer token for subsequent requests.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub joined_at: String,
}

fn session_response(user: user::Model) -> SessionResponse {
    SessionResponse {
        token: user.token,
        user: SessionUser {
            id: user.id,
            username: user.username,
            joined_at: user.created_at.to_rfc3339(),
        },
    }
}

/// Create an account and issue a token.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let user = state
        .user_service
        .create(CreateUserInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(session_response(user))))
}

/// Exchange credentials for the account token.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> AppResult<Json<SessionResponse>> {
    let user = state
        .user_service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(Json(session_response(user)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}
