//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use wyr_core::{CategoryService, ProfileService, QuestionService, UserService, VoteService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub question_service: QuestionService,
    pub vote_service: VoteService,
    pub category_service: CategoryService,
    pub profile_service: ProfileService,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a user and stores the model in request
/// extensions. Requests without a valid token pass through anonymous;
/// handlers that require identity reject via the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
