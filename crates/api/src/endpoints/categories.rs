//! Category catalog endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use wyr_common::AppResult;
use wyr_core::CategoryWithCount;

use crate::middleware::AppState;

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryWithCount>,
}

/// The static catalog with live question counts.
async fn list_categories(State(state): State<AppState>) -> AppResult<Json<CategoriesResponse>> {
    let categories = state.category_service.list_with_counts().await?;
    Ok(Json(CategoriesResponse { categories }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories))
}
