use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{models::CurrentUser, render, AppState};

pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let user_ref = user.as_ref().map(|Extension(u)| u);
    render::render_page(
        &state,
        &headers,
        user_ref,
        StatusCode::OK,
        "WebShop",
        "pages/home",
        &json!({ "is_logged_in": user_ref.is_some() }),
    )
}

pub async fn not_found(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let user_ref = user.as_ref().map(|Extension(u)| u);
    render::render_page(
        &state,
        &headers,
        user_ref,
        StatusCode::NOT_FOUND,
        "404",
        "pages/not_found",
        &json!({}),
    )
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Html("ok".to_string()))
}

pub async fn health_db(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (StatusCode::OK, Html("db: ok".to_string())).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {}", e)),
        )
            .into_response(),
    }
}
