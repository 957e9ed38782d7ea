use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{models::CurrentUser, render, services::statistic_service, AppState};

// GET /Statistic/Index (administrators)
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return render::redirect(&headers, "/login");
    };

    if !u.is_admin() {
        return render::redirect(&headers, "/Order/Denied");
    }

    let stats = match statistic_service::collect(&state).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "collecting statistics failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}"))).into_response();
        }
    };

    render::render_page(
        &state,
        &headers,
        Some(&u),
        StatusCode::OK,
        "Statistics",
        "pages/statistics",
        &json!({
            "count_clients": stats.count_clients,
            "count_products": stats.count_products,
            "count_orders": stats.count_orders,
            "sum_orders": format!("{:.2}", stats.sum_orders),
        }),
    )
}
