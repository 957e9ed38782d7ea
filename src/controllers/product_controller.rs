use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::{models::CurrentUser, render, services::product_service, AppState};

fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

// GET /Product/Index
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let products = match product_service::get_products(&state).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "listing products failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("db error: {e}"))).into_response();
        }
    };

    let rows: Vec<serde_json::Value> = products
        .into_iter()
        .map(|p| {
            json!({
                "id": p.id,
                "product_name": p.product_name,
                "picture": p.picture,
                "price": fmt2(p.price),
                "discount": fmt2(p.discount),
                "quantity": p.quantity,
                "in_stock": p.quantity > 0,
            })
        })
        .collect();

    let user_ref = user.as_ref().map(|Extension(u)| u);
    render::render_page(
        &state,
        &headers,
        user_ref,
        StatusCode::OK,
        "Products",
        "pages/products",
        &json!({ "products": rows, "is_logged_in": user_ref.is_some() }),
    )
}
