use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::{models::CurrentUser, AppState};

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Sends the browser to `path`: `HX-Redirect` for HTMX requests, a 303 otherwise.
pub fn redirect(headers: &HeaderMap, path: &'static str) -> Response {
    if is_htmx(headers) {
        let mut out = HeaderMap::new();
        out.insert("HX-Redirect", HeaderValue::from_static(path));
        return (StatusCode::OK, out, Html("".to_string())).into_response();
    }

    Redirect::to(path).into_response()
}

pub fn render_full(
    state: &AppState,
    title: &str,
    body_html: String,
    user: Option<&CurrentUser>,
) -> Result<String, String> {
    let (is_logged_in, is_admin, user_json) = match user {
        Some(u) => (
            true,
            u.is_admin(),
            json!({
                "id": u.id,
                "email": u.email,
                "username": u.username,
                "role": u.role,
            }),
        ),
        None => (false, false, serde_json::Value::Null),
    };

    let ctx = json!({
        "title": title,
        "body": body_html,
        "is_logged_in": is_logged_in,
        "is_admin": is_admin,
        "user": user_json,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

/// Renders `template` with `ctx`; HTMX requests get the fragment, everyone else the full layout.
pub fn render_page(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&CurrentUser>,
    status: StatusCode,
    title: &str,
    template: &str,
    ctx: &serde_json::Value,
) -> Response {
    let body = match state.hbs.render(template, ctx) {
        Ok(s) => s,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("template error: {e}")),
            )
                .into_response()
        }
    };

    if is_htmx(headers) {
        return (status, Html(body)).into_response();
    }

    match render_full(state, title, body, user) {
        Ok(page) => (status, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}
