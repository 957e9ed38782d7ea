use std::sync::LazyLock;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{render, services::auth_service, AppState};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn signed_in_redirect(headers: &HeaderMap, jar: CookieJar) -> Response {
    (jar, render::redirect(headers, "/Product/Index")).into_response()
}

// ---------------- LOGIN ----------------

pub async fn get_login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    render::render_page(&state, &headers, None, StatusCode::OK, "Login", "pages/login", &json!({}))
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn post_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_string();
    let password = form.password.trim().to_string();

    let mut errors = serde_json::Map::new();

    if email.is_empty() {
        errors.insert("email".into(), json!("Email is required."));
    } else if !is_valid_email(&email) {
        errors.insert("email".into(), json!("Invalid email."));
    }

    if password.is_empty() {
        errors.insert("password".into(), json!("Password is required."));
    }

    let rerender = |errors: serde_json::Map<String, serde_json::Value>| {
        render::render_page(
            &state,
            &headers,
            None,
            StatusCode::OK,
            "Login",
            "pages/login",
            &json!({
                "values": {"email": email},
                "errors": errors
            }),
        )
    };

    if !errors.is_empty() {
        return rerender(errors);
    }

    let user = match auth_service::login_user(&state, &email, &password).await {
        Ok(u) => u,
        Err(errs) => {
            for (k, v) in errs {
                errors.insert(k, json!(v));
            }
            return rerender(errors);
        }
    };

    let token = match auth_service::make_jwt_with_days(&state, user.id, 7) {
        Ok(t) => t,
        Err(e) => {
            errors.insert("_form".into(), json!(format!("Auth error: {e}")));
            return rerender(errors);
        }
    };

    info!(user_id = user.id, "user signed in");
    let jar = jar.add(auth_service::auth_cookie(&state, token));
    signed_in_redirect(&headers, jar)
}

// ---------------- REGISTER ----------------

pub async fn get_register(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    render::render_page(&state, &headers, None, StatusCode::OK, "Register", "pages/register", &json!({}))
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,

    #[serde(default, rename = "rePassword")]
    pub re_password: Option<String>,
}

pub async fn post_register(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let username = form.username.trim().to_string();
    let email = form.email.trim().to_string();
    let password = form.password.trim().to_string();
    let re_password = form.re_password.as_deref().unwrap_or("").trim().to_string();

    let mut errors = serde_json::Map::new();

    if username.is_empty() {
        errors.insert("username".into(), json!("Username is required."));
    } else if username.len() < 2 {
        errors.insert("username".into(), json!("Username must be at least 2 characters."));
    }

    if email.is_empty() {
        errors.insert("email".into(), json!("Email is required."));
    } else if !is_valid_email(&email) {
        errors.insert("email".into(), json!("Invalid email."));
    }

    if password.is_empty() {
        errors.insert("password".into(), json!("Password is required."));
    } else if password.len() < 6 {
        errors.insert("password".into(), json!("Password must be at least 6 characters."));
    }

    if re_password.is_empty() {
        errors.insert("rePassword".into(), json!("Repeat password is required."));
    } else if password != re_password {
        errors.insert("rePassword".into(), json!("Passwords do not match."));
    }

    let rerender = |errors: serde_json::Map<String, serde_json::Value>| {
        render::render_page(
            &state,
            &headers,
            None,
            StatusCode::OK,
            "Register",
            "pages/register",
            &json!({
                "values": {"username": username, "email": email},
                "errors": errors
            }),
        )
    };

    if !errors.is_empty() {
        return rerender(errors);
    }

    let user_id = match auth_service::register_user(&state, &username, &email, &password).await {
        Ok(id) => id,
        Err(errs) => {
            for (k, v) in errs {
                errors.insert(k, json!(v));
            }
            return rerender(errors);
        }
    };

    let token = match auth_service::make_jwt_with_days(&state, user_id, 7) {
        Ok(t) => t,
        Err(e) => {
            errors.insert("_form".into(), json!(format!("Auth error: {e}")));
            return rerender(errors);
        }
    };

    info!(user_id, "user registered");
    let jar = jar.add(auth_service::auth_cookie(&state, token));
    signed_in_redirect(&headers, jar)
}

// ---------------- LOGOUT ----------------

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(auth_service::clear_auth_cookie(&state));
    (jar, (StatusCode::SEE_OTHER, [("Location", "/")]))
}
