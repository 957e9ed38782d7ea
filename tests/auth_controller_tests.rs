mod common;

use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use common::{location, response_body_string, test_state};
use tower::ServiceExt;
use webshop::{controllers::auth_controller, models::ROLE_CLIENT, services::user_service};

#[tokio::test]
async fn post_login_missing_fields_renders_errors() {
    let state = test_state().await;
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=&password="))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Email is required."));
    assert!(body.contains("Password is required."));
}

#[tokio::test]
async fn post_login_invalid_email_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=not-an-email&password=123456"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Invalid email."));
}

#[tokio::test]
async fn post_register_password_mismatch_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    // rePassword mismatch
    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=654321",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Passwords do not match."));
}

#[tokio::test]
async fn post_login_missing_password_only_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=test%40example.com&password="))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Password is required."));
    assert!(!body.contains("Invalid email."));
}

#[tokio::test]
async fn post_login_missing_email_only_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=&password=123456"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Email is required."));
    assert!(!body.contains("Password is required."));
}

#[tokio::test]
async fn post_register_missing_username_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Username is required."));
}

#[tokio::test]
async fn post_register_short_username_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=a&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("at least 2 characters"));
}

#[tokio::test]
async fn post_register_short_password_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123&rePassword=123",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("at least 6 characters"));
}

#[tokio::test]
async fn post_register_missing_repeat_password_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Repeat password is required."));
}

#[tokio::test]
async fn post_register_creates_client_and_sets_session_cookie() {
    let state = test_state().await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/Product/Index"));

    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("auth="));
    assert!(cookie.contains("HttpOnly"));

    let user = user_service::find_by_email(&state, "test@example.com")
        .await
        .unwrap()
        .expect("registered user");
    assert_eq!(user.username, "TestUser");
    assert_eq!(user.role, ROLE_CLIENT);
    assert_ne!(user.password_hash, "123456");
}

#[tokio::test]
async fn post_register_taken_email_renders_error() {
    let state = test_state().await;
    common::seed_user(&state, "taken", ROLE_CLIENT).await;
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=Other&email=taken%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Email has already been taken!"));
}

#[tokio::test]
async fn post_login_wrong_password_renders_error_then_right_password_signs_in() {
    let state = test_state().await;
    webshop::services::auth_service::register_user(&state, "Shopper", "shop@example.com", "secret1")
        .await
        .unwrap();
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=shop%40example.com&password=wrong1"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(response_body_string(res).await.contains("Invalid email or password."));

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(axum::body::Body::from("email=shop%40example.com&password=secret1"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("HX-Redirect").and_then(|v| v.to_str().ok()),
        Some("/Product/Index")
    );
    assert!(res.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let state = test_state().await;
    let app = Router::new()
        .route("/logout", post(auth_controller::logout))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/logout")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/"));

    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(cookie.starts_with("auth=;"));
}
