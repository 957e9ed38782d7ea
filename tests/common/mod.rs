#![allow(dead_code)]

use axum::http::Request;
use http_body_util::BodyExt;
use sqlx::{sqlite::SqlitePoolOptions, Row};
use tempfile::TempDir;
use webshop::{
    config::Settings,
    models::{CurrentUser, NewProduct, Product},
    services::{db_init, product_service, user_service},
    templates, AppState,
};

fn test_settings(database_url: String, db_max_connections: u32) -> Settings {
    Settings {
        database_url,
        db_max_connections,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        jwt_cookie_name: "auth".to_string(),
        cookie_secure: false,
        bcrypt_cost: 4,
        admin_email: None,
        admin_password: None,
        seed_demo_data: false,
    }
}

fn state_with(db: sqlx::SqlitePool, settings: Settings) -> AppState {
    AppState {
        hbs: templates::build_handlebars().expect("templates"),
        db,
        settings,
    }
}

pub async fn test_state() -> AppState {
    let settings = test_settings("sqlite::memory:".to_string(), 1);

    // one long-lived connection, otherwise every connection sees its own empty database
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<std::time::Duration>)
        .max_lifetime(None::<std::time::Duration>)
        .connect(&settings.database_url)
        .await
        .expect("in-memory sqlite");
    db_init::ensure_schema(&db).await.expect("schema");

    state_with(db, settings)
}

/// A database file inside `dir`, opened the way the server opens it, so
/// several pooled connections really contend for the write lock.
pub async fn file_state(dir: &TempDir, max_connections: u32) -> AppState {
    let path = dir.path().join("webshop.db");
    let settings = test_settings(format!("sqlite://{}", path.display()), max_connections);

    let db = db_init::connect(&settings).await.expect("file sqlite");
    db_init::ensure_schema(&db).await.expect("schema");

    state_with(db, settings)
}

pub async fn seed_product(state: &AppState, name: &str, price: f64, discount: f64, quantity: i64) -> Product {
    product_service::create_product(
        state,
        &NewProduct {
            product_name: name.to_string(),
            price,
            discount,
            quantity,
            picture: None,
        },
    )
    .await
    .expect("insert product")
}

pub async fn seed_user(state: &AppState, username: &str, role: &str) -> CurrentUser {
    let email = format!("{username}@example.com");
    let id = user_service::insert_user(state, username, &email, "not-a-real-hash", role)
        .await
        .expect("insert user");
    CurrentUser {
        id,
        email,
        username: username.to_string(),
        role: role.to_string(),
    }
}

pub async fn stock_of(state: &AppState, product_id: i64) -> i64 {
    sqlx::query("SELECT quantity FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_one(&state.db)
        .await
        .expect("product row")
        .get("quantity")
}

pub async fn order_count(state: &AppState) -> i64 {
    sqlx::query("SELECT COUNT(*) AS n FROM orders")
        .fetch_one(&state.db)
        .await
        .expect("count")
        .get("n")
}

pub fn as_user<B>(mut req: Request<B>, user: &CurrentUser) -> Request<B> {
    req.extensions_mut().insert(user.clone());
    req
}

pub async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub fn location(res: &axum::response::Response) -> Option<String> {
    res.headers()
        .get(axum::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
