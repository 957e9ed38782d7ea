use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::{
    config::Settings,
    models::{NewProduct, ROLE_ADMINISTRATOR},
    AppState,
};

use super::{
    auth_service, product_service,
    schema::{CREATE_ORDERS_TABLE, CREATE_PRODUCTS_TABLE, CREATE_USERS_TABLE},
    user_service,
};

// How long a writer waits for another writer's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(settings: &Settings) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&settings.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(settings.db_max_connections)
        .connect_with(options)
        .await
}

pub async fn ensure_schema(db: &SqlitePool) -> Result<(), sqlx::Error> {
    for ddl in [CREATE_USERS_TABLE, CREATE_PRODUCTS_TABLE, CREATE_ORDERS_TABLE] {
        sqlx::raw_sql(ddl).execute(db).await?;
    }
    Ok(())
}

/// Creates the configured administrator account unless the email is already registered.
pub async fn ensure_admin(state: &AppState) -> Result<(), String> {
    let (Some(email), Some(password)) = (
        state.settings.admin_email.as_deref(),
        state.settings.admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    let existing = user_service::find_by_email(state, email)
        .await
        .map_err(|e| e.to_string())?;
    if existing.is_some() {
        return Ok(());
    }

    let username = email.split('@').next().unwrap_or("admin");
    auth_service::create_user(state, username, email, password, ROLE_ADMINISTRATOR)
        .await
        .map_err(|errs| {
            errs.into_values().collect::<Vec<_>>().join("; ")
        })?;

    info!(email, "administrator account created");
    Ok(())
}

/// Fills an empty catalog with a few products so a fresh install has something to order.
pub async fn seed_demo_products(state: &AppState) -> Result<(), String> {
    let existing = product_service::get_products(state)
        .await
        .map_err(|e| e.to_string())?;
    if !existing.is_empty() {
        return Ok(());
    }

    let demo = [
        ("Espresso beans 1kg", 24.90, 0.0, 40),
        ("Pour-over kettle", 59.00, 10.0, 12),
        ("Ceramic cup", 9.50, 0.0, 100),
        ("Hand grinder", 89.00, 15.0, 5),
    ];

    for (name, price, discount, quantity) in demo {
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
        .map_err(|e| e.to_string())?;
    }

    info!(count = demo.len(), "seeded demo products");
    Ok(())
}
