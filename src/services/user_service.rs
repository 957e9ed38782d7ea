use sea_query::{Expr, Query, SimpleExpr, SqliteQueryBuilder};
use sqlx::{sqlite::SqliteRow, Row};

use crate::{models::User, AppState};

use super::schema::Users;

const USER_COLUMNS: [Users; 5] = [
    Users::Id,
    Users::Username,
    Users::Email,
    Users::PasswordHash,
    Users::Role,
];

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
    }
}

fn select_user_where(cond: SimpleExpr) -> String {
    Query::select()
        .columns(USER_COLUMNS)
        .from(Users::Table)
        .and_where(cond)
        .to_string(SqliteQueryBuilder)
}

async fn fetch_one_user(state: &AppState, sql: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(sql).fetch_optional(&state.db).await?;
    Ok(row.as_ref().map(user_from_row))
}

pub async fn find_by_id(state: &AppState, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    let sql = select_user_where(Expr::col(Users::Id).eq(user_id));
    fetch_one_user(state, &sql).await
}

pub async fn find_by_email(state: &AppState, email: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = select_user_where(Expr::col(Users::Email).eq(email));
    fetch_one_user(state, &sql).await
}

pub async fn find_by_username(state: &AppState, username: &str) -> Result<Option<User>, sqlx::Error> {
    let sql = select_user_where(Expr::col(Users::Username).eq(username));
    fetch_one_user(state, &sql).await
}

/// Inserts a user row and returns its id. `password_hash` must already be hashed.
pub async fn insert_user(
    state: &AppState,
    username: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<i64, sqlx::Error> {
    let query = Query::insert()
        .into_table(Users::Table)
        .columns([Users::Username, Users::Email, Users::PasswordHash, Users::Role])
        .values_panic([
            username.into(),
            email.into(),
            password_hash.into(),
            role.into(),
        ])
        .to_string(SqliteQueryBuilder);

    let done = sqlx::query(&query).execute(&state.db).await?;
    Ok(done.last_insert_rowid())
}
