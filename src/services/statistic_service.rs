use sea_query::{Alias, Expr, Func, Query, SqliteQueryBuilder};
use sqlx::Row;

use crate::{models::ROLE_CLIENT, AppState};

use super::{
    error::Result,
    schema::{Orders, Products, Users},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub count_clients: i64,
    pub count_products: i64,
    pub count_orders: i64,
    pub sum_orders: f64,
}

// Counts are aliased `n`.
async fn scalar_i64(state: &AppState, sql: &str) -> Result<i64> {
    let row = sqlx::query(sql).fetch_one(&state.db).await?;
    Ok(row.get("n"))
}

pub async fn count_clients(state: &AppState) -> Result<i64> {
    let sql = Query::select()
        .expr_as(Func::count(Expr::col(Users::Id)), Alias::new("n"))
        .from(Users::Table)
        .and_where(Expr::col(Users::Role).eq(ROLE_CLIENT))
        .to_string(SqliteQueryBuilder);
    scalar_i64(state, &sql).await
}

pub async fn count_products(state: &AppState) -> Result<i64> {
    let sql = Query::select()
        .expr_as(Func::count(Expr::col(Products::Id)), Alias::new("n"))
        .from(Products::Table)
        .to_string(SqliteQueryBuilder);
    scalar_i64(state, &sql).await
}

pub async fn count_orders(state: &AppState) -> Result<i64> {
    let sql = Query::select()
        .expr_as(Func::count(Expr::col(Orders::Id)), Alias::new("n"))
        .from(Orders::Table)
        .to_string(SqliteQueryBuilder);
    scalar_i64(state, &sql).await
}

/// Sum of order totals after discount, using the snapshotted prices.
pub async fn sum_orders(state: &AppState) -> Result<f64> {
    let sql = Query::select()
        .expr_as(
            Expr::cust("COALESCE(SUM(quantity * price * (100.0 - discount) / 100.0), 0.0)"),
            Alias::new("total"),
        )
        .from(Orders::Table)
        .to_string(SqliteQueryBuilder);

    let row = sqlx::query(&sql).fetch_one(&state.db).await?;
    Ok(row.get("total"))
}

pub async fn collect(state: &AppState) -> Result<Statistics> {
    Ok(Statistics {
        count_clients: count_clients(state).await?,
        count_products: count_products(state).await?,
        count_orders: count_orders(state).await?,
        sum_orders: sum_orders(state).await?,
    })
}
