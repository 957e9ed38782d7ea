//! Order placement, editing and cancellation with stock bookkeeping.
//!
//! Every mutating call runs in a single `BEGIN IMMEDIATE` transaction, so
//! concurrent writers queue on SQLite's write lock instead of failing to
//! upgrade a read lock. Stock is only ever taken with a conditional
//! `UPDATE ... WHERE quantity >= n`: two buyers racing for the last units
//! cannot push a product below zero, the loser gets
//! [`ServiceError::InsufficientStock`] and nothing is written.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sea_query::{Alias, Expr, Order as SortOrder, Query, SelectStatement, SqliteQueryBuilder};
use sqlx::{pool::PoolConnection, sqlite::SqliteRow, Row, Sqlite, SqliteConnection};
use tracing::{info, warn};

use crate::{
    models::{Order, OrderSummary, Product},
    AppState,
};

use super::{
    error::{Result, ServiceError},
    product_service::{product_from_row, select_product_by_id},
    schema::{Orders, Products, Users},
};

const ORDER_COLUMNS: [Orders; 7] = [
    Orders::Id,
    Orders::OrderDate,
    Orders::ProductId,
    Orders::UserId,
    Orders::Quantity,
    Orders::Price,
    Orders::Discount,
];

// Fixed width keeps lexical order equal to chronological order.
fn format_order_date(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_order_date(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ServiceError::Malformed(format!("order_date {raw:?}: {e}")))
}

fn order_from_row(row: &SqliteRow) -> Result<Order> {
    let order_date: String = row.get("order_date");

    Ok(Order {
        id: row.get("id"),
        order_date: parse_order_date(&order_date)?,
        product_id: row.get("product_id"),
        user_id: row.get("user_id"),
        quantity: row.get("quantity"),
        price: row.get("price"),
        discount: row.get("discount"),
    })
}

fn summary_from_row(row: &SqliteRow) -> Result<OrderSummary> {
    Ok(OrderSummary {
        order: order_from_row(row)?,
        product_name: row.get("product_name"),
        picture: row.get("picture"),
        username: row.get("username"),
    })
}

fn select_summaries() -> SelectStatement {
    Query::select()
        .columns(ORDER_COLUMNS.map(|c| (Orders::Table, c)))
        .expr_as(
            Expr::col((Products::Table, Products::ProductName)),
            Alias::new("product_name"),
        )
        .expr_as(
            Expr::col((Products::Table, Products::Picture)),
            Alias::new("picture"),
        )
        .expr_as(
            Expr::col((Users::Table, Users::Username)),
            Alias::new("username"),
        )
        .from(Orders::Table)
        .left_join(
            Products::Table,
            Expr::col((Products::Table, Products::Id)).equals((Orders::Table, Orders::ProductId)),
        )
        .left_join(
            Users::Table,
            Expr::col((Users::Table, Users::Id)).equals((Orders::Table, Orders::UserId)),
        )
        .order_by((Orders::Table, Orders::OrderDate), SortOrder::Desc)
        .order_by((Orders::Table, Orders::Id), SortOrder::Desc)
        .to_owned()
}

async fn load_order(conn: &mut SqliteConnection, order_id: i64) -> Result<Option<Order>> {
    let query = Query::select()
        .columns(ORDER_COLUMNS)
        .from(Orders::Table)
        .and_where(Expr::col(Orders::Id).eq(order_id))
        .to_string(SqliteQueryBuilder);

    match sqlx::query(&query).fetch_optional(&mut *conn).await? {
        Some(row) => Ok(Some(order_from_row(&row)?)),
        None => Ok(None),
    }
}

async fn load_product(conn: &mut SqliteConnection, product_id: i64) -> Result<Option<Product>> {
    let row = sqlx::query(&select_product_by_id(product_id))
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.as_ref().map(product_from_row))
}

/// Atomically removes `n` units from stock, failing if fewer than `n` remain.
async fn take_stock(conn: &mut SqliteConnection, product: &Product, n: i64) -> Result<()> {
    let query = Query::update()
        .table(Products::Table)
        .value(Products::Quantity, Expr::col(Products::Quantity).sub(n))
        .and_where(Expr::col(Products::Id).eq(product.id))
        .and_where(Expr::col(Products::Quantity).gte(n))
        .to_string(SqliteQueryBuilder);

    let done = sqlx::query(&query).execute(&mut *conn).await?;
    if done.rows_affected() == 0 {
        warn!(
            product_id = product.id,
            requested = n,
            available = product.quantity,
            "stock check rejected"
        );
        return Err(ServiceError::InsufficientStock {
            product_id: product.id,
            requested: n,
            available: product.quantity,
        });
    }
    Ok(())
}

/// Puts `n` units back. Returns false when the product no longer exists.
async fn return_stock(conn: &mut SqliteConnection, product_id: i64, n: i64) -> Result<bool> {
    let query = Query::update()
        .table(Products::Table)
        .value(Products::Quantity, Expr::col(Products::Quantity).add(n))
        .and_where(Expr::col(Products::Id).eq(product_id))
        .to_string(SqliteQueryBuilder);

    let done = sqlx::query(&query).execute(&mut *conn).await?;
    Ok(done.rows_affected() > 0)
}

/// Takes a pooled connection and opens a write transaction on it.
async fn begin_immediate(state: &AppState) -> Result<PoolConnection<Sqlite>> {
    let mut conn = state.db.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
    Ok(conn)
}

/// Commits on success, rolls back on failure, and hands `result` back.
async fn finish<T>(conn: &mut SqliteConnection, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            sqlx::query("COMMIT").execute(&mut *conn).await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                warn!(error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}

/// Places an order for `quantity` units, snapshotting the product's current price and discount.
pub async fn create(state: &AppState, product_id: i64, user_id: i64, quantity: i64) -> Result<Order> {
    if quantity <= 0 {
        return Err(ServiceError::InvalidQuantity(quantity));
    }

    let mut conn = begin_immediate(state).await?;
    let result = insert_order(&mut conn, product_id, user_id, quantity).await;
    let order = finish(&mut conn, result).await?;

    info!(order_id = order.id, product_id, user_id, quantity, "order created");
    Ok(order)
}

async fn insert_order(
    conn: &mut SqliteConnection,
    product_id: i64,
    user_id: i64,
    quantity: i64,
) -> Result<Order> {
    let product = load_product(conn, product_id)
        .await?
        .ok_or(ServiceError::ProductNotFound(product_id))?;

    take_stock(conn, &product, quantity).await?;

    let order_date = Utc::now().trunc_subsecs(6);
    let query = Query::insert()
        .into_table(Orders::Table)
        .columns([
            Orders::OrderDate,
            Orders::ProductId,
            Orders::UserId,
            Orders::Quantity,
            Orders::Price,
            Orders::Discount,
        ])
        .values_panic([
            format_order_date(order_date).into(),
            product.id.into(),
            user_id.into(),
            quantity.into(),
            product.price.into(),
            product.discount.into(),
        ])
        .to_string(SqliteQueryBuilder);

    let done = sqlx::query(&query).execute(&mut *conn).await?;

    Ok(Order {
        id: done.last_insert_rowid(),
        order_date,
        product_id: product.id,
        user_id,
        quantity,
        price: product.price,
        discount: product.discount,
    })
}

pub async fn get_order_by_id(state: &AppState, order_id: i64) -> Result<Option<Order>> {
    let mut conn = state.db.acquire().await?;
    load_order(&mut *conn, order_id).await
}

/// All orders, newest first.
pub async fn get_orders(state: &AppState) -> Result<Vec<OrderSummary>> {
    let query = select_summaries().to_string(SqliteQueryBuilder);
    let rows = sqlx::query(&query).fetch_all(&state.db).await?;
    rows.iter().map(summary_from_row).collect()
}

/// Orders placed by `user_id`, newest first.
pub async fn get_orders_by_user(state: &AppState, user_id: i64) -> Result<Vec<OrderSummary>> {
    let query = select_summaries()
        .and_where(Expr::col((Orders::Table, Orders::UserId)).eq(user_id))
        .to_string(SqliteQueryBuilder);
    let rows = sqlx::query(&query).fetch_all(&state.db).await?;
    rows.iter().map(summary_from_row).collect()
}

/// Cancels an order, returning its units to the product if the product still exists.
pub async fn remove_by_id(state: &AppState, order_id: i64) -> Result<()> {
    let mut conn = begin_immediate(state).await?;
    let result = delete_order(&mut conn, order_id).await;
    let (order, restocked) = finish(&mut conn, result).await?;

    info!(order_id, product_id = order.product_id, restocked, "order removed");
    Ok(())
}

async fn delete_order(conn: &mut SqliteConnection, order_id: i64) -> Result<(Order, bool)> {
    let order = load_order(conn, order_id)
        .await?
        .ok_or(ServiceError::OrderNotFound(order_id))?;

    let restocked = return_stock(conn, order.product_id, order.quantity).await?;

    let query = Query::delete()
        .from_table(Orders::Table)
        .and_where(Expr::col(Orders::Id).eq(order_id))
        .to_string(SqliteQueryBuilder);
    sqlx::query(&query).execute(&mut *conn).await?;

    Ok((order, restocked))
}

/// Rewrites an order to `quantity` units of `product_id`.
///
/// Stock moves as one signed delta per product: on the same product only the
/// difference is taken or returned; when switching, the old product gets the
/// previous quantity back and the new product gives the full new quantity.
/// Price and discount are re-snapshotted from the target product.
pub async fn update(
    state: &AppState,
    order_id: i64,
    product_id: i64,
    user_id: i64,
    quantity: i64,
) -> Result<Order> {
    if quantity <= 0 {
        return Err(ServiceError::InvalidQuantity(quantity));
    }

    let mut conn = begin_immediate(state).await?;
    let result = rewrite_order(&mut conn, order_id, product_id, user_id, quantity).await;
    let (previous, updated) = finish(&mut conn, result).await?;

    info!(
        order_id,
        from_product = previous.product_id,
        to_product = updated.product_id,
        from_qty = previous.quantity,
        to_qty = updated.quantity,
        "order updated"
    );

    Ok(updated)
}

async fn rewrite_order(
    conn: &mut SqliteConnection,
    order_id: i64,
    product_id: i64,
    user_id: i64,
    quantity: i64,
) -> Result<(Order, Order)> {
    let order = load_order(conn, order_id)
        .await?
        .ok_or(ServiceError::OrderNotFound(order_id))?;

    let product = load_product(conn, product_id)
        .await?
        .ok_or(ServiceError::ProductNotFound(product_id))?;

    if order.product_id == product.id {
        let delta = quantity - order.quantity;
        if delta > 0 {
            take_stock(conn, &product, delta).await.map_err(|e| match e {
                ServiceError::InsufficientStock { .. } => ServiceError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available: product.quantity + order.quantity,
                },
                other => other,
            })?;
        } else if delta < 0 {
            return_stock(conn, product.id, -delta).await?;
        }
    } else {
        return_stock(conn, order.product_id, order.quantity).await?;
        take_stock(conn, &product, quantity).await?;
    }

    let order_date = Utc::now().trunc_subsecs(6);
    let query = Query::update()
        .table(Orders::Table)
        .value(Orders::OrderDate, format_order_date(order_date))
        .value(Orders::ProductId, product.id)
        .value(Orders::UserId, user_id)
        .value(Orders::Quantity, quantity)
        .value(Orders::Price, product.price)
        .value(Orders::Discount, product.discount)
        .and_where(Expr::col(Orders::Id).eq(order_id))
        .to_string(SqliteQueryBuilder);
    sqlx::query(&query).execute(&mut *conn).await?;

    let updated = Order {
        id: order_id,
        order_date,
        product_id: product.id,
        user_id,
        quantity,
        price: product.price,
        discount: product.discount,
    };
    Ok((order, updated))
}
