use sea_query::{Expr, Order as SortOrder, Query, SqliteQueryBuilder};
use sqlx::{sqlite::SqliteRow, Row};

use crate::{
    models::{NewProduct, Product},
    AppState,
};

use super::{error::Result, schema::Products};

pub(crate) const PRODUCT_COLUMNS: [Products; 6] = [
    Products::Id,
    Products::ProductName,
    Products::Price,
    Products::Discount,
    Products::Quantity,
    Products::Picture,
];

pub(crate) fn product_from_row(row: &SqliteRow) -> Product {
    Product {
        id: row.get("id"),
        product_name: row.get("product_name"),
        price: row.get("price"),
        discount: row.get("discount"),
        quantity: row.get("quantity"),
        picture: row.get("picture"),
    }
}

pub(crate) fn select_product_by_id(product_id: i64) -> String {
    Query::select()
        .columns(PRODUCT_COLUMNS)
        .from(Products::Table)
        .and_where(Expr::col(Products::Id).eq(product_id))
        .to_string(SqliteQueryBuilder)
}

pub async fn get_product_by_id(state: &AppState, product_id: i64) -> Result<Option<Product>> {
    let row = sqlx::query(&select_product_by_id(product_id))
        .fetch_optional(&state.db)
        .await?;
    Ok(row.as_ref().map(product_from_row))
}

pub async fn get_products(state: &AppState) -> Result<Vec<Product>> {
    let query = Query::select()
        .columns(PRODUCT_COLUMNS)
        .from(Products::Table)
        .order_by(Products::ProductName, SortOrder::Asc)
        .to_string(SqliteQueryBuilder);

    let rows = sqlx::query(&query).fetch_all(&state.db).await?;
    Ok(rows.iter().map(product_from_row).collect())
}

pub async fn create_product(state: &AppState, new: &NewProduct) -> Result<Product> {
    let query = Query::insert()
        .into_table(Products::Table)
        .columns([
            Products::ProductName,
            Products::Price,
            Products::Discount,
            Products::Quantity,
            Products::Picture,
        ])
        .values_panic([
            new.product_name.clone().into(),
            new.price.into(),
            new.discount.into(),
            new.quantity.into(),
            new.picture.clone().into(),
        ])
        .to_string(SqliteQueryBuilder);

    let done = sqlx::query(&query).execute(&state.db).await?;

    Ok(Product {
        id: done.last_insert_rowid(),
        product_name: new.product_name.clone(),
        price: new.price,
        discount: new.discount,
        quantity: new.quantity,
        picture: new.picture.clone(),
    })
}
