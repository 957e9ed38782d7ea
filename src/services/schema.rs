//! Table and column identifiers for query building, plus the DDL run at startup.

use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "username"]
    Username,
    #[iden = "email"]
    Email,
    #[iden = "password_hash"]
    PasswordHash,
    #[iden = "role"]
    Role,
}

#[derive(Iden, Clone, Copy)]
pub enum Products {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "product_name"]
    ProductName,
    #[iden = "price"]
    Price,
    #[iden = "discount"]
    Discount,
    #[iden = "quantity"]
    Quantity,
    #[iden = "picture"]
    Picture,
}

#[derive(Iden, Clone, Copy)]
pub enum Orders {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "order_date"]
    OrderDate,
    #[iden = "product_id"]
    ProductId,
    #[iden = "user_id"]
    UserId,
    #[iden = "quantity"]
    Quantity,
    #[iden = "price"]
    Price,
    #[iden = "discount"]
    Discount,
}

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL
);
"#;

pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL,
    price REAL NOT NULL,
    discount REAL NOT NULL DEFAULT 0,
    quantity INTEGER NOT NULL,
    picture TEXT
);
"#;

// No foreign key on product_id: orders outlive removed products.
pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_date TEXT NOT NULL,
    product_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    price REAL NOT NULL,
    discount REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user_date ON orders(user_id, order_date);
"#;
