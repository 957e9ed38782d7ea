use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    pub price: f64,
    // percent, 0..=100
    pub discount: f64,
    // units in stock
    pub quantity: i64,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub product_name: String,
    pub price: f64,
    pub discount: f64,
    pub quantity: i64,
    pub picture: Option<String>,
}
