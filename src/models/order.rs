use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub order_date: DateTime<Utc>,
    pub product_id: i64,
    pub user_id: i64,
    pub quantity: i64,

    // copied from the product when the order is placed or edited
    pub price: f64,
    pub discount: f64,
}

impl Order {
    pub fn total_price(&self) -> f64 {
        let gross = self.quantity as f64 * self.price;
        gross - gross * self.discount / 100.0
    }
}

/// An order joined with the names needed to list it.
///
/// Product and user fields are `None` when the referenced row no longer exists.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub order: Order,
    pub product_name: Option<String>,
    pub picture: Option<String>,
    pub username: Option<String>,
}
