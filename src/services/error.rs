/// Result type for the product, order and statistic services.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("order {0} not found")]
    OrderNotFound(i64),

    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("not enough stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    #[error("stored value is malformed: {0}")]
    Malformed(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Failures caused by the request itself rather than by storage.
    pub fn is_guard_failure(&self) -> bool {
        matches!(
            self,
            ServiceError::ProductNotFound(_)
                | ServiceError::InsufficientStock { .. }
                | ServiceError::InvalidQuantity(_)
        )
    }
}
