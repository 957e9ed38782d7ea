pub mod error;
pub mod schema;
pub mod db_init;

pub mod auth_service;
pub mod user_service;
pub mod product_service;
pub mod order_service;
pub mod statistic_service;

pub use error::ServiceError;
