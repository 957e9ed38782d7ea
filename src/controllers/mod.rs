pub mod home_controller;
pub mod auth_controller;
pub mod product_controller;
pub mod order_controller;
pub mod statistic_controller;
