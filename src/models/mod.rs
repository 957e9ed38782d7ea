pub mod user;
pub mod product;
pub mod order;

pub use user::{CurrentUser, User, ROLE_ADMINISTRATOR, ROLE_CLIENT};
pub use product::{NewProduct, Product};
pub use order::{Order, OrderSummary};
